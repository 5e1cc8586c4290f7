//! The authorization pipeline.
//!
//! Leaf-first: address-mapping resolution, Merkle challenge validation,
//! and usage tracking feed the permission evaluator and the transfer
//! approval resolver.

pub mod address_mapping;
pub mod approvals;
pub mod challenges;
pub mod permissions;
pub mod timeline;
pub mod trackers;

pub use address_mapping::resolve_address_mapping;
pub use approvals::{authorize_transfer, Authorized, OverridePolicy, TransferContext};
pub use challenges::verify_challenge;
pub use permissions::{
    check_action_permission, check_balances_action_permission,
    check_collection_approved_transfer_permission, check_timed_update_permission,
    check_timed_update_with_badge_ids_permission, check_user_incoming_transfer_permission,
    check_user_outgoing_transfer_permission, ApprovedTransferCandidate, PermissionVerdict,
};
pub use timeline::{is_archived, resolve_manager};
pub use trackers::{check_cap, current_usage, LeafConsumption, PendingCommit, TrackerUpdate};
