//! # Crest Core
//!
//! Core types, range arithmetic, and hashing for the Crest badge ledger.
//!
//! This crate provides the foundation for the state machine crate:
//! - Closed-interval range sets (badge IDs, times, amounts)
//! - Balance algebra over (amount × badge IDs × ownership times)
//! - Address mappings (named inclusion/exclusion address sets)
//! - Generic timelines with a pure first-match resolver
//! - First-match combinatorial permission types
//! - Approval rules, Merkle challenges, and usage trackers
//! - SHA-256 hashing and Merkle tree computation
//! - Deterministic binary serialization

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crypto;
pub mod error;
pub mod serialization;
pub mod transaction;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{BalanceError, CoreError, RangeError, SerializationError, TimelineError};
pub use transaction::{Transaction, Transfer};
pub use types::{
    ActionCombination, ActionDefaultValues, ActionPermission, Address, AddressMapping,
    ApprovalsTracker, BadgeCollection, BadgeMetadata, Balance, BalancesActionCombination,
    BalancesActionDefaultValues, BalancesActionPermission, CollectionApprovedTransfer,
    CollectionApprovedTransferCombination, CollectionApprovedTransferDefaultValues,
    CollectionApprovedTransferPermission, CollectionMetadata, CollectionPermissions,
    IsCollectionTransferAllowed, IsUserIncomingTransferAllowed, IsUserOutgoingTransferAllowed,
    MerkleChallenge, MerklePathItem, MerkleProof, PerAddressApprovals, TimedUpdateCombination,
    TimedUpdateDefaultValues, TimedUpdatePermission, TimedUpdateWithBadgeIdsCombination,
    TimedUpdateWithBadgeIdsDefaultValues, TimedUpdateWithBadgeIdsPermission, Timeline,
    TimelineEntry, UintRange, UserApprovedIncomingTransfer,
    UserApprovedIncomingTransferCombination, UserApprovedIncomingTransferDefaultValues,
    UserApprovedIncomingTransferPermission, UserApprovedOutgoingTransfer,
    UserApprovedOutgoingTransferCombination, UserApprovedOutgoingTransferDefaultValues,
    UserApprovedOutgoingTransferPermission, UserBalanceStore, UserPermissions, ValueOptions,
};
