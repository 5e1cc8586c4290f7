//! Core ledger data types.
//!
//! This module contains the data model of the badge ledger:
//!
//! - `UintRange` and range-set arithmetic
//! - `Balance` and balance-list algebra
//! - `Address` and `AddressMapping`
//! - Generic timelines and the pure resolver
//! - The seven permission kinds and `ValueOptions`
//! - Approval rules, Merkle challenges, usage trackers
//! - `BadgeCollection` and `UserBalanceStore`

pub mod address;
pub mod address_mapping;
pub mod approvals;
pub mod balance;
pub mod collection;
pub mod permissions;
pub mod ranges;
pub mod timeline;

pub use address::{address_to_hex, Address};
pub use address_mapping::AddressMapping;
pub use approvals::{
    ApprovalsTracker, CollectionApprovedTransfer, IsCollectionTransferAllowed,
    IsUserIncomingTransferAllowed, IsUserOutgoingTransferAllowed, MerkleChallenge,
    MerklePathItem, MerkleProof, PerAddressApprovals, UserApprovedIncomingTransfer,
    UserApprovedOutgoingTransfer,
};
pub use balance::Balance;
pub use collection::{
    BadgeCollection, BadgeMetadata, CollectionMetadata, CollectionPermissions,
    UserBalanceStore, UserPermissions,
};
pub use permissions::{
    ActionCombination, ActionDefaultValues, ActionPermission, BalancesActionCombination,
    BalancesActionDefaultValues, BalancesActionPermission,
    CollectionApprovedTransferCombination, CollectionApprovedTransferDefaultValues,
    CollectionApprovedTransferPermission, TimedUpdateCombination, TimedUpdateDefaultValues,
    TimedUpdatePermission, TimedUpdateWithBadgeIdsCombination,
    TimedUpdateWithBadgeIdsDefaultValues, TimedUpdateWithBadgeIdsPermission,
    UserApprovedIncomingTransferCombination, UserApprovedIncomingTransferDefaultValues,
    UserApprovedIncomingTransferPermission, UserApprovedOutgoingTransferCombination,
    UserApprovedOutgoingTransferDefaultValues, UserApprovedOutgoingTransferPermission,
    ValueOptions,
};
pub use ranges::UintRange;
pub use timeline::{resolve_timeline, validate_timeline, Timeline, TimelineEntry};
