//! Badge collections and per-user balance stores.

use serde::{Deserialize, Serialize};

use crate::types::address::Address;
use crate::types::approvals::{
    CollectionApprovedTransfer, UserApprovedIncomingTransfer, UserApprovedOutgoingTransfer,
};
use crate::types::balance::Balance;
use crate::types::permissions::{
    ActionPermission, BalancesActionPermission, CollectionApprovedTransferPermission,
    TimedUpdatePermission, TimedUpdateWithBadgeIdsPermission,
    UserApprovedIncomingTransferPermission, UserApprovedOutgoingTransferPermission,
};
use crate::types::ranges::UintRange;
use crate::types::timeline::Timeline;

/// Off-chain metadata reference for a collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Metadata URI.
    pub uri: String,
    /// Arbitrary attached data.
    pub custom_data: String,
}

/// Off-chain metadata reference for a set of badges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeMetadata {
    /// Metadata URI.
    pub uri: String,
    /// Arbitrary attached data.
    pub custom_data: String,
    /// Badge IDs this metadata covers.
    pub badge_ids: Vec<UintRange>,
}

/// Manager-gated permissions of a collection.
///
/// Each field is its own first-match permission list; an empty list leaves
/// the action neutral (allowed until explicitly locked).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPermissions {
    /// Gates deleting the collection.
    pub can_delete_collection: Vec<ActionPermission>,
    /// Gates archiving/unarchiving.
    pub can_archive_collection: Vec<TimedUpdatePermission>,
    /// Gates manager handoff.
    pub can_update_manager: Vec<TimedUpdatePermission>,
    /// Gates collection metadata updates.
    pub can_update_collection_metadata: Vec<TimedUpdatePermission>,
    /// Gates badge metadata updates.
    pub can_update_badge_metadata: Vec<TimedUpdateWithBadgeIdsPermission>,
    /// Gates minting of additional badges.
    pub can_create_more_badges: Vec<BalancesActionPermission>,
    /// Gates updates to the collection approved-transfers timeline.
    pub can_update_collection_approved_transfers: Vec<CollectionApprovedTransferPermission>,
}

/// Self-imposed permissions of a user's balance store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissions {
    /// Gates updates to the user's outgoing approvals.
    pub can_update_approved_outgoing_transfers: Vec<UserApprovedOutgoingTransferPermission>,
    /// Gates updates to the user's incoming approvals.
    pub can_update_approved_incoming_transfers: Vec<UserApprovedIncomingTransferPermission>,
}

/// A badge collection: timelines of configuration plus the permission
/// lists that constrain changing them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCollection {
    /// Unique collection identifier.
    pub collection_id: u64,
    /// Who manages the collection, over time.
    pub manager_timeline: Timeline<Address>,
    /// Collection metadata, over time.
    pub collection_metadata_timeline: Timeline<CollectionMetadata>,
    /// Badge metadata, over time.
    pub badge_metadata_timeline: Timeline<Vec<BadgeMetadata>>,
    /// Whether the collection is archived (read-only), over time.
    pub is_archived_timeline: Timeline<bool>,
    /// The collection-level approval rules, over time.
    pub collection_approved_transfers_timeline: Timeline<Vec<CollectionApprovedTransfer>>,
    /// Outgoing approvals a user starts with before customizing.
    pub default_user_approved_outgoing_transfers_timeline:
        Timeline<Vec<UserApprovedOutgoingTransfer>>,
    /// Incoming approvals a user starts with before customizing.
    pub default_user_approved_incoming_transfers_timeline:
        Timeline<Vec<UserApprovedIncomingTransfer>>,
    /// Manager-gated permissions.
    pub permissions: CollectionPermissions,
}

impl BadgeCollection {
    /// A collection with the given ID and no configuration.
    pub fn new(collection_id: u64) -> Self {
        Self {
            collection_id,
            manager_timeline: Vec::new(),
            collection_metadata_timeline: Vec::new(),
            badge_metadata_timeline: Vec::new(),
            is_archived_timeline: Vec::new(),
            collection_approved_transfers_timeline: Vec::new(),
            default_user_approved_outgoing_transfers_timeline: Vec::new(),
            default_user_approved_incoming_transfers_timeline: Vec::new(),
            permissions: CollectionPermissions::default(),
        }
    }
}

/// Per-user state within one collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalanceStore {
    /// Badges held, as (amount, badge IDs, ownership times) entries.
    pub balances: Vec<Balance>,
    /// The user's outgoing approval rules, over time.
    pub approved_outgoing_transfers_timeline: Timeline<Vec<UserApprovedOutgoingTransfer>>,
    /// The user's incoming approval rules, over time.
    pub approved_incoming_transfers_timeline: Timeline<Vec<UserApprovedIncomingTransfer>>,
    /// Self-imposed permissions on changing the above.
    pub permissions: UserPermissions,
}

impl UserBalanceStore {
    /// A store seeded from a collection's default approval timelines.
    pub fn from_collection_defaults(collection: &BadgeCollection) -> Self {
        Self {
            balances: Vec::new(),
            approved_outgoing_transfers_timeline: collection
                .default_user_approved_outgoing_transfers_timeline
                .clone(),
            approved_incoming_transfers_timeline: collection
                .default_user_approved_incoming_transfers_timeline
                .clone(),
            permissions: UserPermissions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{deserialize, serialize};
    use crate::types::timeline::TimelineEntry;

    #[test]
    fn test_new_collection_is_empty() {
        let collection = BadgeCollection::new(7);
        assert_eq!(collection.collection_id, 7);
        assert!(collection.manager_timeline.is_empty());
        assert!(collection.collection_approved_transfers_timeline.is_empty());
    }

    #[test]
    fn test_user_store_inherits_defaults() {
        let mut collection = BadgeCollection::new(1);
        collection.default_user_approved_incoming_transfers_timeline =
            vec![TimelineEntry::always(Vec::new())];

        let store = UserBalanceStore::from_collection_defaults(&collection);
        assert_eq!(store.approved_incoming_transfers_timeline.len(), 1);
        assert!(store.balances.is_empty());
    }

    #[test]
    fn test_collection_serialization() {
        let collection = BadgeCollection::new(42);
        let bytes = serialize(&collection).unwrap();
        let recovered: BadgeCollection = deserialize(&bytes).unwrap();
        assert_eq!(collection, recovered);
    }
}
