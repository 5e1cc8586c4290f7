//! In-memory ledger state container.

use std::collections::HashMap;

use crest_core::{Address, AddressMapping, ApprovalsTracker, BadgeCollection, UserBalanceStore};

use super::keys::{ChallengeKey, TrackerKey};
use super::store::{StateReader, StateWriter};

/// In-memory ledger state backed by HashMaps.
///
/// This is the testing and development implementation. Production swaps in
/// persistent storage implementing the same traits.
#[derive(Clone, Debug, Default)]
pub struct LedgerState {
    /// All collections by ID.
    pub collections: HashMap<u64, BadgeCollection>,

    /// All registered address mappings by ID.
    pub address_mappings: HashMap<String, AddressMapping>,

    /// User balance stores per (collection, address).
    pub balances: HashMap<(u64, Address), UserBalanceStore>,

    /// Approvals trackers by composite key.
    pub approvals_trackers: HashMap<TrackerKey, ApprovalsTracker>,

    /// Challenge leaf consumption tallies by composite key.
    pub challenge_leaf_uses: HashMap<ChallengeKey, u64>,
}

impl LedgerState {
    /// Create a new empty ledger state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered collections.
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Number of registered address mappings.
    pub fn address_mapping_count(&self) -> usize {
        self.address_mappings.len()
    }
}

impl StateReader for LedgerState {
    fn get_collection(&mut self, collection_id: u64) -> Option<&BadgeCollection> {
        self.collections.get(&collection_id)
    }

    fn get_address_mapping(&mut self, mapping_id: &str) -> Option<&AddressMapping> {
        self.address_mappings.get(mapping_id)
    }

    fn get_user_balance(
        &mut self,
        collection_id: u64,
        address: &Address,
    ) -> Option<&UserBalanceStore> {
        self.balances.get(&(collection_id, *address))
    }

    fn get_approvals_tracker(&mut self, key: &TrackerKey) -> Option<&ApprovalsTracker> {
        self.approvals_trackers.get(key)
    }

    fn get_challenge_leaf_uses(&mut self, key: &ChallengeKey) -> u64 {
        self.challenge_leaf_uses.get(key).copied().unwrap_or(0)
    }
}

impl StateWriter for LedgerState {
    fn insert_collection(&mut self, collection: BadgeCollection) {
        self.collections.insert(collection.collection_id, collection);
    }

    fn update_collection<F>(&mut self, collection_id: u64, f: F)
    where
        F: FnOnce(&mut BadgeCollection),
    {
        if let Some(collection) = self.collections.get_mut(&collection_id) {
            f(collection);
        }
    }

    fn remove_collection(&mut self, collection_id: u64) {
        self.collections.remove(&collection_id);
    }

    fn insert_address_mapping(&mut self, mapping: AddressMapping) {
        self.address_mappings
            .insert(mapping.mapping_id.clone(), mapping);
    }

    fn set_user_balance(&mut self, collection_id: u64, address: Address, store: UserBalanceStore) {
        self.balances.insert((collection_id, address), store);
    }

    fn update_user_balance<F>(&mut self, collection_id: u64, address: &Address, f: F)
    where
        F: FnOnce(&mut UserBalanceStore),
    {
        if let Some(store) = self.balances.get_mut(&(collection_id, *address)) {
            f(store);
        }
    }

    fn set_approvals_tracker(&mut self, key: TrackerKey, tracker: ApprovalsTracker) {
        self.approvals_trackers.insert(key, tracker);
    }

    fn set_challenge_leaf_uses(&mut self, key: ChallengeKey, uses: u64) {
        self.challenge_leaf_uses.insert(key, uses);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::keys::{ApprovalLevel, TrackerScope};

    #[test]
    fn test_new_state() {
        let state = LedgerState::new();
        assert_eq!(state.collection_count(), 0);
        assert_eq!(state.address_mapping_count(), 0);
    }

    #[test]
    fn test_insert_and_get_collection() {
        let mut state = LedgerState::new();
        assert!(!state.collection_exists(1));

        state.insert_collection(BadgeCollection::new(1));
        assert!(state.collection_exists(1));
        assert_eq!(state.get_collection(1).unwrap().collection_id, 1);
    }

    #[test]
    fn test_update_collection() {
        let mut state = LedgerState::new();
        state.insert_collection(BadgeCollection::new(1));

        state.update_collection(1, |c| {
            c.manager_timeline = vec![crest_core::TimelineEntry::always([9u8; 20])];
        });

        assert_eq!(state.get_collection(1).unwrap().manager_timeline.len(), 1);
    }

    #[test]
    fn test_address_mapping_registration() {
        let mut state = LedgerState::new();
        assert!(!state.address_mapping_exists("everyone"));

        state.insert_address_mapping(AddressMapping::all("everyone"));
        assert!(state.address_mapping_exists("everyone"));
    }

    #[test]
    fn test_tracker_roundtrip() {
        let mut state = LedgerState::new();
        let key = TrackerKey {
            collection_id: 1,
            level: ApprovalLevel::Collection,
            approver: None,
            tracker_id: "x".into(),
            scope: TrackerScope::Overall,
        };

        assert!(state.get_approvals_tracker(&key).is_none());

        state.set_approvals_tracker(
            key.clone(),
            ApprovalsTracker {
                num_transfers: 2,
                amounts: vec![],
            },
        );
        assert_eq!(state.get_approvals_tracker(&key).unwrap().num_transfers, 2);
    }

    #[test]
    fn test_challenge_leaf_uses_default_zero() {
        let mut state = LedgerState::new();
        let key = ChallengeKey {
            collection_id: 1,
            level: ApprovalLevel::Collection,
            approver: None,
            challenge_id: "claim".into(),
            leaf_index: 3,
        };

        assert_eq!(state.get_challenge_leaf_uses(&key), 0);
        state.set_challenge_leaf_uses(key.clone(), 1);
        assert_eq!(state.get_challenge_leaf_uses(&key), 1);
    }
}
