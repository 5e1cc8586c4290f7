//! State storage traits.
//!
//! These traits abstract over the backing store, so a persistent backend
//! can replace the in-memory one without changing the engine logic.

use crest_core::{Address, AddressMapping, ApprovalsTracker, BadgeCollection, UserBalanceStore};

use super::keys::{ChallengeKey, TrackerKey};

/// Read access to ledger state.
///
/// Methods take `&mut self` to allow implementations to lazily load data
/// from persistent storage into an internal cache on first access.
pub trait StateReader {
    // === Collection Operations ===

    /// Get a collection by ID.
    fn get_collection(&mut self, collection_id: u64) -> Option<&BadgeCollection>;

    /// Check if a collection exists.
    fn collection_exists(&mut self, collection_id: u64) -> bool {
        self.get_collection(collection_id).is_some()
    }

    // === Address Mapping Operations ===

    /// Get an address mapping by ID.
    fn get_address_mapping(&mut self, mapping_id: &str) -> Option<&AddressMapping>;

    /// Check if an address mapping exists.
    fn address_mapping_exists(&mut self, mapping_id: &str) -> bool {
        self.get_address_mapping(mapping_id).is_some()
    }

    // === Balance Operations ===

    /// Get a user's balance store within a collection.
    fn get_user_balance(
        &mut self,
        collection_id: u64,
        address: &Address,
    ) -> Option<&UserBalanceStore>;

    // === Tracker Operations ===

    /// Get an approvals tracker. Absent trackers read as zero usage.
    fn get_approvals_tracker(&mut self, key: &TrackerKey) -> Option<&ApprovalsTracker>;

    /// Number of times a challenge leaf has been consumed.
    fn get_challenge_leaf_uses(&mut self, key: &ChallengeKey) -> u64;
}

/// Mutable access to ledger state.
pub trait StateWriter: StateReader {
    // === Collection Mutations ===

    /// Insert a new collection.
    fn insert_collection(&mut self, collection: BadgeCollection);

    /// Update an existing collection.
    fn update_collection<F>(&mut self, collection_id: u64, f: F)
    where
        F: FnOnce(&mut BadgeCollection);

    /// Remove a collection.
    fn remove_collection(&mut self, collection_id: u64);

    // === Address Mapping Mutations ===

    /// Register an address mapping. Mappings are immutable; the executor
    /// rejects duplicate IDs before calling this.
    fn insert_address_mapping(&mut self, mapping: AddressMapping);

    // === Balance Mutations ===

    /// Set a user's balance store.
    fn set_user_balance(&mut self, collection_id: u64, address: Address, store: UserBalanceStore);

    /// Update an existing balance store.
    fn update_user_balance<F>(&mut self, collection_id: u64, address: &Address, f: F)
    where
        F: FnOnce(&mut UserBalanceStore);

    // === Tracker Mutations ===

    /// Set an approvals tracker.
    fn set_approvals_tracker(&mut self, key: TrackerKey, tracker: ApprovalsTracker);

    /// Record the consumption count of a challenge leaf.
    fn set_challenge_leaf_uses(&mut self, key: ChallengeKey, uses: u64);
}

/// Combined trait for full state access.
///
/// Any type implementing both `StateReader` and `StateWriter`
/// automatically implements `StateStore`.
pub trait StateStore: StateReader + StateWriter {}

// Blanket implementation
impl<T: StateReader + StateWriter> StateStore for T {}
