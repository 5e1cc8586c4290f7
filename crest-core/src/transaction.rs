//! Decoded transaction messages.
//!
//! The wire codec lives outside this engine; by the time a message reaches
//! the state machine it has been decoded into these structures and its
//! signature checked. The `creator` of each message is the address that
//! initiated it.

use serde::{Deserialize, Serialize};

use crate::types::address::Address;
use crate::types::address_mapping::AddressMapping;
use crate::types::approvals::{
    CollectionApprovedTransfer, MerkleProof, UserApprovedIncomingTransfer,
    UserApprovedOutgoingTransfer,
};
use crate::types::balance::Balance;
use crate::types::collection::{BadgeMetadata, CollectionMetadata};
use crate::types::timeline::Timeline;

/// One transfer within a transfer message: badges moving from one sender
/// to one or more recipients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The sending address.
    pub from: Address,
    /// The receiving addresses. Each receives the full `balances`.
    pub to_addresses: Vec<Address>,
    /// The badges and amounts to move to each recipient.
    pub balances: Vec<Balance>,
    /// Solutions for any Merkle challenges on the matching approvals.
    pub merkle_proofs: Vec<MerkleProof>,
}

/// All transaction types handled by the state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    /// Transfer badges between users.
    /// Signed by: the initiator (`creator`).
    TransferBadges {
        /// The initiating address.
        creator: Address,
        /// The collection the badges belong to.
        collection_id: u64,
        /// The transfers to execute, in order, atomically.
        transfers: Vec<Transfer>,
    },

    /// Replace the collection-level approved-transfers timeline.
    /// Signed by: the current manager.
    UpdateCollectionApprovedTransfers {
        /// The initiating address; must be the manager.
        creator: Address,
        /// The collection to update.
        collection_id: u64,
        /// The replacement timeline.
        timeline: Timeline<Vec<CollectionApprovedTransfer>>,
    },

    /// Replace the creator's own outgoing-approvals timeline.
    UpdateUserApprovedOutgoingTransfers {
        /// The initiating address; the store being updated is theirs.
        creator: Address,
        /// The collection the store belongs to.
        collection_id: u64,
        /// The replacement timeline.
        timeline: Timeline<Vec<UserApprovedOutgoingTransfer>>,
    },

    /// Replace the creator's own incoming-approvals timeline.
    UpdateUserApprovedIncomingTransfers {
        /// The initiating address; the store being updated is theirs.
        creator: Address,
        /// The collection the store belongs to.
        collection_id: u64,
        /// The replacement timeline.
        timeline: Timeline<Vec<UserApprovedIncomingTransfer>>,
    },

    /// Replace the manager timeline.
    /// Signed by: the current manager.
    UpdateManager {
        /// The initiating address; must be the manager.
        creator: Address,
        /// The collection to update.
        collection_id: u64,
        /// The replacement timeline.
        timeline: Timeline<Address>,
    },

    /// Replace the collection metadata timeline.
    /// Signed by: the current manager.
    UpdateCollectionMetadata {
        /// The initiating address; must be the manager.
        creator: Address,
        /// The collection to update.
        collection_id: u64,
        /// The replacement timeline.
        timeline: Timeline<CollectionMetadata>,
    },

    /// Replace the badge metadata timeline.
    /// Signed by: the current manager.
    UpdateBadgeMetadata {
        /// The initiating address; must be the manager.
        creator: Address,
        /// The collection to update.
        collection_id: u64,
        /// The replacement timeline.
        timeline: Timeline<Vec<BadgeMetadata>>,
    },

    /// Replace the archived-flag timeline. An archived collection rejects
    /// transfers until unarchived.
    /// Signed by: the current manager.
    UpdateIsArchived {
        /// The initiating address; must be the manager.
        creator: Address,
        /// The collection to update.
        collection_id: u64,
        /// The replacement timeline.
        timeline: Timeline<bool>,
    },

    /// Delete a collection outright.
    /// Signed by: the current manager.
    DeleteCollection {
        /// The initiating address; must be the manager.
        creator: Address,
        /// The collection to delete.
        collection_id: u64,
    },

    /// Register a new address mapping. Mappings are immutable once
    /// registered.
    CreateAddressMapping {
        /// The initiating address.
        creator: Address,
        /// The mapping to register.
        mapping: AddressMapping,
    },
}

impl Transaction {
    /// The address that initiated this transaction.
    pub fn creator(&self) -> &Address {
        match self {
            Transaction::TransferBadges { creator, .. }
            | Transaction::UpdateCollectionApprovedTransfers { creator, .. }
            | Transaction::UpdateUserApprovedOutgoingTransfers { creator, .. }
            | Transaction::UpdateUserApprovedIncomingTransfers { creator, .. }
            | Transaction::UpdateManager { creator, .. }
            | Transaction::UpdateCollectionMetadata { creator, .. }
            | Transaction::UpdateBadgeMetadata { creator, .. }
            | Transaction::UpdateIsArchived { creator, .. }
            | Transaction::DeleteCollection { creator, .. }
            | Transaction::CreateAddressMapping { creator, .. } => creator,
        }
    }
}
