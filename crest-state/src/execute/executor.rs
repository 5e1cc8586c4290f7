//! Transaction executor - main entry point for state transitions.
//!
//! This module contains the `apply_transaction` function which validates
//! and executes decoded transactions, updating the ledger state.

use crest_core::Transaction;

use crate::error::StateResult;
use crate::state::StateWriter;

use super::address_mapping::execute_create_address_mapping;
use super::approvals_update::{
    execute_update_collection_approved_transfers, execute_update_user_incoming_transfers,
    execute_update_user_outgoing_transfers,
};
use super::collection_update::{
    execute_delete_collection, execute_update_badge_metadata,
    execute_update_collection_metadata, execute_update_is_archived, execute_update_manager,
};
use super::context::ExecutionContext;
use super::transfer::execute_transfer_badges;

/// Apply a transaction to the ledger state.
///
/// This is the main entry point for state transitions. Signature and wire
/// decoding happen upstream; this dispatches to the appropriate handler
/// and either fully applies the transaction or leaves the state untouched.
///
/// # Arguments
/// - `state`: Mutable ledger state
/// - `tx`: The decoded transaction to apply
/// - `block_timestamp`: Current block timestamp
///
/// # Returns
/// - `Ok(())` if the transaction was applied successfully
/// - `Err(StateError)` if validation or execution failed
pub fn apply_transaction<S: StateWriter>(
    state: &mut S,
    tx: &Transaction,
    block_timestamp: u64,
) -> StateResult<()> {
    let ctx = ExecutionContext::with_timestamp(block_timestamp);
    apply_transaction_with_context(state, tx, &ctx)
}

/// Apply a transaction with a custom execution context.
pub fn apply_transaction_with_context<S: StateWriter>(
    state: &mut S,
    tx: &Transaction,
    ctx: &ExecutionContext,
) -> StateResult<()> {
    tracing::debug!(timestamp = ctx.timestamp, "applying transaction");

    let result = match tx {
        Transaction::TransferBadges {
            creator,
            collection_id,
            transfers,
        } => execute_transfer_badges(state, ctx, creator, *collection_id, transfers),

        Transaction::UpdateCollectionApprovedTransfers {
            creator,
            collection_id,
            timeline,
        } => execute_update_collection_approved_transfers(
            state,
            ctx,
            creator,
            *collection_id,
            timeline,
        ),

        Transaction::UpdateUserApprovedOutgoingTransfers {
            creator,
            collection_id,
            timeline,
        } => {
            execute_update_user_outgoing_transfers(state, ctx, creator, *collection_id, timeline)
        }

        Transaction::UpdateUserApprovedIncomingTransfers {
            creator,
            collection_id,
            timeline,
        } => {
            execute_update_user_incoming_transfers(state, ctx, creator, *collection_id, timeline)
        }

        Transaction::UpdateManager {
            creator,
            collection_id,
            timeline,
        } => execute_update_manager(state, ctx, creator, *collection_id, timeline),

        Transaction::UpdateCollectionMetadata {
            creator,
            collection_id,
            timeline,
        } => execute_update_collection_metadata(state, ctx, creator, *collection_id, timeline),

        Transaction::UpdateBadgeMetadata {
            creator,
            collection_id,
            timeline,
        } => execute_update_badge_metadata(state, ctx, creator, *collection_id, timeline),

        Transaction::UpdateIsArchived {
            creator,
            collection_id,
            timeline,
        } => execute_update_is_archived(state, ctx, creator, *collection_id, timeline),

        Transaction::DeleteCollection {
            creator,
            collection_id,
        } => execute_delete_collection(state, ctx, creator, *collection_id),

        Transaction::CreateAddressMapping { mapping, .. } => {
            execute_create_address_mapping(state, ctx, mapping)
        }
    };

    if let Err(ref error) = result {
        tracing::debug!(%error, anomaly = error.is_data_integrity_anomaly(), "transaction denied");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StateError;
    use crate::state::{LedgerState, StateReader};
    use crest_core::AddressMapping;

    #[test]
    fn test_apply_create_address_mapping() {
        let mut state = LedgerState::new();
        let tx = Transaction::CreateAddressMapping {
            creator: [1u8; 20],
            mapping: AddressMapping::all("everyone"),
        };

        apply_transaction(&mut state, &tx, 1000).unwrap();
        assert!(state.get_address_mapping("everyone").is_some());
    }

    #[test]
    fn test_apply_transfer_to_missing_collection() {
        let mut state = LedgerState::new();
        let tx = Transaction::TransferBadges {
            creator: [1u8; 20],
            collection_id: 5,
            transfers: vec![],
        };

        let result = apply_transaction(&mut state, &tx, 1000);
        assert!(matches!(
            result,
            Err(StateError::CollectionNotFound { collection_id: 5 })
        ));
    }
}
