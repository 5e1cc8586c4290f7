//! TransferBadges transaction handler.
//!
//! A transfer message can carry many transfers, each fanning out to many
//! recipients. Every (recipient, balance) pair is authorized and staged
//! separately, in submission order; a later transfer sees the tracker
//! reservations and balance movements of earlier ones. Nothing touches
//! the store until every piece has been authorized, and any denial aborts
//! the whole message.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::slice;

use crest_core::error::BalanceError;
use crest_core::types::address::address_to_hex;
use crest_core::types::balance::{add_balances, subtract_balances};
use crest_core::{Address, BadgeCollection, Transfer, UserBalanceStore};

use crate::error::{StateError, StateResult};
use crate::resolve::approvals::{authorize_transfer, TransferContext};
use crate::resolve::timeline::is_archived;
use crate::resolve::trackers::PendingCommit;
use crate::state::{StateReader, StateWriter};

use super::context::ExecutionContext;

/// Execute a TransferBadges transaction.
///
/// # Validation
/// - Collection must exist and not be archived at the block time
/// - Every (recipient, balance) pair must be authorized (collection and
///   user approvals, challenges, caps)
/// - The sender must hold every transferred balance, accounting for
///   earlier transfers in the same message
pub fn execute_transfer_badges<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    creator: &Address,
    collection_id: u64,
    transfers: &[Transfer],
) -> StateResult<()> {
    let collection = state
        .get_collection(collection_id)
        .cloned()
        .ok_or(StateError::CollectionNotFound { collection_id })?;

    if is_archived(&collection, ctx.timestamp) {
        return Err(StateError::CollectionArchived { collection_id });
    }

    let mut pending = PendingCommit::new();
    let mut stores: HashMap<Address, UserBalanceStore> = HashMap::new();

    for transfer in transfers {
        for to in &transfer.to_addresses {
            for balance in &transfer.balances {
                let transfer_ctx = TransferContext {
                    from: transfer.from,
                    to: *to,
                    initiated_by: *creator,
                    time: ctx.timestamp,
                    badge_ids: balance.badge_ids.clone(),
                    ownership_times: balance.ownership_times.clone(),
                    amount: balance.amount,
                };

                let authorized = authorize_transfer(
                    state,
                    &collection,
                    &transfer_ctx,
                    &transfer.merkle_proofs,
                    &pending,
                )?;
                for update in authorized.tracker_updates {
                    pending.record_tracker(update)?;
                }
                for consumption in authorized.challenge_consumptions {
                    pending.record_leaf(consumption);
                }

                let sender = staged_store(state, &collection, &mut stores, &transfer.from);
                sender.balances = subtract_balances(&sender.balances, slice::from_ref(balance))
                    .map_err(|e| match e {
                        BalanceError::InsufficientBalance { needed, available } => {
                            StateError::InsufficientBalance {
                                address: transfer.from,
                                needed,
                                available,
                            }
                        }
                        BalanceError::AmountOverflow => StateError::ArithmeticOverflow,
                    })?;

                let recipient = staged_store(state, &collection, &mut stores, to);
                recipient.balances = add_balances(&recipient.balances, slice::from_ref(balance))
                    .map_err(|_| StateError::ArithmeticOverflow)?;
            }
        }
    }

    // Every piece authorized: commit reservations, then balances.
    pending.commit(state)?;
    for (address, store) in stores {
        state.set_user_balance(collection_id, address, store);
    }

    tracing::debug!(
        collection_id,
        initiated_by = %address_to_hex(creator),
        transfers = transfers.len(),
        "transfer message committed"
    );
    Ok(())
}

/// Working copy of a user's store for this message, loaded on first touch.
/// Later transfers in the message read through the staged copy
/// (read-after-write within the batch).
fn staged_store<'a, S: StateReader>(
    state: &mut S,
    collection: &BadgeCollection,
    stores: &'a mut HashMap<Address, UserBalanceStore>,
    address: &Address,
) -> &'a mut UserBalanceStore {
    match stores.entry(*address) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            let store = state
                .get_user_balance(collection.collection_id, address)
                .cloned()
                .unwrap_or_else(|| UserBalanceStore::from_collection_defaults(collection));
            entry.insert(store)
        }
    }
}
