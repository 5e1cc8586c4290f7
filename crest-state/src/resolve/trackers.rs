//! Approval usage tracking and transaction-scoped reservations.
//!
//! Trackers are monotonic counters (transfer count plus cumulative
//! amounts) keyed by rule and scope. During a transaction they are never
//! written directly: the resolver checks caps against committed state plus
//! a [`PendingCommit`] overlay, records reservations into the overlay, and
//! the executor commits the whole overlay only once every transfer in the
//! transaction has been authorized. Any denial discards the overlay.

use std::collections::HashMap;

use crest_core::types::balance::{add_balances, within_threshold};
use crest_core::{ApprovalsTracker, Balance};

use crate::error::{StateError, StateResult};
use crate::state::{ChallengeKey, StateReader, StateWriter, TrackerKey};

/// One reserved tracker increment: one transfer plus its amounts.
#[derive(Clone, Debug)]
pub struct TrackerUpdate {
    /// The tracker to increment.
    pub key: TrackerKey,
    /// Amounts consumed by this use.
    pub amounts: Vec<Balance>,
}

/// One reserved challenge-leaf consumption.
#[derive(Clone, Debug)]
pub struct LeafConsumption {
    /// The leaf tally to increment.
    pub key: ChallengeKey,
}

/// Reservations accumulated across one transaction.
///
/// Later transfers in the same transaction see earlier reservations
/// (read-after-write within the batch); nothing reaches the store until
/// [`PendingCommit::commit`].
#[derive(Clone, Debug, Default)]
pub struct PendingCommit {
    tracker_deltas: HashMap<TrackerKey, ApprovalsTracker>,
    leaf_uses: HashMap<ChallengeKey, u64>,
}

impl PendingCommit {
    /// An empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending delta for a tracker, if any.
    pub fn tracker_delta(&self, key: &TrackerKey) -> Option<&ApprovalsTracker> {
        self.tracker_deltas.get(key)
    }

    /// Pending consumption count for a challenge leaf.
    pub fn leaf_uses(&self, key: &ChallengeKey) -> u64 {
        self.leaf_uses.get(key).copied().unwrap_or(0)
    }

    /// Fold a reservation into the overlay.
    pub fn record_tracker(&mut self, update: TrackerUpdate) -> StateResult<()> {
        let delta = self.tracker_deltas.entry(update.key).or_default();
        delta.num_transfers = delta
            .num_transfers
            .checked_add(1)
            .ok_or(StateError::ArithmeticOverflow)?;
        delta.amounts = add_balances(&delta.amounts, &update.amounts)
            .map_err(|_| StateError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Fold a leaf consumption into the overlay.
    pub fn record_leaf(&mut self, consumption: LeafConsumption) {
        *self.leaf_uses.entry(consumption.key).or_insert(0) += 1;
    }

    /// Apply the overlay to the store.
    ///
    /// Merged values are computed for every tracker before anything is
    /// written, so a failure leaves the store untouched.
    pub fn commit<S: StateWriter>(self, state: &mut S) -> StateResult<()> {
        let mut merged: Vec<(TrackerKey, ApprovalsTracker)> =
            Vec::with_capacity(self.tracker_deltas.len());
        for (key, delta) in self.tracker_deltas {
            let current = state
                .get_approvals_tracker(&key)
                .cloned()
                .unwrap_or_default();
            let num_transfers = current
                .num_transfers
                .checked_add(delta.num_transfers)
                .ok_or(StateError::ArithmeticOverflow)?;
            let amounts = add_balances(&current.amounts, &delta.amounts)
                .map_err(|_| StateError::ArithmeticOverflow)?;
            merged.push((
                key,
                ApprovalsTracker {
                    num_transfers,
                    amounts,
                },
            ));
        }

        for (key, tracker) in merged {
            state.set_approvals_tracker(key, tracker);
        }
        for (key, uses) in self.leaf_uses {
            let total = state.get_challenge_leaf_uses(&key) + uses;
            state.set_challenge_leaf_uses(key, total);
        }
        Ok(())
    }
}

/// Committed plus pending usage for a tracker.
pub fn current_usage<S: StateReader>(
    state: &mut S,
    pending: &PendingCommit,
    key: &TrackerKey,
) -> StateResult<ApprovalsTracker> {
    let mut usage = state
        .get_approvals_tracker(key)
        .cloned()
        .unwrap_or_default();
    if let Some(delta) = pending.tracker_delta(key) {
        usage.num_transfers = usage
            .num_transfers
            .checked_add(delta.num_transfers)
            .ok_or(StateError::ArithmeticOverflow)?;
        usage.amounts = add_balances(&usage.amounts, &delta.amounts)
            .map_err(|_| StateError::ArithmeticOverflow)?;
    }
    Ok(usage)
}

/// Check that one more use, carrying `delta_amounts`, stays within `cap`.
///
/// A `num_transfers` cap of zero and an empty `amounts` cap each mean
/// "uncapped" for their dimension. Amount regions the cap does not cover
/// are capped at zero.
pub fn check_cap<S: StateReader>(
    state: &mut S,
    pending: &PendingCommit,
    key: &TrackerKey,
    cap: &ApprovalsTracker,
    delta_amounts: &[Balance],
) -> StateResult<()> {
    let usage = current_usage(state, pending, key)?;

    if cap.num_transfers > 0 && usage.num_transfers >= cap.num_transfers {
        return Err(StateError::ApprovalTransfersExceeded {
            tracker_id: key.tracker_id.clone(),
            used: usage.num_transfers,
            max: cap.num_transfers,
        });
    }

    if !cap.amounts.is_empty() {
        let combined = add_balances(&usage.amounts, delta_amounts)
            .map_err(|_| StateError::ArithmeticOverflow)?;
        if !within_threshold(&combined, &cap.amounts) {
            return Err(StateError::ApprovalAmountsExceeded {
                tracker_id: key.tracker_id.clone(),
            });
        }
    }

    Ok(())
}
