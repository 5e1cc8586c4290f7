//! Approval-timeline update handlers.
//!
//! Collection approvals are replaced by the manager, gated by the
//! collection's approved-transfer update permission. User approvals are
//! replaced by the owning user, gated by their own permissions. In both
//! cases every approval entry present in the old or the new timeline is a
//! candidate the permission must not forbid, and the replacement timeline
//! must be overlap-free.

use crest_core::error::TimelineError;
use crest_core::types::timeline::validate_timeline;
use crest_core::{
    Address, CollectionApprovedTransfer, Timeline, TimelineEntry, UserApprovedIncomingTransfer,
    UserApprovedOutgoingTransfer, UserBalanceStore,
};

use crate::error::{StateError, StateResult};
use crate::resolve::address_mapping::resolve_address_mapping;
use crate::resolve::permissions::{
    check_collection_approved_transfer_permission, check_user_incoming_transfer_permission,
    check_user_outgoing_transfer_permission, ApprovedTransferCandidate, PermissionVerdict,
};
use crate::resolve::timeline::resolve_manager;
use crate::state::{StateReader, StateWriter};

use super::context::ExecutionContext;

fn map_overlap(e: TimelineError) -> StateError {
    let TimelineError::OverlappingTimes { instant } = e;
    StateError::OverlappingTimeline { instant }
}

fn collection_candidates<S: StateReader>(
    state: &mut S,
    timeline: &[TimelineEntry<Vec<CollectionApprovedTransfer>>],
) -> StateResult<Vec<ApprovedTransferCandidate>> {
    let mut candidates = Vec::new();
    for entry in timeline {
        for rule in &entry.value {
            candidates.push(ApprovedTransferCandidate {
                timeline_times: entry.times.clone(),
                from: Some(resolve_address_mapping(state, &rule.from_mapping_id)?),
                to: Some(resolve_address_mapping(state, &rule.to_mapping_id)?),
                initiated_by: resolve_address_mapping(state, &rule.initiated_by_mapping_id)?,
                transfer_times: rule.transfer_times.clone(),
                badge_ids: rule.badge_ids.clone(),
                ownership_times: rule.ownership_times.clone(),
            });
        }
    }
    Ok(candidates)
}

fn outgoing_candidates<S: StateReader>(
    state: &mut S,
    timeline: &[TimelineEntry<Vec<UserApprovedOutgoingTransfer>>],
) -> StateResult<Vec<ApprovedTransferCandidate>> {
    let mut candidates = Vec::new();
    for entry in timeline {
        for rule in &entry.value {
            candidates.push(ApprovedTransferCandidate {
                timeline_times: entry.times.clone(),
                from: None,
                to: Some(resolve_address_mapping(state, &rule.to_mapping_id)?),
                initiated_by: resolve_address_mapping(state, &rule.initiated_by_mapping_id)?,
                transfer_times: rule.transfer_times.clone(),
                badge_ids: rule.badge_ids.clone(),
                ownership_times: rule.ownership_times.clone(),
            });
        }
    }
    Ok(candidates)
}

fn incoming_candidates<S: StateReader>(
    state: &mut S,
    timeline: &[TimelineEntry<Vec<UserApprovedIncomingTransfer>>],
) -> StateResult<Vec<ApprovedTransferCandidate>> {
    let mut candidates = Vec::new();
    for entry in timeline {
        for rule in &entry.value {
            candidates.push(ApprovedTransferCandidate {
                timeline_times: entry.times.clone(),
                from: Some(resolve_address_mapping(state, &rule.from_mapping_id)?),
                to: None,
                initiated_by: resolve_address_mapping(state, &rule.initiated_by_mapping_id)?,
                transfer_times: rule.transfer_times.clone(),
                badge_ids: rule.badge_ids.clone(),
                ownership_times: rule.ownership_times.clone(),
            });
        }
    }
    Ok(candidates)
}

/// Execute an UpdateCollectionApprovedTransfers transaction.
///
/// # Validation
/// - Signer must be the manager at the block time
/// - The replacement timeline must be overlap-free
/// - No candidate entry (old or new) may be forbidden by the
///   collection's update permission
pub fn execute_update_collection_approved_transfers<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    creator: &Address,
    collection_id: u64,
    timeline: &Timeline<Vec<CollectionApprovedTransfer>>,
) -> StateResult<()> {
    let collection = state
        .get_collection(collection_id)
        .cloned()
        .ok_or(StateError::CollectionNotFound { collection_id })?;

    let manager = resolve_manager(&collection, ctx.timestamp)
        .ok_or(StateError::ManagerNotSet { collection_id })?;
    if manager != *creator {
        return Err(StateError::NotManager {
            manager,
            signer: *creator,
        });
    }

    validate_timeline(timeline).map_err(map_overlap)?;

    let mut candidates =
        collection_candidates(state, &collection.collection_approved_transfers_timeline)?;
    candidates.extend(collection_candidates(state, timeline)?);

    for candidate in &candidates {
        let verdict = check_collection_approved_transfer_permission(
            state,
            &collection.permissions.can_update_collection_approved_transfers,
            candidate,
            ctx.timestamp,
        )?;
        if verdict == PermissionVerdict::Forbidden {
            return Err(StateError::UpdatePermanentlyForbidden { at: ctx.timestamp });
        }
    }

    state.update_collection(collection_id, |c| {
        c.collection_approved_transfers_timeline = timeline.clone();
    });
    tracing::debug!(collection_id, "collection approved transfers updated");
    Ok(())
}

/// Execute an UpdateUserApprovedOutgoingTransfers transaction.
///
/// The creator updates their own store; a store is created from the
/// collection defaults on first touch.
pub fn execute_update_user_outgoing_transfers<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    creator: &Address,
    collection_id: u64,
    timeline: &Timeline<Vec<UserApprovedOutgoingTransfer>>,
) -> StateResult<()> {
    let collection = state
        .get_collection(collection_id)
        .cloned()
        .ok_or(StateError::CollectionNotFound { collection_id })?;

    validate_timeline(timeline).map_err(map_overlap)?;

    let mut store = state
        .get_user_balance(collection_id, creator)
        .cloned()
        .unwrap_or_else(|| UserBalanceStore::from_collection_defaults(&collection));

    let mut candidates =
        outgoing_candidates(state, &store.approved_outgoing_transfers_timeline)?;
    candidates.extend(outgoing_candidates(state, timeline)?);

    for candidate in &candidates {
        let verdict = check_user_outgoing_transfer_permission(
            state,
            &store.permissions.can_update_approved_outgoing_transfers,
            candidate,
            ctx.timestamp,
        )?;
        if verdict == PermissionVerdict::Forbidden {
            return Err(StateError::UpdatePermanentlyForbidden { at: ctx.timestamp });
        }
    }

    store.approved_outgoing_transfers_timeline = timeline.clone();
    state.set_user_balance(collection_id, *creator, store);
    Ok(())
}

/// Execute an UpdateUserApprovedIncomingTransfers transaction.
pub fn execute_update_user_incoming_transfers<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    creator: &Address,
    collection_id: u64,
    timeline: &Timeline<Vec<UserApprovedIncomingTransfer>>,
) -> StateResult<()> {
    let collection = state
        .get_collection(collection_id)
        .cloned()
        .ok_or(StateError::CollectionNotFound { collection_id })?;

    validate_timeline(timeline).map_err(map_overlap)?;

    let mut store = state
        .get_user_balance(collection_id, creator)
        .cloned()
        .unwrap_or_else(|| UserBalanceStore::from_collection_defaults(&collection));

    let mut candidates =
        incoming_candidates(state, &store.approved_incoming_transfers_timeline)?;
    candidates.extend(incoming_candidates(state, timeline)?);

    for candidate in &candidates {
        let verdict = check_user_incoming_transfer_permission(
            state,
            &store.permissions.can_update_approved_incoming_transfers,
            candidate,
            ctx.timestamp,
        )?;
        if verdict == PermissionVerdict::Forbidden {
            return Err(StateError::UpdatePermanentlyForbidden { at: ctx.timestamp });
        }
    }

    store.approved_incoming_transfers_timeline = timeline.clone();
    state.set_user_balance(collection_id, *creator, store);
    Ok(())
}
