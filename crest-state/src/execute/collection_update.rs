//! Manager-gated collection update handlers.
//!
//! Manager handoff, metadata, badge metadata, archiving, and deletion.
//! Each update is gated twice: the signer must be the manager at the
//! block time, and the matching permission list must not forbid the
//! change. For timeline replacements the candidate is the union of entry
//! times across the old and new timelines; badge-metadata updates also
//! project the badge IDs each entry covers.

use crest_core::error::TimelineError;
use crest_core::types::ranges::UintRange;
use crest_core::types::timeline::validate_timeline;
use crest_core::{Address, BadgeMetadata, CollectionMetadata, Timeline, TimelineEntry};

use crate::error::{StateError, StateResult};
use crate::resolve::permissions::{
    check_action_permission, check_timed_update_permission,
    check_timed_update_with_badge_ids_permission, PermissionVerdict,
};
use crate::resolve::timeline::resolve_manager;
use crate::state::StateWriter;

use super::context::ExecutionContext;

fn map_overlap(e: TimelineError) -> StateError {
    let TimelineError::OverlappingTimes { instant } = e;
    StateError::OverlappingTimeline { instant }
}

fn require_manager<S: StateWriter>(
    state: &mut S,
    collection_id: u64,
    creator: &Address,
    at: u64,
) -> StateResult<crest_core::BadgeCollection> {
    let collection = state
        .get_collection(collection_id)
        .cloned()
        .ok_or(StateError::CollectionNotFound { collection_id })?;
    let manager = resolve_manager(&collection, at)
        .ok_or(StateError::ManagerNotSet { collection_id })?;
    if manager != *creator {
        return Err(StateError::NotManager {
            manager,
            signer: *creator,
        });
    }
    Ok(collection)
}

fn require_permitted(verdict: PermissionVerdict, at: u64) -> StateResult<()> {
    if verdict == PermissionVerdict::Forbidden {
        return Err(StateError::UpdatePermanentlyForbidden { at });
    }
    Ok(())
}

/// Times occupied by entries of the old and new timelines combined.
fn update_times<V>(old: &[TimelineEntry<V>], new: &[TimelineEntry<V>]) -> Vec<UintRange> {
    old.iter()
        .chain(new)
        .flat_map(|entry| entry.times.iter().copied())
        .collect()
}

/// Execute an UpdateManager transaction.
pub fn execute_update_manager<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    creator: &Address,
    collection_id: u64,
    timeline: &Timeline<Address>,
) -> StateResult<()> {
    let collection = require_manager(state, collection_id, creator, ctx.timestamp)?;
    validate_timeline(timeline).map_err(map_overlap)?;

    let times = update_times(&collection.manager_timeline, timeline);
    require_permitted(
        check_timed_update_permission(
            &collection.permissions.can_update_manager,
            &times,
            ctx.timestamp,
        ),
        ctx.timestamp,
    )?;

    state.update_collection(collection_id, |c| {
        c.manager_timeline = timeline.clone();
    });
    Ok(())
}

/// Execute an UpdateCollectionMetadata transaction.
pub fn execute_update_collection_metadata<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    creator: &Address,
    collection_id: u64,
    timeline: &Timeline<CollectionMetadata>,
) -> StateResult<()> {
    let collection = require_manager(state, collection_id, creator, ctx.timestamp)?;
    validate_timeline(timeline).map_err(map_overlap)?;

    let times = update_times(&collection.collection_metadata_timeline, timeline);
    require_permitted(
        check_timed_update_permission(
            &collection.permissions.can_update_collection_metadata,
            &times,
            ctx.timestamp,
        ),
        ctx.timestamp,
    )?;

    state.update_collection(collection_id, |c| {
        c.collection_metadata_timeline = timeline.clone();
    });
    Ok(())
}

/// Execute an UpdateBadgeMetadata transaction.
///
/// Each entry (old and new) is a candidate projected onto the timeline
/// times it occupies and the badge IDs its metadata covers.
pub fn execute_update_badge_metadata<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    creator: &Address,
    collection_id: u64,
    timeline: &Timeline<Vec<BadgeMetadata>>,
) -> StateResult<()> {
    let collection = require_manager(state, collection_id, creator, ctx.timestamp)?;
    validate_timeline(timeline).map_err(map_overlap)?;

    for entry in collection.badge_metadata_timeline.iter().chain(timeline) {
        let badge_ids: Vec<UintRange> = entry
            .value
            .iter()
            .flat_map(|metadata| metadata.badge_ids.iter().copied())
            .collect();
        require_permitted(
            check_timed_update_with_badge_ids_permission(
                &collection.permissions.can_update_badge_metadata,
                &entry.times,
                &badge_ids,
                ctx.timestamp,
            ),
            ctx.timestamp,
        )?;
    }

    state.update_collection(collection_id, |c| {
        c.badge_metadata_timeline = timeline.clone();
    });
    Ok(())
}

/// Execute an UpdateIsArchived transaction.
pub fn execute_update_is_archived<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    creator: &Address,
    collection_id: u64,
    timeline: &Timeline<bool>,
) -> StateResult<()> {
    let collection = require_manager(state, collection_id, creator, ctx.timestamp)?;
    validate_timeline(timeline).map_err(map_overlap)?;

    let times = update_times(&collection.is_archived_timeline, timeline);
    require_permitted(
        check_timed_update_permission(
            &collection.permissions.can_archive_collection,
            &times,
            ctx.timestamp,
        ),
        ctx.timestamp,
    )?;

    state.update_collection(collection_id, |c| {
        c.is_archived_timeline = timeline.clone();
    });
    Ok(())
}

/// Execute a DeleteCollection transaction.
pub fn execute_delete_collection<S: StateWriter>(
    state: &mut S,
    ctx: &ExecutionContext,
    creator: &Address,
    collection_id: u64,
) -> StateResult<()> {
    let collection = require_manager(state, collection_id, creator, ctx.timestamp)?;
    require_permitted(
        check_action_permission(
            &collection.permissions.can_delete_collection,
            ctx.timestamp,
        ),
        ctx.timestamp,
    )?;

    state.remove_collection(collection_id);
    tracing::debug!(collection_id, "collection deleted");
    Ok(())
}
