//! State-facing timeline lookups.
//!
//! Thin wrappers over the core resolver for the collection timelines the
//! executor consults.

use crest_core::types::timeline::resolve_timeline;
use crest_core::{Address, BadgeCollection};

/// The collection's manager at `at`, if one is set.
pub fn resolve_manager(collection: &BadgeCollection, at: u64) -> Option<Address> {
    resolve_timeline(&collection.manager_timeline, at).copied()
}

/// Whether the collection is archived (read-only) at `at`.
pub fn is_archived(collection: &BadgeCollection, at: u64) -> bool {
    *resolve_timeline(&collection.is_archived_timeline, at).unwrap_or(&false)
}
