//! Address mapping resolution.
//!
//! Approval rules and permissions reference address mappings by ID. A
//! dangling reference is malformed state, not a policy outcome, so it
//! surfaces as a data-integrity error and the evaluation fails closed.

use crest_core::AddressMapping;

use crate::error::{StateError, StateResult};
use crate::state::StateReader;

/// Resolve a mapping ID to its registered address set.
pub fn resolve_address_mapping<S: StateReader>(
    state: &mut S,
    mapping_id: &str,
) -> StateResult<AddressMapping> {
    state
        .get_address_mapping(mapping_id)
        .cloned()
        .ok_or_else(|| StateError::AddressMappingNotFound {
            mapping_id: mapping_id.to_string(),
        })
}
