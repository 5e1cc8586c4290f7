//! CreateAddressMapping transaction handler.

use crest_core::AddressMapping;

use crate::error::{StateError, StateResult};
use crate::state::StateWriter;

use super::context::ExecutionContext;

/// Execute a CreateAddressMapping transaction.
///
/// # Validation
/// - The mapping ID must be non-empty
/// - The mapping ID must not already be registered (mappings are
///   immutable once created)
pub fn execute_create_address_mapping<S: StateWriter>(
    state: &mut S,
    _ctx: &ExecutionContext,
    mapping: &AddressMapping,
) -> StateResult<()> {
    if mapping.mapping_id.is_empty() {
        return Err(StateError::InvalidMappingId);
    }
    if state.address_mapping_exists(&mapping.mapping_id) {
        return Err(StateError::MappingAlreadyExists {
            mapping_id: mapping.mapping_id.clone(),
        });
    }
    state.insert_address_mapping(mapping.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{LedgerState, StateReader};

    #[test]
    fn test_create_mapping() {
        let mut state = LedgerState::new();
        let ctx = ExecutionContext::with_timestamp(100);

        execute_create_address_mapping(&mut state, &ctx, &AddressMapping::all("everyone"))
            .unwrap();
        assert!(state.get_address_mapping("everyone").is_some());
    }

    #[test]
    fn test_duplicate_mapping_rejected() {
        let mut state = LedgerState::new();
        let ctx = ExecutionContext::with_timestamp(100);

        execute_create_address_mapping(&mut state, &ctx, &AddressMapping::all("everyone"))
            .unwrap();
        let err =
            execute_create_address_mapping(&mut state, &ctx, &AddressMapping::empty("everyone"))
                .unwrap_err();
        assert!(matches!(err, StateError::MappingAlreadyExists { .. }));

        // The original registration is untouched.
        assert!(!state
            .get_address_mapping("everyone")
            .unwrap()
            .include_addresses);
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut state = LedgerState::new();
        let ctx = ExecutionContext::with_timestamp(100);

        let err = execute_create_address_mapping(&mut state, &ctx, &AddressMapping::all(""))
            .unwrap_err();
        assert!(matches!(err, StateError::InvalidMappingId));
    }
}
