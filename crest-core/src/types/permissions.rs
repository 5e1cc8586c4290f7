//! First-match combinatorial permissions.
//!
//! A permission is a list of default dimension values plus an ordered list
//! of combinations. Each combination reshapes the defaults per dimension
//! through [`ValueOptions`] and carries its own permitted/forbidden time
//! windows (also derived from defaults through `ValueOptions`). Evaluation
//! is first-match with early exit; see the state crate's evaluator.

use serde::{Deserialize, Serialize};

use crate::types::ranges::UintRange;

/// How a combination reshapes one dimension's default value set.
///
/// A sum type rather than independent booleans, so that contradictory
/// settings (all-values and no-values together) cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueOptions {
    /// Use the defaults unchanged.
    Default,
    /// Use the complement of the defaults.
    InvertDefault,
    /// Use the universal set: the dimension always matches.
    AllValues,
    /// Use the empty set: the dimension can never match.
    NoValues,
}

impl Default for ValueOptions {
    fn default() -> Self {
        ValueOptions::Default
    }
}

/// Permission over a plain action with no qualifying dimensions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPermission {
    /// Default permitted/forbidden time windows.
    pub default_values: ActionDefaultValues,
    /// Ordered combination list; first match wins.
    pub combinations: Vec<ActionCombination>,
}

/// Defaults for [`ActionPermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefaultValues {
    /// Times at which the action is explicitly permitted.
    pub permitted_times: Vec<UintRange>,
    /// Times at which the action is explicitly forbidden.
    pub forbidden_times: Vec<UintRange>,
}

/// One combination of an [`ActionPermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCombination {
    /// Reshapes the default permitted times.
    pub permitted_times_options: ValueOptions,
    /// Reshapes the default forbidden times.
    pub forbidden_times_options: ValueOptions,
}

/// Permission over updates to a timeline, qualified by which timeline
/// times are being updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedUpdatePermission {
    /// Default dimension values and time windows.
    pub default_values: TimedUpdateDefaultValues,
    /// Ordered combination list; first match wins.
    pub combinations: Vec<TimedUpdateCombination>,
}

/// Defaults for [`TimedUpdatePermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedUpdateDefaultValues {
    /// Timeline times the permission speaks to.
    pub timeline_times: Vec<UintRange>,
    /// Times at which matching updates are explicitly permitted.
    pub permitted_times: Vec<UintRange>,
    /// Times at which matching updates are explicitly forbidden.
    pub forbidden_times: Vec<UintRange>,
}

/// One combination of a [`TimedUpdatePermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedUpdateCombination {
    /// Reshapes the default timeline times.
    pub timeline_times_options: ValueOptions,
    /// Reshapes the default permitted times.
    pub permitted_times_options: ValueOptions,
    /// Reshapes the default forbidden times.
    pub forbidden_times_options: ValueOptions,
}

/// Permission over timeline updates additionally scoped to badge IDs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedUpdateWithBadgeIdsPermission {
    /// Default dimension values and time windows.
    pub default_values: TimedUpdateWithBadgeIdsDefaultValues,
    /// Ordered combination list; first match wins.
    pub combinations: Vec<TimedUpdateWithBadgeIdsCombination>,
}

/// Defaults for [`TimedUpdateWithBadgeIdsPermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedUpdateWithBadgeIdsDefaultValues {
    /// Timeline times the permission speaks to.
    pub timeline_times: Vec<UintRange>,
    /// Badge IDs the permission speaks to.
    pub badge_ids: Vec<UintRange>,
    /// Times at which matching updates are explicitly permitted.
    pub permitted_times: Vec<UintRange>,
    /// Times at which matching updates are explicitly forbidden.
    pub forbidden_times: Vec<UintRange>,
}

/// One combination of a [`TimedUpdateWithBadgeIdsPermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedUpdateWithBadgeIdsCombination {
    /// Reshapes the default timeline times.
    pub timeline_times_options: ValueOptions,
    /// Reshapes the default badge IDs.
    pub badge_ids_options: ValueOptions,
    /// Reshapes the default permitted times.
    pub permitted_times_options: ValueOptions,
    /// Reshapes the default forbidden times.
    pub forbidden_times_options: ValueOptions,
}

/// Permission over balance-affecting actions, scoped to badge IDs and
/// ownership times.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancesActionPermission {
    /// Default dimension values and time windows.
    pub default_values: BalancesActionDefaultValues,
    /// Ordered combination list; first match wins.
    pub combinations: Vec<BalancesActionCombination>,
}

/// Defaults for [`BalancesActionPermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancesActionDefaultValues {
    /// Badge IDs the permission speaks to.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times the permission speaks to.
    pub ownership_times: Vec<UintRange>,
    /// Times at which matching actions are explicitly permitted.
    pub permitted_times: Vec<UintRange>,
    /// Times at which matching actions are explicitly forbidden.
    pub forbidden_times: Vec<UintRange>,
}

/// One combination of a [`BalancesActionPermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancesActionCombination {
    /// Reshapes the default badge IDs.
    pub badge_ids_options: ValueOptions,
    /// Reshapes the default ownership times.
    pub ownership_times_options: ValueOptions,
    /// Reshapes the default permitted times.
    pub permitted_times_options: ValueOptions,
    /// Reshapes the default forbidden times.
    pub forbidden_times_options: ValueOptions,
}

/// Permission over updates to the collection approved-transfers timeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionApprovedTransferPermission {
    /// Default dimension values and time windows.
    pub default_values: CollectionApprovedTransferDefaultValues,
    /// Ordered combination list; first match wins.
    pub combinations: Vec<CollectionApprovedTransferCombination>,
}

/// Defaults for [`CollectionApprovedTransferPermission`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionApprovedTransferDefaultValues {
    /// Timeline times the permission speaks to.
    pub timeline_times: Vec<UintRange>,
    /// Mapping ID for the sender dimension.
    pub from_mapping_id: String,
    /// Mapping ID for the recipient dimension.
    pub to_mapping_id: String,
    /// Mapping ID for the initiator dimension.
    pub initiated_by_mapping_id: String,
    /// Transfer times the permission speaks to.
    pub transfer_times: Vec<UintRange>,
    /// Badge IDs the permission speaks to.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times the permission speaks to.
    pub ownership_times: Vec<UintRange>,
    /// Times at which matching updates are explicitly permitted.
    pub permitted_times: Vec<UintRange>,
    /// Times at which matching updates are explicitly forbidden.
    pub forbidden_times: Vec<UintRange>,
}

/// One combination of a [`CollectionApprovedTransferPermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionApprovedTransferCombination {
    /// Reshapes the default timeline times.
    pub timeline_times_options: ValueOptions,
    /// Reshapes the sender mapping.
    pub from_options: ValueOptions,
    /// Reshapes the recipient mapping.
    pub to_options: ValueOptions,
    /// Reshapes the initiator mapping.
    pub initiated_by_options: ValueOptions,
    /// Reshapes the default transfer times.
    pub transfer_times_options: ValueOptions,
    /// Reshapes the default badge IDs.
    pub badge_ids_options: ValueOptions,
    /// Reshapes the default ownership times.
    pub ownership_times_options: ValueOptions,
    /// Reshapes the default permitted times.
    pub permitted_times_options: ValueOptions,
    /// Reshapes the default forbidden times.
    pub forbidden_times_options: ValueOptions,
}

/// Permission over updates to a user's approved outgoing transfers.
///
/// The sender dimension is implicitly the user, so only recipient and
/// initiator mappings qualify the rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApprovedOutgoingTransferPermission {
    /// Default dimension values and time windows.
    pub default_values: UserApprovedOutgoingTransferDefaultValues,
    /// Ordered combination list; first match wins.
    pub combinations: Vec<UserApprovedOutgoingTransferCombination>,
}

/// Defaults for [`UserApprovedOutgoingTransferPermission`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApprovedOutgoingTransferDefaultValues {
    /// Timeline times the permission speaks to.
    pub timeline_times: Vec<UintRange>,
    /// Mapping ID for the recipient dimension.
    pub to_mapping_id: String,
    /// Mapping ID for the initiator dimension.
    pub initiated_by_mapping_id: String,
    /// Transfer times the permission speaks to.
    pub transfer_times: Vec<UintRange>,
    /// Badge IDs the permission speaks to.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times the permission speaks to.
    pub ownership_times: Vec<UintRange>,
    /// Times at which matching updates are explicitly permitted.
    pub permitted_times: Vec<UintRange>,
    /// Times at which matching updates are explicitly forbidden.
    pub forbidden_times: Vec<UintRange>,
}

/// One combination of a [`UserApprovedOutgoingTransferPermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApprovedOutgoingTransferCombination {
    /// Reshapes the default timeline times.
    pub timeline_times_options: ValueOptions,
    /// Reshapes the recipient mapping.
    pub to_options: ValueOptions,
    /// Reshapes the initiator mapping.
    pub initiated_by_options: ValueOptions,
    /// Reshapes the default transfer times.
    pub transfer_times_options: ValueOptions,
    /// Reshapes the default badge IDs.
    pub badge_ids_options: ValueOptions,
    /// Reshapes the default ownership times.
    pub ownership_times_options: ValueOptions,
    /// Reshapes the default permitted times.
    pub permitted_times_options: ValueOptions,
    /// Reshapes the default forbidden times.
    pub forbidden_times_options: ValueOptions,
}

/// Permission over updates to a user's approved incoming transfers.
///
/// The recipient dimension is implicitly the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApprovedIncomingTransferPermission {
    /// Default dimension values and time windows.
    pub default_values: UserApprovedIncomingTransferDefaultValues,
    /// Ordered combination list; first match wins.
    pub combinations: Vec<UserApprovedIncomingTransferCombination>,
}

/// Defaults for [`UserApprovedIncomingTransferPermission`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApprovedIncomingTransferDefaultValues {
    /// Timeline times the permission speaks to.
    pub timeline_times: Vec<UintRange>,
    /// Mapping ID for the sender dimension.
    pub from_mapping_id: String,
    /// Mapping ID for the initiator dimension.
    pub initiated_by_mapping_id: String,
    /// Transfer times the permission speaks to.
    pub transfer_times: Vec<UintRange>,
    /// Badge IDs the permission speaks to.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times the permission speaks to.
    pub ownership_times: Vec<UintRange>,
    /// Times at which matching updates are explicitly permitted.
    pub permitted_times: Vec<UintRange>,
    /// Times at which matching updates are explicitly forbidden.
    pub forbidden_times: Vec<UintRange>,
}

/// One combination of a [`UserApprovedIncomingTransferPermission`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApprovedIncomingTransferCombination {
    /// Reshapes the default timeline times.
    pub timeline_times_options: ValueOptions,
    /// Reshapes the sender mapping.
    pub from_options: ValueOptions,
    /// Reshapes the initiator mapping.
    pub initiated_by_options: ValueOptions,
    /// Reshapes the default transfer times.
    pub transfer_times_options: ValueOptions,
    /// Reshapes the default badge IDs.
    pub badge_ids_options: ValueOptions,
    /// Reshapes the default ownership times.
    pub ownership_times_options: ValueOptions,
    /// Reshapes the default permitted times.
    pub permitted_times_options: ValueOptions,
    /// Reshapes the default forbidden times.
    pub forbidden_times_options: ValueOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{deserialize, serialize};

    #[test]
    fn test_value_options_default() {
        assert_eq!(ValueOptions::default(), ValueOptions::Default);
    }

    #[test]
    fn test_action_permission_serialization() {
        let permission = ActionPermission {
            default_values: ActionDefaultValues {
                permitted_times: vec![UintRange { start: 0, end: 100 }],
                forbidden_times: vec![],
            },
            combinations: vec![ActionCombination::default()],
        };
        let bytes = serialize(&permission).unwrap();
        let recovered: ActionPermission = deserialize(&bytes).unwrap();
        assert_eq!(permission, recovered);
    }

    #[test]
    fn test_value_options_serialization() {
        for options in [
            ValueOptions::Default,
            ValueOptions::InvertDefault,
            ValueOptions::AllValues,
            ValueOptions::NoValues,
        ] {
            let bytes = serialize(&options).unwrap();
            let recovered: ValueOptions = deserialize(&bytes).unwrap();
            assert_eq!(options, recovered);
        }
    }
}
