//! First-match permission combination evaluation.
//!
//! Every permission kind shares the same shape: defaults per dimension
//! plus an ordered combination list. A combination reshapes each
//! dimension's defaults through its `ValueOptions` and matches when the
//! candidate's projection is contained in every effective set; the first
//! matching combination wins and its forbidden/permitted time windows
//! decide the verdict. No match leaves the action neutral, which the
//! engine treats as allowed: actions stay open until explicitly locked.

use crest_core::types::ranges::{self, UintRange};
use crest_core::{
    ActionPermission, AddressMapping, BalancesActionPermission,
    CollectionApprovedTransferPermission, TimedUpdatePermission,
    TimedUpdateWithBadgeIdsPermission, UserApprovedIncomingTransferPermission,
    UserApprovedOutgoingTransferPermission, ValueOptions,
};

use crate::error::StateResult;
use crate::resolve::address_mapping::resolve_address_mapping;
use crate::state::StateReader;

/// Outcome of evaluating a permission list against a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionVerdict {
    /// A combination matched and the query time is not forbidden.
    Allowed,
    /// A combination matched and the query time is forbidden. Forbidden
    /// windows are additive and never retracted, so this is permanent.
    Forbidden,
    /// No combination matched; allowed by convention.
    Neutral,
}

impl PermissionVerdict {
    /// Whether the action may proceed.
    pub fn permits(&self) -> bool {
        !matches!(self, PermissionVerdict::Forbidden)
    }
}

/// Apply `ValueOptions` to a range-list dimension.
fn effective_ranges(defaults: &[UintRange], options: ValueOptions) -> Vec<UintRange> {
    match options {
        ValueOptions::Default => defaults.to_vec(),
        ValueOptions::InvertDefault => ranges::invert(defaults),
        ValueOptions::AllValues => vec![UintRange::full()],
        ValueOptions::NoValues => Vec::new(),
    }
}

/// Apply `ValueOptions` to an address-mapping dimension.
fn effective_mapping(default: &AddressMapping, options: ValueOptions) -> AddressMapping {
    match options {
        ValueOptions::Default => default.clone(),
        ValueOptions::InvertDefault => default.complement(),
        ValueOptions::AllValues => AddressMapping::all(""),
        ValueOptions::NoValues => AddressMapping::empty(""),
    }
}

/// Verdict once a combination has matched: a forbidden window denies,
/// a permitted window or no constraint proceeds.
fn times_verdict(forbidden: &[UintRange], at: u64) -> PermissionVerdict {
    if ranges::contains_value(forbidden, at) {
        PermissionVerdict::Forbidden
    } else {
        PermissionVerdict::Allowed
    }
}

/// Evaluate a plain action permission at `at`.
///
/// Action permissions carry no qualifying dimensions, so the first
/// combination in the list always matches.
pub fn check_action_permission(
    permissions: &[ActionPermission],
    at: u64,
) -> PermissionVerdict {
    for permission in permissions {
        for combination in &permission.combinations {
            let forbidden = effective_ranges(
                &permission.default_values.forbidden_times,
                combination.forbidden_times_options,
            );
            return times_verdict(&forbidden, at);
        }
    }
    PermissionVerdict::Neutral
}

/// Evaluate a timed-update permission against the timeline times being
/// updated.
pub fn check_timed_update_permission(
    permissions: &[TimedUpdatePermission],
    update_times: &[UintRange],
    at: u64,
) -> PermissionVerdict {
    for permission in permissions {
        for combination in &permission.combinations {
            let timeline_times = effective_ranges(
                &permission.default_values.timeline_times,
                combination.timeline_times_options,
            );
            if !ranges::contains_all(&timeline_times, update_times) {
                continue;
            }
            let forbidden = effective_ranges(
                &permission.default_values.forbidden_times,
                combination.forbidden_times_options,
            );
            return times_verdict(&forbidden, at);
        }
    }
    PermissionVerdict::Neutral
}

/// Evaluate a timed-update-with-badge-IDs permission.
pub fn check_timed_update_with_badge_ids_permission(
    permissions: &[TimedUpdateWithBadgeIdsPermission],
    update_times: &[UintRange],
    badge_ids: &[UintRange],
    at: u64,
) -> PermissionVerdict {
    for permission in permissions {
        for combination in &permission.combinations {
            let timeline_times = effective_ranges(
                &permission.default_values.timeline_times,
                combination.timeline_times_options,
            );
            let badge_ids_set = effective_ranges(
                &permission.default_values.badge_ids,
                combination.badge_ids_options,
            );
            if !ranges::contains_all(&timeline_times, update_times)
                || !ranges::contains_all(&badge_ids_set, badge_ids)
            {
                continue;
            }
            let forbidden = effective_ranges(
                &permission.default_values.forbidden_times,
                combination.forbidden_times_options,
            );
            return times_verdict(&forbidden, at);
        }
    }
    PermissionVerdict::Neutral
}

/// Evaluate a balances-action permission against the badge IDs and
/// ownership times the action touches.
pub fn check_balances_action_permission(
    permissions: &[BalancesActionPermission],
    badge_ids: &[UintRange],
    ownership_times: &[UintRange],
    at: u64,
) -> PermissionVerdict {
    for permission in permissions {
        for combination in &permission.combinations {
            let badge_ids_set = effective_ranges(
                &permission.default_values.badge_ids,
                combination.badge_ids_options,
            );
            let ownership_set = effective_ranges(
                &permission.default_values.ownership_times,
                combination.ownership_times_options,
            );
            if !ranges::contains_all(&badge_ids_set, badge_ids)
                || !ranges::contains_all(&ownership_set, ownership_times)
            {
                continue;
            }
            let forbidden = effective_ranges(
                &permission.default_values.forbidden_times,
                combination.forbidden_times_options,
            );
            return times_verdict(&forbidden, at);
        }
    }
    PermissionVerdict::Neutral
}

/// The projection of one approval-timeline entry, used as the candidate
/// when evaluating approved-transfer update permissions.
#[derive(Clone, Debug)]
pub struct ApprovedTransferCandidate {
    /// Timeline times the entry occupies.
    pub timeline_times: Vec<UintRange>,
    /// Resolved sender mapping; `None` when the sender is implicit.
    pub from: Option<AddressMapping>,
    /// Resolved recipient mapping; `None` when the recipient is implicit.
    pub to: Option<AddressMapping>,
    /// Resolved initiator mapping.
    pub initiated_by: AddressMapping,
    /// Transfer times the entry covers.
    pub transfer_times: Vec<UintRange>,
    /// Badge IDs the entry covers.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times the entry covers.
    pub ownership_times: Vec<UintRange>,
}

/// Evaluate a collection approved-transfer update permission against one
/// candidate entry.
pub fn check_collection_approved_transfer_permission<S: StateReader>(
    state: &mut S,
    permissions: &[CollectionApprovedTransferPermission],
    candidate: &ApprovedTransferCandidate,
    at: u64,
) -> StateResult<PermissionVerdict> {
    for permission in permissions {
        let defaults = &permission.default_values;
        let from_default = resolve_address_mapping(state, &defaults.from_mapping_id)?;
        let to_default = resolve_address_mapping(state, &defaults.to_mapping_id)?;
        let initiated_default =
            resolve_address_mapping(state, &defaults.initiated_by_mapping_id)?;

        for combination in &permission.combinations {
            let timeline_times =
                effective_ranges(&defaults.timeline_times, combination.timeline_times_options);
            let transfer_times =
                effective_ranges(&defaults.transfer_times, combination.transfer_times_options);
            let badge_ids = effective_ranges(&defaults.badge_ids, combination.badge_ids_options);
            let ownership_times =
                effective_ranges(&defaults.ownership_times, combination.ownership_times_options);
            let from = effective_mapping(&from_default, combination.from_options);
            let to = effective_mapping(&to_default, combination.to_options);
            let initiated_by =
                effective_mapping(&initiated_default, combination.initiated_by_options);

            if !ranges::contains_all(&timeline_times, &candidate.timeline_times)
                || !ranges::contains_all(&transfer_times, &candidate.transfer_times)
                || !ranges::contains_all(&badge_ids, &candidate.badge_ids)
                || !ranges::contains_all(&ownership_times, &candidate.ownership_times)
                || !candidate.from.as_ref().is_none_or(|m| from.contains_mapping(m))
                || !candidate.to.as_ref().is_none_or(|m| to.contains_mapping(m))
                || !initiated_by.contains_mapping(&candidate.initiated_by)
            {
                continue;
            }
            let forbidden =
                effective_ranges(&defaults.forbidden_times, combination.forbidden_times_options);
            return Ok(times_verdict(&forbidden, at));
        }
    }
    Ok(PermissionVerdict::Neutral)
}

/// Evaluate a user outgoing approved-transfer update permission.
pub fn check_user_outgoing_transfer_permission<S: StateReader>(
    state: &mut S,
    permissions: &[UserApprovedOutgoingTransferPermission],
    candidate: &ApprovedTransferCandidate,
    at: u64,
) -> StateResult<PermissionVerdict> {
    for permission in permissions {
        let defaults = &permission.default_values;
        let to_default = resolve_address_mapping(state, &defaults.to_mapping_id)?;
        let initiated_default =
            resolve_address_mapping(state, &defaults.initiated_by_mapping_id)?;

        for combination in &permission.combinations {
            let timeline_times =
                effective_ranges(&defaults.timeline_times, combination.timeline_times_options);
            let transfer_times =
                effective_ranges(&defaults.transfer_times, combination.transfer_times_options);
            let badge_ids = effective_ranges(&defaults.badge_ids, combination.badge_ids_options);
            let ownership_times =
                effective_ranges(&defaults.ownership_times, combination.ownership_times_options);
            let to = effective_mapping(&to_default, combination.to_options);
            let initiated_by =
                effective_mapping(&initiated_default, combination.initiated_by_options);

            if !ranges::contains_all(&timeline_times, &candidate.timeline_times)
                || !ranges::contains_all(&transfer_times, &candidate.transfer_times)
                || !ranges::contains_all(&badge_ids, &candidate.badge_ids)
                || !ranges::contains_all(&ownership_times, &candidate.ownership_times)
                || !candidate.to.as_ref().is_none_or(|m| to.contains_mapping(m))
                || !initiated_by.contains_mapping(&candidate.initiated_by)
            {
                continue;
            }
            let forbidden =
                effective_ranges(&defaults.forbidden_times, combination.forbidden_times_options);
            return Ok(times_verdict(&forbidden, at));
        }
    }
    Ok(PermissionVerdict::Neutral)
}

/// Evaluate a user incoming approved-transfer update permission.
pub fn check_user_incoming_transfer_permission<S: StateReader>(
    state: &mut S,
    permissions: &[UserApprovedIncomingTransferPermission],
    candidate: &ApprovedTransferCandidate,
    at: u64,
) -> StateResult<PermissionVerdict> {
    for permission in permissions {
        let defaults = &permission.default_values;
        let from_default = resolve_address_mapping(state, &defaults.from_mapping_id)?;
        let initiated_default =
            resolve_address_mapping(state, &defaults.initiated_by_mapping_id)?;

        for combination in &permission.combinations {
            let timeline_times =
                effective_ranges(&defaults.timeline_times, combination.timeline_times_options);
            let transfer_times =
                effective_ranges(&defaults.transfer_times, combination.transfer_times_options);
            let badge_ids = effective_ranges(&defaults.badge_ids, combination.badge_ids_options);
            let ownership_times =
                effective_ranges(&defaults.ownership_times, combination.ownership_times_options);
            let from = effective_mapping(&from_default, combination.from_options);
            let initiated_by =
                effective_mapping(&initiated_default, combination.initiated_by_options);

            if !ranges::contains_all(&timeline_times, &candidate.timeline_times)
                || !ranges::contains_all(&transfer_times, &candidate.transfer_times)
                || !ranges::contains_all(&badge_ids, &candidate.badge_ids)
                || !ranges::contains_all(&ownership_times, &candidate.ownership_times)
                || !candidate.from.as_ref().is_none_or(|m| from.contains_mapping(m))
                || !initiated_by.contains_mapping(&candidate.initiated_by)
            {
                continue;
            }
            let forbidden =
                effective_ranges(&defaults.forbidden_times, combination.forbidden_times_options);
            return Ok(times_verdict(&forbidden, at));
        }
    }
    Ok(PermissionVerdict::Neutral)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crest_core::{
        ActionCombination, ActionDefaultValues, TimedUpdateCombination, TimedUpdateDefaultValues,
    };

    fn r(start: u64, end: u64) -> UintRange {
        UintRange { start, end }
    }

    fn forbid_after(at: u64) -> ActionPermission {
        ActionPermission {
            default_values: ActionDefaultValues {
                permitted_times: vec![],
                forbidden_times: vec![r(at, u64::MAX)],
            },
            combinations: vec![ActionCombination::default()],
        }
    }

    #[test]
    fn test_empty_permissions_are_neutral() {
        assert_eq!(check_action_permission(&[], 100), PermissionVerdict::Neutral);
        assert!(check_action_permission(&[], 100).permits());
    }

    #[test]
    fn test_action_forbidden_window() {
        let permissions = vec![forbid_after(1000)];
        assert_eq!(
            check_action_permission(&permissions, 999),
            PermissionVerdict::Allowed
        );
        assert_eq!(
            check_action_permission(&permissions, 1000),
            PermissionVerdict::Forbidden
        );
        assert!(!check_action_permission(&permissions, 1000).permits());
    }

    #[test]
    fn test_forbidden_is_permanent() {
        // Once the query time is inside a forbidden window, every later
        // query time in that window reports Forbidden as well.
        let permissions = vec![forbid_after(1000)];
        for at in [1000, 5000, u64::MAX] {
            assert_eq!(
                check_action_permission(&permissions, at),
                PermissionVerdict::Forbidden
            );
        }
    }

    #[test]
    fn test_first_match_wins() {
        // First combination forbids everywhere; a later, permissive
        // combination must not be reached.
        let permission = ActionPermission {
            default_values: ActionDefaultValues {
                permitted_times: vec![],
                forbidden_times: vec![UintRange::full()],
            },
            combinations: vec![
                ActionCombination::default(),
                ActionCombination {
                    forbidden_times_options: ValueOptions::NoValues,
                    ..Default::default()
                },
            ],
        };
        assert_eq!(
            check_action_permission(&[permission], 50),
            PermissionVerdict::Forbidden
        );
    }

    #[test]
    fn test_reordering_after_first_match_is_invariant() {
        let matching = TimedUpdatePermission {
            default_values: TimedUpdateDefaultValues {
                timeline_times: vec![r(0, 100)],
                permitted_times: vec![],
                forbidden_times: vec![UintRange::full()],
            },
            combinations: vec![TimedUpdateCombination::default()],
        };
        // Non-matching: timeline times don't contain the update.
        let non_matching = TimedUpdatePermission {
            default_values: TimedUpdateDefaultValues {
                timeline_times: vec![r(500, 600)],
                permitted_times: vec![],
                forbidden_times: vec![],
            },
            combinations: vec![TimedUpdateCombination::default()],
        };

        // Moving a non-matching permission before or after the match does
        // not change the outcome.
        let update = vec![r(10, 20)];
        let a = check_timed_update_permission(
            &[matching.clone(), non_matching.clone()],
            &update,
            50,
        );
        let b = check_timed_update_permission(&[non_matching, matching], &update, 50);
        assert_eq!(a, b);
        assert_eq!(a, PermissionVerdict::Forbidden);
    }

    #[test]
    fn test_timed_update_partial_overlap_falls_through() {
        let permission = TimedUpdatePermission {
            default_values: TimedUpdateDefaultValues {
                timeline_times: vec![r(0, 100)],
                permitted_times: vec![],
                forbidden_times: vec![UintRange::full()],
            },
            combinations: vec![TimedUpdateCombination::default()],
        };
        // Candidate spills past the combination's set: no match, neutral.
        assert_eq!(
            check_timed_update_permission(&[permission], &[r(50, 150)], 10),
            PermissionVerdict::Neutral
        );
    }

    #[test]
    fn test_invert_default_flips_dimension() {
        let permission = TimedUpdatePermission {
            default_values: TimedUpdateDefaultValues {
                timeline_times: vec![r(0, 100)],
                permitted_times: vec![],
                forbidden_times: vec![UintRange::full()],
            },
            combinations: vec![TimedUpdateCombination {
                timeline_times_options: ValueOptions::InvertDefault,
                ..Default::default()
            }],
        };
        // [200, 300] is outside the defaults but inside their complement.
        assert_eq!(
            check_timed_update_permission(&[permission.clone()], &[r(200, 300)], 10),
            PermissionVerdict::Forbidden
        );
        assert_eq!(
            check_timed_update_permission(&[permission], &[r(0, 100)], 10),
            PermissionVerdict::Neutral
        );
    }

    #[test]
    fn test_no_values_never_matches() {
        let permission = TimedUpdatePermission {
            default_values: TimedUpdateDefaultValues {
                timeline_times: vec![r(0, 100)],
                permitted_times: vec![],
                forbidden_times: vec![UintRange::full()],
            },
            combinations: vec![TimedUpdateCombination {
                timeline_times_options: ValueOptions::NoValues,
                ..Default::default()
            }],
        };
        assert_eq!(
            check_timed_update_permission(&[permission], &[r(0, 10)], 10),
            PermissionVerdict::Neutral
        );
    }

    #[test]
    fn test_balances_action_dimensions() {
        let permission = BalancesActionPermission {
            default_values: crest_core::BalancesActionDefaultValues {
                badge_ids: vec![r(1, 10)],
                ownership_times: vec![UintRange::full()],
                permitted_times: vec![],
                forbidden_times: vec![UintRange::full()],
            },
            combinations: vec![crest_core::BalancesActionCombination::default()],
        };
        assert_eq!(
            check_balances_action_permission(
                &[permission.clone()],
                &[r(1, 5)],
                &[UintRange::full()],
                10
            ),
            PermissionVerdict::Forbidden
        );
        assert_eq!(
            check_balances_action_permission(
                &[permission],
                &[r(20, 30)],
                &[UintRange::full()],
                10
            ),
            PermissionVerdict::Neutral
        );
    }
}
