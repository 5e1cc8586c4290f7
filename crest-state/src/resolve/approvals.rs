//! Transfer approval resolution.
//!
//! For one candidate transfer, resolve the collection's approvals at the
//! transfer time, find the first matching (rule, combination) pair, apply
//! override semantics against the sender's and recipient's own approval
//! timelines, validate any Merkle challenges, and check usage caps. The
//! result is a set of tracker and challenge-leaf reservations for the
//! caller to commit; nothing is written here.

use crest_core::types::ranges::{self, UintRange};
use crest_core::types::timeline::resolve_timeline;
use crest_core::{
    Address, ApprovalsTracker, BadgeCollection, Balance, CollectionApprovedTransfer,
    MerkleChallenge, MerkleProof, PerAddressApprovals, UserApprovedIncomingTransfer,
    UserApprovedOutgoingTransfer,
};

use crate::error::{StateError, StateResult};
use crate::resolve::address_mapping::resolve_address_mapping;
use crate::resolve::challenges::verify_challenge;
use crate::resolve::trackers::{
    check_cap, current_usage, LeafConsumption, PendingCommit, TrackerUpdate,
};
use crate::state::{ApprovalLevel, ChallengeKey, StateReader, TrackerKey, TrackerScope};

/// One candidate transfer, projected onto the dimensions approvals match.
#[derive(Clone, Debug)]
pub struct TransferContext {
    /// The sending address.
    pub from: Address,
    /// The receiving address.
    pub to: Address,
    /// The address that initiated the transaction.
    pub initiated_by: Address,
    /// The transfer time (block time).
    pub time: u64,
    /// Badge IDs being transferred.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times being transferred.
    pub ownership_times: Vec<UintRange>,
    /// Amount per (badge, time) point.
    pub amount: u64,
}

impl TransferContext {
    /// The transferred amounts as a balance list, for tracker accounting.
    fn delta_amounts(&self) -> Vec<Balance> {
        vec![Balance::new(
            self.amount,
            self.badge_ids.clone(),
            self.ownership_times.clone(),
        )]
    }
}

/// Override and equality semantics of a matched rule, computed once per
/// match so the resolver's branching stays auditable.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverridePolicy {
    /// Skip the sender's outgoing-approval leg.
    pub overrides_outgoing: bool,
    /// Skip the recipient's incoming-approval leg.
    pub overrides_incoming: bool,
    /// Require the recipient to equal the initiator.
    pub require_to_equals_initiated_by: bool,
    /// Require the sender to equal the initiator.
    pub require_from_equals_initiated_by: bool,
    /// Require the recipient to differ from the initiator.
    pub require_to_does_not_equal_initiated_by: bool,
    /// Require the sender to differ from the initiator.
    pub require_from_does_not_equal_initiated_by: bool,
}

impl OverridePolicy {
    fn from_collection(rule: &CollectionApprovedTransfer) -> Self {
        Self {
            overrides_outgoing: rule.overrides_from_approved_outgoing_transfers,
            overrides_incoming: rule.overrides_to_approved_incoming_transfers,
            require_to_equals_initiated_by: rule.require_to_equals_initiated_by,
            require_from_equals_initiated_by: rule.require_from_equals_initiated_by,
            require_to_does_not_equal_initiated_by: rule.require_to_does_not_equal_initiated_by,
            require_from_does_not_equal_initiated_by: rule
                .require_from_does_not_equal_initiated_by,
        }
    }

    fn from_outgoing(rule: &UserApprovedOutgoingTransfer) -> Self {
        Self {
            require_to_equals_initiated_by: rule.require_to_equals_initiated_by,
            require_to_does_not_equal_initiated_by: rule.require_to_does_not_equal_initiated_by,
            ..Self::default()
        }
    }

    fn from_incoming(rule: &UserApprovedIncomingTransfer) -> Self {
        Self {
            require_from_equals_initiated_by: rule.require_from_equals_initiated_by,
            require_from_does_not_equal_initiated_by: rule
                .require_from_does_not_equal_initiated_by,
            ..Self::default()
        }
    }

    /// Enforce the equality constraints against a transfer.
    fn enforce(&self, ctx: &TransferContext) -> StateResult<()> {
        if self.require_to_equals_initiated_by && ctx.to != ctx.initiated_by {
            return Err(StateError::ToMustEqualInitiatedBy {
                to: ctx.to,
                initiated_by: ctx.initiated_by,
            });
        }
        if self.require_from_equals_initiated_by && ctx.from != ctx.initiated_by {
            return Err(StateError::FromMustEqualInitiatedBy {
                from: ctx.from,
                initiated_by: ctx.initiated_by,
            });
        }
        if self.require_to_does_not_equal_initiated_by && ctx.to == ctx.initiated_by {
            return Err(StateError::ToMustNotEqualInitiatedBy { address: ctx.to });
        }
        if self.require_from_does_not_equal_initiated_by && ctx.from == ctx.initiated_by {
            return Err(StateError::FromMustNotEqualInitiatedBy { address: ctx.from });
        }
        Ok(())
    }
}

/// Reservations produced by an authorized transfer, committed by the
/// caller's transaction handler iff the whole transaction succeeds.
#[derive(Clone, Debug, Default)]
pub struct Authorized {
    /// Tracker increments to reserve.
    pub tracker_updates: Vec<TrackerUpdate>,
    /// Challenge leaves to mark consumed.
    pub challenge_consumptions: Vec<LeafConsumption>,
}

/// The directive-carrying fields shared by all three rule kinds.
struct MatchedRule<'a> {
    level: ApprovalLevel,
    approver: Option<Address>,
    tracker_id: &'a str,
    challenges: &'a [MerkleChallenge],
    increment_badge_ids_by: u64,
    increment_ownership_times_by: u64,
    overall_approvals: Option<&'a ApprovalsTracker>,
    per_address_approvals: Option<&'a PerAddressApprovals>,
    badge_ids: &'a [UintRange],
    ownership_times: &'a [UintRange],
}

fn effective(set: &[UintRange], inverted: bool) -> Vec<UintRange> {
    if inverted {
        ranges::invert(set)
    } else {
        set.to_vec()
    }
}

/// Find the first collection rule whose allowed-combination list decides
/// the transfer. `Ok(None)` means no combination matched (neutral).
fn match_collection_rule<'a, S: StateReader>(
    state: &mut S,
    rules: &'a [CollectionApprovedTransfer],
    ctx: &TransferContext,
) -> StateResult<Option<&'a CollectionApprovedTransfer>> {
    for rule in rules {
        let from_mapping = resolve_address_mapping(state, &rule.from_mapping_id)?;
        let to_mapping = resolve_address_mapping(state, &rule.to_mapping_id)?;
        let initiated_mapping = resolve_address_mapping(state, &rule.initiated_by_mapping_id)?;

        for combination in &rule.allowed_combinations {
            // Increment-based rules distribute a moving badge/time slice;
            // the slice for the current use is checked against the usage
            // tracker in collect_obligations, not here.
            let badge_ids_match = rule.increment_badge_ids_by > 0
                || ranges::contains_all(
                    &effective(&rule.badge_ids, combination.invert_badge_ids),
                    &ctx.badge_ids,
                );
            let ownership_times_match = rule.increment_ownership_times_by > 0
                || ranges::contains_all(
                    &effective(&rule.ownership_times, combination.invert_ownership_times),
                    &ctx.ownership_times,
                );
            let matches = (from_mapping.includes(&ctx.from) ^ combination.invert_from)
                && (to_mapping.includes(&ctx.to) ^ combination.invert_to)
                && (initiated_mapping.includes(&ctx.initiated_by)
                    ^ combination.invert_initiated_by)
                && (ranges::contains_value(&rule.transfer_times, ctx.time)
                    ^ combination.invert_transfer_times)
                && badge_ids_match
                && ownership_times_match;
            if matches {
                if combination.is_allowed {
                    return Ok(Some(rule));
                }
                return Err(StateError::TransferExplicitlyForbidden {
                    level: ApprovalLevel::Collection,
                });
            }
        }
    }
    Ok(None)
}

fn match_outgoing_rule<'a, S: StateReader>(
    state: &mut S,
    rules: &'a [UserApprovedOutgoingTransfer],
    ctx: &TransferContext,
) -> StateResult<Option<&'a UserApprovedOutgoingTransfer>> {
    for rule in rules {
        let to_mapping = resolve_address_mapping(state, &rule.to_mapping_id)?;
        let initiated_mapping = resolve_address_mapping(state, &rule.initiated_by_mapping_id)?;

        for combination in &rule.allowed_combinations {
            let badge_ids_match = rule.increment_badge_ids_by > 0
                || ranges::contains_all(
                    &effective(&rule.badge_ids, combination.invert_badge_ids),
                    &ctx.badge_ids,
                );
            let ownership_times_match = rule.increment_ownership_times_by > 0
                || ranges::contains_all(
                    &effective(&rule.ownership_times, combination.invert_ownership_times),
                    &ctx.ownership_times,
                );
            let matches = (to_mapping.includes(&ctx.to) ^ combination.invert_to)
                && (initiated_mapping.includes(&ctx.initiated_by)
                    ^ combination.invert_initiated_by)
                && (ranges::contains_value(&rule.transfer_times, ctx.time)
                    ^ combination.invert_transfer_times)
                && badge_ids_match
                && ownership_times_match;
            if matches {
                if combination.is_allowed {
                    return Ok(Some(rule));
                }
                return Err(StateError::TransferExplicitlyForbidden {
                    level: ApprovalLevel::Outgoing,
                });
            }
        }
    }
    Ok(None)
}

fn match_incoming_rule<'a, S: StateReader>(
    state: &mut S,
    rules: &'a [UserApprovedIncomingTransfer],
    ctx: &TransferContext,
) -> StateResult<Option<&'a UserApprovedIncomingTransfer>> {
    for rule in rules {
        let from_mapping = resolve_address_mapping(state, &rule.from_mapping_id)?;
        let initiated_mapping = resolve_address_mapping(state, &rule.initiated_by_mapping_id)?;

        for combination in &rule.allowed_combinations {
            let badge_ids_match = rule.increment_badge_ids_by > 0
                || ranges::contains_all(
                    &effective(&rule.badge_ids, combination.invert_badge_ids),
                    &ctx.badge_ids,
                );
            let ownership_times_match = rule.increment_ownership_times_by > 0
                || ranges::contains_all(
                    &effective(&rule.ownership_times, combination.invert_ownership_times),
                    &ctx.ownership_times,
                );
            let matches = (from_mapping.includes(&ctx.from) ^ combination.invert_from)
                && (initiated_mapping.includes(&ctx.initiated_by)
                    ^ combination.invert_initiated_by)
                && (ranges::contains_value(&rule.transfer_times, ctx.time)
                    ^ combination.invert_transfer_times)
                && badge_ids_match
                && ownership_times_match;
            if matches {
                if combination.is_allowed {
                    return Ok(Some(rule));
                }
                return Err(StateError::TransferExplicitlyForbidden {
                    level: ApprovalLevel::Incoming,
                });
            }
        }
    }
    Ok(None)
}

/// Validate a matched rule's challenges and caps, pushing the resulting
/// reservations into `out`.
fn collect_obligations<S: StateReader>(
    state: &mut S,
    pending: &PendingCommit,
    collection_id: u64,
    rule: MatchedRule<'_>,
    ctx: &TransferContext,
    proofs: &[MerkleProof],
    out: &mut Authorized,
) -> StateResult<()> {
    // Challenges first: each challenge takes its proof positionally.
    for (index, challenge) in rule.challenges.iter().enumerate() {
        let proof = proofs
            .get(index)
            .ok_or_else(|| StateError::ChallengeMissingProof {
                challenge_id: challenge.challenge_id.clone(),
            })?;
        let leaf_index = verify_challenge(challenge, proof, &ctx.initiated_by)?;

        if challenge.max_one_use_per_leaf {
            let key = ChallengeKey {
                collection_id,
                level: rule.level,
                approver: rule.approver,
                challenge_id: challenge.challenge_id.clone(),
                leaf_index,
            };
            let uses = state.get_challenge_leaf_uses(&key) + pending.leaf_uses(&key);
            if uses > 0 {
                return Err(StateError::ChallengeLeafAlreadyUsed {
                    challenge_id: challenge.challenge_id.clone(),
                    leaf_index,
                });
            }
            out.challenge_consumptions.push(LeafConsumption { key });
        }
    }

    // An empty tracker ID disables usage tracking for the rule.
    if rule.tracker_id.is_empty() {
        return Ok(());
    }

    let overall_key = TrackerKey {
        collection_id,
        level: rule.level,
        approver: rule.approver,
        tracker_id: rule.tracker_id.to_string(),
        scope: TrackerScope::Overall,
    };

    // Ordered distribution: use number N is entitled to the rule's ranges
    // shifted by N increments.
    if rule.increment_badge_ids_by > 0 || rule.increment_ownership_times_by > 0 {
        let uses = current_usage(state, pending, &overall_key)?.num_transfers;
        let id_shift = uses
            .checked_mul(rule.increment_badge_ids_by)
            .ok_or(StateError::ArithmeticOverflow)?;
        let time_shift = uses
            .checked_mul(rule.increment_ownership_times_by)
            .ok_or(StateError::ArithmeticOverflow)?;
        let expected_ids = ranges::offset(rule.badge_ids, id_shift)
            .map_err(|_| StateError::ArithmeticOverflow)?;
        let expected_times = ranges::offset(rule.ownership_times, time_shift)
            .map_err(|_| StateError::ArithmeticOverflow)?;
        if !ranges::contains_all(&expected_ids, &ctx.badge_ids)
            || !ranges::contains_all(&expected_times, &ctx.ownership_times)
        {
            return Err(StateError::DistributionOutOfSequence {
                tracker_id: rule.tracker_id.to_string(),
            });
        }
    }

    let delta = ctx.delta_amounts();
    if let Some(cap) = rule.overall_approvals {
        check_cap(state, pending, &overall_key, cap, &delta)?;
    }
    out.tracker_updates.push(TrackerUpdate {
        key: overall_key,
        amounts: delta.clone(),
    });

    if let Some(per_address) = rule.per_address_approvals {
        let scoped = [
            (
                per_address.approvals_per_from_address.as_ref(),
                TrackerScope::From(ctx.from),
            ),
            (
                per_address.approvals_per_to_address.as_ref(),
                TrackerScope::To(ctx.to),
            ),
            (
                per_address.approvals_per_initiated_by_address.as_ref(),
                TrackerScope::InitiatedBy(ctx.initiated_by),
            ),
        ];
        for (cap, scope) in scoped {
            let Some(cap) = cap else { continue };
            let key = TrackerKey {
                collection_id,
                level: rule.level,
                approver: rule.approver,
                tracker_id: rule.tracker_id.to_string(),
                scope,
            };
            check_cap(state, pending, &key, cap, &delta)?;
            out.tracker_updates.push(TrackerUpdate {
                key,
                amounts: delta.clone(),
            });
        }
    }

    Ok(())
}

/// Authorize one transfer against the collection's and users' approvals.
///
/// Returns the reservations to commit on transaction success, or the
/// denial reason. Reads committed state plus the transaction's pending
/// overlay; writes nothing.
pub fn authorize_transfer<S: StateReader>(
    state: &mut S,
    collection: &BadgeCollection,
    ctx: &TransferContext,
    proofs: &[MerkleProof],
    pending: &PendingCommit,
) -> StateResult<Authorized> {
    let mut out = Authorized::default();

    let empty = Vec::new();
    let rules = resolve_timeline(&collection.collection_approved_transfers_timeline, ctx.time)
        .unwrap_or(&empty);
    let matched = match_collection_rule(state, rules, ctx)?;

    let policy = match matched {
        Some(rule) => OverridePolicy::from_collection(rule),
        None => {
            // Self-initiated sends are permitted by default; everything
            // else needs an explicit collection approval.
            if ctx.from != ctx.initiated_by {
                return Err(StateError::NoCollectionApproval {
                    from: ctx.from,
                    to: ctx.to,
                    initiated_by: ctx.initiated_by,
                });
            }
            OverridePolicy::default()
        }
    };
    policy.enforce(ctx)?;

    if let Some(rule) = matched {
        collect_obligations(
            state,
            pending,
            collection.collection_id,
            MatchedRule {
                level: ApprovalLevel::Collection,
                approver: None,
                tracker_id: &rule.tracker_id,
                challenges: &rule.challenges,
                increment_badge_ids_by: rule.increment_badge_ids_by,
                increment_ownership_times_by: rule.increment_ownership_times_by,
                overall_approvals: rule.overall_approvals.as_ref(),
                per_address_approvals: rule.per_address_approvals.as_ref(),
                badge_ids: &rule.badge_ids,
                ownership_times: &rule.ownership_times,
            },
            ctx,
            proofs,
            &mut out,
        )?;
    }

    if !policy.overrides_outgoing {
        authorize_outgoing_leg(state, collection, ctx, proofs, pending, &mut out)?;
    }
    if !policy.overrides_incoming {
        authorize_incoming_leg(state, collection, ctx, proofs, pending, &mut out)?;
    }

    Ok(out)
}

fn authorize_outgoing_leg<S: StateReader>(
    state: &mut S,
    collection: &BadgeCollection,
    ctx: &TransferContext,
    proofs: &[MerkleProof],
    pending: &PendingCommit,
    out: &mut Authorized,
) -> StateResult<()> {
    let timeline = match state.get_user_balance(collection.collection_id, &ctx.from) {
        Some(store) => store.approved_outgoing_transfers_timeline.clone(),
        None => collection
            .default_user_approved_outgoing_transfers_timeline
            .clone(),
    };
    let rules = resolve_timeline(&timeline, ctx.time).cloned().unwrap_or_default();

    match match_outgoing_rule(state, &rules, ctx)? {
        Some(rule) => {
            OverridePolicy::from_outgoing(rule).enforce(ctx)?;
            collect_obligations(
                state,
                pending,
                collection.collection_id,
                MatchedRule {
                    level: ApprovalLevel::Outgoing,
                    approver: Some(ctx.from),
                    tracker_id: &rule.tracker_id,
                    challenges: &rule.challenges,
                    increment_badge_ids_by: rule.increment_badge_ids_by,
                    increment_ownership_times_by: rule.increment_ownership_times_by,
                    overall_approvals: rule.overall_approvals.as_ref(),
                    per_address_approvals: rule.per_address_approvals.as_ref(),
                    badge_ids: &rule.badge_ids,
                    ownership_times: &rule.ownership_times,
                },
                ctx,
                proofs,
                out,
            )?;
        }
        None => {
            // Absence of an outgoing approval does not block the sender's
            // own sends.
            if ctx.from != ctx.initiated_by {
                return Err(StateError::NoOutgoingApproval { user: ctx.from });
            }
        }
    }
    Ok(())
}

fn authorize_incoming_leg<S: StateReader>(
    state: &mut S,
    collection: &BadgeCollection,
    ctx: &TransferContext,
    proofs: &[MerkleProof],
    pending: &PendingCommit,
    out: &mut Authorized,
) -> StateResult<()> {
    let timeline = match state.get_user_balance(collection.collection_id, &ctx.to) {
        Some(store) => store.approved_incoming_transfers_timeline.clone(),
        None => collection
            .default_user_approved_incoming_transfers_timeline
            .clone(),
    };
    let rules = resolve_timeline(&timeline, ctx.time).cloned().unwrap_or_default();

    match match_incoming_rule(state, &rules, ctx)? {
        Some(rule) => {
            OverridePolicy::from_incoming(rule).enforce(ctx)?;
            collect_obligations(
                state,
                pending,
                collection.collection_id,
                MatchedRule {
                    level: ApprovalLevel::Incoming,
                    approver: Some(ctx.to),
                    tracker_id: &rule.tracker_id,
                    challenges: &rule.challenges,
                    increment_badge_ids_by: rule.increment_badge_ids_by,
                    increment_ownership_times_by: rule.increment_ownership_times_by,
                    overall_approvals: rule.overall_approvals.as_ref(),
                    per_address_approvals: rule.per_address_approvals.as_ref(),
                    badge_ids: &rule.badge_ids,
                    ownership_times: &rule.ownership_times,
                },
                ctx,
                proofs,
                out,
            )?;
        }
        None => {
            if ctx.to != ctx.initiated_by {
                return Err(StateError::NoIncomingApproval { user: ctx.to });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{LedgerState, StateWriter};
    use crest_core::{
        AddressMapping, IsCollectionTransferAllowed, TimelineEntry, UserBalanceStore,
    };

    const ALICE: Address = [1u8; 20];
    const BOB: Address = [2u8; 20];
    const CAROL: Address = [3u8; 20];

    fn r(start: u64, end: u64) -> UintRange {
        UintRange { start, end }
    }

    fn open_rule() -> CollectionApprovedTransfer {
        CollectionApprovedTransfer {
            from_mapping_id: "everyone".into(),
            to_mapping_id: "everyone".into(),
            initiated_by_mapping_id: "everyone".into(),
            transfer_times: vec![UintRange::full()],
            badge_ids: vec![r(1, 10)],
            ownership_times: vec![UintRange::full()],
            allowed_combinations: vec![IsCollectionTransferAllowed {
                is_allowed: true,
                ..Default::default()
            }],
            challenges: vec![],
            tracker_id: String::new(),
            increment_badge_ids_by: 0,
            increment_ownership_times_by: 0,
            overall_approvals: None,
            per_address_approvals: None,
            overrides_from_approved_outgoing_transfers: true,
            overrides_to_approved_incoming_transfers: true,
            require_to_equals_initiated_by: false,
            require_from_equals_initiated_by: false,
            require_to_does_not_equal_initiated_by: false,
            require_from_does_not_equal_initiated_by: false,
            uri: String::new(),
            custom_data: String::new(),
        }
    }

    fn collection_with(rules: Vec<CollectionApprovedTransfer>) -> BadgeCollection {
        let mut collection = BadgeCollection::new(1);
        collection.collection_approved_transfers_timeline = vec![TimelineEntry::always(rules)];
        collection
    }

    fn state_with_everyone() -> LedgerState {
        let mut state = LedgerState::new();
        state.insert_address_mapping(AddressMapping::all("everyone"));
        state
    }

    fn transfer(from: Address, to: Address, initiated_by: Address) -> TransferContext {
        TransferContext {
            from,
            to,
            initiated_by,
            time: 100,
            badge_ids: vec![r(5, 5)],
            ownership_times: vec![UintRange::full()],
            amount: 1,
        }
    }

    #[test]
    fn test_open_rule_authorizes() {
        let mut state = state_with_everyone();
        let collection = collection_with(vec![open_rule()]);
        let pending = PendingCommit::new();

        let auth = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending,
        )
        .unwrap();
        assert!(auth.tracker_updates.is_empty());
        assert!(auth.challenge_consumptions.is_empty());
    }

    #[test]
    fn test_no_collection_approval_denies_third_party() {
        let mut state = state_with_everyone();
        let collection = collection_with(vec![]);
        let pending = PendingCommit::new();

        // Carol initiating Alice's send has no approval anywhere.
        let err = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, CAROL),
            &[],
            &pending,
        )
        .unwrap_err();
        assert!(matches!(err, StateError::NoCollectionApproval { .. }));
    }

    #[test]
    fn test_collection_neutral_self_send_checks_user_legs() {
        let mut state = state_with_everyone();
        let collection = collection_with(vec![]);
        let pending = PendingCommit::new();

        // No collection rule, but Alice initiates her own send and Bob
        // initiates nothing: the incoming leg denies.
        let err = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending,
        )
        .unwrap_err();
        assert!(matches!(err, StateError::NoIncomingApproval { user } if user == BOB));
    }

    #[test]
    fn test_explicit_forbid_stops_scan() {
        let mut state = state_with_everyone();
        let mut forbid = open_rule();
        forbid.allowed_combinations = vec![IsCollectionTransferAllowed {
            is_allowed: false,
            ..Default::default()
        }];
        // A later permissive rule must not rescue the transfer.
        let collection = collection_with(vec![forbid, open_rule()]);
        let pending = PendingCommit::new();

        let err = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StateError::TransferExplicitlyForbidden {
                level: ApprovalLevel::Collection
            }
        ));
    }

    #[test]
    fn test_badge_outside_rule_falls_through() {
        let mut state = state_with_everyone();
        let collection = collection_with(vec![open_rule()]);
        let pending = PendingCommit::new();

        // Carol-initiated so the neutral result is not rescued by the
        // self-send convention.
        let mut ctx = transfer(ALICE, BOB, CAROL);
        ctx.badge_ids = vec![r(11, 11)];
        let err =
            authorize_transfer(&mut state, &collection, &ctx, &[], &pending).unwrap_err();
        assert!(matches!(err, StateError::NoCollectionApproval { .. }));
    }

    #[test]
    fn test_inverted_from_dimension() {
        let mut state = state_with_everyone();
        state.insert_address_mapping(AddressMapping {
            mapping_id: "alice".into(),
            addresses: vec![ALICE],
            include_addresses: true,
            uri: String::new(),
            custom_data: String::new(),
        });
        let mut rule = open_rule();
        rule.from_mapping_id = "alice".into();
        rule.allowed_combinations = vec![IsCollectionTransferAllowed {
            invert_from: true,
            is_allowed: true,
            ..Default::default()
        }];
        let collection = collection_with(vec![rule]);
        let pending = PendingCommit::new();

        // Alice is excluded by the inverted dimension...
        assert!(authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending
        )
        .is_err());
        // ...while Carol matches it.
        assert!(authorize_transfer(
            &mut state,
            &collection,
            &transfer(CAROL, BOB, CAROL),
            &[],
            &pending
        )
        .is_ok());
    }

    #[test]
    fn test_equality_constraint_denies() {
        let mut state = state_with_everyone();
        let mut rule = open_rule();
        rule.require_to_equals_initiated_by = true;
        let collection = collection_with(vec![rule]);
        let pending = PendingCommit::new();

        let err = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending,
        )
        .unwrap_err();
        assert!(matches!(err, StateError::ToMustEqualInitiatedBy { .. }));

        // Bob initiating his own receipt satisfies the constraint.
        assert!(authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, BOB),
            &[],
            &pending
        )
        .is_ok());
    }

    #[test]
    fn test_user_incoming_veto_without_override() {
        let mut state = state_with_everyone();
        let mut rule = open_rule();
        rule.overrides_to_approved_incoming_transfers = false;
        let collection = collection_with(vec![rule]);
        let pending = PendingCommit::new();

        // Bob's store exists with an empty incoming timeline: disallow all.
        state.set_user_balance(1, BOB, UserBalanceStore::default());

        let err = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending,
        )
        .unwrap_err();
        assert!(matches!(err, StateError::NoIncomingApproval { user } if user == BOB));
    }

    #[test]
    fn test_override_bypasses_incoming_veto() {
        let mut state = state_with_everyone();
        let collection = collection_with(vec![open_rule()]);
        let pending = PendingCommit::new();

        state.set_user_balance(1, BOB, UserBalanceStore::default());

        assert!(authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending
        )
        .is_ok());
    }

    #[test]
    fn test_self_transfer_bypasses_missing_outgoing() {
        let mut state = state_with_everyone();
        let mut rule = open_rule();
        rule.overrides_from_approved_outgoing_transfers = false;
        let collection = collection_with(vec![rule]);
        let pending = PendingCommit::new();

        // Alice has no outgoing approvals at all, but initiates her own
        // send: the outgoing leg is bypassed.
        state.set_user_balance(1, ALICE, UserBalanceStore::default());
        assert!(authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending
        )
        .is_ok());

        // Carol initiating the same send is not bypassed.
        let err = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, CAROL),
            &[],
            &pending,
        )
        .unwrap_err();
        assert!(matches!(err, StateError::NoOutgoingApproval { user } if user == ALICE));
    }

    #[test]
    fn test_tracker_cap_and_reservation() {
        let mut state = state_with_everyone();
        let mut rule = open_rule();
        rule.tracker_id = "capped".into();
        rule.overall_approvals = Some(ApprovalsTracker {
            num_transfers: 1,
            amounts: vec![],
        });
        let collection = collection_with(vec![rule]);
        let mut pending = PendingCommit::new();

        let auth = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending,
        )
        .unwrap();
        assert_eq!(auth.tracker_updates.len(), 1);
        for update in auth.tracker_updates {
            pending.record_tracker(update).unwrap();
        }

        // Second use in the same transaction exceeds the cap.
        let err = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending,
        )
        .unwrap_err();
        assert!(matches!(err, StateError::ApprovalTransfersExceeded { .. }));
    }

    #[test]
    fn test_increment_distribution_sequence() {
        let mut state = state_with_everyone();
        let mut rule = open_rule();
        rule.tracker_id = "drop".into();
        rule.badge_ids = vec![r(1, 1)];
        rule.increment_badge_ids_by = 1;
        let collection = collection_with(vec![rule]);
        let mut pending = PendingCommit::new();

        // Use 0 takes badge 1.
        let mut ctx = transfer(ALICE, BOB, ALICE);
        ctx.badge_ids = vec![r(1, 1)];
        let auth =
            authorize_transfer(&mut state, &collection, &ctx, &[], &pending).unwrap();
        for update in auth.tracker_updates {
            pending.record_tracker(update).unwrap();
        }

        // Use 1 must take badge 2; badge 1 again is out of sequence.
        let err = authorize_transfer(&mut state, &collection, &ctx, &[], &pending)
            .unwrap_err();
        assert!(matches!(err, StateError::DistributionOutOfSequence { .. }));

        ctx.badge_ids = vec![r(2, 2)];
        assert!(authorize_transfer(&mut state, &collection, &ctx, &[], &pending).is_ok());
    }

    #[test]
    fn test_missing_mapping_fails_closed() {
        let mut state = LedgerState::new();
        let collection = collection_with(vec![open_rule()]);
        let pending = PendingCommit::new();

        let err = authorize_transfer(
            &mut state,
            &collection,
            &transfer(ALICE, BOB, ALICE),
            &[],
            &pending,
        )
        .unwrap_err();
        assert!(err.is_data_integrity_anomaly());
    }
}
