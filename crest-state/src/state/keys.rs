//! Composite keys for tracker and challenge-usage state.
//!
//! Trackers and leaf-usage tallies are keyed deterministically so the
//! external store can address them directly. The same key types double as
//! the HashMap keys of the in-memory implementation.

use crest_core::Address;

/// Which approval level a tracker or challenge belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApprovalLevel {
    /// A collection-level approval rule.
    Collection,
    /// A user's outgoing approval rule.
    Outgoing,
    /// A user's incoming approval rule.
    Incoming,
}

/// Which address role scopes a tracker instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackerScope {
    /// One tracker for all uses of the rule.
    Overall,
    /// One tracker per distinct sender.
    From(Address),
    /// One tracker per distinct recipient.
    To(Address),
    /// One tracker per distinct initiator.
    InitiatedBy(Address),
}

/// Identity of one approvals tracker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackerKey {
    /// Collection the tracked rule belongs to.
    pub collection_id: u64,
    /// Approval level of the tracked rule.
    pub level: ApprovalLevel,
    /// Owning user for user-level rules; `None` at collection level.
    pub approver: Option<Address>,
    /// The rule's tracker namespace.
    pub tracker_id: String,
    /// Address-role scope of this instance.
    pub scope: TrackerScope,
}

/// Identity of one challenge leaf's usage tally.
///
/// The `challenge_id` is part of the key, so changing a challenge's ID
/// resets every leaf tally recorded under the old ID.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChallengeKey {
    /// Collection the challenge's rule belongs to.
    pub collection_id: u64,
    /// Approval level of the challenge's rule.
    pub level: ApprovalLevel,
    /// Owning user for user-level rules; `None` at collection level.
    pub approver: Option<Address>,
    /// The challenge's usage namespace.
    pub challenge_id: String,
    /// Index of the leaf within the challenge's tree.
    pub leaf_index: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tracker_keys_distinguish_scope() {
        let base = TrackerKey {
            collection_id: 1,
            level: ApprovalLevel::Collection,
            approver: None,
            tracker_id: "x".into(),
            scope: TrackerScope::Overall,
        };
        let per_from = TrackerKey {
            scope: TrackerScope::From([1u8; 20]),
            ..base.clone()
        };

        let mut set = HashSet::new();
        set.insert(base);
        set.insert(per_from);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_challenge_keys_distinguish_id() {
        let a = ChallengeKey {
            collection_id: 1,
            level: ApprovalLevel::Collection,
            approver: None,
            challenge_id: "claim-1".into(),
            leaf_index: 0,
        };
        let b = ChallengeKey {
            challenge_id: "claim-2".into(),
            ..a.clone()
        };
        assert_ne!(a, b);
    }
}
