//! Transfer approval rules, Merkle challenges, and usage trackers.
//!
//! Approvals are the rules that gate transfers. A collection carries a
//! timeline of collection-level approvals; each user carries timelines of
//! outgoing and incoming approvals. Each rule is keyed by address mappings
//! and range lists, carries an ordered list of invertible allowed
//! combinations, and may attach Merkle challenges and usage caps.

use serde::{Deserialize, Serialize};

use crate::types::balance::Balance;
use crate::types::ranges::UintRange;

/// A Merkle-membership gate attached to an approval rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleChallenge {
    /// Root of the Merkle tree proofs must resolve to.
    pub root: [u8; 32],
    /// Required number of aunts in a valid proof.
    pub expected_proof_length: u64,
    /// Require the leaf to be the initiator's canonical address bytes.
    pub use_creator_address_as_leaf: bool,
    /// Each leaf may gate at most one successful transfer.
    pub max_one_use_per_leaf: bool,
    /// Hint for distribution ordering; does not affect proof validity.
    pub use_leaf_index_for_distribution_order: bool,
    /// Namespace for leaf-usage tallies. Changing this ID resets all
    /// recorded uses for the challenge.
    pub challenge_id: String,
}

/// One step of a Merkle proof path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePathItem {
    /// Sibling hash combined at this level.
    pub aunt: [u8; 32],
    /// Whether the aunt sits to the right of the running hash.
    pub on_right: bool,
}

/// A supplied solution to a Merkle challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// The claimed leaf value.
    pub leaf: Vec<u8>,
    /// Path from the leaf to the root.
    pub aunts: Vec<MerklePathItem>,
}

impl MerkleProof {
    /// Build the proof for `leaves[index]` against the tree produced by
    /// [`merkle_root_of_leaves`](crate::crypto::merkle_root_of_leaves).
    ///
    /// Mirrors the tree construction: leaves are hashed once, odd nodes
    /// are duplicated, and each path item records whether the sibling sits
    /// to the right.
    pub fn for_leaf(leaves: &[Vec<u8>], index: usize) -> Option<MerkleProof> {
        if index >= leaves.len() {
            return None;
        }
        let leaf = leaves[index].clone();
        let mut level: Vec<[u8; 32]> = leaves.iter().map(|l| crate::crypto::sha256(l)).collect();
        let mut idx = index;
        let mut aunts = Vec::new();

        while level.len() > 1 {
            let sibling = if idx % 2 == 0 {
                // Right sibling, or self-duplication for a trailing node.
                if idx + 1 < level.len() {
                    idx + 1
                } else {
                    idx
                }
            } else {
                idx - 1
            };
            aunts.push(MerklePathItem {
                aunt: level[sibling],
                on_right: idx % 2 == 0,
            });

            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            for chunk in level.chunks(2) {
                let combined = if chunk.len() == 2 {
                    crate::crypto::sha256_concat(&[&chunk[0], &chunk[1]])
                } else {
                    crate::crypto::sha256_concat(&[&chunk[0], &chunk[0]])
                };
                next.push(combined);
            }
            level = next;
            idx /= 2;
        }

        Some(MerkleProof { leaf, aunts })
    }
}

/// Usage counter for an approval, and the cap shape carried by a rule.
///
/// The same type serves as the mutable tracker (transfers seen so far and
/// cumulative amounts) and as the ceiling a rule imposes on that tracker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalsTracker {
    /// Number of transfers counted against this tracker.
    pub num_transfers: u64,
    /// Cumulative transferred amounts.
    pub amounts: Vec<Balance>,
}

/// Per-address usage caps for an approval rule.
///
/// Each populated field caps usage separately per distinct address in that
/// role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerAddressApprovals {
    /// Cap applied per distinct sender.
    pub approvals_per_from_address: Option<ApprovalsTracker>,
    /// Cap applied per distinct recipient.
    pub approvals_per_to_address: Option<ApprovalsTracker>,
    /// Cap applied per distinct initiator.
    pub approvals_per_initiated_by_address: Option<ApprovalsTracker>,
}

/// An invertible predicate over a collection approval's dimensions.
///
/// Each `invert_*` flag complements the corresponding dimension of the
/// owning rule before the containment check; `is_allowed` is the verdict
/// when the combination matches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsCollectionTransferAllowed {
    /// Complement the sender mapping.
    pub invert_from: bool,
    /// Complement the recipient mapping.
    pub invert_to: bool,
    /// Complement the initiator mapping.
    pub invert_initiated_by: bool,
    /// Complement the transfer times.
    pub invert_transfer_times: bool,
    /// Complement the badge IDs.
    pub invert_badge_ids: bool,
    /// Complement the ownership times.
    pub invert_ownership_times: bool,
    /// Verdict when this combination matches.
    pub is_allowed: bool,
}

/// An invertible predicate over a user outgoing approval's dimensions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsUserOutgoingTransferAllowed {
    /// Complement the recipient mapping.
    pub invert_to: bool,
    /// Complement the initiator mapping.
    pub invert_initiated_by: bool,
    /// Complement the transfer times.
    pub invert_transfer_times: bool,
    /// Complement the badge IDs.
    pub invert_badge_ids: bool,
    /// Complement the ownership times.
    pub invert_ownership_times: bool,
    /// Verdict when this combination matches.
    pub is_allowed: bool,
}

/// An invertible predicate over a user incoming approval's dimensions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsUserIncomingTransferAllowed {
    /// Complement the sender mapping.
    pub invert_from: bool,
    /// Complement the initiator mapping.
    pub invert_initiated_by: bool,
    /// Complement the transfer times.
    pub invert_transfer_times: bool,
    /// Complement the badge IDs.
    pub invert_badge_ids: bool,
    /// Complement the ownership times.
    pub invert_ownership_times: bool,
    /// Verdict when this combination matches.
    pub is_allowed: bool,
}

/// A collection-level approval rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionApprovedTransfer {
    /// Mapping the sender must belong to.
    pub from_mapping_id: String,
    /// Mapping the recipient must belong to.
    pub to_mapping_id: String,
    /// Mapping the initiator must belong to.
    pub initiated_by_mapping_id: String,
    /// Transfer times this rule covers.
    pub transfer_times: Vec<UintRange>,
    /// Badge IDs this rule covers.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times this rule covers.
    pub ownership_times: Vec<UintRange>,
    /// Ordered allowed-combination list; first match wins.
    pub allowed_combinations: Vec<IsCollectionTransferAllowed>,
    /// Merkle gates a matching transfer must additionally satisfy.
    pub challenges: Vec<MerkleChallenge>,
    /// Namespace for this rule's usage trackers. Empty disables tracking.
    pub tracker_id: String,
    /// Shift applied to badge IDs per prior use, for ordered distribution.
    pub increment_badge_ids_by: u64,
    /// Shift applied to ownership times per prior use.
    pub increment_ownership_times_by: u64,
    /// Cap on total usage of this rule.
    pub overall_approvals: Option<ApprovalsTracker>,
    /// Caps on usage per address role.
    pub per_address_approvals: Option<PerAddressApprovals>,
    /// Skip the sender's own outgoing-approval check.
    pub overrides_from_approved_outgoing_transfers: bool,
    /// Skip the recipient's own incoming-approval check.
    pub overrides_to_approved_incoming_transfers: bool,
    /// Require the recipient to equal the initiator.
    pub require_to_equals_initiated_by: bool,
    /// Require the sender to equal the initiator.
    pub require_from_equals_initiated_by: bool,
    /// Require the recipient to differ from the initiator.
    pub require_to_does_not_equal_initiated_by: bool,
    /// Require the sender to differ from the initiator.
    pub require_from_does_not_equal_initiated_by: bool,
    /// Off-chain metadata URI.
    pub uri: String,
    /// Arbitrary attached data.
    pub custom_data: String,
}

/// A user-level approval rule for outgoing transfers. The sender is
/// implicitly the owning user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApprovedOutgoingTransfer {
    /// Mapping the recipient must belong to.
    pub to_mapping_id: String,
    /// Mapping the initiator must belong to.
    pub initiated_by_mapping_id: String,
    /// Transfer times this rule covers.
    pub transfer_times: Vec<UintRange>,
    /// Badge IDs this rule covers.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times this rule covers.
    pub ownership_times: Vec<UintRange>,
    /// Ordered allowed-combination list; first match wins.
    pub allowed_combinations: Vec<IsUserOutgoingTransferAllowed>,
    /// Merkle gates a matching transfer must additionally satisfy.
    pub challenges: Vec<MerkleChallenge>,
    /// Namespace for this rule's usage trackers. Empty disables tracking.
    pub tracker_id: String,
    /// Shift applied to badge IDs per prior use.
    pub increment_badge_ids_by: u64,
    /// Shift applied to ownership times per prior use.
    pub increment_ownership_times_by: u64,
    /// Cap on total usage of this rule.
    pub overall_approvals: Option<ApprovalsTracker>,
    /// Caps on usage per address role.
    pub per_address_approvals: Option<PerAddressApprovals>,
    /// Require the recipient to equal the initiator.
    pub require_to_equals_initiated_by: bool,
    /// Require the recipient to differ from the initiator.
    pub require_to_does_not_equal_initiated_by: bool,
    /// Off-chain metadata URI.
    pub uri: String,
    /// Arbitrary attached data.
    pub custom_data: String,
}

/// A user-level approval rule for incoming transfers. The recipient is
/// implicitly the owning user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApprovedIncomingTransfer {
    /// Mapping the sender must belong to.
    pub from_mapping_id: String,
    /// Mapping the initiator must belong to.
    pub initiated_by_mapping_id: String,
    /// Transfer times this rule covers.
    pub transfer_times: Vec<UintRange>,
    /// Badge IDs this rule covers.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times this rule covers.
    pub ownership_times: Vec<UintRange>,
    /// Ordered allowed-combination list; first match wins.
    pub allowed_combinations: Vec<IsUserIncomingTransferAllowed>,
    /// Merkle gates a matching transfer must additionally satisfy.
    pub challenges: Vec<MerkleChallenge>,
    /// Namespace for this rule's usage trackers. Empty disables tracking.
    pub tracker_id: String,
    /// Shift applied to badge IDs per prior use.
    pub increment_badge_ids_by: u64,
    /// Shift applied to ownership times per prior use.
    pub increment_ownership_times_by: u64,
    /// Cap on total usage of this rule.
    pub overall_approvals: Option<ApprovalsTracker>,
    /// Caps on usage per address role.
    pub per_address_approvals: Option<PerAddressApprovals>,
    /// Require the sender to equal the initiator.
    pub require_from_equals_initiated_by: bool,
    /// Require the sender to differ from the initiator.
    pub require_from_does_not_equal_initiated_by: bool,
    /// Off-chain metadata URI.
    pub uri: String,
    /// Arbitrary attached data.
    pub custom_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::{deserialize, serialize};

    fn test_challenge() -> MerkleChallenge {
        MerkleChallenge {
            root: [7u8; 32],
            expected_proof_length: 3,
            use_creator_address_as_leaf: false,
            max_one_use_per_leaf: true,
            use_leaf_index_for_distribution_order: false,
            challenge_id: "claim-drop-1".into(),
        }
    }

    #[test]
    fn test_challenge_serialization() {
        let challenge = test_challenge();
        let bytes = serialize(&challenge).unwrap();
        let recovered: MerkleChallenge = deserialize(&bytes).unwrap();
        assert_eq!(challenge, recovered);
    }

    #[test]
    fn test_tracker_default_is_zero() {
        let tracker = ApprovalsTracker::default();
        assert_eq!(tracker.num_transfers, 0);
        assert!(tracker.amounts.is_empty());
    }

    #[test]
    fn test_proof_serialization() {
        let proof = MerkleProof {
            leaf: b"leaf".to_vec(),
            aunts: vec![MerklePathItem {
                aunt: [1u8; 32],
                on_right: true,
            }],
        };
        let bytes = serialize(&proof).unwrap();
        let recovered: MerkleProof = deserialize(&bytes).unwrap();
        assert_eq!(proof, recovered);
    }

    #[test]
    fn test_proof_for_leaf_folds_to_root() {
        use crate::crypto::{merkle_root_of_leaves, sha256, sha256_concat};

        let leaves: Vec<Vec<u8>> = (0u8..5).map(|i| vec![i]).collect();
        let root = merkle_root_of_leaves(&leaves);

        for index in 0..leaves.len() {
            let proof = MerkleProof::for_leaf(&leaves, index).unwrap();
            let mut current = sha256(&proof.leaf);
            for item in &proof.aunts {
                current = if item.on_right {
                    sha256_concat(&[&current, &item.aunt])
                } else {
                    sha256_concat(&[&item.aunt, &current])
                };
            }
            assert_eq!(current, root, "leaf {} does not fold to root", index);
        }
    }

    #[test]
    fn test_proof_for_leaf_out_of_bounds() {
        let leaves = vec![b"only".to_vec()];
        assert!(MerkleProof::for_leaf(&leaves, 1).is_none());
        // A single-leaf tree has an empty path.
        assert!(MerkleProof::for_leaf(&leaves, 0).unwrap().aunts.is_empty());
    }
}
