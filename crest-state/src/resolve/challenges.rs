//! Merkle challenge validation.
//!
//! A challenge gates a transfer behind membership in a Merkle tree: the
//! submitter supplies a leaf and a path of sibling hashes, and the engine
//! recomputes the root. Leaf-usage limits are enforced by the approval
//! resolver against the usage store; this module is pure hash math.

use crest_core::crypto::{sha256, sha256_concat};
use crest_core::{Address, MerkleChallenge, MerkleProof};

use crate::error::{StateError, StateResult};

/// Verify a proof against a challenge, returning the proven leaf index.
///
/// The leaf is hashed once and folded with each aunt in path order; each
/// aunt's `on_right` flag selects the concatenation order. The proof is
/// accepted iff the recomputed root equals the challenge root and the path
/// length equals `expected_proof_length`. When the challenge pins the leaf
/// to the initiator, the raw 20 address bytes are the canonical encoding.
pub fn verify_challenge(
    challenge: &MerkleChallenge,
    proof: &MerkleProof,
    initiated_by: &Address,
) -> StateResult<u64> {
    if challenge.use_creator_address_as_leaf && proof.leaf != initiated_by.as_slice() {
        return Err(StateError::ChallengeWrongLeaf {
            challenge_id: challenge.challenge_id.clone(),
        });
    }

    if proof.aunts.len() as u64 != challenge.expected_proof_length {
        return Err(StateError::ChallengeProofLengthMismatch {
            challenge_id: challenge.challenge_id.clone(),
            expected: challenge.expected_proof_length,
            actual: proof.aunts.len() as u64,
        });
    }

    let mut current = sha256(&proof.leaf);
    let mut leaf_index: u64 = 0;
    for (depth, item) in proof.aunts.iter().enumerate() {
        if item.on_right {
            current = sha256_concat(&[&current, &item.aunt]);
        } else {
            // Aunt on the left means our node was the right child, which
            // sets this level's bit of the leaf index.
            current = sha256_concat(&[&item.aunt, &current]);
            if depth < 64 {
                leaf_index |= 1 << depth;
            }
        }
    }

    if current != challenge.root {
        return Err(StateError::ChallengeInvalidProof {
            challenge_id: challenge.challenge_id.clone(),
        });
    }

    Ok(leaf_index)
}
