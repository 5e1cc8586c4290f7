//! SHA-256 hashing utilities.

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of the input data.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-256 hash of concatenated data slices.
///
/// More efficient than allocating a buffer for concatenation.
pub fn sha256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Compute the Merkle root of a list of leaf values.
///
/// Leaves are hashed once, then paired and hashed upward:
/// - Empty list returns 32 zero bytes
/// - Odd nodes are duplicated
///
/// Challenge roots are built with this construction, and proof
/// verification folds the same way.
pub fn merkle_root_of_leaves(leaves: &[Vec<u8>]) -> [u8; 32] {
    let hashes: Vec<[u8; 32]> = leaves.iter().map(|leaf| sha256(leaf)).collect();
    merkle_root(&hashes)
}

/// Compute Merkle root of a list of 32-byte hashes.
///
/// Uses a simple binary Merkle tree construction:
/// - Empty list returns 32 zero bytes
/// - Single hash returns that hash
/// - Otherwise, pair hashes and hash pairs recursively
/// - Odd leaves are duplicated
pub fn merkle_root(hashes: &[[u8; 32]]) -> [u8; 32] {
    if hashes.is_empty() {
        return [0u8; 32];
    }
    if hashes.len() == 1 {
        return hashes[0];
    }

    let mut level: Vec<[u8; 32]> = hashes.to_vec();

    while level.len() > 1 {
        let mut next_level = Vec::with_capacity(level.len().div_ceil(2));

        for chunk in level.chunks(2) {
            let combined = if chunk.len() == 2 {
                sha256_concat(&[&chunk[0], &chunk[1]])
            } else {
                // Odd leaf: duplicate it
                sha256_concat(&[&chunk[0], &chunk[0]])
            };
            next_level.push(combined);
        }

        level = next_level;
    }

    level[0]
}
