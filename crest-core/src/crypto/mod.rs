//! Cryptographic primitives.
//!
//! Only hashing lives here: signatures are verified before a transaction
//! reaches this engine.

mod hashing;

pub use hashing::{merkle_root, merkle_root_of_leaves, sha256, sha256_concat};
