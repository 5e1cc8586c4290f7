//! Deterministic binary serialization.

mod bincode_config;

pub use bincode_config::{deserialize, serialize, serialized_size};
