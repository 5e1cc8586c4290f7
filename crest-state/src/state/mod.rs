//! State container and storage traits.
//!
//! This module provides:
//! - [`StateReader`]: Read-only access to ledger state
//! - [`StateWriter`]: Mutable access to ledger state
//! - [`StateStore`]: Combined trait for full state access
//! - [`LedgerState`]: In-memory HashMap-backed implementation
//! - Composite key types for trackers and challenge usage

pub mod keys;
mod ledger_state;
mod store;

pub use keys::{ApprovalLevel, ChallengeKey, TrackerKey, TrackerScope};
pub use ledger_state::LedgerState;
pub use store::{StateReader, StateStore, StateWriter};
