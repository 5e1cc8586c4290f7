// Allow handlers with many parameters - transaction handlers need context
#![allow(clippy::too_many_arguments)]

//! Transfer-authorization state machine for the Crest badge ledger.
//!
//! This crate implements the complete state transition function. Given a
//! current state and a decoded transaction, it produces the next state or
//! an error. Every authorization rule is enforced here, with no networking
//! or persistence.
//!
//! # Key Components
//!
//! - [`LedgerState`]: In-memory state container backed by HashMaps
//! - [`StateReader`]/[`StateWriter`]: Traits abstracting state access
//! - [`apply_transaction`]: Main entry point for executing transactions
//! - [`authorize_transfer`]: The per-transfer authorization pipeline
//! - [`StateError`]: Denial reasons and data-integrity anomalies
//!
//! # Example
//!
//! ```ignore
//! use crest_state::{apply_transaction, LedgerState};
//! use crest_core::Transaction;
//!
//! let mut state = LedgerState::new();
//! let result = apply_transaction(&mut state, &tx, block_timestamp);
//! ```

mod error;
pub mod execute;
pub mod resolve;
pub mod state;

pub use error::{StateError, StateResult};
pub use execute::{apply_transaction, apply_transaction_with_context, ExecutionContext};
pub use resolve::{
    authorize_transfer, Authorized, OverridePolicy, PendingCommit, PermissionVerdict,
    TransferContext,
};
pub use state::{
    ApprovalLevel, ChallengeKey, LedgerState, StateReader, StateStore, StateWriter, TrackerKey,
    TrackerScope,
};
