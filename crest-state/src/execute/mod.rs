//! Transaction execution.
//!
//! `apply_transaction` dispatches decoded transactions to per-message
//! handlers. Each handler either fully applies its message or returns a
//! denial with the state untouched.

mod address_mapping;
mod approvals_update;
mod collection_update;
mod context;
mod executor;
mod transfer;

pub use context::ExecutionContext;
pub use executor::{apply_transaction, apply_transaction_with_context};
