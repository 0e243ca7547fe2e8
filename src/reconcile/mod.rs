//! Persistence reconciliation.
//!
//! Decides - once, at apply time - whether an edit reuses the persisted
//! transaction in place, moves it to another owner, or creates a fresh one,
//! and assembles the annotation units written back onto it.

mod reconcile_model;
mod reconcile_service;


pub use reconcile_model::{resolve_apply_mode, ApplyMode};
pub use reconcile_service::{assemble_units, reconcile_transaction};
