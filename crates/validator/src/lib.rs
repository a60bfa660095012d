//! Snapshot validation for snapcheck.
//!
//! Compares the digests a snapshot records with the digests its bundle
//! references and renders the verdict.

pub mod compare;
pub mod pipeline;
pub mod report;

pub use compare::{aggregate, compare, Outcome, RoleOutcome, ValidationResult};
pub use pipeline::validate_snapshot;
