//! Snapshot model for snapcheck.
//!
//! A snapshot is the release pipeline's record of which container image was
//! built for every component of a candidate release.

pub mod snapshot;

pub use snapshot::{Component, Snapshot};
