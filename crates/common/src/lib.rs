//! Common utilities and types shared across snapcheck crates.

pub mod digest;
pub mod error;
pub mod stream;

pub use error::{Error, Result, EXIT_OPERATIONAL, EXIT_PASS, EXIT_VALIDATION_FAILED};
pub use stream::Stream;
