//! Common error types for snapcheck.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for a snapshot whose bundle is consistent.
pub const EXIT_PASS: i32 = 0;

/// Exit status for a failed validation or a structurally incomplete snapshot.
pub const EXIT_VALIDATION_FAILED: i32 = 1;

/// Exit status for usage errors and operational failures.
pub const EXIT_OPERATIONAL: i32 = 2;

/// Common error type for snapcheck operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Cannot detect stream from application name: {0}")]
    UnknownStream(String),

    #[error("Missing required components: {}", missing.join(", "))]
    MissingComponents {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("Failed to extract bundle {image}: {stderr}")]
    Extraction { image: String, stderr: String },

    #[error("Manifest not found after extraction: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("Invalid extraction profile: {0}")]
    Profile(String),

    #[error("Invalid pattern for {role}: {source}")]
    InvalidPattern {
        role: String,
        #[source]
        source: regex::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Process exit status for this error.
    ///
    /// Missing snapshot components are a validation failure; everything else
    /// aborts the run as an operational error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingComponents { .. } => EXIT_VALIDATION_FAILED,
            _ => EXIT_OPERATIONAL,
        }
    }
}

/// Result type alias using common Error.
pub type Result<T> = std::result::Result<T, Error>;
