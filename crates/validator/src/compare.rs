//! Digest comparison and verdict aggregation.

use snapcheck_common::{EXIT_PASS, EXIT_VALIDATION_FAILED};
use std::fmt;

/// Result of comparing one role's digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Match,
    Mismatch,
    Missing,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Match => write!(f, "MATCH"),
            Outcome::Mismatch => write!(f, "MISMATCH"),
            Outcome::Missing => write!(f, "MISSING"),
        }
    }
}

/// Compare the snapshot's digest with the one the bundle references.
///
/// A reference the bundle does not carry is `Missing` whatever the snapshot
/// says. A snapshot component that is not pinned by digest never matches.
pub fn compare(expected: Option<&str>, actual: Option<&str>) -> Outcome {
    match (expected, actual) {
        (_, None) => Outcome::Missing,
        (Some(expected), Some(actual)) if expected == actual => Outcome::Match,
        _ => Outcome::Mismatch,
    }
}

/// Outcome for a single role, with the values that were compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOutcome {
    pub role: String,
    pub outcome: Outcome,
    /// Digest recorded in the snapshot.
    pub expected: Option<String>,
    /// Digest referenced by the bundle.
    pub actual: Option<String>,
}

impl RoleOutcome {
    pub fn evaluate(role: &str, expected: Option<&str>, actual: Option<&str>) -> Self {
        Self {
            role: role.to_string(),
            outcome: compare(expected, actual),
            expected: expected.map(str::to_string),
            actual: actual.map(str::to_string),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Match
    }
}

/// Aggregated verdict over every role's outcome.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub outcomes: Vec<RoleOutcome>,
}

impl ValidationResult {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(RoleOutcome::passed)
    }

    pub fn matches(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes.len() - self.matches()
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            EXIT_PASS
        } else {
            EXIT_VALIDATION_FAILED
        }
    }
}

/// Combine the role outcomes into a verdict. Passes only when every role
/// matches.
pub fn aggregate<I>(outcomes: I) -> ValidationResult
where
    I: IntoIterator<Item = RoleOutcome>,
{
    ValidationResult {
        outcomes: outcomes.into_iter().collect(),
    }
}
