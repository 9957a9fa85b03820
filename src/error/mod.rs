//! # Error Taxonomy
//!
//! Every failure a scenario can hit, each kind reported distinctly. None of
//! these are recoverable: the first error terminates its scenario and is
//! surfaced synchronously to the caller.

use thiserror::Error;

use crate::oracle::Violation;

/// A failure that terminates a scenario.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Credentials rejected, login transport failure, or an empty token.
    /// Raised before any mutating call runs.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    /// Transport-level failure on a scenario step. One request, one
    /// response; nothing is retried.
    #[error("transport failure during `{step}`: {source}")]
    Transport {
        step: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response status differed from the code the step expected.
    #[error("unexpected status for `{step}`: expected {expected}, got {actual}")]
    UnexpectedStatus {
        step: String,
        expected: u16,
        actual: u16,
    },

    /// One verification block's accumulated check failures. Checks within a
    /// block never short-circuit each other; the block fails as a whole.
    #[error("step `{step}` violated {} expectation(s):{}", violations.len(), render(violations))]
    AssertionViolation {
        step: String,
        violations: Vec<Violation>,
    },

    /// A seeded entity the scenario depends on was not in the listing.
    /// Distinct from an assertion violation: this points at bad test-data
    /// setup, not a service defect.
    #[error("precondition entity not found: {0}")]
    PreconditionNotFound(String),

    /// A response body did not match the typed record for its resource.
    /// Distinct from an assertion violation: the shape, not a value, is off.
    #[error("malformed `{resource}` response: {detail}")]
    Parse { resource: String, detail: String },
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("\n  - {violation}"))
        .collect()
}

impl HarnessError {
    pub(crate) fn transport(step: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            step: step.into(),
            source,
        }
    }

    pub(crate) fn parse(resource: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Parse {
            resource: resource.into(),
            detail: detail.into(),
        }
    }
}
