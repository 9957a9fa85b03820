//! # Oracle Checks
//!
//! Composable expected-value checks over parsed response data. A
//! [`CheckList`] batches every check in one verification block: a failing
//! check records a [`Violation`] instead of short-circuiting, so a step
//! reports all simultaneous violations at once. The scenario then calls
//! [`CheckList::finish`] to decide whether to proceed.
//!
//! Status codes are the exception: a wrong status makes everything after it
//! meaningless, so [`expect_status`] fails a step on its own, reported as
//! [`HarnessError::UnexpectedStatus`] with both codes.

use std::fmt;

use reqwest::StatusCode;

use crate::error::HarnessError;

/// One failed expectation: which check, what was expected, what showed up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub check: String,
    pub expected: String,
    pub actual: String,
}

impl Violation {
    pub fn new(
        check: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            check: check.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected `{}`, got `{}`",
            self.check, self.expected, self.actual
        )
    }
}

/// Fail the step unless the response status matches the expected code.
pub fn expect_status(
    step: &str,
    expected: StatusCode,
    actual: StatusCode,
) -> Result<(), HarnessError> {
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::UnexpectedStatus {
            step: step.to_string(),
            expected: expected.as_u16(),
            actual: actual.as_u16(),
        })
    }
}

/// Violation accumulator for one verification block.
#[derive(Debug, Default)]
pub struct CheckList {
    violations: Vec<Violation>,
}

impl CheckList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an arbitrary check outcome.
    pub fn check(
        &mut self,
        name: impl Into<String>,
        passed: bool,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) {
        if !passed {
            self.violations.push(Violation::new(name, expected, actual));
        }
    }

    /// Required string field must be present and non-empty.
    pub fn non_empty(&mut self, field: &str, value: &str) {
        self.check(
            format!("`{field}` is non-empty"),
            !value.is_empty(),
            "non-empty string",
            value,
        );
    }

    /// Field must equal the expected value exactly.
    pub fn field_eq(&mut self, field: &str, actual: &str, expected: &str) {
        self.check(format!("`{field}` equals"), actual == expected, expected, actual);
    }

    /// A numeric field the service renders as text must match the expected
    /// number's rendering (`10`, not `10.0`).
    pub fn numeric_text_eq(&mut self, field: &str, actual: &str, expected: u64) {
        let rendered = expected.to_string();
        let passed = actual == rendered;
        self.check(format!("`{field}` renders numeric value"), passed, rendered, actual);
    }

    /// Listed collection must be a non-empty array. (An object in place of
    /// an array never reaches this point: typed parsing rejects it.)
    pub fn non_empty_collection(&mut self, name: &str, len: usize) {
        self.check(
            format!("`{name}` is a non-empty array"),
            len > 0,
            "at least one element",
            format!("{len} elements"),
        );
    }

    /// An element matching the expected field value must exist somewhere in
    /// the listed collection; order does not matter.
    pub fn contains<T>(
        &mut self,
        collection: &str,
        items: &[T],
        field: &str,
        expected: &str,
        key: impl Fn(&T) -> &str,
    ) {
        self.check(
            format!("`{collection}` contains element with `{field}`"),
            items.iter().any(|item| key(item) == expected),
            expected,
            "no matching element",
        );
    }

    /// A by-id lookup must have found the entity.
    pub fn present(&mut self, entity: &str, found: bool) {
        self.check(format!("`{entity}` is present"), found, "an entity", "null");
    }

    /// A by-id lookup must have returned the absence sentinel. The check is
    /// on body content: deletion is confirmed by a literal `null` body, not
    /// by a status code.
    pub fn absent(&mut self, entity: &str, found: bool) {
        self.check(format!("`{entity}` is absent"), !found, "null", "an entity");
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Close the verification block: every recorded violation fails the step
    /// together, halting the scenario before any dependent step.
    pub fn finish(self, step: &str) -> Result<(), HarnessError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::AssertionViolation {
                step: step.to_string(),
                violations: self.violations,
            })
        }
    }
}
