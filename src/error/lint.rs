//! Lint and revision invariant errors

use super::PinledgerError;

/// Create a LintFailed error for `count` denied findings
pub fn failed(count: usize) -> PinledgerError {
    PinledgerError::LintFailed { count }
}

/// Create an InvariantViolations error for `count` backwards pins
pub fn violations(count: usize) -> PinledgerError {
    PinledgerError::InvariantViolations { count }
}
