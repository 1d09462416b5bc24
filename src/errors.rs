//! Failure values signaled by test bodies and assertion helpers.
//!
//! The harness distinguishes two failure kinds. [`Failure::Assertion`] is
//! raised by the assertion helpers and stub queries; it always fails the test
//! regardless of any declared error expectation. [`Failure::Unexpected`] is
//! any other failure a body signals (an explicit `Err`, or a panic caught by
//! the runner); whether it fails the test depends on the expectation flag.
//!
//! The variant tag is the classification — the runner never inspects message
//! text to decide which kind it caught.

use miette::Diagnostic;
use thiserror::Error;

/// A failure signaled while a test body runs.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum Failure {
    /// An assertion helper or stub query found a mismatch.
    #[error("Assertion failed: {message}")]
    #[diagnostic(code(modspec::assertion_failure))]
    Assertion { message: String },

    /// Any other failure raised by the body or the code under test.
    #[error("{message}")]
    #[diagnostic(code(modspec::unexpected_failure))]
    Unexpected { message: String },
}

impl Failure {
    /// Builds an assertion failure with the given message.
    pub fn assertion(message: impl Into<String>) -> Self {
        Failure::Assertion {
            message: message.into(),
        }
    }

    /// Builds a non-assertion failure with the given message.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Failure::Unexpected {
            message: message.into(),
        }
    }

    /// True for failures raised by assertion helpers.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Failure::Assertion { .. })
    }

    /// The raw failure message, without the assertion tag.
    pub fn message(&self) -> &str {
        match self {
            Failure::Assertion { message } | Failure::Unexpected { message } => message,
        }
    }
}

/// Result alias used by assertion helpers, stub queries, and test bodies.
pub type AssertResult = Result<(), Failure>;
