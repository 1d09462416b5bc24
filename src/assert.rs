//! Deep-equality assertion helpers for test bodies.
//!
//! All helpers return [`AssertResult`] so they compose with `?` inside a test
//! body. On mismatch they produce a [`Failure::Assertion`], which the runner
//! classifies as an intentional test failure rather than an unexpected error.

use difference::{Changeset, Difference};

use crate::errors::{AssertResult, Failure};
use crate::value::{deep_equal, Value};

/// Asserts that `actual` deep-equals `expected`.
///
/// ```rust
/// use modspec::assert;
/// assert!(assert::equal(1 + 1, 2).is_ok());
/// assert!(assert::equal(1, 2).is_err());
/// ```
pub fn equal<A: Into<Value>, B: Into<Value>>(actual: A, expected: B) -> AssertResult {
    check_equal(actual.into(), expected.into(), None)
}

/// Like [`equal`], with a caller-supplied context message.
pub fn equal_msg<A: Into<Value>, B: Into<Value>>(
    actual: A,
    expected: B,
    message: &str,
) -> AssertResult {
    check_equal(actual.into(), expected.into(), Some(message))
}

/// Asserts that `actual` does not deep-equal `expected`.
pub fn not_equal<A: Into<Value>, B: Into<Value>>(actual: A, expected: B) -> AssertResult {
    check_not_equal(actual.into(), expected.into(), None)
}

/// Like [`not_equal`], with a caller-supplied context message.
pub fn not_equal_msg<A: Into<Value>, B: Into<Value>>(
    actual: A,
    expected: B,
    message: &str,
) -> AssertResult {
    check_not_equal(actual.into(), expected.into(), Some(message))
}

fn check_equal(actual: Value, expected: Value, message: Option<&str>) -> AssertResult {
    if deep_equal(&actual, &expected) {
        return Ok(());
    }
    let mut text = match message {
        Some(m) => format!("{}: Expected {}, got {}", m, expected, actual),
        None => format!("Expected {}, got {}", expected, actual),
    };
    if let (Value::String(exp), Value::String(act)) = (&expected, &actual) {
        if exp.contains('\n') || act.contains('\n') {
            text.push('\n');
            text.push_str(&render_line_diff(exp, act));
        }
    }
    Err(Failure::assertion(text))
}

fn check_not_equal(actual: Value, expected: Value, message: Option<&str>) -> AssertResult {
    if !deep_equal(&actual, &expected) {
        return Ok(());
    }
    let text = match message {
        Some(m) => format!("{}: Expected values to differ, both were {}", m, actual),
        None => format!("Expected values to differ, both were {}", actual),
    };
    Err(Failure::assertion(text))
}

/// Renders a line-by-line diff of two multi-line strings.
fn render_line_diff(expected: &str, actual: &str) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut out = String::new();
    for diff in &changeset.diffs {
        let (marker, chunk) = match diff {
            Difference::Same(x) => ("  ", x),
            Difference::Rem(x) => ("- ", x),
            Difference::Add(x) => ("+ ", x),
        };
        for line in chunk.lines() {
            out.push_str(marker);
            out.push_str(line);
            out.push('\n');
        }
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_accepts_deep_equal_operands() {
        assert!(equal(2, 2.0).is_ok());
        assert!(equal("ore", "ore").is_ok());
        assert!(equal(
            Value::from(vec![Value::from(1), Value::from(2)]),
            Value::from(vec![Value::from(1), Value::from(2)]),
        )
        .is_ok());
    }

    #[test]
    fn equal_mismatch_names_both_values() {
        let err = equal(1, 2).unwrap_err();
        assert!(err.is_assertion());
        assert_eq!(err.message(), "Expected 2, got 1");
    }

    #[test]
    fn equal_msg_prefixes_caller_context() {
        let err = equal_msg("dirt", "gravel", "sieve output").unwrap_err();
        assert_eq!(err.message(), "sieve output: Expected gravel, got dirt");
    }

    #[test]
    fn multiline_string_mismatch_appends_diff() {
        let err = equal("a\nb\nc", "a\nx\nc").unwrap_err();
        let message = err.message();
        assert!(message.starts_with("Expected a\nx\nc, got a\nb\nc"));
        assert!(message.contains("- x"));
        assert!(message.contains("+ b"));
        assert!(message.contains("  a"));
    }

    #[test]
    fn not_equal_rejects_deep_equal_operands() {
        let err = not_equal(3, 3).unwrap_err();
        assert_eq!(err.message(), "Expected values to differ, both were 3");
        assert!(not_equal(3, 4).is_ok());
    }
}
