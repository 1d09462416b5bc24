//! Call-recording stubs and the per-test error expectation flag.
//!
//! A [`Stub`] substitutes for a real collaborator of the code under test. The
//! code under test calls [`Stub::call`] with a tuple of [`Value`] arguments;
//! the test body later verifies the interaction with [`Stub::called_with`] or
//! [`Stub::called_times`]. Handles are cheap clones over shared
//! single-threaded state, so the same stub can be captured by lifecycle hooks
//! and test bodies alike. The runner clears every registered stub's log
//! before each test, so no recorded calls leak between tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::{AssertResult, Failure};
use crate::value::{deep_equal, Value};

#[derive(Debug, Default)]
struct StubState {
    name: Option<String>,
    calls: Vec<Vec<Value>>,
}

/// A call-recording test double.
///
/// Created through [`Harness::stub`](crate::registry::Harness::stub) or the
/// suite context so the harness can reset it between tests.
#[derive(Debug, Clone, Default)]
pub struct Stub {
    state: Rc<RefCell<StubState>>,
}

impl Stub {
    pub(crate) fn new(name: Option<String>) -> Self {
        Stub {
            state: Rc::new(RefCell::new(StubState { name, calls: Vec::new() })),
        }
    }

    /// Records one invocation with the given argument tuple.
    pub fn call(&self, args: impl IntoIterator<Item = Value>) {
        self.state.borrow_mut().calls.push(args.into_iter().collect());
    }

    /// Number of invocations recorded since the last reset.
    pub fn call_count(&self) -> usize {
        self.state.borrow().calls.len()
    }

    /// Snapshot of all recorded invocations, in call order.
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.state.borrow().calls.clone()
    }

    /// True iff some recorded invocation deep-equals the given tuple.
    pub fn was_called_with(&self, args: &[Value]) -> bool {
        self.state.borrow().calls.iter().any(|call| {
            call.len() == args.len()
                && call.iter().zip(args.iter()).all(|(a, b)| deep_equal(a, b))
        })
    }

    /// Fails the current test unless some recorded invocation deep-equals
    /// the given tuple.
    pub fn called_with(&self, args: &[Value]) -> AssertResult {
        if self.was_called_with(args) {
            return Ok(());
        }
        Err(Failure::assertion(format!(
            "{} was not called with ({})",
            self.label(),
            format_args_tuple(args),
        )))
    }

    /// Fails the current test unless exactly `n` invocations were recorded.
    pub fn called_times(&self, n: usize) -> AssertResult {
        let count = self.call_count();
        if count == n {
            return Ok(());
        }
        Err(Failure::assertion(format!(
            "Expected {} to be called {} times, got {}",
            self.label(),
            n,
            count,
        )))
    }

    /// Clears the invocation log.
    pub(crate) fn reset(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn label(&self) -> String {
        match &self.state.borrow().name {
            Some(name) => format!("stub '{}'", name),
            None => "stub".to_string(),
        }
    }
}

fn format_args_tuple(args: &[Value]) -> String {
    args.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-test declaration of whether a non-assertion failure is anticipated.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ErrorExpectation {
    /// No error expected; any non-assertion failure fails the test.
    #[default]
    None,
    /// Any non-assertion failure passes the test.
    Any,
    /// A non-assertion failure passes iff its message contains the substring.
    Containing(String),
}

/// Context handed to every test body.
///
/// Carries the expectation flag for the currently running test. The flag is
/// reset before each test and read once by the outcome classifier after the
/// body returns.
pub struct TestCtx {
    expectation: Rc<RefCell<ErrorExpectation>>,
}

impl TestCtx {
    pub(crate) fn new(expectation: Rc<RefCell<ErrorExpectation>>) -> Self {
        TestCtx { expectation }
    }

    /// Declares that this test expects some non-assertion failure.
    pub fn expect_error(&self) {
        *self.expectation.borrow_mut() = ErrorExpectation::Any;
    }

    /// Declares that this test expects a non-assertion failure whose message
    /// contains `substring`.
    pub fn expect_error_containing(&self, substring: impl Into<String>) {
        *self.expectation.borrow_mut() = ErrorExpectation::Containing(substring.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let stub = Stub::new(None);
        stub.call([Value::from(1)]);
        stub.call([Value::from(2), Value::from("a")]);
        assert_eq!(stub.call_count(), 2);
        assert_eq!(
            stub.calls(),
            vec![
                vec![Value::from(1)],
                vec![Value::from(2), Value::from("a")],
            ]
        );
    }

    #[test]
    fn called_with_matches_deep_equal_tuples() {
        let stub = Stub::new(None);
        stub.call([Value::from(1), Value::from("a")]);
        assert!(stub.called_with(&[Value::from(1), Value::from("a")]).is_ok());
        assert!(stub.called_with(&[Value::from(1)]).is_err());
        assert!(!stub.was_called_with(&[Value::from("a"), Value::from(1)]));
    }

    #[test]
    fn called_with_failure_lists_expected_arguments() {
        let stub = Stub::new(Some("on_punch".to_string()));
        let err = stub.called_with(&[Value::from(7), Value::from("mese")]).unwrap_err();
        assert_eq!(err.message(), "stub 'on_punch' was not called with (7, mese)");
    }

    #[test]
    fn called_times_requires_exact_count() {
        let stub = Stub::new(None);
        stub.call([Value::from(1)]);
        assert!(stub.called_times(1).is_ok());
        let err = stub.called_times(2).unwrap_err();
        assert_eq!(err.message(), "Expected stub to be called 2 times, got 1");
    }

    #[test]
    fn reset_clears_the_log() {
        let stub = Stub::new(None);
        stub.call([Value::Nil]);
        stub.reset();
        assert_eq!(stub.call_count(), 0);
    }
}
