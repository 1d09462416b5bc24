//! Test execution: suite lifecycle replay, failure isolation, and outcome
//! classification.
//!
//! [`Harness::execute`] walks the registry in registration order. Suite
//! enter/exit callbacks are driven by diffing each test's ancestor chain
//! against the previous test's chain, so each suite's `before_all` fires
//! exactly once before its first test and its `after_all` exactly once after
//! its last (a synthetic terminal record with an empty chain closes any
//! suites still open at run end). Both exit and enter callbacks fire deepest
//! level first; this ordering is part of the observable contract and must
//! not be normalized to shallow-first.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use crate::errors::Failure;
use crate::registry::{Harness, SuiteSnapshot, TestBody, TestRecord};
use crate::report::{self, LogSink};
use crate::stub::{ErrorExpectation, TestCtx};

/// Pass/fail counts for one run.
///
/// A convenience for programmatic callers; the log sink remains the
/// harness's output contract.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn total_tests(&self) -> usize {
        self.passed + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_tests() == 0 {
            return 0.0;
        }
        (self.passed as f64 / self.total_tests() as f64) * 100.0
    }
}

/// One failed test: its suite path, label, and diagnostic lines.
struct FailureRecord {
    suites: Vec<String>,
    label: String,
    diagnostics: Vec<String>,
}

impl Harness {
    /// Runs every registered test in registration order, reporting through
    /// `sink`, and resets the harness so the next run starts clean.
    ///
    /// With an empty registry this logs a no-tests notice and returns
    /// immediately without touching any other harness state.
    pub fn execute(&mut self, sink: &mut dyn LogSink) -> RunSummary {
        if self.registry.is_empty() {
            report::no_tests(sink);
            return RunSummary::default();
        }

        let mut records = std::mem::take(&mut self.registry);
        records.push(TestRecord::terminal());

        let mut previous: Vec<SuiteSnapshot> = Vec::new();
        let mut passed = 0usize;
        let mut failures: Vec<FailureRecord> = Vec::new();

        for record in records {
            fire_suite_transitions(&previous, &record.ancestors);

            if let Some(body) = record.body.clone() {
                for stub in &self.stubs {
                    stub.reset();
                }
                *self.expectation.borrow_mut() = ErrorExpectation::None;

                for suite in &record.ancestors {
                    for cb in &suite.setup {
                        cb();
                    }
                }

                let ctx = TestCtx::new(self.expectation.clone());
                let outcome = run_isolated(&body, &ctx);
                let expectation = self.expectation.borrow().clone();

                match classify(outcome, &expectation) {
                    Ok(()) => {
                        passed += 1;
                        report::test_line(sink, &record.suite_labels(), &record.label, true);
                    }
                    Err(diagnostics) => {
                        report::test_line(sink, &record.suite_labels(), &record.label, false);
                        failures.push(FailureRecord {
                            suites: record
                                .suite_labels()
                                .iter()
                                .map(|s| s.to_string())
                                .collect(),
                            label: record.label.clone(),
                            diagnostics,
                        });
                    }
                }

                for suite in &record.ancestors {
                    for cb in &suite.teardown {
                        cb();
                    }
                }
            }

            previous = record.ancestors;
        }

        if failures.is_empty() {
            report::all_passed(sink);
        } else {
            for failure in &failures {
                let suites: Vec<&str> = failure.suites.iter().map(|s| s.as_str()).collect();
                report::failure_block(sink, &suites, &failure.label, &failure.diagnostics);
            }
        }

        self.stack.clear();
        self.stubs.clear();
        *self.expectation.borrow_mut() = ErrorExpectation::None;

        RunSummary {
            passed,
            failed: failures.len(),
        }
    }
}

/// Fires suite-exit callbacks for levels left behind and suite-enter
/// callbacks for levels newly entered, comparing chains level by level.
/// Snapshot chains share prefixes by construction (a suite id at level k
/// implies the same ancestry above it), so a per-level id comparison is a
/// full divergence check.
fn fire_suite_transitions(previous: &[SuiteSnapshot], current: &[SuiteSnapshot]) {
    let depth = previous.len().max(current.len());
    for level in (0..depth).rev() {
        if let Some(prev) = previous.get(level) {
            if current.get(level).map_or(true, |cur| cur.id != prev.id) {
                for cb in &prev.exit {
                    cb();
                }
            }
        }
    }
    for level in (0..depth).rev() {
        if let Some(cur) = current.get(level) {
            if previous.get(level).map_or(true, |prev| prev.id != cur.id) {
                for cb in &cur.enter {
                    cb();
                }
            }
        }
    }
}

/// Runs the body inside the failure-isolating scope: explicit `Err` values
/// come back as-is, and panics from the body or the code under test are
/// caught and mapped to [`Failure::Unexpected`].
fn run_isolated(body: &TestBody, ctx: &TestCtx) -> Result<(), Failure> {
    match catch_unwind(AssertUnwindSafe(|| body(ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => Err(Failure::unexpected(panic_message(payload))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The outcome classification table. Assertion failures always fail the
/// test; other failures are weighed against the declared expectation.
fn classify(
    outcome: Result<(), Failure>,
    expectation: &ErrorExpectation,
) -> Result<(), Vec<String>> {
    match (outcome, expectation) {
        (Ok(()), ErrorExpectation::None) => Ok(()),
        (Ok(()), _) => Err(vec!["Error expected but none occurred".to_string()]),
        (Err(failure @ Failure::Assertion { .. }), _) => Err(vec![failure.to_string()]),
        (Err(Failure::Unexpected { message }), ErrorExpectation::None) => Err(vec![
            "Error occurred but none expected".to_string(),
            message,
        ]),
        (Err(Failure::Unexpected { .. }), ErrorExpectation::Any) => Ok(()),
        (Err(Failure::Unexpected { message }), ErrorExpectation::Containing(wanted)) => {
            if message.contains(wanted) {
                Ok(())
            } else {
                Err(vec![
                    format!("Expected error containing \"{}\"", wanted),
                    format!("Occurred error: {}", message),
                ])
            }
        }
    }
}
