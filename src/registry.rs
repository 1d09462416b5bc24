//! Test and suite registration.
//!
//! A [`Harness`] owns all registration state: the ordered test registry, the
//! suite-nesting stack (live only while `describe` bodies run), the suite id
//! counter, the set of stubs to reset between tests, and the error
//! expectation flag. Nothing is module-global, so independent harnesses can
//! coexist and a harness can be reused across runs.
//!
//! Suites are declared with [`Harness::describe`], which hands the body a
//! [`Suite`] context. Lifecycle hooks exist only on that context, so
//! registering a hook outside any suite is unrepresentable. Tests are
//! declared with `it`; each test snapshots its ancestor suites at
//! registration time, so hooks added to a still-open suite after the `it`
//! call do not apply to it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::{AssertResult, Failure};
use crate::stub::{ErrorExpectation, Stub, TestCtx};

/// A lifecycle callback: suite enter/exit or per-test setup/teardown.
pub(crate) type Hook = Rc<dyn Fn()>;

/// A test body. Returns `Ok(())` to pass; signals failure via [`Failure`].
pub(crate) type TestBody = Rc<dyn Fn(&TestCtx) -> Result<(), Failure>>;

/// A suite that is open during registration. Its hook lists grow while the
/// `describe` body runs and are snapshotted by every `it` call inside it.
pub(crate) struct SuiteFrame {
    id: u64,
    label: String,
    enter: Vec<Hook>,
    exit: Vec<Hook>,
    setup: Vec<Hook>,
    teardown: Vec<Hook>,
}

impl SuiteFrame {
    fn new(id: u64, label: String) -> Self {
        SuiteFrame {
            id,
            label,
            enter: Vec::new(),
            exit: Vec::new(),
            setup: Vec::new(),
            teardown: Vec::new(),
        }
    }

    fn snapshot(&self) -> SuiteSnapshot {
        SuiteSnapshot {
            id: self.id,
            label: self.label.clone(),
            enter: self.enter.clone(),
            exit: self.exit.clone(),
            setup: self.setup.clone(),
            teardown: self.teardown.clone(),
        }
    }
}

/// A registration-time snapshot of one ancestor suite, carried by a test
/// record. Hook vectors are cloned lists of shared callbacks, so two tests
/// registered at different points inside the same suite may see different
/// hook sets, as specified.
#[derive(Clone)]
pub(crate) struct SuiteSnapshot {
    pub(crate) id: u64,
    pub(crate) label: String,
    pub(crate) enter: Vec<Hook>,
    pub(crate) exit: Vec<Hook>,
    pub(crate) setup: Vec<Hook>,
    pub(crate) teardown: Vec<Hook>,
}

/// One registered test: its label, ancestor-suite snapshots (outermost
/// first), and its body. The terminal record appended by the runner carries
/// no body and an empty ancestor chain.
pub(crate) struct TestRecord {
    pub(crate) label: String,
    pub(crate) ancestors: Vec<SuiteSnapshot>,
    pub(crate) body: Option<TestBody>,
}

impl TestRecord {
    pub(crate) fn terminal() -> Self {
        TestRecord {
            label: String::new(),
            ancestors: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn suite_labels(&self) -> Vec<&str> {
        self.ancestors.iter().map(|s| s.label.as_str()).collect()
    }
}

/// The harness: registration API plus all per-run state.
pub struct Harness {
    pub(crate) registry: Vec<TestRecord>,
    pub(crate) stack: Vec<SuiteFrame>,
    pub(crate) next_suite_id: u64,
    pub(crate) stubs: Vec<Stub>,
    pub(crate) expectation: Rc<RefCell<ErrorExpectation>>,
}

impl Harness {
    pub fn new() -> Self {
        Harness {
            registry: Vec::new(),
            stack: Vec::new(),
            next_suite_id: 1,
            stubs: Vec::new(),
            expectation: Rc::new(RefCell::new(ErrorExpectation::None)),
        }
    }

    /// Opens a suite, runs `body` with a [`Suite`] context for nested
    /// registrations, then closes the suite. Panics inside `body` propagate:
    /// registration errors indicate a harness-usage bug and are not isolated.
    pub fn describe(&mut self, label: impl Into<String>, body: impl FnOnce(&mut Suite)) {
        let id = self.next_suite_id;
        self.next_suite_id += 1;
        self.stack.push(SuiteFrame::new(id, label.into()));
        let mut suite = Suite { harness: &mut *self };
        body(&mut suite);
        self.stack.pop();
    }

    /// Registers a test under the currently open suites (none, at top
    /// level). The body is not executed until [`Harness::execute`] runs.
    pub fn it(
        &mut self,
        label: impl Into<String>,
        body: impl Fn(&TestCtx) -> AssertResult + 'static,
    ) {
        let ancestors = self.stack.iter().map(SuiteFrame::snapshot).collect();
        self.registry.push(TestRecord {
            label: label.into(),
            ancestors,
            body: Some(Rc::new(body)),
        });
    }

    /// Creates an anonymous stub registered for per-test reset.
    pub fn stub(&mut self) -> Stub {
        self.register_stub(None)
    }

    /// Creates a named stub; the name appears in query diagnostics.
    pub fn stub_named(&mut self, name: impl Into<String>) -> Stub {
        self.register_stub(Some(name.into()))
    }

    fn register_stub(&mut self, name: Option<String>) -> Stub {
        let stub = Stub::new(name);
        self.stubs.push(stub.clone());
        stub
    }

    pub(crate) fn innermost_frame(&mut self) -> &mut SuiteFrame {
        self.stack
            .last_mut()
            .expect("suite context exists only inside describe")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration context for the body of a `describe` call.
pub struct Suite<'h> {
    harness: &'h mut Harness,
}

impl Suite<'_> {
    /// Opens a nested suite.
    pub fn describe(&mut self, label: impl Into<String>, body: impl FnOnce(&mut Suite)) {
        self.harness.describe(label, body);
    }

    /// Registers a test in this suite.
    pub fn it(
        &mut self,
        label: impl Into<String>,
        body: impl Fn(&TestCtx) -> AssertResult + 'static,
    ) {
        self.harness.it(label, body);
    }

    /// Runs before every test in this suite (and nested suites), after any
    /// outer suite's setup.
    pub fn before_each(&mut self, cb: impl Fn() + 'static) {
        self.harness.innermost_frame().setup.push(Rc::new(cb));
    }

    /// Runs after every test in this suite (and nested suites).
    pub fn after_each(&mut self, cb: impl Fn() + 'static) {
        self.harness.innermost_frame().teardown.push(Rc::new(cb));
    }

    /// Runs once, before the first test whose suite chain includes this
    /// suite.
    pub fn before_all(&mut self, cb: impl Fn() + 'static) {
        self.harness.innermost_frame().enter.push(Rc::new(cb));
    }

    /// Runs once, after the last test whose suite chain includes this suite
    /// (or at run end if the suite is still open).
    pub fn after_all(&mut self, cb: impl Fn() + 'static) {
        self.harness.innermost_frame().exit.push(Rc::new(cb));
    }

    /// Creates an anonymous stub registered for per-test reset.
    pub fn stub(&mut self) -> Stub {
        self.harness.stub()
    }

    /// Creates a named stub; the name appears in query diagnostics.
    pub fn stub_named(&mut self, name: impl Into<String>) -> Stub {
        self.harness.stub_named(name)
    }
}
