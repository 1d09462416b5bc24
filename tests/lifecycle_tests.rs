//! Suite lifecycle and ordering behavior of the execution engine.

use std::cell::RefCell;
use std::rc::Rc;

use modspec::prelude::*;

type EventLog = Rc<RefCell<Vec<String>>>;

fn new_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

fn push(events: &EventLog, entry: &str) {
    events.borrow_mut().push(entry.to_string());
}

#[test]
fn tests_run_in_registration_order() {
    let events = new_log();
    let mut h = Harness::new();

    let ev = events.clone();
    h.it("first", move |_| {
        ev.borrow_mut().push("first".to_string());
        Ok(())
    });
    h.describe("crusher", |s| {
        let ev = events.clone();
        s.it("second", move |_| {
            ev.borrow_mut().push("second".to_string());
            Ok(())
        });
        s.describe("hopper", |s| {
            let ev = events.clone();
            s.it("third", move |_| {
                ev.borrow_mut().push("third".to_string());
                Ok(())
            });
        });
        let ev = events.clone();
        s.it("fourth", move |_| {
            ev.borrow_mut().push("fourth".to_string());
            Ok(())
        });
    });
    let ev = events.clone();
    h.it("fifth", move |_| {
        ev.borrow_mut().push("fifth".to_string());
        Ok(())
    });

    let summary = h.execute(&mut LogBuffer::new());
    assert_eq!(summary.passed, 5);
    assert_eq!(
        *events.borrow(),
        vec!["first", "second", "third", "fourth", "fifth"]
    );
}

#[test]
fn nested_after_all_hooks_close_inner_suite_first() {
    // Suites A -> B, hooks on both, one test in B. After that test (the
    // last in both suites) B's exit hooks run, then A's.
    let events = new_log();
    let mut h = Harness::new();

    h.describe("A", |s| {
        let ev = events.clone();
        s.before_all(move || push(&ev, "A:before_all"));
        let ev = events.clone();
        s.after_all(move || push(&ev, "A:after_all"));
        s.describe("B", |s| {
            let ev = events.clone();
            s.before_all(move || push(&ev, "B:before_all"));
            let ev = events.clone();
            s.after_all(move || push(&ev, "B:after_all"));
            let ev = events.clone();
            s.it("only test", move |_| {
                ev.borrow_mut().push("test".to_string());
                Ok(())
            });
        });
    });

    h.execute(&mut LogBuffer::new());
    // Enter callbacks fire deepest level first, matching the exit order.
    assert_eq!(
        *events.borrow(),
        vec![
            "B:before_all",
            "A:before_all",
            "test",
            "B:after_all",
            "A:after_all",
        ]
    );
}

#[test]
fn suite_transitions_fire_deepest_level_first() {
    let events = new_log();
    let mut h = Harness::new();

    h.describe("A", |s| {
        let ev = events.clone();
        s.before_all(move || push(&ev, "A:enter"));
        let ev = events.clone();
        s.after_all(move || push(&ev, "A:exit"));
        s.describe("B", |s| {
            let ev = events.clone();
            s.before_all(move || push(&ev, "B:enter"));
            let ev = events.clone();
            s.after_all(move || push(&ev, "B:exit"));
            s.it("inner", |_| Ok(()));
        });
    });
    h.describe("C", |s| {
        let ev = events.clone();
        s.before_all(move || push(&ev, "C:enter"));
        let ev = events.clone();
        s.after_all(move || push(&ev, "C:exit"));
        s.it("sibling", |_| Ok(()));
    });

    h.execute(&mut LogBuffer::new());
    assert_eq!(
        *events.borrow(),
        vec![
            "B:enter", "A:enter", // into A/B, deepest first
            "B:exit", "A:exit",   // out of both when the chain moves to C
            "C:enter", "C:exit",
        ]
    );
}

#[test]
fn enter_and_exit_fire_exactly_once_per_suite() {
    let events = new_log();
    let mut h = Harness::new();

    h.describe("shared", |s| {
        let ev = events.clone();
        s.before_all(move || push(&ev, "enter"));
        let ev = events.clone();
        s.after_all(move || push(&ev, "exit"));
        s.it("one", |_| Ok(()));
        s.it("two", |_| Ok(()));
        s.it("three", |_| Ok(()));
    });

    h.execute(&mut LogBuffer::new());
    let counts = events.borrow();
    assert_eq!(counts.iter().filter(|e| *e == "enter").count(), 1);
    assert_eq!(counts.iter().filter(|e| *e == "exit").count(), 1);
}

#[test]
fn setup_runs_outermost_first_and_teardown_fires_even_on_failure() {
    let events = new_log();
    let mut h = Harness::new();

    h.describe("outer", |s| {
        let ev = events.clone();
        s.before_each(move || push(&ev, "outer:setup"));
        let ev = events.clone();
        s.after_each(move || push(&ev, "outer:teardown"));
        s.describe("inner", |s| {
            let ev = events.clone();
            s.before_each(move || push(&ev, "inner:setup"));
            let ev = events.clone();
            s.after_each(move || push(&ev, "inner:teardown"));
            let ev = events.clone();
            s.it("fails", move |_| {
                ev.borrow_mut().push("body".to_string());
                assert::equal(1, 2)
            });
        });
    });

    let summary = h.execute(&mut LogBuffer::new());
    assert_eq!(summary.failed, 1);
    assert_eq!(
        *events.borrow(),
        vec![
            "outer:setup",
            "inner:setup",
            "body",
            "outer:teardown",
            "inner:teardown",
        ]
    );
}

#[test]
fn hooks_added_after_a_test_do_not_apply_to_it() {
    let events = new_log();
    let mut h = Harness::new();

    h.describe("suite", |s| {
        let ev = events.clone();
        s.it("early", move |_| {
            ev.borrow_mut().push("early".to_string());
            Ok(())
        });
        let ev = events.clone();
        s.before_each(move || push(&ev, "setup"));
        let ev = events.clone();
        s.it("late", move |_| {
            ev.borrow_mut().push("late".to_string());
            Ok(())
        });
    });

    h.execute(&mut LogBuffer::new());
    assert_eq!(*events.borrow(), vec!["early", "setup", "late"]);
}

#[test]
fn one_passing_test_reports_pass_and_summary() {
    let mut h = Harness::new();
    h.describe("math", |s| {
        s.it("adds", |_| assert::equal(1 + 1, 2));
    });

    let mut log = LogBuffer::new();
    let summary = h.execute(&mut log);

    assert_eq!(summary, RunSummary { passed: 1, failed: 0 });
    assert!(!summary.has_failures());
    assert_eq!(
        log.lines(),
        vec!["[TESTS] [math] adds ok", "[TESTS] All tests passed"]
    );
}
