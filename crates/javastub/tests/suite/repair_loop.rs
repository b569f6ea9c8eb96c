use javastub_core::{MethodId, Options, StubPlan};

use crate::support::{failing_output, success_output, timed_out_output, write_slice_class, ScriptedCompileFn};

fn method_id() -> MethodId {
    MethodId::new("a/B", "f", "()V")
}

#[test]
fn stalls_when_extraction_yields_no_new_entries() {
    let dir = tempfile::tempdir().unwrap();
    write_slice_class(dir.path(), "    void f() {}\n");
    let options = Options::new(dir.path(), 30);
    let index = javastub_index::build_from_sources(&[]);
    let compile_fn = ScriptedCompileFn::new(vec![
        failing_output("a/B.java:1: error: some unrelated compile error\n"),
        failing_output("a/B.java:1: error: some unrelated compile error\n"),
    ]);

    let mut plan = StubPlan::new();
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(30);
    let outcome = javastub::repair::run_repair_loop(&mut plan, &index, &options, &method_id(), &compile_fn, deadline).unwrap();

    assert!(matches!(outcome, javastub::repair::LoopOutcome::Stalled { .. }));
    assert_eq!(*compile_fn.calls.borrow(), 1);
}

#[test]
fn reaches_iteration_budget_when_every_round_adds_an_entry() {
    let dir = tempfile::tempdir().unwrap();
    write_slice_class(dir.path(), "    void f() {}\n");
    let mut options = Options::new(dir.path(), 30);
    options.max_iterations = 2;
    let index = javastub_index::build_from_sources(&[]);

    let diag = |name: &str| {
        failing_output(&format!(
            "a/B.java:1: error: cannot find symbol\n  symbol:   method {name}()\n  location: class a.B\n"
        ))
    };
    let compile_fn = ScriptedCompileFn::new(vec![diag("first"), diag("second"), diag("third")]);

    let mut plan = StubPlan::new();
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(30);
    let outcome = javastub::repair::run_repair_loop(&mut plan, &index, &options, &method_id(), &compile_fn, deadline).unwrap();

    assert!(matches!(outcome, javastub::repair::LoopOutcome::IterationBudget { .. }));
    assert_eq!(*compile_fn.calls.borrow(), 2);
    assert_eq!(plan.methods().count(), 2);
}

#[test]
fn succeeds_after_one_repair_iteration() {
    let dir = tempfile::tempdir().unwrap();
    write_slice_class(dir.path(), "    void f() {\n        frobnicate(\"x\");\n    }\n");
    let options = Options::new(dir.path(), 30);
    let index = javastub_index::build_from_sources(&[]);

    let diag = "a/B.java:2: error: cannot find symbol\n        frobnicate(\"x\");\n        ^\n  symbol:   method frobnicate(java.lang.String)\n  location: class a.B\n";
    let compile_fn = ScriptedCompileFn::new(vec![failing_output(diag), success_output()]);

    let mut plan = StubPlan::new();
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(30);
    let outcome = javastub::repair::run_repair_loop(&mut plan, &index, &options, &method_id(), &compile_fn, deadline).unwrap();

    // No real classes dir was ever populated by the scripted compiler, so
    // VERIFY correctly reports the target as not emitted — the point of
    // this test is that the loop reaches COMPILE exactly twice and merges
    // exactly one new method stub, per spec scenario 6.
    assert!(matches!(outcome, javastub::repair::LoopOutcome::TargetMissing { .. }));
    assert_eq!(*compile_fn.calls.borrow(), 2);
    assert_eq!(plan.methods().count(), 1);
    assert_eq!(plan.methods().next().unwrap().name.as_str(), "frobnicate");
}

#[test]
fn timeout_from_compile_fn_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    write_slice_class(dir.path(), "    void f() {}\n");
    let options = Options::new(dir.path(), 30);
    let index = javastub_index::build_from_sources(&[]);
    let compile_fn = ScriptedCompileFn::new(vec![timed_out_output()]);

    let mut plan = StubPlan::new();
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(30);
    let outcome = javastub::repair::run_repair_loop(&mut plan, &index, &options, &method_id(), &compile_fn, deadline).unwrap();

    assert!(matches!(outcome, javastub::repair::LoopOutcome::Timeout));
}
