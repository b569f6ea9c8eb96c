use javastub_core::{AmbiguityPolicy, MethodId, Options, Request, Status};

use crate::support::{failing_output, success_output, ScriptedCompileFn};

#[test]
fn reports_failed_parse_when_slice_has_no_source() {
    let dir = tempfile::tempdir().unwrap();
    let options = Options::new(dir.path(), 30);
    let request = Request {
        project_root: dir.path().to_path_buf(),
        source_root: dir.path().to_path_buf(),
        method_id: MethodId::new("a/B", "f", "()V"),
        options,
    };

    let compile_fn = ScriptedCompileFn::new(vec![]);
    let outcome = javastub::run_with_compiler(&request, &compile_fn);

    assert_eq!(outcome.status, Status::FailedParse);
    assert_eq!(*compile_fn.calls.borrow(), 0);
}

#[test]
fn repairs_across_two_compiles_and_reports_target_not_emitted() {
    let dir = tempfile::tempdir().unwrap();
    let slice_dir = dir.path().join("slice/a");
    std::fs::create_dir_all(&slice_dir).unwrap();
    std::fs::write(
        slice_dir.join("B.java"),
        "package a;\n\nclass B {\n    void f() {\n        frobnicate(\"x\");\n    }\n}\n",
    )
    .unwrap();

    let options = Options::new(dir.path(), 30);
    let request = Request {
        project_root: dir.path().to_path_buf(),
        source_root: slice_dir.clone(),
        method_id: MethodId::new("a/B", "f", "()V"),
        options,
    };

    let diag = "a/B.java:5: error: cannot find symbol\n        frobnicate(\"x\");\n        ^\n  symbol:   method frobnicate(java.lang.String)\n  location: class a.B\n";
    let compile_fn = ScriptedCompileFn::new(vec![failing_output(diag), success_output()]);

    let outcome = javastub::run_with_compiler(&request, &compile_fn);

    // Nothing actually lands in the classes dir since the scripted compiler
    // never writes real classfiles, so VERIFY reports the target missing —
    // what this exercises is that collect (C2) plus the repair loop (C7)
    // drive the compiler exactly twice and that the synthesized stub is
    // reflected in `used_stubs`.
    assert_eq!(outcome.status, Status::TargetMethodNotEmitted);
    assert_eq!(*compile_fn.calls.borrow(), 2);
    assert!(outcome.used_stubs);
}

#[test]
fn strict_ambiguity_policy_fails_resolve_before_any_compile() {
    let dir = tempfile::tempdir().unwrap();
    let source_root = dir.path().join("src");
    std::fs::create_dir_all(source_root.join("x")).unwrap();
    std::fs::create_dir_all(source_root.join("y")).unwrap();
    std::fs::write(source_root.join("x/Helper.java"), "package x;\n\nclass Helper {}\n").unwrap();
    std::fs::write(source_root.join("y/Helper.java"), "package y;\n\nclass Helper {}\n").unwrap();

    let slice_dir = dir.path().join("work/slice/a");
    std::fs::create_dir_all(&slice_dir).unwrap();
    std::fs::write(
        slice_dir.join("B.java"),
        "package a;\n\nclass B {\n    Helper h;\n\n    void f() {}\n}\n",
    )
    .unwrap();

    let mut options = Options::new(dir.path().join("work"), 30);
    options.ambiguity_policy = AmbiguityPolicy::Strict;
    let request = Request {
        project_root: dir.path().to_path_buf(),
        source_root,
        method_id: MethodId::new("a/B", "f", "()V"),
        options,
    };

    let compile_fn = ScriptedCompileFn::new(vec![]);
    let outcome = javastub::run_with_compiler(&request, &compile_fn);

    assert_eq!(outcome.status, Status::FailedResolve);
    assert_eq!(*compile_fn.calls.borrow(), 0);
    assert!(outcome.notes.contains("Helper"));
}
