//! Partial-method compilation via iterative stub synthesis.
//!
//! Wires the source index (C1, [`javastub_index`]), symbol collector (C2,
//! [`javastub_collect`]), stub plan model (C3, [`javastub_core`]), stub
//! materializer (C4, [`javastub_materialize`]), compiler driver (C5),
//! diagnostics extractor (C6), repair loop (C7) and result reporter (C8)
//! into the single entry point external callers use: [`run`].

pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod repair;
pub mod report;

pub use driver::{CompileFn, CompileOutput, JavacCompileFn};
pub use error::{Error, Result};

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use javastub_core::{DepMode, Outcome, Request, Status, StubPlan};
use javastub_index::ContextIndex;

use crate::repair::LoopOutcome;

/// Runs a request end to end against a real `javac` on `PATH`.
pub fn run(request: &Request) -> Outcome {
    run_with_compiler(request, &JavacCompileFn::default())
}

/// Runs a request end to end against a caller-supplied compile function.
/// Exposed so tests can substitute a fake compiler instead of shelling out.
pub fn run_with_compiler(request: &Request, compile_fn: &dyn CompileFn) -> Outcome {
    let start = Instant::now();
    match run_inner(request, compile_fn, start) {
        Ok(outcome) => outcome,
        Err(err) => {
            let mut outcome = Outcome::internal_error(request.method_id.canonical_owner(), err.to_string());
            outcome.elapsed_ms = start.elapsed().as_millis();
            outcome
        }
    }
}

fn run_inner(request: &Request, compile_fn: &dyn CompileFn, start: Instant) -> Result<Outcome> {
    let target_class = request.method_id.canonical_owner();
    let deadline = start + Duration::from_secs(request.options.timeout_sec);

    let mut index = ContextIndex::build(&[request.source_root.clone()])?;
    if !matches!(request.options.dep_mode, DepMode::None) && !request.options.extra_classpath.is_empty() {
        let jars: Vec<PathBuf> = request
            .options
            .extra_classpath
            .iter()
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("jar"))
            .cloned()
            .collect();
        if !jars.is_empty() {
            index.merge_external_types(javastub_index::index_classpath(&jars));
        }
    }

    let slice_units = load_slice_units(&request.options.slice_dir())?;
    if slice_units.is_empty() {
        return Ok(Outcome {
            status: Status::FailedParse,
            classes_out_dir: None,
            target_class,
            emitted_classes: Vec::new(),
            target_class_file: None,
            target_has_code: false,
            used_stubs: false,
            deps_resolved: request.options.dep_mode,
            elapsed_ms: start.elapsed().as_millis(),
            notes: format!("no parseable source found under {}", request.options.slice_dir().display()),
        });
    }

    let mut plan = StubPlan::new();
    for (_, unit) in &slice_units {
        match javastub_collect::collect(unit, &index, request.options.ambiguity_policy) {
            Ok(result) => {
                plan.merge(result.plan);
            }
            Err(javastub_collect::Error::Ambiguous { simple_name, candidates }) => {
                return Ok(Outcome {
                    status: Status::FailedResolve,
                    classes_out_dir: None,
                    target_class,
                    emitted_classes: Vec::new(),
                    target_class_file: None,
                    target_has_code: false,
                    used_stubs: false,
                    deps_resolved: request.options.dep_mode,
                    elapsed_ms: start.elapsed().as_millis(),
                    notes: format!("ambiguous reference to `{simple_name}`: candidates are {}", candidates.join(", ")),
                });
            }
        }
    }

    let outcome_status = repair::run_repair_loop(&mut plan, &index, &request.options, &request.method_id, compile_fn, deadline)?;

    let classes_out_dir = Some(request.options.classes_dir());
    let elapsed_ms = start.elapsed().as_millis();

    Ok(match outcome_status {
        LoopOutcome::Success { report, used_stubs } => Outcome {
            status: Status::Ok,
            classes_out_dir,
            target_class,
            emitted_classes: report.emitted_classes,
            target_class_file: report.target_class_file,
            target_has_code: report.target_has_code,
            used_stubs,
            deps_resolved: request.options.dep_mode,
            elapsed_ms,
            notes: String::new(),
        },
        LoopOutcome::TargetMissing { report } => Outcome {
            status: Status::TargetMethodNotEmitted,
            classes_out_dir,
            target_class,
            emitted_classes: report.emitted_classes,
            target_class_file: report.target_class_file,
            target_has_code: false,
            used_stubs: !plan.is_empty(),
            deps_resolved: request.options.dep_mode,
            elapsed_ms,
            notes: report.descriptor_mismatch.unwrap_or_default(),
        },
        LoopOutcome::Stalled { notes } | LoopOutcome::IterationBudget { notes } => Outcome {
            status: Status::FailedCompile,
            classes_out_dir,
            target_class,
            emitted_classes: Vec::new(),
            target_class_file: None,
            target_has_code: false,
            used_stubs: !plan.is_empty(),
            deps_resolved: request.options.dep_mode,
            elapsed_ms,
            notes,
        },
        LoopOutcome::Timeout => Outcome {
            status: Status::Timeout,
            classes_out_dir,
            target_class,
            emitted_classes: Vec::new(),
            target_class_file: None,
            target_has_code: false,
            used_stubs: !plan.is_empty(),
            deps_resolved: request.options.dep_mode,
            elapsed_ms,
            notes: "per-method wall-clock timeout exceeded".to_string(),
        },
    })
}

fn load_slice_units(slice_dir: &Path) -> Result<Vec<(PathBuf, javastub_syntax::CompilationUnit)>> {
    let mut units = Vec::new();
    if !slice_dir.exists() {
        return Ok(units);
    }
    for entry in walkdir::WalkDir::new(slice_dir).into_iter().filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() || entry.path().extension().and_then(|e| e.to_str()) != Some("java") {
            continue;
        }
        let source = std::fs::read_to_string(entry.path()).map_err(|source| Error::ReadFile { path: entry.path().to_path_buf(), source })?;
        units.push((entry.path().to_path_buf(), javastub_syntax::parse(&source)));
    }
    Ok(units)
}

