//! Repair Loop Orchestrator (component C7): the
//! collect → materialize → compile → extract state machine (spec §4.7).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use javastub_core::{MethodId, Options, StubPlan};
use javastub_index::ContextIndex;
use javastub_materialize::materialize;

use crate::diagnostics::{extract, parse_javac_diagnostics, Diagnostic};
use crate::driver::{merged_java_files, CompileFn};
use crate::error::Result;
use crate::report::{locate_target_method, TargetReport};

const MAX_NOTES_DIAGNOSTICS: usize = 5;

pub enum LoopOutcome {
    Success {
        report: TargetReport,
        used_stubs: bool,
    },
    /// VERIFY ran (no compiler errors) but the target method wasn't emitted
    /// with a body. Terminal: the state diagram has no edge back to
    /// MATERIALIZE from a failed VERIFY.
    TargetMissing {
        report: TargetReport,
    },
    /// EXTRACT produced zero new plan entries (spec §4.7 "Fixed point").
    Stalled {
        notes: String,
    },
    /// `options.max_iterations` reached without success (spec §4.7 "Budget").
    IterationBudget {
        notes: String,
    },
    /// Per-method wall-clock budget exceeded (spec §4.7 "Wall clock").
    Timeout,
}

/// Runs the state machine to completion, mutating `plan` in place so the
/// caller can report how many stub entries the run ultimately needed.
pub fn run_repair_loop(
    plan: &mut StubPlan,
    index: &ContextIndex,
    options: &Options,
    method_id: &MethodId,
    compile_fn: &dyn CompileFn,
    deadline: Instant,
) -> Result<LoopOutcome> {
    let slice_dir = options.slice_dir();
    let gen_dir = options.gen_dir();
    let classes_dir = options.classes_dir();
    let mut last_diagnostics: Vec<Diagnostic> = Vec::new();

    for _iteration in 0..options.max_iterations {
        if Instant::now() >= deadline {
            return Ok(LoopOutcome::Timeout);
        }

        materialize(plan, &slice_dir, &gen_dir, index)?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let source_roots = vec![slice_dir.clone(), gen_dir.clone()];
        let output = compile_fn.compile(&source_roots, &options.extra_classpath, &classes_dir, remaining)?;
        if output.timed_out {
            return Ok(LoopOutcome::Timeout);
        }

        if output.success {
            let report = locate_target_method(&classes_dir, method_id)?;
            return if report.target_has_code {
                Ok(LoopOutcome::Success { report, used_stubs: !plan.is_empty() })
            } else {
                Ok(LoopOutcome::TargetMissing { report })
            };
        }

        let diagnostics = parse_javac_diagnostics(&output.raw_output);
        let sources = load_source_texts(&source_roots);
        let extracted = extract(&diagnostics, &sources, index);

        let added = plan.merge(extracted.plan);
        if added == 0 {
            return Ok(LoopOutcome::Stalled { notes: summarize(&diagnostics) });
        }
        last_diagnostics = diagnostics;
    }

    Ok(LoopOutcome::IterationBudget { notes: summarize(&last_diagnostics) })
}

/// Reads every `.java` file the compiler would have seen, keyed by the same
/// absolute path javac reports in its diagnostics, so the extractor can
/// re-derive owner/return-type context from the exact text that was
/// compiled.
fn load_source_texts(source_roots: &[PathBuf]) -> BTreeMap<PathBuf, String> {
    merged_java_files(source_roots)
        .into_iter()
        .filter_map(|path| std::fs::read_to_string(&path).ok().map(|text| (path, text)))
        .collect()
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .filter(|d| d.kind == crate::diagnostics::DiagnosticKind::Error)
        .take(MAX_NOTES_DIAGNOSTICS)
        .map(|d| format!("{}:{}: {}", d.path.display(), d.line, d.message))
        .collect::<Vec<_>>()
        .join("; ")
}
