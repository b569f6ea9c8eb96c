//! Compiler Driver (component C5): invokes an external compiler over the
//! union of slice + stub source roots and captures its raw diagnostic text.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// What the orchestrator needs back from one compiler invocation (spec §6
/// "Compiler interface").
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub success: bool,
    pub raw_output: String,
    /// `.class` files written under `classes_dir`, relative to it.
    pub emitted_classes: Vec<PathBuf>,
    pub timed_out: bool,
}

/// A diagnostic-emitting compile function (spec §6): inputs are source
/// roots, extra classpath and an output directory; outputs are a success
/// flag, the raw diagnostic text, and the emitted classfile list.
pub trait CompileFn {
    fn compile(&self, source_roots: &[PathBuf], extra_classpath: &[PathBuf], out_dir: &Path, timeout: Duration) -> Result<CompileOutput>;
}

/// Shells out to a real `javac`. `nova-process`, the teacher's own process
/// wrapper, ships no implementation in this tree (no `src/`, only its test
/// suite), so timeout enforcement here uses `wait-timeout` directly.
#[derive(Debug, Clone)]
pub struct JavacCompileFn {
    pub javac_path: PathBuf,
}

impl Default for JavacCompileFn {
    fn default() -> Self {
        Self { javac_path: PathBuf::from("javac") }
    }
}

impl CompileFn for JavacCompileFn {
    fn compile(&self, source_roots: &[PathBuf], extra_classpath: &[PathBuf], out_dir: &Path, timeout: Duration) -> Result<CompileOutput> {
        std::fs::create_dir_all(out_dir).map_err(|source| Error::CreateDir { path: out_dir.to_path_buf(), source })?;

        let sources = merged_java_files(source_roots);
        if sources.is_empty() {
            return Ok(CompileOutput {
                success: true,
                raw_output: String::new(),
                emitted_classes: Vec::new(),
                timed_out: false,
            });
        }

        let mut cmd = Command::new(&self.javac_path);
        cmd.arg("-d").arg(out_dir);
        if !extra_classpath.is_empty() {
            let cp = std::env::join_paths(extra_classpath).unwrap_or_default();
            cmd.arg("-cp").arg(cp);
        }
        cmd.args(&sources);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(Error::Spawn)?;
        let status = child.wait_timeout(timeout).map_err(Error::Spawn)?;

        match status {
            Some(status) => {
                use std::io::Read;
                let mut out = String::new();
                let mut err = String::new();
                if let Some(mut stdout) = child.stdout.take() {
                    let _ = stdout.read_to_string(&mut out);
                }
                if let Some(mut stderr) = child.stderr.take() {
                    let _ = stderr.read_to_string(&mut err);
                }
                let raw_output = format!("{out}{err}");
                Ok(CompileOutput {
                    success: status.success(),
                    raw_output,
                    emitted_classes: collect_class_files(out_dir),
                    timed_out: false,
                })
            }
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Ok(CompileOutput {
                    success: false,
                    raw_output: String::new(),
                    emitted_classes: Vec::new(),
                    timed_out: true,
                })
            }
        }
    }
}

/// Merges `source_roots` by relative path, later roots winning on overlap,
/// and returns the absolute list of `.java` files to hand the compiler.
/// Callers pass `[slice_root, gen_root]` so the materializer's stubs take
/// precedence over the slice (spec §6 filesystem layout).
pub fn merged_java_files(source_roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut by_relative: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    for root in source_roots {
        if !root.exists() {
            continue;
        }
        for entry in WalkDir::new(root).into_iter().filter_map(std::result::Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("java") {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(root) {
                by_relative.insert(rel.to_path_buf(), path.to_path_buf());
            }
        }
    }
    by_relative.into_values().collect()
}

fn collect_class_files(out_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(out_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file() && e.path().extension().and_then(|x| x.to_str()) == Some("class"))
        .filter_map(|e| e.path().strip_prefix(out_dir).ok().map(|p| p.to_path_buf()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_wins_over_slice_for_same_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let slice = dir.path().join("slice");
        let gen = dir.path().join("gen");
        std::fs::create_dir_all(slice.join("a")).unwrap();
        std::fs::create_dir_all(gen.join("a")).unwrap();
        std::fs::write(slice.join("a/B.java"), "stale").unwrap();
        std::fs::write(gen.join("a/B.java"), "fresh").unwrap();
        std::fs::write(slice.join("a/Only.java"), "only").unwrap();

        let files = merged_java_files(&[slice.clone(), gen.clone()]);
        assert_eq!(files.len(), 2);
        let b = files.iter().find(|p| p.ends_with("a/B.java")).unwrap();
        assert_eq!(std::fs::read_to_string(b).unwrap(), "fresh");
    }
}
