//! Source-root walking and the multi-module root-pruning heuristic (spec
//! "Multi-module filtering").
//!
//! Root *discovery* — finding candidate source roots in the first place —
//! is the external driver's job. This module only walks a root that's
//! already been chosen and prunes a candidate list down when there are too
//! many of them.

use std::path::{Path, PathBuf};

use javastub_syntax::CompilationUnit;

use crate::error::{Error, Result};

pub const SOURCE_EXTENSION: &str = "java";

/// A parsed compilation unit plus the file it came from, relative to its
/// source root (used to resolve simple-name packages and for jar-free
/// directory existence checks in the collector's filters).
pub struct ScannedFile {
    pub relative_path: PathBuf,
    pub absolute_path: PathBuf,
    pub unit: CompilationUnit,
}

fn is_ignored_stem(stem: &str) -> bool {
    matches!(stem, "package-info" | "module-info")
}

fn is_test_dir(path: &Path) -> bool {
    path.components().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        s == "test" || s == "tests" || s.ends_with("Test") || s == "androidTest"
    })
}

/// Walks every regular source file under `root`, parsing each one
/// best-effort. A file that fails to parse (or can't be read) is skipped
/// silently, per the scanner's tolerant-parsing contract — the return value
/// simply omits it.
pub fn scan_source_root(root: &Path) -> Result<Vec<ScannedFile>> {
    let mut out = Vec::new();

    for entry in walkdir::WalkDir::new(root).into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::debug!(
                    target = "javastub.index",
                    root = %root.display(),
                    error = %err,
                    "skipping unreadable directory entry"
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }
        if is_test_dir(path) {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        if is_ignored_stem(stem) {
            continue;
        }

        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(err) => {
                tracing::debug!(
                    target = "javastub.index",
                    path = %path.display(),
                    error = %err,
                    "skipping unreadable source file"
                );
                continue;
            }
        };

        let unit = javastub_syntax::parse(&source);
        if unit.types.is_empty() {
            // A parse that yields no declarations at all is indistinguishable
            // from a genuine parse failure for indexing purposes; skip it.
            continue;
        }

        let relative_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        out.push(ScannedFile {
            relative_path,
            absolute_path: path.to_path_buf(),
            unit,
        });
    }

    Ok(out)
}

pub fn scan_roots(roots: &[PathBuf]) -> Result<Vec<ScannedFile>> {
    let mut out = Vec::new();
    for root in roots {
        if !root.is_dir() {
            continue;
        }
        out.extend(scan_source_root(root).map_err(|err| match err {
            Error::Walk { source, .. } => Error::Walk {
                path: root.clone(),
                source,
            },
            other => other,
        })?);
    }
    Ok(out)
}

/// Prunes a discovered candidate set down to the roots the scanner should
/// actually index, per the fixed priority list. Returns the input unchanged
/// when there are few enough candidates that indiscriminate union is still
/// tractable.
pub fn filter_source_roots(candidates: &[PathBuf]) -> Vec<PathBuf> {
    let non_test: Vec<PathBuf> = candidates.iter().filter(|p| !is_test_dir(p)).cloned().collect();

    if non_test.len() <= 3 {
        return non_test;
    }

    let buckets: [fn(&Path) -> bool; 4] = [
        |p| {
            let s = p.to_string_lossy();
            s.ends_with(&format!("src/main/{SOURCE_EXTENSION}")) || s.ends_with("src/main/java")
        },
        |p| {
            let s = p.to_string_lossy();
            s.contains("library/src") || s.contains("app/src")
        },
        |p| p.file_name().map(|n| n == "src").unwrap_or(false),
        |p| {
            p.components().any(|c| {
                let s = c.as_os_str().to_string_lossy();
                s == "core" || s == "main" || s == "api"
            })
        },
    ];

    for bucket in buckets {
        let matched: Vec<PathBuf> = non_test.iter().filter(|p| bucket(p)).cloned().collect();
        if !matched.is_empty() {
            return matched;
        }
    }

    let mut by_len = non_test;
    by_len.sort_by_key(|p| p.as_os_str().len());
    by_len.truncate(5);
    by_len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn few_candidates_pass_through_unfiltered() {
        let roots = vec![PathBuf::from("a/src"), PathBuf::from("b/src")];
        assert_eq!(filter_source_roots(&roots), roots);
    }

    #[test]
    fn prefers_src_main_java_bucket() {
        let roots = vec![
            PathBuf::from("mod1/src/main/java"),
            PathBuf::from("mod2/src/main/java"),
            PathBuf::from("mod3/other"),
            PathBuf::from("mod4/weird"),
        ];
        let filtered = filter_source_roots(&roots);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|p| p.to_string_lossy().ends_with("src/main/java")));
    }

    #[test]
    fn falls_back_to_five_shortest_paths() {
        let roots = vec![
            PathBuf::from("a/very/deeply/nested/weird/path/one"),
            PathBuf::from("b/very/deeply/nested/weird/path/two"),
            PathBuf::from("c/short"),
            PathBuf::from("d/shorter"),
            PathBuf::from("e/shortest"),
            PathBuf::from("f/also/quite/long/indeed/here"),
        ];
        let filtered = filter_source_roots(&roots);
        assert_eq!(filtered.len(), 5);
    }

    #[test]
    fn excludes_test_directories_always() {
        let roots = vec![
            PathBuf::from("mod/src/main/java"),
            PathBuf::from("mod/src/test/java"),
        ];
        let filtered = filter_source_roots(&roots);
        assert_eq!(filtered, vec![PathBuf::from("mod/src/main/java")]);
    }
}
