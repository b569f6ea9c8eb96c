//! Rewrites a slice compilation unit's import list (spec §4.4 "Import
//! cleanup"): dead static imports are removed, imports are added for
//! synthetic types that land in a different package, and the whole list is
//! deduplicated. Satisfies invariant P5 (import consistency post-cleanup).

use std::collections::BTreeSet;

use javastub_syntax::ImportDecl;

fn render_import(decl: &ImportDecl) -> String {
    let mut text = String::from("import ");
    if decl.is_static {
        text.push_str("static ");
    }
    text.push_str(&decl.path);
    if decl.is_wildcard {
        text.push_str(".*");
    }
    text.push(';');
    text
}

/// Rewrites the import block of `source`.
///
/// - `dead_static_import_paths`: static imports whose owner turned out not
///   to exist at all (spec scenario 3) and so get dropped rather than
///   stubbed.
/// - `needed_fqns`: fully-qualified synthetic (or otherwise newly
///   resolved) type names actually used in this file that live outside
///   `own_package` and outside `java.lang`, and so need an explicit import.
pub fn rewrite_imports(
    source: &str,
    imports: &[ImportDecl],
    dead_static_import_paths: &BTreeSet<String>,
    needed_fqns: &BTreeSet<String>,
    own_package: Option<&str>,
) -> String {
    let mut seen_rendered: BTreeSet<String> = BTreeSet::new();
    let mut last_import_line_end: Option<usize> = None;
    let mut lines_to_drop: BTreeSet<usize> = BTreeSet::new();

    for (line_no, line) in source.lines().enumerate() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with("import ") {
            continue;
        }
        last_import_line_end = Some(line_offset_end(source, line_no));

        if let Some(decl) = imports.iter().find(|d| render_import(d) == trimmed) {
            let dead = decl.is_static && dead_static_import_paths.contains(&decl.path);
            let dup = !seen_rendered.insert(trimmed.to_string());
            if dead || dup {
                lines_to_drop.insert(line_no);
            }
        }
    }

    let mut out = String::new();
    for (line_no, line) in source.lines().enumerate() {
        if lines_to_drop.contains(&line_no) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }

    let already_imported: BTreeSet<&str> = imports.iter().filter(|d| !d.is_static).map(|d| d.path.as_str()).collect();
    let mut additions: Vec<&str> = needed_fqns
        .iter()
        .map(String::as_str)
        .filter(|fqn| {
            let pkg = fqn.rsplit_once('.').map(|(p, _)| p);
            pkg != own_package && !fqn.starts_with("java.lang.") && !already_imported.contains(fqn)
        })
        .collect();
    additions.sort_unstable();
    additions.dedup();

    if additions.is_empty() {
        return out;
    }

    let insertion_byte = match last_import_line_end {
        Some(end) => end,
        None => package_decl_end(&out).unwrap_or(0),
    };
    let mut block = String::new();
    for fqn in additions {
        block.push_str("import ");
        block.push_str(fqn);
        block.push_str(";\n");
    }
    out.insert_str(insertion_byte, &block);
    out
}

fn line_offset_end(source: &str, line_no: usize) -> usize {
    let mut offset = 0;
    for (i, line) in source.lines().enumerate() {
        offset += line.len() + 1;
        if i == line_no {
            return offset;
        }
    }
    offset
}

fn package_decl_end(source: &str) -> Option<usize> {
    let idx = source.find("package ")?;
    let rest = &source[idx..];
    let semi = rest.find(';')?;
    Some(idx + semi + 1 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(path: &str, is_static: bool, is_wildcard: bool) -> ImportDecl {
        ImportDecl {
            path: path.to_string(),
            is_static,
            is_wildcard,
        }
    }

    #[test]
    fn removes_dead_static_import() {
        let src = "package a;\n\nimport static com.acme.Missing.thing;\n\nclass Foo {}\n";
        let imports = vec![decl("com.acme.Missing.thing", true, false)];
        let mut dead = BTreeSet::new();
        dead.insert("com.acme.Missing.thing".to_string());
        let out = rewrite_imports(src, &imports, &dead, &BTreeSet::new(), Some("a"));
        assert!(!out.contains("Missing"));
    }

    #[test]
    fn dedupes_repeated_import() {
        let src = "package a;\n\nimport b.C;\nimport b.C;\n\nclass Foo {}\n";
        let imports = vec![decl("b.C", false, false), decl("b.C", false, false)];
        let out = rewrite_imports(src, &imports, &BTreeSet::new(), &BTreeSet::new(), Some("a"));
        assert_eq!(out.matches("import b.C;").count(), 1);
    }

    #[test]
    fn adds_import_for_cross_package_synthetic_type() {
        let src = "package a;\n\nclass Foo {}\n";
        let mut needed = BTreeSet::new();
        needed.insert("b.Widget".to_string());
        let out = rewrite_imports(src, &[], &BTreeSet::new(), &needed, Some("a"));
        assert!(out.contains("import b.Widget;"));
    }

    #[test]
    fn does_not_import_same_package_type() {
        let src = "package a;\n\nclass Foo {}\n";
        let mut needed = BTreeSet::new();
        needed.insert("a.Sibling".to_string());
        let out = rewrite_imports(src, &[], &BTreeSet::new(), &needed, Some("a"));
        assert!(!out.contains("import a.Sibling;"));
    }

    #[test]
    fn does_not_import_java_lang() {
        let src = "package a;\n\nclass Foo {}\n";
        let mut needed = BTreeSet::new();
        needed.insert("java.lang.Thing".to_string());
        let out = rewrite_imports(src, &[], &BTreeSet::new(), &needed, Some("a"));
        assert!(!out.contains("import java.lang.Thing;"));
    }
}
