//! Diagnostics Plan Extractor (component C6): turns the compiler's raw
//! `cannot find symbol` output back into plan entries the materializer can
//! act on next iteration.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use javastub_core::{CtorStub, FieldStub, MethodStub, Primitive, StubPlan, TypeKind, TypeRef, TypeStub, Visibility};
use javastub_index::ContextIndex;
use javastub_materialize::{enclosing_type_at_offset, line_start_offset, locate_type_bodies};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Info,
}

/// One javac-style diagnostic, with its (if present) `symbol:`/`location:`
/// continuation lines folded in.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: PathBuf,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub symbol: Option<String>,
    pub location: Option<String>,
}

impl Diagnostic {
    fn is_cannot_find_symbol(&self) -> bool {
        self.message.contains("cannot find symbol")
    }
}

/// Parses the raw textual output of a javac-like compiler into a flat list
/// of diagnostics, recognizing both the standard `path:line: error: msg`
/// header and the continuation lines javac emits for `cannot find symbol`.
pub fn parse_javac_diagnostics(output: &str) -> Vec<Diagnostic> {
    let lines: Vec<&str> = output.lines().collect();
    let mut diagnostics = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if let Some((path, line, kind, message)) = parse_header(lines[i]) {
            let mut symbol = None;
            let mut location = None;
            let mut column = 1u32;
            let mut j = i + 1;
            // Scan forward to the next diagnostic header (or EOF), picking
            // up the `symbol:`/`location:` continuation lines and the caret
            // marker javac prints under the quoted source line. Unlike the
            // header, these don't have a fixed offset from it.
            while j < lines.len() && parse_header(lines[j]).is_none() {
                let trimmed = lines[j].trim();
                if let Some(rest) = trimmed.strip_prefix("symbol:") {
                    symbol = Some(rest.trim().to_string());
                } else if let Some(rest) = trimmed.strip_prefix("location:") {
                    location = Some(rest.trim().to_string());
                } else if trimmed.starts_with('^') {
                    column = caret_column(lines[j]);
                }
                j += 1;
            }
            diagnostics.push(Diagnostic {
                kind,
                path,
                line,
                column,
                message,
                symbol,
                location,
            });
            i = j;
        } else {
            i += 1;
        }
    }
    diagnostics
}

fn parse_header(line: &str) -> Option<(PathBuf, u32, DiagnosticKind, String)> {
    // Maven-style: "[ERROR] /path/Foo.java:[10,5] message"
    if let Some(rest) = line.strip_prefix("[ERROR] ").or_else(|| line.strip_prefix("[WARNING] ")) {
        let kind = if line.starts_with("[ERROR]") { DiagnosticKind::Error } else { DiagnosticKind::Warning };
        if let Some(bracket) = rest.find(":[") {
            let path = &rest[..bracket];
            let after = &rest[bracket + 2..];
            if let Some(close) = after.find(']') {
                let coords = &after[..close];
                let mut parts = coords.splitn(2, ',');
                let line_no: u32 = parts.next()?.parse().ok()?;
                let message = after[close + 1..].trim().to_string();
                return Some((PathBuf::from(path), line_no, kind, message));
            }
        }
        return None;
    }

    // Standard javac: "/path/Foo.java:10: error: message"
    let colon = line.find(".java:")?;
    let after_ext = colon + 5;
    let rest = &line[after_ext + 1..];
    let mut parts = rest.splitn(2, ": ");
    let line_no: u32 = parts.next()?.parse().ok()?;
    let rest = parts.next()?;
    let (kind, message) = if let Some(m) = rest.strip_prefix("error: ") {
        (DiagnosticKind::Error, m)
    } else if let Some(m) = rest.strip_prefix("warning: ") {
        (DiagnosticKind::Warning, m)
    } else if let Some(m) = rest.strip_prefix("note: ") {
        (DiagnosticKind::Info, m)
    } else {
        return None;
    };
    let path = PathBuf::from(&line[..after_ext]);
    Some((path, line_no, kind, message.to_string()))
}

fn caret_column(line: &str) -> u32 {
    line.find('^').map(|i| i as u32 + 1).unwrap_or(1)
}

/// Result of running extraction over one compile's diagnostics.
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    pub plan: StubPlan,
    pub warnings: Vec<String>,
    /// Non-`cannot find symbol` ERROR diagnostics, surfaced to the
    /// orchestrator for possible terminal classification (spec §4.5).
    pub other_errors: Vec<Diagnostic>,
}

/// Component C6. `sources` maps each diagnostic's source path to its full
/// text so the extractor can re-derive owner and return-type context.
pub fn extract(diagnostics: &[Diagnostic], sources: &BTreeMap<PathBuf, String>, index: &ContextIndex) -> ExtractOutcome {
    let mut outcome = ExtractOutcome::default();
    let mut seen: BTreeSet<(&'static str, String, String, bool)> = BTreeSet::new();

    for diag in diagnostics {
        if diag.kind != DiagnosticKind::Error {
            continue;
        }
        if !diag.is_cannot_find_symbol() {
            outcome.other_errors.push(diag.clone());
            continue;
        }

        let Some(source) = sources.get(&diag.path) else {
            outcome.warnings.push(format!("no source text available for {}", diag.path.display()));
            continue;
        };

        let Some(owner) = resolve_owner(diag, source) else {
            outcome.warnings.push(format!("could not resolve enclosing owner for diagnostic at {}:{}", diag.path.display(), diag.line));
            continue;
        };

        let Some(symbol) = diag.symbol.as_deref() else {
            outcome.warnings.push(format!("diagnostic at {}:{} has no `symbol:` line", diag.path.display(), diag.line));
            continue;
        };

        if let Some(name) = symbol.strip_prefix("variable ") {
            let key = ("field", owner.clone(), name.trim().to_string(), true);
            if !seen.insert(key) {
                continue;
            }
            let field_type = infer_field_type(name.trim());
            outcome.plan.add_field(FieldStub {
                owner_fqn: owner.as_str().into(),
                name: name.trim().into(),
                field_type,
                is_static: false,
                visibility: Visibility::Public,
                mutable: true,
            });
        } else if let Some(rest) = symbol.strip_prefix("method ") {
            let (name, arity) = parse_method_symbol(rest);
            let key = ("method", owner.clone(), format!("{name}/{arity}"), false);
            if !seen.insert(key) {
                continue;
            }
            let return_type = infer_return_type(source, diag.line as usize, index);
            let params = vec![TypeRef::top(); arity];
            outcome.plan.add_method(MethodStub {
                owner_fqn: owner.as_str().into(),
                name: name.as_str().into(),
                return_type,
                params,
                is_static: false,
                visibility: Visibility::Public,
                thrown: Vec::new(),
                default_on_interface: false,
                varargs: false,
                mirror: None,
            });
        } else if let Some(name) = symbol.strip_prefix("class ") {
            let name = name.trim();
            let key = ("class", owner.clone(), name.to_string(), false);
            if !seen.insert(key) {
                continue;
            }
            if let Some(fqn) = resolve_missing_class(name, &owner, source, index, &outcome.plan) {
                outcome.plan.add_type(TypeStub::new(fqn, TypeKind::Class));
            }
        } else if symbol.starts_with("constructor ") {
            let arity = symbol.matches(',').count() + if symbol.contains('(') && !symbol.contains("()") { 1 } else { 0 };
            let key = ("ctor", owner.clone(), format!("arity{arity}"), false);
            if !seen.insert(key) {
                continue;
            }
            outcome.plan.add_ctor(CtorStub {
                owner_fqn: owner.as_str().into(),
                params: vec![TypeRef::top(); arity],
            });
        } else {
            outcome.warnings.push(format!("unrecognized symbol kind: {symbol}"));
        }
    }

    outcome
}

fn resolve_owner(diag: &Diagnostic, source: &str) -> Option<String> {
    let spans = locate_type_bodies(source);
    let offset = line_start_offset(source, diag.line);
    if let Some(nested_path) = enclosing_type_at_offset(&spans, offset) {
        let package = package_of(source);
        return Some(qualify(&package, &nested_path));
    }
    // Fallback: `location: class a.b.C` (spec §4.6 owner resolution ii).
    diag.location.as_deref().and_then(|loc| loc.strip_prefix("class ")).map(|s| s.trim().to_string())
}

fn package_of(source: &str) -> String {
    for line in source.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("package ") {
            return rest.trim_end_matches(';').trim().to_string();
        }
        if !trimmed.is_empty() && !trimmed.starts_with("//") && !trimmed.starts_with("/*") {
            break;
        }
    }
    String::new()
}

fn qualify(package: &str, nested_dollar_path: &str) -> String {
    if package.is_empty() {
        nested_dollar_path.to_string()
    } else {
        format!("{package}.{nested_dollar_path}")
    }
}

fn parse_method_symbol(rest: &str) -> (String, usize) {
    match rest.find('(') {
        Some(paren) => {
            let name = rest[..paren].trim().to_string();
            let args = &rest[paren + 1..rest.rfind(')').unwrap_or(rest.len())];
            let arity = if args.trim().is_empty() { 0 } else { args.split(',').count() };
            (name, arity)
        }
        None => (rest.trim().to_string(), 0),
    }
}

fn infer_field_type(name: &str) -> TypeRef {
    if name.starts_with("bitField") && name.ends_with('_') {
        TypeRef::primitive(Primitive::Int)
    } else {
        TypeRef::top()
    }
}

/// Return-type inference from the source line at the diagnostic (spec §4.6).
fn infer_return_type(source: &str, line: usize, index: &ContextIndex) -> TypeRef {
    let Some(text) = source.lines().nth(line.saturating_sub(1)) else {
        return TypeRef::top();
    };
    let trimmed = text.trim();

    if trimmed.ends_with(';') && !trimmed.contains('=') {
        return TypeRef::void();
    }
    if is_inside_if_condition(trimmed) {
        return TypeRef::primitive(Primitive::Boolean);
    }
    if let Some(eq) = trimmed.find('=') {
        let decl = trimmed[..eq].trim();
        let mut words = decl.split_whitespace();
        if let (Some(ty), Some(_ident)) = (words.next(), words.next()) {
            if let Some(p) = Primitive::from_keyword(ty) {
                return TypeRef::primitive(p);
            }
            if !ty.is_empty() && ty.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
                let candidates = index.candidates_for_simple_name(ty);
                if let Some(fqn) = candidates.iter().next() {
                    return TypeRef::reference(fqn.as_str(), Vec::new());
                }
                return TypeRef::reference(ty.to_string(), Vec::new());
            }
        }
    }
    TypeRef::top()
}

fn is_inside_if_condition(trimmed: &str) -> bool {
    trimmed.starts_with("if (") || trimmed.starts_with("if(") || trimmed.starts_with("} else if")
}

/// Top-level vs nested decision for a missing class `Y` at owner `O` (spec
/// §4.6).
fn resolve_missing_class(simple_name: &str, owner: &str, source: &str, index: &ContextIndex, _plan_so_far: &StubPlan) -> Option<String> {
    for line in source.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("import ") {
            let rest = rest.trim_start_matches("static ").trim_end_matches(';').trim();
            if let Some((prefix, last)) = rest.rsplit_once('.') {
                if last == simple_name {
                    return Some(rest.to_string());
                }
                if last == "*" {
                    let candidate = format!("{prefix}.{simple_name}");
                    if index.has_type(&candidate) {
                        return Some(candidate);
                    }
                }
            }
        }
    }

    let candidates = index.candidates_for_simple_name(simple_name);
    if candidates.len() == 1 {
        return candidates.into_iter().next();
    }

    // Neither an import nor a unique index hit settled it. A recognized
    // builder-ish naming pattern or an explicit `O.Y` usage in the source
    // confirms nesting; absent either, fall back to nested anyway — the
    // conservative default (spec §4.6 "else conservatively treat as nested").
    Some(format!("{owner}${simple_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_javac_header_with_symbol_and_location() {
        let output = "src/a/B.java:10: error: cannot find symbol\n        frobnicate(s);\n        ^\n  symbol:   method frobnicate(java.lang.String)\n  location: class a.B\n1 error\n";
        let diags = parse_javac_diagnostics(output);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 10);
        assert_eq!(diags[0].symbol.as_deref(), Some("method frobnicate(java.lang.String)"));
        assert_eq!(diags[0].location.as_deref(), Some("class a.B"));
    }

    #[test]
    fn parses_maven_style_header() {
        let output = "[ERROR] /repo/src/a/B.java:[10,9] cannot find symbol\n";
        let diags = parse_javac_diagnostics(output);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 10);
        assert_eq!(diags[0].kind, DiagnosticKind::Error);
    }

    #[test]
    fn extracts_method_stub_on_enclosing_owner() {
        let mut sources = BTreeMap::new();
        let path = PathBuf::from("src/a/B.java");
        sources.insert(
            path.clone(),
            "package a;\nclass B {\n    void f() {\n        frobnicate(\"x\");\n    }\n}\n".to_string(),
        );
        let diag = Diagnostic {
            kind: DiagnosticKind::Error,
            path: path.clone(),
            line: 4,
            column: 9,
            message: "cannot find symbol".to_string(),
            symbol: Some("method frobnicate(java.lang.String)".to_string()),
            location: Some("class a.B".to_string()),
        };
        let index = javastub_index::build_from_sources(&[]);
        let outcome = extract(&[diag], &sources, &index);
        assert_eq!(outcome.plan.methods().count(), 1);
        let m = outcome.plan.methods().next().unwrap();
        assert_eq!(m.owner_fqn.as_str(), "a.B");
        assert_eq!(m.name.as_str(), "frobnicate");
        assert_eq!(m.params.len(), 1);
    }

    #[test]
    fn dedups_repeated_method_diagnostic() {
        let mut sources = BTreeMap::new();
        let path = PathBuf::from("src/a/B.java");
        sources.insert(path.clone(), "package a;\nclass B {\n    void f() {}\n}\n".to_string());
        let make = || Diagnostic {
            kind: DiagnosticKind::Error,
            path: path.clone(),
            line: 3,
            column: 1,
            message: "cannot find symbol".to_string(),
            symbol: Some("method frobnicate()".to_string()),
            location: Some("class a.B".to_string()),
        };
        let index = javastub_index::build_from_sources(&[]);
        let outcome = extract(&[make(), make()], &sources, &index);
        assert_eq!(outcome.plan.methods().count(), 1);
    }
}
