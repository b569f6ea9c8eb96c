//! Locates the body span of every type declaration in a raw Java source
//! file, without relying on [`javastub_syntax`]'s token stream (which
//! carries line numbers but no byte offsets). Patching a slice-resident
//! file means splicing new members directly into its text, so this module
//! does its own minimal scan: skip comments and string/char literals, track
//! brace depth, and record where each `class`/`interface`/`enum`/`record`
//! (and `@interface`) body starts and ends.

use std::collections::BTreeMap;

/// Byte offsets of a type body's `{` and its matching `}`, both inclusive
/// of the brace characters themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeBodySpan {
    pub open: usize,
    pub close: usize,
}

impl TypeBodySpan {
    /// Byte offset immediately before the closing brace — where new member
    /// source text should be inserted.
    pub fn insertion_point(&self) -> usize {
        self.close
    }
}

const DECL_KEYWORDS: [&str; 4] = ["class", "interface", "enum", "record"];

/// Scans `source` and returns the body span of every type declaration,
/// keyed by its `$`-nested path (`Outer` or `Outer$Inner`).
pub fn locate_type_bodies(source: &str) -> BTreeMap<String, TypeBodySpan> {
    let bytes = source.as_bytes();
    let mut spans = BTreeMap::new();
    let mut type_stack: Vec<String> = Vec::new();
    // Each open brace pushes the type path it belongs to (and the byte
    // offset of the `{`), or `None` for a brace that isn't a type body
    // (method body, initializer, array literal, lambda, ...).
    let mut brace_stack: Vec<Option<(String, usize)>> = Vec::new();
    let mut pending_decl: Option<String> = None;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];

        if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if b == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                i += 1;
            }
            i += 2;
            continue;
        }
        if b == b'"' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i += 1;
            continue;
        }
        if b == b'\'' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'\'' {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i += 1;
            continue;
        }

        if is_ident_start(b) {
            let start = i;
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            let word = &source[start..i];
            if DECL_KEYWORDS.contains(&word) {
                // The declared simple name is the next identifier token,
                // skipping whitespace and any type-parameter/annotation
                // noise that might appear between the keyword and the name.
                if let Some(name) = next_identifier(source, i) {
                    pending_decl = Some(name);
                }
            }
            continue;
        }

        if b == b'{' {
            let entry = match pending_decl.take() {
                Some(simple) => {
                    let full = match type_stack.last() {
                        Some(parent) => format!("{parent}${simple}"),
                        None => simple,
                    };
                    type_stack.push(full.clone());
                    Some((full, i))
                }
                None => None,
            };
            brace_stack.push(entry);
            i += 1;
            continue;
        }

        if b == b'}' {
            if let Some((path, open)) = brace_stack.pop().flatten() {
                spans.insert(path, TypeBodySpan { open, close: i });
                type_stack.pop();
            }
            i += 1;
            continue;
        }

        i += 1;
    }

    spans
}

/// Byte offset of the start of the given 1-based line, or the source's
/// length if `line` is past the end.
pub fn line_start_offset(source: &str, line: u32) -> usize {
    if line <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth((line - 2) as usize)
        .map(|(i, _)| i + 1)
        .unwrap_or(source.len())
}

/// The innermost type whose body span contains `offset`, if any — used to
/// resolve a diagnostic's enclosing type from its line number.
pub fn enclosing_type_at_offset(spans: &BTreeMap<String, TypeBodySpan>, offset: usize) -> Option<String> {
    spans
        .iter()
        .filter(|(_, span)| span.open <= offset && offset <= span.close)
        .min_by_key(|(_, span)| span.close - span.open)
        .map(|(path, _)| path.clone())
}

fn next_identifier(source: &str, mut i: usize) -> Option<String> {
    let bytes = source.as_bytes();
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        if is_ident_start(bytes[i]) {
            let start = i;
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            let word = &source[start..i];
            // A keyword that can legally appear before the name only in
            // positions this scan doesn't expect means this wasn't a
            // declaration header after all; bail out rather than guess.
            if matches!(word, "extends" | "implements" | "permits") {
                return None;
            }
            return Some(word.to_string());
        }
        if bytes[i] == b'{' || bytes[i] == b'(' || bytes[i] == b';' {
            return None;
        }
        i += 1;
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_top_level_class_body() {
        let src = "package a;\nclass Foo {\n    void m() {}\n}\n";
        let spans = locate_type_bodies(src);
        let span = spans.get("Foo").unwrap();
        assert_eq!(&src[span.open..span.open + 1], "{");
        assert_eq!(&src[span.close..span.close + 1], "}");
        assert!(span.open < span.close);
    }

    #[test]
    fn finds_nested_class_body() {
        let src = "class Outer {\n    class Inner {\n        int x;\n    }\n}\n";
        let spans = locate_type_bodies(src);
        assert!(spans.contains_key("Outer"));
        assert!(spans.contains_key("Outer$Inner"));
        let outer = spans["Outer"];
        let inner = spans["Outer$Inner"];
        assert!(outer.open < inner.open && inner.close < outer.close);
    }

    #[test]
    fn finds_enclosing_type_by_line() {
        let src = "class Outer {\n    class Inner {\n        int x;\n    }\n}\n";
        let spans = locate_type_bodies(src);
        let offset = line_start_offset(src, 3);
        assert_eq!(enclosing_type_at_offset(&spans, offset).as_deref(), Some("Outer$Inner"));
    }

    #[test]
    fn ignores_braces_in_comments_and_strings() {
        let src = "class Foo {\n    // a { fake brace\n    String s = \"{ not a brace }\";\n    /* also { not */\n}\n";
        let spans = locate_type_bodies(src);
        let span = spans["Foo"];
        assert_eq!(&src[span.close..span.close + 1], "}");
    }

    #[test]
    fn handles_annotation_type_declaration() {
        let src = "@interface Marker {\n    String value();\n}\n";
        let spans = locate_type_bodies(src);
        assert!(spans.contains_key("Marker"));
    }

    #[test]
    fn method_body_braces_do_not_confuse_class_close() {
        let src = "class Foo {\n    void m() {\n        if (true) {\n            return;\n        }\n    }\n}\n";
        let spans = locate_type_bodies(src);
        let span = spans["Foo"];
        assert_eq!(&src[span.close..span.close + 1], "}");
        assert_eq!(span.close, src.rfind('}').unwrap());
    }
}
