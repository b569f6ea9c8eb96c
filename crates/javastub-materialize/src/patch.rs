//! Splices generated member source text into an existing slice-resident
//! Java file (spec §4.4 "Patch existing source file"), using the raw-text
//! body spans from [`crate::span`] instead of rewriting through the AST.

use std::collections::BTreeMap;

use crate::span::locate_type_bodies;

/// Inserts each `members_text` block immediately before the matching
/// type's closing brace. `members_by_type_path` is keyed by the same
/// `$`-nested path `locate_type_bodies` produces (`Outer` or
/// `Outer$Inner`). Types with no matching span (e.g. a typo'd owner, or a
/// type the scanner couldn't find) are silently skipped — the caller is
/// expected to have validated `is_patchable_owner` before reaching here.
pub fn patch_source(original: &str, members_by_type_path: &BTreeMap<String, String>) -> String {
    let spans = locate_type_bodies(original);

    // Collect matching insertion points and apply them back-to-front so
    // earlier offsets stay valid as later ones shift the string.
    let mut insertions: Vec<(usize, &str)> = members_by_type_path
        .iter()
        .filter_map(|(path, text)| spans.get(path).map(|span| (span.insertion_point(), text.as_str())))
        .collect();
    insertions.sort_by(|a, b| b.0.cmp(&a.0));

    let mut patched = original.to_string();
    for (offset, text) in insertions {
        patched.insert_str(offset, text);
    }
    patched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splices_member_before_closing_brace() {
        let src = "class Foo {\n    void existing() {}\n}\n";
        let mut inserts = BTreeMap::new();
        inserts.insert("Foo".to_string(), "    void added() {}\n".to_string());
        let patched = patch_source(src, &inserts);
        assert!(patched.contains("void existing()"));
        assert!(patched.contains("void added()"));
        assert!(patched.find("added").unwrap() > patched.find("existing").unwrap());
    }

    #[test]
    fn targets_correct_nested_type() {
        let src = "class Outer {\n    class Inner {\n    }\n}\n";
        let mut inserts = BTreeMap::new();
        inserts.insert("Outer$Inner".to_string(), "        int x;\n".to_string());
        let patched = patch_source(src, &inserts);
        let inner_open = patched.find("class Inner").unwrap();
        let inserted_at = patched.find("int x;").unwrap();
        let outer_close = patched.rfind('}').unwrap();
        assert!(inserted_at > inner_open);
        assert!(inserted_at < outer_close);
    }

    #[test]
    fn unmatched_owner_path_is_skipped() {
        let src = "class Foo {\n}\n";
        let mut inserts = BTreeMap::new();
        inserts.insert("DoesNotExist".to_string(), "    void x() {}\n".to_string());
        let patched = patch_source(src, &inserts);
        assert_eq!(patched, src);
    }
}
