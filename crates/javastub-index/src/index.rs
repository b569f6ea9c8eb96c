//! The `ContextIndex` (spec §3): a read-only, build-once structure used for
//! disambiguation and nested-vs-top-level decisions. Nothing here mutates
//! after [`ContextIndex::build`] returns.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use javastub_core::TypeKind;
use javastub_syntax::{DeclKind, Member, TypeDecl};

use crate::scanner::{scan_roots, ScannedFile};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedMethod {
    pub name: String,
    pub arity: u32,
    /// Simple-name lexemes of each parameter type, as written — used for the
    /// precise `name:arity:paramSimpleNames` key.
    pub param_simple_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IndexedType {
    pub fqn: String,
    pub kind: TypeKind,
    pub outer_fqn: Option<String>,
    /// As written in the source (simple identifiers resolved best-effort
    /// against the declaring unit's package; qualified names kept as-is).
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<IndexedMethod>,
    pub fields: Vec<String>,
}

fn decl_kind_to_type_kind(kind: DeclKind) -> TypeKind {
    match kind {
        DeclKind::Class => TypeKind::Class,
        DeclKind::Interface => TypeKind::Interface,
        DeclKind::AnnotationType => TypeKind::Annotation,
        DeclKind::Enum => TypeKind::Enum,
        DeclKind::Record => TypeKind::Record,
    }
}

/// Resolves a lexeme written in extends/implements position against the
/// declaring unit's package, best-effort: simple identifiers are qualified
/// with the package; already-dotted names are left untouched.
fn resolve_lexeme(lexeme: &str, package: Option<&str>) -> String {
    if lexeme.contains('.') {
        return lexeme.to_string();
    }
    match package {
        Some(pkg) if !pkg.is_empty() => format!("{pkg}.{lexeme}"),
        _ => lexeme.to_string(),
    }
}

pub struct ContextIndex {
    types: BTreeMap<String, IndexedType>,
    simple_name_index: BTreeMap<String, BTreeSet<String>>,
    source_roots: Vec<PathBuf>,
}

impl ContextIndex {
    pub fn build(source_roots: &[PathBuf]) -> Result<Self> {
        let files = scan_roots(source_roots)?;
        Ok(Self::from_scanned(files, source_roots.to_vec()))
    }

    fn from_scanned(files: Vec<ScannedFile>, source_roots: Vec<PathBuf>) -> Self {
        let mut types = BTreeMap::new();
        let mut simple_name_index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for file in &files {
            let package = file.unit.package.as_deref();
            for type_decl in &file.unit.types {
                index_type_decl(type_decl, package, None, &mut types, &mut simple_name_index);
            }
        }

        Self {
            types,
            simple_name_index,
            source_roots,
        }
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn get(&self, fqn: &str) -> Option<&IndexedType> {
        self.types.get(fqn)
    }

    pub fn has_type(&self, fqn: &str) -> bool {
        self.types.contains_key(fqn)
    }

    pub fn kind_of(&self, fqn: &str) -> Option<TypeKind> {
        self.types.get(fqn).map(|t| t.kind)
    }

    /// `simpleName -> candidate FQNs`. The simple name of a nested type is
    /// its innermost `$`-free segment.
    pub fn candidates_for_simple_name(&self, simple_name: &str) -> BTreeSet<String> {
        self.simple_name_index.get(simple_name).cloned().unwrap_or_default()
    }

    /// Superclass, then breadth-first interface closure; cycle-safe,
    /// depth-capped at 20.
    pub fn super_type_chain(&self, fqn: &str) -> Vec<String> {
        const DEPTH_CAP: usize = 20;
        let mut chain = Vec::new();
        let mut visited: BTreeSet<String> = BTreeSet::new();
        visited.insert(fqn.to_string());

        let mut cursor = self.types.get(fqn).and_then(|t| t.superclass.clone());
        let mut depth = 0;
        while let Some(sup) = cursor {
            if depth >= DEPTH_CAP || !visited.insert(sup.clone()) {
                break;
            }
            chain.push(sup.clone());
            depth += 1;
            cursor = self.types.get(&sup).and_then(|t| t.superclass.clone());
        }

        let mut queue: std::collections::VecDeque<(String, usize)> = self
            .types
            .get(fqn)
            .map(|t| t.interfaces.iter().map(|i| (i.clone(), 1)).collect())
            .unwrap_or_default();

        while let Some((iface, depth)) = queue.pop_front() {
            if depth > DEPTH_CAP || !visited.insert(iface.clone()) {
                continue;
            }
            chain.push(iface.clone());
            if let Some(t) = self.types.get(&iface) {
                for parent in &t.interfaces {
                    queue.push_back((parent.clone(), depth + 1));
                }
            }
        }

        chain
    }

    pub fn methods_for(&self, fqn: &str) -> &[IndexedMethod] {
        self.types.get(fqn).map(|t| t.methods.as_slice()).unwrap_or(&[])
    }

    pub fn fields_for(&self, fqn: &str) -> &[String] {
        self.types.get(fqn).map(|t| t.fields.as_slice()).unwrap_or(&[])
    }

    pub fn has_method_arity(&self, fqn: &str, name: &str, arity: u32) -> bool {
        self.methods_for(fqn).iter().any(|m| m.name == name && m.arity == arity)
    }

    /// The collector's filter #4: rejects a claimed package prefix that
    /// doesn't exist as a directory under any indexed source root.
    pub fn package_dir_exists(&self, dotted_package: &str) -> bool {
        if dotted_package.is_empty() {
            return true;
        }
        let rel: PathBuf = dotted_package.split('.').collect();
        self.source_roots.iter().any(|root| root.join(&rel).is_dir())
    }

    pub fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    /// Folds externally discovered types (e.g. from classpath jars, see
    /// [`crate::jarindex`]) into the index. Entries that collide with a
    /// source-derived FQN are dropped — the repository's own declarations
    /// take precedence over classpath metadata.
    pub fn merge_external_types(&mut self, entries: Vec<IndexedType>) {
        for t in entries {
            let simple = javastub_core::simple_name_of(&t.fqn).to_string();
            self.simple_name_index.entry(simple).or_default().insert(t.fqn.clone());
            self.types.entry(t.fqn.clone()).or_insert(t);
        }
    }
}

fn index_type_decl(
    decl: &TypeDecl,
    package: Option<&str>,
    outer_fqn: Option<&str>,
    types: &mut BTreeMap<String, IndexedType>,
    simple_name_index: &mut BTreeMap<String, BTreeSet<String>>,
) {
    let fqn = match outer_fqn {
        Some(outer) => format!("{outer}${}", decl.name),
        None => match package {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}.{}", decl.name),
            _ => decl.name.clone(),
        },
    };

    let superclass = decl.extends.first().map(|t| resolve_lexeme(&t.name, package));
    let interfaces = if decl.kind == DeclKind::Interface {
        // `interface Foo extends A, B` — all entries are super-interfaces.
        decl.extends
            .iter()
            .map(|t| resolve_lexeme(&t.name, package))
            .collect()
    } else {
        decl.implements
            .iter()
            .map(|t| resolve_lexeme(&t.name, package))
            .collect()
    };

    let mut methods = Vec::new();
    let mut fields = Vec::new();

    for member in &decl.members {
        match member {
            Member::Method(m) => methods.push(IndexedMethod {
                name: m.name.clone(),
                arity: m.params.len() as u32,
                param_simple_names: m.params.iter().map(|p| simple_of(&p.ty.name)).collect(),
            }),
            Member::Field(f) => fields.push(f.name.clone()),
            Member::NestedType(nested) => {
                index_type_decl(nested, package, Some(&fqn), types, simple_name_index);
            }
            Member::Constructor(_) | Member::Initializer => {}
        }
    }

    simple_name_index
        .entry(decl.name.clone())
        .or_default()
        .insert(fqn.clone());

    types.insert(
        fqn.clone(),
        IndexedType {
            fqn,
            kind: decl_kind_to_type_kind(decl.kind),
            outer_fqn: outer_fqn.map(|s| s.to_string()),
            superclass: if decl.kind == DeclKind::Interface {
                None
            } else {
                superclass
            },
            interfaces,
            methods,
            fields,
        },
    );
}

fn simple_of(lexeme: &str) -> String {
    lexeme.rsplit('.').next().unwrap_or(lexeme).to_string()
}

/// Test convenience: builds an index from in-memory source text rather than
/// a filesystem walk. Exposed (not behind `cfg(test)`) so downstream crates'
/// test suites can construct fixtures without touching disk.
pub fn build_from_sources(sources: &[(&str, &str)]) -> ContextIndex {
    let files = sources
        .iter()
        .map(|(path, src)| ScannedFile {
            relative_path: PathBuf::from(path),
            absolute_path: PathBuf::from(path),
            unit: javastub_syntax::parse(src),
        })
        .collect();
    ContextIndex::from_scanned(files, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_top_level_and_nested_types() {
        let idx = build_from_sources(&[(
            "com/acme/Outer.java",
            r#"
            package com.acme;
            class Outer {
                static class Inner {}
            }
            "#,
        )]);
        assert!(idx.has_type("com.acme.Outer"));
        assert!(idx.has_type("com.acme.Outer$Inner"));
    }

    #[test]
    fn resolves_simple_superclass_against_package() {
        let idx = build_from_sources(&[(
            "com/acme/Base.java",
            "package com.acme; class Base {}",
        ), (
            "com/acme/Derived.java",
            "package com.acme; class Derived extends Base {}",
        )]);
        let chain = idx.super_type_chain("com.acme.Derived");
        assert_eq!(chain, vec!["com.acme.Base".to_string()]);
    }

    #[test]
    fn interface_closure_is_breadth_first_and_cycle_safe() {
        let idx = build_from_sources(&[
            ("A.java", "interface A extends B {}"),
            ("B.java", "interface B extends A {}"),
            ("C.java", "class C implements A {}"),
        ]);
        let chain = idx.super_type_chain("C");
        assert!(chain.contains(&"A".to_string()));
        assert!(chain.contains(&"B".to_string()));
        assert!(chain.len() <= 20);
    }

    #[test]
    fn simple_name_candidates_collect_multiple_fqns() {
        let idx = build_from_sources(&[
            ("a/List.java", "package a; class List {}"),
            ("b/List.java", "package b; class List {}"),
        ]);
        let candidates = idx.candidates_for_simple_name("List");
        assert_eq!(candidates.len(), 2);
        assert!(candidates.contains("a.List"));
        assert!(candidates.contains("b.List"));
    }
}
