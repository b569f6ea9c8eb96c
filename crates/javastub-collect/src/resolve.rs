//! Type-name resolution and the disambiguation policy (spec §4.2
//! "Disambiguation" and the four type-stub filters).

use std::collections::BTreeMap;

use javastub_core::{AmbiguityPolicy, TypeKind};
use javastub_index::ContextIndex;
use javastub_syntax::ImportDecl;

use crate::error::{Error, Result};

/// The outcome of resolving a (possibly qualified) type name.
pub struct TypeResolution {
    pub fqn: String,
    pub exists: bool,
    pub outer_fqn: Option<String>,
    /// Whether `fqn`'s package prefix should be checked against the
    /// indexed source roots before a stub is emitted (spec §4.2, filter 4).
    /// Only set for names guessed purely from the default-package
    /// heuristic — import-derived and already-qualified names are taken at
    /// the user's word.
    pub check_package_dir: bool,
}

pub struct Resolver<'a> {
    package: Option<&'a str>,
    imports: &'a [ImportDecl],
    index: &'a ContextIndex,
    local_types: &'a BTreeMap<String, TypeKind>,
    local_simple: &'a BTreeMap<String, String>,
    policy: AmbiguityPolicy,
    pub warnings: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        package: Option<&'a str>,
        imports: &'a [ImportDecl],
        index: &'a ContextIndex,
        local_types: &'a BTreeMap<String, TypeKind>,
        local_simple: &'a BTreeMap<String, String>,
        policy: AmbiguityPolicy,
    ) -> Self {
        Self {
            package,
            imports,
            index,
            local_types,
            local_simple,
            policy,
            warnings: Vec::new(),
        }
    }

    fn type_is_known(&self, fqn: &str) -> bool {
        self.local_types.contains_key(fqn) || self.index.has_type(fqn)
    }

    /// Resolves a simple (unqualified) identifier used in a type position.
    pub fn resolve_simple(&mut self, simple: &str) -> Result<TypeResolution> {
        if let Some(fqn) = self.local_simple.get(simple) {
            return Ok(TypeResolution {
                fqn: fqn.clone(),
                exists: true,
                outer_fqn: None,
                check_package_dir: false,
            });
        }

        let candidates = self.index.candidates_for_simple_name(simple);

        if candidates.len() == 1 {
            let fqn = candidates.into_iter().next().unwrap();
            return Ok(TypeResolution {
                fqn,
                exists: true,
                outer_fqn: None,
                check_package_dir: false,
            });
        }

        if candidates.len() > 1 {
            if let Some(pkg) = self.package {
                let same_pkg = format!("{pkg}.{simple}");
                if candidates.contains(&same_pkg) {
                    return Ok(TypeResolution {
                        fqn: same_pkg,
                        exists: true,
                        outer_fqn: None,
                        check_package_dir: false,
                    });
                }
            }
            if let Some(imp) = self
                .imports
                .iter()
                .find(|i| !i.is_wildcard && !i.is_static && import_simple_name(i) == simple)
            {
                if candidates.contains(&imp.path) {
                    return Ok(TypeResolution {
                        fqn: imp.path.clone(),
                        exists: true,
                        outer_fqn: None,
                        check_package_dir: false,
                    });
                }
            }
            for imp in self.imports.iter().filter(|i| i.is_wildcard && !i.is_static) {
                let candidate = format!("{}.{simple}", imp.path);
                if candidates.contains(&candidate) {
                    return Ok(TypeResolution {
                        fqn: candidate,
                        exists: true,
                        outer_fqn: None,
                        check_package_dir: false,
                    });
                }
            }

            match self.policy {
                AmbiguityPolicy::Strict => {
                    let mut sorted: Vec<String> = candidates.into_iter().collect();
                    sorted.sort();
                    return Err(Error::Ambiguous {
                        simple_name: simple.to_string(),
                        candidates: sorted,
                    });
                }
                AmbiguityPolicy::Lenient => {
                    let smallest = candidates.iter().min().cloned().unwrap();
                    self.warnings.push(format!(
                        "ambiguous reference to `{simple}`: picked `{smallest}` (lenient policy)"
                    ));
                    return Ok(TypeResolution {
                        fqn: smallest,
                        exists: true,
                        outer_fqn: None,
                        check_package_dir: false,
                    });
                }
            }
        }

        // No candidates at all: this name needs a stub. Pick the FQN the
        // same way javac would have resolved it, had it existed.
        if let Some(imp) = self
            .imports
            .iter()
            .find(|i| !i.is_wildcard && import_simple_name(i) == simple)
        {
            return Ok(TypeResolution {
                fqn: imp.path.clone(),
                exists: false,
                outer_fqn: None,
                check_package_dir: false,
            });
        }
        if let Some(imp) = self.imports.iter().find(|i| i.is_wildcard) {
            return Ok(TypeResolution {
                fqn: format!("{}.{simple}", imp.path),
                exists: false,
                outer_fqn: None,
                check_package_dir: false,
            });
        }

        let fqn = match self.package {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}.{simple}"),
            _ => simple.to_string(),
        };
        Ok(TypeResolution {
            fqn,
            exists: false,
            outer_fqn: None,
            check_package_dir: true,
        })
    }

    /// Resolves a dotted name `A.B.C` (spec §4.2 point 2): tries the
    /// longest known-type prefix first, treating anything past it as a
    /// `$`-nested suffix; falls back to treating the whole dotted string as
    /// an already-qualified name.
    pub fn resolve_qualified(&mut self, segments: &[String]) -> Result<TypeResolution> {
        for split in (1..segments.len()).rev() {
            let prefix = segments[..split].join(".");
            let suffix_head = &segments[split];
            let starts_upper = suffix_head.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
            if !starts_upper {
                continue;
            }
            let prefix_fqn = if self.type_is_known(&prefix) {
                Some(prefix.clone())
            } else if segments.len() == split + 1 {
                // Single-segment suffix against a simple (unqualified)
                // prefix name: try resolving the prefix as a simple name too.
                match self.local_simple.get(prefix.as_str()) {
                    Some(fqn) => Some(fqn.clone()),
                    None => None,
                }
            } else {
                None
            };

            if let Some(prefix_fqn) = prefix_fqn {
                let nested = segments[split..].join("$");
                let fqn = format!("{prefix_fqn}${nested}");
                let exists = self.type_is_known(&fqn);
                return Ok(TypeResolution {
                    exists,
                    outer_fqn: Some(prefix_fqn),
                    fqn,
                    check_package_dir: false,
                });
            }
        }

        let fqn = segments.join(".");
        let exists = self.type_is_known(&fqn);
        Ok(TypeResolution {
            fqn,
            exists,
            outer_fqn: None,
            check_package_dir: false,
        })
    }

    /// The four filters a candidate type stub name must pass before a
    /// `TypeStub` is actually emitted (spec §4.2).
    pub fn passes_stub_filters(&self, resolution: &TypeResolution) -> bool {
        let fqn = &resolution.fqn;
        if fqn.contains('[') || fqn.contains(']') {
            return false;
        }
        if fqn.ends_with('-') || fqn.ends_with('_') || fqn.ends_with('.') {
            return false;
        }
        // An empty source-root set means there's nothing to check this
        // against (e.g. a single-file fixture); don't reject for lack of
        // evidence.
        if resolution.check_package_dir && !self.index.source_roots().is_empty() {
            if let Some((pkg, _simple)) = fqn.rsplit_once('.') {
                if !self.index.package_dir_exists(pkg) {
                    return false;
                }
            }
        }
        true
    }
}

fn import_simple_name(imp: &ImportDecl) -> &str {
    imp.path.rsplit('.').next().unwrap_or(&imp.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use javastub_index::build_from_sources;
    use std::collections::BTreeMap;

    fn resolver<'a>(
        index: &'a ContextIndex,
        imports: &'a [ImportDecl],
        local_types: &'a BTreeMap<String, TypeKind>,
        local_simple: &'a BTreeMap<String, String>,
        policy: AmbiguityPolicy,
    ) -> Resolver<'a> {
        Resolver::new(Some("com.acme"), imports, index, local_types, local_simple, policy)
    }

    #[test]
    fn unambiguous_simple_name_resolves_via_index() {
        let index = build_from_sources(&[("a/Foo.java", "package a; class Foo {}")]);
        let imports = Vec::new();
        let local_types = BTreeMap::new();
        let local_simple = BTreeMap::new();
        let mut r = resolver(&index, &imports, &local_types, &local_simple, AmbiguityPolicy::Lenient);
        let res = r.resolve_simple("Foo").unwrap();
        assert_eq!(res.fqn, "a.Foo");
        assert!(res.exists);
    }

    #[test]
    fn strict_ambiguity_fails() {
        let index = build_from_sources(&[
            ("a/List.java", "package a; class List {}"),
            ("b/List.java", "package b; class List {}"),
        ]);
        let imports = Vec::new();
        let local_types = BTreeMap::new();
        let local_simple = BTreeMap::new();
        let mut r = resolver(&index, &imports, &local_types, &local_simple, AmbiguityPolicy::Strict);
        assert!(matches!(r.resolve_simple("List"), Err(Error::Ambiguous { .. })));
    }

    #[test]
    fn lenient_ambiguity_picks_lexicographically_smallest() {
        let index = build_from_sources(&[
            ("a/List.java", "package a; class List {}"),
            ("b/List.java", "package b; class List {}"),
        ]);
        let imports = Vec::new();
        let local_types = BTreeMap::new();
        let local_simple = BTreeMap::new();
        let mut r = resolver(&index, &imports, &local_types, &local_simple, AmbiguityPolicy::Lenient);
        let res = r.resolve_simple("List").unwrap();
        assert_eq!(res.fqn, "a.List");
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn missing_type_needs_stub_with_default_package() {
        let index = build_from_sources(&[]);
        let imports = Vec::new();
        let local_types = BTreeMap::new();
        let local_simple = BTreeMap::new();
        let mut r = resolver(&index, &imports, &local_types, &local_simple, AmbiguityPolicy::Lenient);
        let res = r.resolve_simple("Bar").unwrap();
        assert_eq!(res.fqn, "com.acme.Bar");
        assert!(!res.exists);
        assert!(res.check_package_dir);
    }

    #[test]
    fn qualified_nested_type_disambiguates_against_known_outer() {
        let index = build_from_sources(&[("com/acme/Outer.java", "package com.acme; class Outer {}")]);
        let imports = Vec::new();
        let local_types = BTreeMap::new();
        let local_simple = BTreeMap::new();
        let mut r = resolver(&index, &imports, &local_types, &local_simple, AmbiguityPolicy::Lenient);
        let res = r.resolve_qualified(&["Outer".to_string(), "Inner".to_string()]).unwrap();
        assert_eq!(res.fqn, "com.acme.Outer$Inner");
        assert!(!res.exists);
    }
}
