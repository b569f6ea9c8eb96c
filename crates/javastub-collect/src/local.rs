//! Declarations visible directly in the slice being collected, without
//! consulting the `ContextIndex`. These never need stubbing even if the
//! index (built from the rest of the repository) doesn't know about them —
//! a type the slice itself declares is, by definition, resolvable.

use std::collections::BTreeMap;

use javastub_core::TypeKind;
use javastub_syntax::{CompilationUnit, DeclKind, Member, TypeDecl};

fn decl_kind_to_type_kind(kind: DeclKind) -> TypeKind {
    match kind {
        DeclKind::Class => TypeKind::Class,
        DeclKind::Interface => TypeKind::Interface,
        DeclKind::AnnotationType => TypeKind::Annotation,
        DeclKind::Enum => TypeKind::Enum,
        DeclKind::Record => TypeKind::Record,
    }
}

/// `FQN -> kind` for every type (including nested) declared directly in the
/// compilation unit being collected.
pub fn declared_types(unit: &CompilationUnit) -> BTreeMap<String, TypeKind> {
    let mut out = BTreeMap::new();
    let package = unit.package.as_deref();
    for type_decl in &unit.types {
        index_decl(type_decl, package, None, &mut out);
    }
    out
}

fn index_decl(
    decl: &TypeDecl,
    package: Option<&str>,
    outer_fqn: Option<&str>,
    out: &mut BTreeMap<String, TypeKind>,
) {
    let fqn = match outer_fqn {
        Some(outer) => format!("{outer}${}", decl.name),
        None => match package {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}.{}", decl.name),
            _ => decl.name.clone(),
        },
    };
    out.insert(fqn.clone(), decl_kind_to_type_kind(decl.kind));
    for member in &decl.members {
        if let Member::NestedType(nested) = member {
            index_decl(nested, package, Some(&fqn), out);
        }
    }
}

/// The simple name -> FQN map derived from [`declared_types`], used for
/// same-slice disambiguation before falling back to the `ContextIndex`.
pub fn simple_name_lookup(declared: &BTreeMap<String, TypeKind>) -> BTreeMap<String, String> {
    declared
        .keys()
        .map(|fqn| (javastub_core::simple_name_of(fqn).to_string(), fqn.clone()))
        .collect()
}

#[derive(Default, Debug, Clone)]
pub struct DeclaredMembers {
    pub methods: std::collections::BTreeSet<(String, u32)>,
    pub fields: std::collections::BTreeSet<String>,
    pub ctors: std::collections::BTreeSet<u32>,
}

/// `FQN -> declared (method name, arity) pairs and field names`, for every
/// type in the unit. Lets the collector skip stubbing a member the slice
/// already declares on its own enclosing type.
pub fn declared_members(unit: &CompilationUnit) -> BTreeMap<String, DeclaredMembers> {
    let mut out = BTreeMap::new();
    let package = unit.package.as_deref();
    for type_decl in &unit.types {
        index_members(type_decl, package, None, &mut out);
    }
    out
}

fn index_members(
    decl: &TypeDecl,
    package: Option<&str>,
    outer_fqn: Option<&str>,
    out: &mut BTreeMap<String, DeclaredMembers>,
) {
    let fqn = match outer_fqn {
        Some(outer) => format!("{outer}${}", decl.name),
        None => match package {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}.{}", decl.name),
            _ => decl.name.clone(),
        },
    };
    let entry = out.entry(fqn.clone()).or_default();
    for member in &decl.members {
        match member {
            Member::Method(m) => {
                entry.methods.insert((m.name.clone(), m.params.len() as u32));
            }
            Member::Field(f) => {
                entry.fields.insert(f.name.clone());
            }
            Member::NestedType(nested) => {
                index_members(nested, package, Some(&fqn), out);
            }
            Member::Constructor(c) => {
                entry.ctors.insert(c.params.len() as u32);
            }
            Member::Initializer => {}
        }
    }
}
