//! Stub materializer (component C4): turns a [`javastub_core::StubPlan`]
//! into Java source text on disk, either as brand-new compilation units or
//! spliced into existing slice-resident files, and cleans up each touched
//! file's import list.

mod error;
mod import_cleanup;
mod patch;
mod render;
mod span;

pub use error::{Error, Result};
pub use span::{enclosing_type_at_offset, line_start_offset, locate_type_bodies, TypeBodySpan};

use std::collections::{BTreeMap, BTreeSet};
use std::panic::Location;
use std::path::{Path, PathBuf};

use javastub_core::{StubPlan, TypeStub};
use javastub_index::ContextIndex;
use javastub_syntax::CompilationUnit;

/// Files written or overwritten by a single materialization pass.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub generated_files: Vec<PathBuf>,
    pub patched_files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

struct SliceUnit {
    relative_path: PathBuf,
    source: String,
    unit: CompilationUnit,
}

/// Maps a type's canonical FQN to where it lives in the slice: which file,
/// and its `$`-nested path within that file.
struct SliceTypeLocation {
    relative_path: PathBuf,
    nested_path: String,
}

/// Materializes `plan` against the slice rooted at `slice_root`, writing
/// brand-new compilation units and patched copies of touched slice files
/// under `gen_root`. `gen_root` is cleared first (spec §5 resource
/// discipline): every repair iteration starts from a clean generated tree
/// so a retracted stub can't leak into the next compile.
pub fn materialize(plan: &StubPlan, slice_root: &Path, gen_root: &Path, index: &ContextIndex) -> Result<MaterializeReport> {
    clear_dir_best_effort(gen_root, "repair iteration start");
    std::fs::create_dir_all(gen_root).map_err(|source| Error::CreateDir {
        path: gen_root.to_path_buf(),
        source,
    })?;

    let slice_units = load_slice_units(slice_root)?;
    let slice_locations = index_slice_types(&slice_units);

    let mut report = MaterializeReport::default();

    // New top-level types: anything the plan knows about that doesn't nest
    // under another plan type and isn't itself a slice-resident type.
    for top in plan.types().filter(|t| t.outer_fqn.is_none()) {
        write_new_compilation_unit(plan, top, gen_root, &mut report)?;
    }

    // Nested types whose outer is a real slice type need to be spliced in
    // as a nested-type member rather than written as a new file (spec §6:
    // nested types are never separate files).
    let mut members_by_file: BTreeMap<PathBuf, BTreeMap<String, String>> = BTreeMap::new();

    for nested in plan.types().filter(|t| t.outer_fqn.is_some()) {
        let outer_fqn = nested.outer_fqn.as_ref().unwrap().as_str();
        if plan.has_type(outer_fqn) {
            continue; // rendered recursively by the owning synthetic type
        }
        if let Some(loc) = slice_locations.get(outer_fqn) {
            let text = render::render_nested_type(plan, nested, 1);
            members_by_file
                .entry(loc.relative_path.clone())
                .or_default()
                .entry(loc.nested_path.clone())
                .or_default()
                .push_str(&text);
        } else {
            report.warnings.push(format!(
                "nested stub {} has unresolved outer type {outer_fqn}; skipped",
                nested.fqn.as_str()
            ));
        }
    }

    // Methods/fields/ctors directly owned by a real slice type get spliced
    // into that type's body. Owners that are themselves plan types were
    // already covered by write_new_compilation_unit's recursive rendering.
    let mut unknown_owners: BTreeMap<String, Vec<&javastub_core::MethodStub>> = BTreeMap::new();

    for method in plan.methods() {
        let owner = method.owner_fqn.as_str();
        if plan.has_type(owner) {
            continue;
        }
        if owner.starts_with("unknown.") {
            unknown_owners.entry(owner.to_string()).or_default().push(method);
            continue;
        }
        splice_member(&slice_locations, owner, render_one_method(method), &mut members_by_file, &mut report);
    }
    for field in plan.fields() {
        let owner = field.owner_fqn.as_str();
        if plan.has_type(owner) {
            continue;
        }
        splice_member(&slice_locations, owner, render_one_field(field), &mut members_by_file, &mut report);
    }
    for ctor in plan.ctors() {
        let owner = ctor.owner_fqn.as_str();
        if plan.has_type(owner) {
            continue;
        }
        if let Some(owner_stub) = find_owner_for_ctor_rendering(&slice_units, owner) {
            splice_member(
                &slice_locations,
                owner,
                render_one_ctor(&owner_stub, ctor),
                &mut members_by_file,
                &mut report,
            );
        }
    }

    for (owner_fqn, methods) in &unknown_owners {
        let simple = owner_fqn.rsplit('.').next().unwrap_or(owner_fqn);
        let text = render::render_mirror_unit(simple, methods);
        write_generated_file(gen_root, Path::new("unknown").join(format!("{simple}.java")), &text, &mut report)?;
    }

    for slice in &slice_units {
        let needed = needed_fqns_for(slice, plan);
        let dead_static = dead_static_import_paths(slice, plan, index);
        let members = members_by_file.get(&slice.relative_path);

        if members.is_none() && needed.is_empty() && dead_static.is_empty() {
            continue;
        }

        let patched_body = match members {
            Some(m) => patch::patch_source(&slice.source, m),
            None => slice.source.clone(),
        };
        let rewritten = import_cleanup::rewrite_imports(
            &patched_body,
            &slice.unit.imports,
            &dead_static,
            &needed,
            slice.unit.package.as_deref(),
        );

        let out_path = gen_root.join(&slice.relative_path);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&out_path, rewritten).map_err(|source| Error::WriteGenerated {
            path: out_path.clone(),
            source,
        })?;
        report.patched_files.push(out_path);
    }

    Ok(report)
}

fn splice_member(
    slice_locations: &BTreeMap<String, SliceTypeLocation>,
    owner_fqn: &str,
    text: String,
    members_by_file: &mut BTreeMap<PathBuf, BTreeMap<String, String>>,
    report: &mut MaterializeReport,
) {
    match slice_locations.get(owner_fqn) {
        Some(loc) => {
            members_by_file
                .entry(loc.relative_path.clone())
                .or_default()
                .entry(loc.nested_path.clone())
                .or_default()
                .push_str(&text);
        }
        None => {
            report.warnings.push(format!("stub member targets unresolved owner {owner_fqn}; skipped"));
        }
    }
}

fn render_one_method(m: &javastub_core::MethodStub) -> String {
    let mut plan = StubPlan::new();
    let placeholder = TypeStub::new(m.owner_fqn.as_str(), javastub_core::TypeKind::Class);
    plan.add_type(placeholder.clone());
    plan.add_method(m.clone());
    let rendered = render::render_nested_type(&plan, &placeholder, 1);
    extract_body_members(&rendered)
}

fn render_one_field(f: &javastub_core::FieldStub) -> String {
    let mut plan = StubPlan::new();
    let placeholder = TypeStub::new(f.owner_fqn.as_str(), javastub_core::TypeKind::Class);
    plan.add_type(placeholder.clone());
    plan.add_field(f.clone());
    let rendered = render::render_nested_type(&plan, &placeholder, 1);
    extract_body_members(&rendered)
}

fn render_one_ctor(owner_stub: &TypeStub, c: &javastub_core::CtorStub) -> String {
    let mut plan = StubPlan::new();
    plan.add_type(owner_stub.clone());
    plan.add_ctor(c.clone());
    let rendered = render::render_nested_type(&plan, owner_stub, 1);
    extract_body_members(&rendered)
}

/// Strips the `class X {` ... `}` wrapper `render_nested_type` always
/// produces, leaving just the member lines, so they can be spliced into an
/// unrelated real type's body.
fn extract_body_members(rendered: &str) -> String {
    let open = rendered.find('{').map(|i| i + 1).unwrap_or(0);
    let close = rendered.rfind('}').unwrap_or(rendered.len());
    rendered[open..close].to_string()
}

fn find_owner_for_ctor_rendering(slice_units: &[SliceUnit], owner_fqn: &str) -> Option<TypeStub> {
    let simple = owner_fqn.rsplit(['.', '$']).next()?;
    for slice in slice_units {
        if type_decl_names(&slice.unit).iter().any(|n| n == simple) {
            return Some(TypeStub::new(owner_fqn, javastub_core::TypeKind::Class));
        }
    }
    None
}

fn type_decl_names(unit: &CompilationUnit) -> Vec<String> {
    fn walk(types: &[javastub_syntax::TypeDecl], out: &mut Vec<String>) {
        for t in types {
            out.push(t.name.clone());
            let nested: Vec<javastub_syntax::TypeDecl> = t
                .members
                .iter()
                .filter_map(|m| match m {
                    javastub_syntax::Member::NestedType(n) => Some(n.clone()),
                    _ => None,
                })
                .collect();
            walk(&nested, out);
        }
    }
    let mut out = Vec::new();
    walk(&unit.types, &mut out);
    out
}

fn write_new_compilation_unit(plan: &StubPlan, top: &TypeStub, gen_root: &Path, report: &mut MaterializeReport) -> Result<()> {
    let fqn = top.fqn.as_str();
    let (package, simple) = match fqn.rsplit_once('.') {
        Some((pkg, simple)) => (pkg, simple),
        None => ("", fqn),
    };
    let text = render::render_compilation_unit(plan, top, package);
    let rel = PathBuf::from(package.replace('.', "/")).join(format!("{simple}.java"));
    write_generated_file(gen_root, rel, &text, report)
}

fn write_generated_file(gen_root: &Path, relative: PathBuf, text: &str, report: &mut MaterializeReport) -> Result<()> {
    let out_path = gen_root.join(&relative);
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&out_path, text).map_err(|source| Error::WriteGenerated {
        path: out_path.clone(),
        source,
    })?;
    report.generated_files.push(out_path);
    Ok(())
}

fn load_slice_units(slice_root: &Path) -> Result<Vec<SliceUnit>> {
    let mut units = Vec::new();
    if !slice_root.exists() {
        return Ok(units);
    }
    for entry in walkdir::WalkDir::new(slice_root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("java") {
            continue;
        }
        let source = std::fs::read_to_string(entry.path()).map_err(|source| Error::ReadSlice {
            path: entry.path().to_path_buf(),
            source,
        })?;
        let unit = javastub_syntax::parse(&source);
        let relative_path = entry
            .path()
            .strip_prefix(slice_root)
            .unwrap_or(entry.path())
            .to_path_buf();
        units.push(SliceUnit {
            relative_path,
            source,
            unit,
        });
    }
    units
}

fn index_slice_types(units: &[SliceUnit]) -> BTreeMap<String, SliceTypeLocation> {
    fn walk(
        types: &[javastub_syntax::TypeDecl],
        package: &str,
        prefix_fqn: Option<&str>,
        prefix_path: Option<&str>,
        relative_path: &Path,
        out: &mut BTreeMap<String, SliceTypeLocation>,
    ) {
        for t in types {
            let fqn = match prefix_fqn {
                Some(p) => format!("{p}${}", t.name),
                None if package.is_empty() => t.name.clone(),
                None => format!("{package}.{}", t.name),
            };
            let nested_path = match prefix_path {
                Some(p) => format!("{p}${}", t.name),
                None => t.name.clone(),
            };
            out.insert(
                fqn.clone(),
                SliceTypeLocation {
                    relative_path: relative_path.to_path_buf(),
                    nested_path: nested_path.clone(),
                },
            );
            let nested: Vec<javastub_syntax::TypeDecl> = t
                .members
                .iter()
                .filter_map(|m| match m {
                    javastub_syntax::Member::NestedType(n) => Some(n.clone()),
                    _ => None,
                })
                .collect();
            walk(&nested, package, Some(&fqn), Some(&nested_path), relative_path, out);
        }
    }

    let mut out = BTreeMap::new();
    for unit in units {
        let package = unit.unit.package.as_deref().unwrap_or("");
        walk(&unit.unit.types, package, None, None, &unit.relative_path, &mut out);
    }
    out
}

/// Synthetic (or otherwise plan-resolved) type FQNs this file's source
/// text mentions by simple name, that live outside the file's own package
/// and so need an added import.
fn needed_fqns_for(slice: &SliceUnit, plan: &StubPlan) -> BTreeSet<String> {
    let own_package = slice.unit.package.as_deref();
    let mut needed = BTreeSet::new();
    for t in plan.types() {
        if t.outer_fqn.is_some() {
            continue;
        }
        let simple = t.simple_name();
        let pkg = t.fqn.as_str().rsplit_once('.').map(|(p, _)| p);
        if pkg == own_package {
            continue;
        }
        if mentions_simple_name(&slice.source, simple) {
            needed.insert(t.fqn.as_str().to_string());
        }
    }
    needed
}

fn mentions_simple_name(source: &str, simple: &str) -> bool {
    let bytes = source.as_bytes();
    let needle = simple.as_bytes();
    if needle.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = find_from(bytes, needle, start) {
        let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
        let after = pos + needle.len();
        let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
        if before_ok && after_ok {
            return true;
        }
        start = pos + 1;
    }
    false
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Static imports whose named owner exists nowhere — not in the index, not
/// among local slice types, and no stub was synthesized for it either
/// (spec scenario 3: the import is simply dropped, no stub created).
fn dead_static_import_paths(slice: &SliceUnit, plan: &StubPlan, index: &ContextIndex) -> BTreeSet<String> {
    let mut dead = BTreeSet::new();
    for imp in slice.unit.imports.iter().filter(|i| i.is_static && !i.is_wildcard) {
        let owner = match imp.path.rsplit_once('.') {
            Some((owner, _member)) => owner,
            None => continue,
        };
        let owner_known = index.has_type(owner) || plan.has_type(owner) || type_decl_names(&slice.unit).iter().any(|n| owner.ends_with(n.as_str()));
        if !owner_known {
            dead.insert(imp.path.clone());
        }
    }
    dead
}

#[track_caller]
fn clear_dir_best_effort(dir: &Path, reason: &'static str) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            let loc = Location::caller();
            tracing::debug!(
                target = "javastub.materialize",
                path = %dir.display(),
                reason,
                file = loc.file(),
                line = loc.line(),
                column = loc.column(),
                error = %err,
                "failed to clear generated output directory (best effort)"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javastub_core::{CtorStub, FieldStub, MethodStub, TypeKind, TypeRef, Visibility};
    use javastub_index::build_from_sources;
    use tempfile::tempdir;

    fn write_file(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn writes_brand_new_top_level_type() {
        let slice = tempdir().unwrap();
        let gen = tempdir().unwrap();
        let index = build_from_sources(&[]);

        let mut plan = StubPlan::new();
        let stub = TypeStub::new("foo.Widget", TypeKind::Class);
        plan.add_type(stub);
        plan.add_method(MethodStub {
            owner_fqn: "foo.Widget".into(),
            name: "run".into(),
            return_type: TypeRef::void(),
            params: Vec::new(),
            is_static: false,
            visibility: Visibility::Public,
            thrown: Vec::new(),
            default_on_interface: false,
            varargs: false,
            mirror: None,
        });

        let report = materialize(&plan, slice.path(), gen.path(), &index).unwrap();
        assert_eq!(report.generated_files.len(), 1);
        let generated = std::fs::read_to_string(&report.generated_files[0]).unwrap();
        assert!(generated.contains("package foo;"));
        assert!(generated.contains("class Widget"));
    }

    #[test]
    fn patches_method_into_existing_slice_type() {
        let slice = tempdir().unwrap();
        write_file(slice.path(), "a/Foo.java", "package a;\n\nclass Foo {\n}\n");
        let gen = tempdir().unwrap();
        let index = build_from_sources(&[]);

        let mut plan = StubPlan::new();
        plan.add_method(MethodStub {
            owner_fqn: "a.Foo".into(),
            name: "bar".into(),
            return_type: TypeRef::top(),
            params: Vec::new(),
            is_static: false,
            visibility: Visibility::Public,
            thrown: Vec::new(),
            default_on_interface: false,
            varargs: false,
            mirror: None,
        });

        let report = materialize(&plan, slice.path(), gen.path(), &index).unwrap();
        assert_eq!(report.patched_files.len(), 1);
        let patched = std::fs::read_to_string(&report.patched_files[0]).unwrap();
        assert!(patched.contains("class Foo"));
        assert!(patched.contains("bar()"));
    }

    #[test]
    fn groups_unknown_owner_methods_into_one_mirror_class() {
        let slice = tempdir().unwrap();
        let gen = tempdir().unwrap();
        let index = build_from_sources(&[]);

        let mut plan = StubPlan::new();
        for name in ["one", "two"] {
            plan.add_method(MethodStub {
                owner_fqn: "unknown.helper".into(),
                name: name.into(),
                return_type: TypeRef::top(),
                params: Vec::new(),
                is_static: false,
                visibility: Visibility::Public,
                thrown: Vec::new(),
                default_on_interface: false,
                varargs: false,
                mirror: None,
            });
        }

        let report = materialize(&plan, slice.path(), gen.path(), &index).unwrap();
        assert_eq!(report.generated_files.len(), 1);
        let generated = std::fs::read_to_string(&report.generated_files[0]).unwrap();
        assert!(generated.contains("class helper"));
        assert!(generated.contains("one()"));
        assert!(generated.contains("two()"));
    }

    #[test]
    fn rematerializing_is_idempotent() {
        let slice = tempdir().unwrap();
        write_file(slice.path(), "a/Foo.java", "package a;\n\nclass Foo {\n}\n");
        let gen = tempdir().unwrap();
        let index = build_from_sources(&[]);

        let mut plan = StubPlan::new();
        plan.add_field(FieldStub {
            owner_fqn: "a.Foo".into(),
            name: "count".into(),
            field_type: TypeRef::primitive(javastub_core::Primitive::Int),
            is_static: false,
            visibility: Visibility::Private,
            mutable: false,
        });
        plan.add_ctor(CtorStub {
            owner_fqn: "a.Foo".into(),
            params: Vec::new(),
        });

        let first = materialize(&plan, slice.path(), gen.path(), &index).unwrap();
        let first_bytes: Vec<u8> = first
            .patched_files
            .iter()
            .map(|p| std::fs::read(p).unwrap())
            .flatten()
            .collect();
        let second = materialize(&plan, slice.path(), gen.path(), &index).unwrap();
        let second_bytes: Vec<u8> = second
            .patched_files
            .iter()
            .map(|p| std::fs::read(p).unwrap())
            .flatten()
            .collect();
        assert_eq!(first_bytes, second_bytes);
    }
}
