//! The stub plan model (spec §3 `StubPlan`, component C3).
//!
//! Everything here is a pure value type; the only logic is dedup-on-insert
//! and the canonicalization helpers in [`crate::type_ref`]. Materialization
//! (C4), collection (C2), and diagnostics extraction (C6) all build and merge
//! `StubPlan`s through the `add_*` methods on this type so dedup can never be
//! bypassed (spec invariant P1).

use std::collections::BTreeMap;

use crate::name::Name;
use crate::type_ref::TypeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    Class,
    Interface,
    Annotation,
    Enum,
    Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "",
            Visibility::Private => "private",
        }
    }
}

/// A declared type parameter on a synthesized generic type or method
/// (e.g. the `T` in `class Box<T>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamStub {
    pub name: Name,
    /// Declared bounds, if any (`T extends Comparable<T>`). Empty means no
    /// explicit bound (implicitly `Object`).
    pub bounds: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStub {
    pub fqn: Name,
    pub kind: TypeKind,
    /// `Some` for nested types; the outer type's FQN.
    pub outer_fqn: Option<Name>,
    /// Whether a nested (non-static) inner class needs an enclosing-instance
    /// reference. Stub inner classes are emitted `static` unless this is set.
    pub non_static_inner: bool,
    pub type_params: Vec<TypeParamStub>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
}

impl TypeStub {
    pub fn new(fqn: impl Into<Name>, kind: TypeKind) -> Self {
        Self {
            fqn: fqn.into(),
            kind,
            outer_fqn: None,
            non_static_inner: false,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
        }
    }

    pub fn simple_name(&self) -> &str {
        crate::type_ref::simple_name_of(self.fqn.as_str())
    }

    /// Merge another stub for the *same* FQN into this one, widening (never
    /// narrowing) declared structure. Used when the same missing type is
    /// discovered more than once across repair iterations (spec §4.4
    /// "merging policy").
    pub fn merge_from(&mut self, other: &TypeStub) {
        if self.superclass.is_none() {
            self.superclass = other.superclass.clone();
        }
        for iface in &other.interfaces {
            if !self.interfaces.contains(iface) {
                self.interfaces.push(iface.clone());
            }
        }
        for tp in &other.type_params {
            if !self.type_params.iter().any(|existing| existing.name == tp.name) {
                self.type_params.push(tp.clone());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodKey {
    pub owner_fqn: Name,
    pub name: Name,
    pub arity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    pub owner_fqn: Name,
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CtorKey {
    pub owner_fqn: Name,
    pub arity: usize,
}

/// A duplicate-under-`unknown.*` target for a [`MethodStub`] whose real
/// receiver type could not be determined (spec §4.4 "Mirror duplication").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorTarget {
    pub owner_fqn: Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodStub {
    pub owner_fqn: Name,
    pub name: Name,
    pub return_type: TypeRef,
    pub params: Vec<TypeRef>,
    pub is_static: bool,
    pub visibility: Visibility,
    pub thrown: Vec<TypeRef>,
    pub default_on_interface: bool,
    pub varargs: bool,
    pub mirror: Option<MirrorTarget>,
}

impl MethodStub {
    pub fn key(&self) -> MethodKey {
        MethodKey {
            owner_fqn: self.owner_fqn.clone(),
            name: self.name.clone(),
            arity: self.params.len(),
        }
    }

    /// Whether every parameter is the defaulted top type — i.e. this stub
    /// carries no real signature information, only an arity.
    fn is_untyped(&self) -> bool {
        self.params.iter().all(TypeRef::is_top_type)
    }

    fn signature_shape(&self) -> Vec<String> {
        self.params.iter().map(TypeRef::simple_shape).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStub {
    pub owner_fqn: Name,
    pub name: Name,
    pub field_type: TypeRef,
    pub is_static: bool,
    pub visibility: Visibility,
    /// Defaults to `true`: stubs tolerate assignment unless known to be
    /// read-only (spec §3).
    pub mutable: bool,
}

impl FieldStub {
    pub fn key(&self) -> FieldKey {
        FieldKey {
            owner_fqn: self.owner_fqn.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorStub {
    pub owner_fqn: Name,
    pub params: Vec<TypeRef>,
}

impl CtorStub {
    pub fn key(&self) -> CtorKey {
        CtorKey {
            owner_fqn: self.owner_fqn.clone(),
            arity: self.params.len(),
        }
    }

    fn signature_shape(&self) -> Vec<String> {
        self.params.iter().map(TypeRef::simple_shape).collect()
    }
}

/// Aggregates every synthesized type/method/field/constructor for a single
/// target-method compile (spec §3 `StubPlan`).
///
/// Grows monotonically across repair iterations (spec invariant P6): entries
/// are only ever added through `add_*`, never removed.
#[derive(Debug, Clone, Default)]
pub struct StubPlan {
    types: BTreeMap<Name, TypeStub>,
    // Overload sets keyed by the coarse (owner, name, arity) identity; within
    // a bucket, entries are further disambiguated by concrete parameter shape
    // once that information becomes available (spec §3).
    methods: BTreeMap<MethodKey, Vec<MethodStub>>,
    fields: BTreeMap<FieldKey, FieldStub>,
    ctors: BTreeMap<CtorKey, Vec<CtorStub>>,
}

impl StubPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.methods.is_empty() && self.fields.is_empty() && self.ctors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.types.len()
            + self.methods.values().map(Vec::len).sum::<usize>()
            + self.fields.len()
            + self.ctors.values().map(Vec::len).sum::<usize>()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeStub> {
        self.types.values()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodStub> {
        self.methods.values().flatten()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldStub> {
        self.fields.values()
    }

    pub fn ctors(&self) -> impl Iterator<Item = &CtorStub> {
        self.ctors.values().flatten()
    }

    pub fn methods_for_owner<'a>(&'a self, owner_fqn: &'a str) -> impl Iterator<Item = &'a MethodStub> + 'a {
        self.methods().filter(move |m| m.owner_fqn.as_str() == owner_fqn)
    }

    pub fn fields_for_owner<'a>(&'a self, owner_fqn: &'a str) -> impl Iterator<Item = &'a FieldStub> + 'a {
        self.fields().filter(move |f| f.owner_fqn.as_str() == owner_fqn)
    }

    pub fn ctors_for_owner<'a>(&'a self, owner_fqn: &'a str) -> impl Iterator<Item = &'a CtorStub> + 'a {
        self.ctors().filter(move |c| c.owner_fqn.as_str() == owner_fqn)
    }

    pub fn type_stub(&self, fqn: &str) -> Option<&TypeStub> {
        self.types.get(&Name::new(fqn))
    }

    pub fn has_type(&self, fqn: &str) -> bool {
        self.types.contains_key(&Name::new(fqn))
    }

    /// Whether a method stub for `(owner, name, arity)` has already been
    /// added to this plan, regardless of parameter shape.
    pub fn has_method(&self, owner_fqn: &str, name: &str, arity: usize) -> bool {
        let key = MethodKey {
            owner_fqn: Name::new(owner_fqn),
            name: Name::new(name),
            arity,
        };
        self.methods.contains_key(&key)
    }

    /// Insert or merge a type stub. Returns `true` if this added new
    /// information (a brand-new FQN, or widened an existing one).
    pub fn add_type(&mut self, stub: TypeStub) -> bool {
        match self.types.get_mut(&stub.fqn) {
            Some(existing) => {
                let before = existing.clone();
                existing.merge_from(&stub);
                *existing != before
            }
            None => {
                self.types.insert(stub.fqn.clone(), stub);
                true
            }
        }
    }

    /// Insert a method stub, deduplicating per spec §3/P1.
    ///
    /// The coarse `(owner, name, arity)` key picks the overload bucket.
    /// Within a bucket: an untyped (`Object`-defaulted) stub merges into any
    /// existing untyped entry; a stub with concrete parameter types is only
    /// added if no existing entry shares its exact parameter shape.
    pub fn add_method(&mut self, stub: MethodStub) -> bool {
        let key = stub.key();
        let bucket = self.methods.entry(key).or_default();

        if stub.is_untyped() {
            if let Some(existing) = bucket.iter_mut().find(|m| m.is_untyped()) {
                widen_method(existing, &stub);
                return false;
            }
        } else {
            let shape = stub.signature_shape();
            if bucket.iter().any(|m| m.signature_shape() == shape) {
                return false;
            }
        }

        bucket.push(stub);
        true
    }

    pub fn add_field(&mut self, stub: FieldStub) -> bool {
        let key = stub.key();
        match self.fields.get_mut(&key) {
            Some(existing) => {
                // Assignment-target usages win: once a field is known to be
                // mutated, it must stay mutable even if a later read-only
                // usage is seen first or second.
                if stub.mutable && !existing.mutable {
                    existing.mutable = true;
                    true
                } else {
                    false
                }
            }
            None => {
                self.fields.insert(key, stub);
                true
            }
        }
    }

    pub fn add_ctor(&mut self, stub: CtorStub) -> bool {
        let key = stub.key();
        let bucket = self.ctors.entry(key).or_default();
        let shape = stub.signature_shape();
        if bucket.iter().any(|c| c.signature_shape() == shape) {
            return false;
        }
        bucket.push(stub);
        true
    }

    /// Merge every entry of `other` into `self`. Returns the number of
    /// entries that were genuinely new (used by the repair loop to detect a
    /// fixed point, spec §4.7 "EXTRACT produced zero new plan entries").
    pub fn merge(&mut self, other: StubPlan) -> usize {
        let mut added = 0;
        for stub in other.types.into_values() {
            if self.add_type(stub) {
                added += 1;
            }
        }
        for stub in other.methods.into_values().flatten() {
            if self.add_method(stub) {
                added += 1;
            }
        }
        for stub in other.fields.into_values() {
            if self.add_field(stub) {
                added += 1;
            }
        }
        for stub in other.ctors.into_values().flatten() {
            if self.add_ctor(stub) {
                added += 1;
            }
        }
        added
    }
}

fn widen_method(existing: &mut MethodStub, incoming: &MethodStub) {
    // Prefer a non-`void` return type and any thrown-exceptions/varargs
    // information a later discovery contributes; never narrow what's already
    // known.
    if existing.return_type.is_top_type() && !incoming.return_type.is_top_type() {
        existing.return_type = incoming.return_type.clone();
    }
    if !incoming.thrown.is_empty() && existing.thrown.is_empty() {
        existing.thrown = incoming.thrown.clone();
    }
    existing.varargs |= incoming.varargs;
    existing.default_on_interface |= incoming.default_on_interface;
    if existing.mirror.is_none() {
        existing.mirror = incoming.mirror.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(owner: &str, name: &str, params: Vec<TypeRef>) -> MethodStub {
        MethodStub {
            owner_fqn: owner.into(),
            name: name.into(),
            return_type: TypeRef::top(),
            params,
            is_static: false,
            visibility: Visibility::Public,
            thrown: Vec::new(),
            default_on_interface: false,
            varargs: false,
            mirror: None,
        }
    }

    #[test]
    fn duplicate_untyped_methods_dedup() {
        let mut plan = StubPlan::new();
        let m1 = method("a.B", "frobnicate", vec![TypeRef::top()]);
        let m2 = method("a.B", "frobnicate", vec![TypeRef::top()]);
        assert!(plan.add_method(m1));
        assert!(!plan.add_method(m2));
        assert_eq!(plan.methods().count(), 1);
    }

    #[test]
    fn distinct_typed_overloads_both_kept() {
        let mut plan = StubPlan::new();
        let string_overload = method("a.B", "f", vec![TypeRef::reference("java.lang.String", vec![])]);
        let int_overload = method("a.B", "f", vec![TypeRef::primitive(crate::type_ref::Primitive::Int)]);
        assert!(plan.add_method(string_overload));
        assert!(plan.add_method(int_overload));
        assert_eq!(plan.methods().count(), 2);
    }

    #[test]
    fn repeated_type_stub_is_not_new() {
        let mut plan = StubPlan::new();
        assert!(plan.add_type(TypeStub::new("foo.Bar", TypeKind::Class)));
        assert!(!plan.add_type(TypeStub::new("foo.Bar", TypeKind::Class)));
    }

    #[test]
    fn field_assignment_promotes_mutability() {
        let mut plan = StubPlan::new();
        let read_only = FieldStub {
            owner_fqn: "a.B".into(),
            name: "x".into(),
            field_type: TypeRef::top(),
            is_static: false,
            visibility: Visibility::Public,
            mutable: false,
        };
        let mut assigned = read_only.clone();
        assigned.mutable = true;
        plan.add_field(read_only);
        assert!(plan.add_field(assigned));
        assert!(plan.fields().next().unwrap().mutable);
    }
}
