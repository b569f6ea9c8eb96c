//! Walks a best-effort AST and builds a [`StubPlan`] of every reference that
//! can't already be resolved against the declarations in the slice or the
//! [`ContextIndex`] (component C2, spec §4.2 classification rules 1-6).
//!
//! This is a first guess, not a fixed point. Whatever it misses — a field it
//! assumed was a local variable, an inherited method it couldn't trace
//! through a superclass it hasn't yet seen — gets caught by a real compile
//! and fed back in by the diagnostics extractor on the next iteration.

use std::collections::BTreeMap;

use javastub_core::{
    AmbiguityPolicy, CtorStub, FieldStub, MethodStub, MirrorTarget, StubPlan, TypeKind, TypeRef,
    TypeStub, Visibility,
};
use javastub_index::ContextIndex;
use javastub_syntax::{
    Annotation, Block, CompilationUnit, CtorDecl, Expr, FieldDecl, ImportDecl, Member, MethodDecl,
    Stmt, TypeDecl, TypeRefSyntax,
};

use crate::error::Result;
use crate::local::{self, DeclaredMembers};
use crate::resolve::{Resolver, TypeResolution};

pub struct CollectOutcome {
    pub plan: StubPlan,
    pub warnings: Vec<String>,
}

/// Entry point: collect every missing-symbol candidate referenced by `unit`.
pub fn collect(unit: &CompilationUnit, index: &ContextIndex, policy: AmbiguityPolicy) -> Result<CollectOutcome> {
    let local_types = local::declared_types(unit);
    let local_simple = local::simple_name_lookup(&local_types);
    let declared_members = local::declared_members(unit);

    let mut collector = Collector {
        package: unit.package.as_deref(),
        imports: &unit.imports,
        index,
        local_types: &local_types,
        local_simple: &local_simple,
        declared_members: &declared_members,
        policy,
        plan: StubPlan::new(),
        warnings: Vec::new(),
        enclosing: Vec::new(),
        enclosing_super: Vec::new(),
        declared_interfaces: BTreeMap::new(),
        scopes: Vec::new(),
    };

    for type_decl in &unit.types {
        collector.visit_type_decl(type_decl, None)?;
    }

    Ok(CollectOutcome {
        plan: collector.plan,
        warnings: collector.warnings,
    })
}

struct Collector<'a> {
    package: Option<&'a str>,
    imports: &'a [ImportDecl],
    index: &'a ContextIndex,
    local_types: &'a BTreeMap<String, TypeKind>,
    local_simple: &'a BTreeMap<String, String>,
    declared_members: &'a BTreeMap<String, DeclaredMembers>,
    policy: AmbiguityPolicy,
    plan: StubPlan,
    warnings: Vec<String>,
    /// FQN stack of the type(s) currently being walked, innermost last.
    enclosing: Vec<String>,
    /// Resolved superclass FQN for each entry of `enclosing`, parallel stack.
    enclosing_super: Vec<Option<String>>,
    /// Resolved `implements` FQNs per type, keyed by the type's own FQN.
    /// Populated as each type decl is visited so a bare call inside that
    /// type's body can see interfaces stubbed earlier in the same pass
    /// (spec §4.2 rule 3's inherited-method case), not just ones the
    /// `ContextIndex` already knew about before this compile.
    declared_interfaces: BTreeMap<String, Vec<String>>,
    /// Local variable / parameter name -> declared type, innermost scope last.
    scopes: Vec<BTreeMap<String, TypeRefSyntax>>,
}

impl<'a> Collector<'a> {
    fn make_resolver(&self) -> Resolver<'a> {
        Resolver::new(
            self.package,
            self.imports,
            self.index,
            self.local_types,
            self.local_simple,
            self.policy,
        )
    }

    /// Resolves a type name (simple or dotted) used in a type position,
    /// emitting a [`TypeStub`] for it if it resolves to nothing (spec §4.2
    /// classification rules 1 and 2, and rule 6 for annotations via `kind`).
    fn resolve_type_name(&mut self, name: &str, kind: TypeKind) -> Result<TypeResolution> {
        let res = if let Some((_, _)) = name.split_once('.') {
            let segments: Vec<String> = name.split('.').map(str::to_string).collect();
            let mut r = self.make_resolver();
            let res = r.resolve_qualified(&segments)?;
            self.warnings.append(&mut r.warnings);
            res
        } else {
            let mut r = self.make_resolver();
            let res = r.resolve_simple(name)?;
            self.warnings.append(&mut r.warnings);
            res
        };
        if !res.exists {
            let r = self.make_resolver();
            if r.passes_stub_filters(&res) {
                self.emit_type_stub(&res.fqn, kind, res.outer_fqn.as_deref());
            }
        }
        Ok(res)
    }

    fn emit_type_stub(&mut self, fqn: &str, kind: TypeKind, outer_fqn: Option<&str>) {
        if self.local_types.contains_key(fqn) || self.index.has_type(fqn) {
            return;
        }
        let mut stub = TypeStub::new(fqn, kind);
        stub.outer_fqn = outer_fqn.map(|s| s.into());
        self.plan.add_type(stub);
    }

    fn is_patchable_owner(&self, owner: &str) -> bool {
        self.local_types.contains_key(owner) || self.plan.has_type(owner)
    }

    fn method_known(&self, owner: &str, name: &str, arity: u32) -> bool {
        if let Some(dm) = self.declared_members.get(owner) {
            if dm.methods.contains(&(name.to_string(), arity)) {
                return true;
            }
        }
        if self.index.has_method_arity(owner, name, arity) {
            return true;
        }
        if self
            .index
            .super_type_chain(owner)
            .iter()
            .any(|ancestor| self.index.has_method_arity(ancestor, name, arity))
        {
            return true;
        }
        // `super_type_chain` only knows about ancestors the ContextIndex saw
        // before this compile. An interface `owner` implements can be one
        // this same collection pass stubbed in moments ago (spec §8
        // scenario 5's multi-interface case), so it's also checked directly
        // against the plan being built.
        if let Some(ifaces) = self.declared_interfaces.get(owner) {
            if ifaces.iter().any(|iface| self.method_known_on_interface(iface, name, arity)) {
                return true;
            }
        }
        false
    }

    fn method_known_on_interface(&self, iface: &str, name: &str, arity: u32) -> bool {
        if self.index.has_method_arity(iface, name, arity) {
            return true;
        }
        if self
            .index
            .super_type_chain(iface)
            .iter()
            .any(|ancestor| self.index.has_method_arity(ancestor, name, arity))
        {
            return true;
        }
        self.plan.has_method(iface, name, arity as usize)
    }

    fn field_known(&self, owner: &str, name: &str) -> bool {
        if let Some(dm) = self.declared_members.get(owner) {
            if dm.fields.contains(name) {
                return true;
            }
        }
        if self.index.fields_for(owner).iter().any(|f| f == name) {
            return true;
        }
        self.index
            .super_type_chain(owner)
            .iter()
            .any(|ancestor| self.index.fields_for(ancestor).iter().any(|f| f == name))
    }

    fn ctor_known(&self, owner: &str, arity: u32) -> bool {
        self.declared_members
            .get(owner)
            .map(|dm| dm.ctors.contains(&arity))
            .unwrap_or(false)
    }

    fn lookup_scope(&self, name: &str) -> Option<TypeRefSyntax> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).cloned())
    }

    // ---- type declarations ------------------------------------------------

    fn fqn_of(&self, decl: &TypeDecl, outer_fqn: Option<&str>) -> String {
        match outer_fqn {
            Some(outer) => format!("{outer}${}", decl.name),
            None => match self.package {
                Some(pkg) if !pkg.is_empty() => format!("{pkg}.{}", decl.name),
                _ => decl.name.clone(),
            },
        }
    }

    fn visit_type_decl(&mut self, decl: &TypeDecl, outer_fqn: Option<&str>) -> Result<()> {
        let fqn = self.fqn_of(decl, outer_fqn);

        let mut super_fqn = None;
        for (i, ext) in decl.extends.iter().enumerate() {
            self.visit_type_ref_syntax(ext)?;
            if i == 0 && !ext.is_primitive && !ext.is_void && ext.array_dims == 0 {
                let res = self.resolve_type_name(&ext.name, TypeKind::Class)?;
                super_fqn = Some(res.fqn);
            }
        }
        let mut iface_fqns = Vec::new();
        for iface in &decl.implements {
            self.visit_type_ref_syntax(iface)?;
            if !iface.is_primitive && !iface.is_void && iface.array_dims == 0 {
                let res = self.resolve_type_name(&iface.name, TypeKind::Class)?;
                iface_fqns.push(res.fqn);
            }
        }
        for ann in &decl.annotations {
            self.visit_annotation(ann)?;
        }

        self.declared_interfaces.insert(fqn.clone(), iface_fqns);
        self.enclosing.push(fqn);
        self.enclosing_super.push(super_fqn);

        for member in &decl.members {
            self.visit_member(member)?;
        }

        self.enclosing.pop();
        self.enclosing_super.pop();
        Ok(())
    }

    fn visit_member(&mut self, member: &Member) -> Result<()> {
        match member {
            Member::Field(f) => self.visit_field_decl(f),
            Member::Method(m) => self.visit_method_decl(m),
            Member::Constructor(c) => self.visit_ctor_decl(c),
            Member::NestedType(t) => {
                let outer = self.enclosing.last().cloned();
                self.visit_type_decl(t, outer.as_deref())
            }
            Member::Initializer => Ok(()),
        }
    }

    /// Same as [`Self::visit_member`] but used for anonymous-class bodies,
    /// which don't get their own enclosing FQN pushed since they aren't a
    /// stub target themselves.
    fn visit_member_loose(&mut self, member: &Member) -> Result<()> {
        match member {
            Member::Field(f) => self.visit_field_decl(f),
            Member::Method(m) => self.visit_method_decl(m),
            Member::Constructor(c) => self.visit_ctor_decl(c),
            Member::NestedType(t) => {
                let outer = self.enclosing.last().cloned();
                self.visit_type_decl(t, outer.as_deref())
            }
            Member::Initializer => Ok(()),
        }
    }

    fn visit_field_decl(&mut self, f: &FieldDecl) -> Result<()> {
        self.visit_type_ref_syntax(&f.ty)?;
        if let Some(init) = &f.initializer {
            self.visit_expr(init)?;
        }
        Ok(())
    }

    fn visit_method_decl(&mut self, m: &MethodDecl) -> Result<()> {
        self.visit_type_ref_syntax(&m.return_type)?;
        for tp in &m.type_params {
            for bound in &tp.bounds {
                self.visit_type_ref_syntax(bound)?;
            }
        }
        let mut scope = BTreeMap::new();
        for p in &m.params {
            self.visit_type_ref_syntax(&p.ty)?;
            scope.insert(p.name.clone(), p.ty.clone());
        }
        for t in &m.thrown {
            self.visit_type_ref_syntax(t)?;
        }
        self.scopes.push(scope);
        if let Some(body) = &m.body {
            self.visit_block_inner(body)?;
        }
        self.scopes.pop();
        Ok(())
    }

    fn visit_ctor_decl(&mut self, c: &CtorDecl) -> Result<()> {
        let mut scope = BTreeMap::new();
        for p in &c.params {
            self.visit_type_ref_syntax(&p.ty)?;
            scope.insert(p.name.clone(), p.ty.clone());
        }
        for t in &c.thrown {
            self.visit_type_ref_syntax(t)?;
        }
        self.scopes.push(scope);
        self.visit_block_inner(&c.body)?;
        self.scopes.pop();
        Ok(())
    }

    fn visit_annotation(&mut self, ann: &Annotation) -> Result<()> {
        self.resolve_type_name(&ann.name, TypeKind::Annotation)?;
        Ok(())
    }

    // ---- type references --------------------------------------------------

    fn visit_type_ref_syntax(&mut self, ty: &TypeRefSyntax) -> Result<()> {
        if ty.is_primitive || ty.is_void {
            return Ok(());
        }
        for arg in &ty.type_args {
            self.visit_type_ref_syntax(arg)?;
        }
        self.resolve_type_name(&ty.name, TypeKind::Class)?;
        Ok(())
    }

    fn resolve_type_ref_syntax_owner(&mut self, ty: &TypeRefSyntax) -> Option<String> {
        if ty.is_primitive || ty.is_void || ty.array_dims > 0 {
            return None;
        }
        self.resolve_type_name(&ty.name, TypeKind::Class).ok().map(|r| r.fqn)
    }

    fn type_name_to_fqn(&mut self, name: &str) -> Option<String> {
        if !name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
            return None;
        }
        self.resolve_type_name(name, TypeKind::Class).ok().map(|r| r.fqn)
    }

    fn visit_qualified_name(&mut self, segments: &[String]) -> Result<()> {
        if segments
            .first()
            .and_then(|s| s.chars().next())
            .map(|c| c.is_uppercase())
            .unwrap_or(false)
        {
            self.resolve_type_name(&segments.join("."), TypeKind::Class)?;
        }
        Ok(())
    }

    // ---- statements/blocks --------------------------------------------------

    fn visit_block_inner(&mut self, b: &Block) -> Result<()> {
        self.scopes.push(BTreeMap::new());
        for s in &b.stmts {
            self.visit_stmt(s)?;
        }
        self.scopes.pop();
        Ok(())
    }

    fn visit_stmt(&mut self, s: &Stmt) -> Result<()> {
        match s {
            Stmt::Expr(e) => self.visit_expr(e),
            Stmt::LocalVar { ty, name, initializer } => {
                self.visit_type_ref_syntax(ty)?;
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.clone(), ty.clone());
                }
                if let Some(init) = initializer {
                    self.visit_expr(init)?;
                }
                Ok(())
            }
            Stmt::Return(e) => match e {
                Some(e) => self.visit_expr(e),
                None => Ok(()),
            },
            Stmt::If { cond, then_branch, else_branch } => {
                self.visit_expr(cond)?;
                self.visit_block_inner(then_branch)?;
                if let Some(b) = else_branch {
                    self.visit_block_inner(b)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                self.visit_expr(cond)?;
                self.visit_block_inner(body)
            }
            Stmt::For { body } => self.visit_block_inner(body),
            Stmt::Throw(e) => self.visit_expr(e),
            Stmt::Block(b) => self.visit_block_inner(b),
            Stmt::Unparsed => Ok(()),
        }
    }

    // ---- expressions --------------------------------------------------------

    fn visit_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Ident(_) | Expr::Literal | Expr::Lambda(_) => Ok(()),
            Expr::FieldAccess { receiver, name } => {
                self.visit_expr(receiver)?;
                self.visit_field_access_impl(receiver, name, false)
            }
            Expr::MethodCall { receiver, type_args, name, args } => {
                for ta in type_args {
                    self.visit_type_ref_syntax(ta)?;
                }
                for a in args {
                    self.visit_expr(a)?;
                }
                let arity = args.len() as u32;
                match (receiver, name.as_str()) {
                    (None, "this") => self.visit_this_ctor_call(arity),
                    (None, "super") => self.visit_super_ctor_call(arity),
                    (Some(r), _) => {
                        self.visit_expr(r)?;
                        self.visit_qualified_method_call(r, name, arity)
                    }
                    (None, _) => self.visit_bare_call(name, arity),
                }
            }
            Expr::New { ty, args, anon_body } => {
                self.visit_type_ref_syntax(ty)?;
                for a in args {
                    self.visit_expr(a)?;
                }
                self.visit_constructor_call(ty, args.len() as u32)?;
                if let Some(members) = anon_body {
                    for m in members {
                        self.visit_member_loose(m)?;
                    }
                }
                Ok(())
            }
            Expr::Cast { ty, expr } => {
                self.visit_type_ref_syntax(ty)?;
                self.visit_expr(expr)
            }
            Expr::InstanceOf { expr, ty } => {
                self.visit_expr(expr)?;
                self.visit_type_ref_syntax(ty)
            }
            Expr::ClassLiteral(ty) => self.visit_type_ref_syntax(ty),
            Expr::QualifiedName(segs) => self.visit_qualified_name(segs),
            Expr::Assign { target, value } => {
                self.visit_assign_target(target)?;
                self.visit_expr(value)
            }
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left)?;
                self.visit_expr(right)
            }
            Expr::Unary { expr, .. } => self.visit_expr(expr),
            Expr::ArrayAccess { array, index } => {
                self.visit_expr(array)?;
                self.visit_expr(index)
            }
            Expr::Paren(inner) => self.visit_expr(inner),
        }
    }

    fn visit_assign_target(&mut self, target: &Expr) -> Result<()> {
        match target {
            Expr::FieldAccess { receiver, name } => {
                self.visit_expr(receiver)?;
                self.visit_field_access_impl(receiver, name, true)
            }
            Expr::Ident(name) => self.visit_bare_field(name, true),
            Expr::ArrayAccess { array, index } => {
                self.visit_assign_target(array)?;
                self.visit_expr(index)
            }
            other => self.visit_expr(other),
        }
    }

    /// Best-effort static type of a method/field receiver expression (spec
    /// §4.2 rules 3 and 4). `None` means nothing short of full type
    /// inference could answer it.
    fn receiver_owner(&mut self, receiver: &Expr) -> Option<(String, bool)> {
        match receiver {
            Expr::Ident(name) if name == "this" => self.enclosing.last().cloned().map(|fqn| (fqn, false)),
            Expr::Ident(name) if name == "super" => {
                self.enclosing_super.last().cloned().flatten().map(|fqn| (fqn, false))
            }
            Expr::Ident(name) => {
                if let Some(ty) = self.lookup_scope(name) {
                    self.resolve_type_ref_syntax_owner(&ty).map(|fqn| (fqn, false))
                } else {
                    self.type_name_to_fqn(name).map(|fqn| (fqn, true))
                }
            }
            Expr::QualifiedName(segs) => self
                .resolve_type_name(&segs.join("."), TypeKind::Class)
                .ok()
                .map(|res| (res.fqn, true)),
            Expr::Cast { ty, .. } => self.resolve_type_ref_syntax_owner(ty).map(|fqn| (fqn, false)),
            Expr::Paren(inner) => self.receiver_owner(inner),
            _ => None,
        }
    }

    fn visit_field_access_impl(&mut self, receiver: &Expr, name: &str, mutable: bool) -> Result<()> {
        let Some((owner, is_static)) = self.receiver_owner(receiver) else {
            return Ok(());
        };
        if self.field_known(&owner, name) {
            return Ok(());
        }
        if !self.is_patchable_owner(&owner) {
            return Ok(());
        }
        let stub = FieldStub {
            owner_fqn: owner.into(),
            name: name.into(),
            field_type: TypeRef::top(),
            is_static,
            visibility: Visibility::Public,
            mutable,
        };
        self.plan.add_field(stub);
        Ok(())
    }

    fn visit_bare_field(&mut self, name: &str, mutable: bool) -> Result<()> {
        if self.lookup_scope(name).is_some() {
            return Ok(());
        }
        let Some(owner) = self.enclosing.last().cloned() else {
            return Ok(());
        };
        if self.field_known(&owner, name) {
            return Ok(());
        }
        let stub = FieldStub {
            owner_fqn: owner.into(),
            name: name.into(),
            field_type: TypeRef::top(),
            is_static: false,
            visibility: Visibility::Public,
            mutable,
        };
        self.plan.add_field(stub);
        Ok(())
    }

    fn visit_bare_call(&mut self, name: &str, arity: u32) -> Result<()> {
        if let Some(owner_path) = self.static_import_owner(name) {
            let owner = self.resolve_type_name(&owner_path, TypeKind::Class)?.fqn;
            if self.method_known(&owner, name, arity) {
                return Ok(());
            }
            if self.is_patchable_owner(&owner) {
                self.emit_method_stub(owner, name, arity, true, false);
            } else {
                self.emit_mirror_only_method_stub(name, arity);
            }
            return Ok(());
        }

        let Some(owner) = self.enclosing.last().cloned() else {
            self.emit_mirror_only_method_stub(name, arity);
            return Ok(());
        };
        if self.method_known(&owner, name, arity) {
            return Ok(());
        }
        self.emit_method_stub(owner, name, arity, false, true);
        Ok(())
    }

    /// Spec §4.2 rule 3: a bare call whose enclosing class statically
    /// imports a matching member name resolves against the import's owner,
    /// not the enclosing class.
    fn static_import_owner(&self, name: &str) -> Option<String> {
        self.imports
            .iter()
            .find(|i| i.is_static && !i.is_wildcard && import_simple_name(i) == name)
            .and_then(|i| i.path.rsplit_once('.').map(|(owner, _)| owner.to_string()))
    }

    fn visit_qualified_method_call(&mut self, receiver: &Expr, name: &str, arity: u32) -> Result<()> {
        let uncertain_owner_choice = matches!(receiver, Expr::Ident(n) if n == "this" || n == "super");
        match self.receiver_owner(receiver) {
            Some((owner, is_static)) => {
                if self.method_known(&owner, name, arity) {
                    return Ok(());
                }
                if self.is_patchable_owner(&owner) {
                    self.emit_method_stub(owner, name, arity, is_static, uncertain_owner_choice);
                } else {
                    self.emit_mirror_only_method_stub(name, arity);
                }
            }
            None => self.emit_mirror_only_method_stub(name, arity),
        }
        Ok(())
    }

    fn visit_this_ctor_call(&mut self, arity: u32) -> Result<()> {
        let Some(owner) = self.enclosing.last().cloned() else {
            return Ok(());
        };
        self.stub_ctor_if_missing(owner, arity);
        Ok(())
    }

    fn visit_super_ctor_call(&mut self, arity: u32) -> Result<()> {
        let Some(owner) = self.enclosing_super.last().cloned().flatten() else {
            return Ok(());
        };
        self.stub_ctor_if_missing(owner, arity);
        Ok(())
    }

    fn visit_constructor_call(&mut self, ty: &TypeRefSyntax, arity: u32) -> Result<()> {
        if ty.is_primitive || ty.is_void || ty.array_dims > 0 {
            return Ok(());
        }
        let res = self.resolve_type_name(&ty.name, TypeKind::Class)?;
        self.stub_ctor_if_missing(res.fqn, arity);
        Ok(())
    }

    fn stub_ctor_if_missing(&mut self, owner: String, arity: u32) {
        if !self.is_patchable_owner(&owner) {
            return;
        }
        if self.ctor_known(&owner, arity) {
            return;
        }
        let stub = CtorStub {
            owner_fqn: owner.into(),
            params: vec![TypeRef::top(); arity as usize],
        };
        self.plan.add_ctor(stub);
    }

    fn emit_method_stub(&mut self, owner: String, name: &str, arity: u32, is_static: bool, with_mirror: bool) {
        let mirror = with_mirror.then(|| MirrorTarget {
            owner_fqn: format!("unknown.{name}").into(),
        });
        let stub = MethodStub {
            owner_fqn: owner.into(),
            name: name.into(),
            return_type: TypeRef::top(),
            params: vec![TypeRef::top(); arity as usize],
            is_static,
            visibility: Visibility::Public,
            thrown: Vec::new(),
            default_on_interface: false,
            varargs: false,
            mirror,
        };
        self.plan.add_method(stub);
    }

    fn emit_mirror_only_method_stub(&mut self, name: &str, arity: u32) {
        let stub = MethodStub {
            owner_fqn: format!("unknown.{name}").into(),
            name: name.into(),
            return_type: TypeRef::top(),
            params: vec![TypeRef::top(); arity as usize],
            is_static: false,
            visibility: Visibility::Public,
            thrown: Vec::new(),
            default_on_interface: false,
            varargs: false,
            mirror: None,
        };
        self.plan.add_method(stub);
    }
}

fn import_simple_name(imp: &ImportDecl) -> &str {
    imp.path.rsplit('.').next().unwrap_or(&imp.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use javastub_index::build_from_sources;

    fn collect_source(source: &str) -> CollectOutcome {
        let unit = javastub_syntax::parse(source);
        let index = build_from_sources(&[]);
        collect(&unit, &index, AmbiguityPolicy::Lenient).unwrap()
    }

    #[test]
    fn bare_call_stubs_enclosing_method_with_mirror() {
        let outcome = collect_source(
            r#"
            package a;
            class Foo {
                void run() {
                    compute();
                }
            }
            "#,
        );
        let m = outcome.plan.methods().find(|m| m.name.as_str() == "compute").unwrap();
        assert_eq!(m.owner_fqn.as_str(), "a.Foo");
        assert!(m.mirror.is_some());
    }

    #[test]
    fn static_call_on_known_local_class_stubs_method_without_mirror() {
        let outcome = collect_source(
            r#"
            package a;
            class Foo {
                void run() {
                    Helper.assist();
                }
            }
            class Helper {}
            "#,
        );
        let m = outcome.plan.methods().find(|m| m.name.as_str() == "assist").unwrap();
        assert_eq!(m.owner_fqn.as_str(), "a.Helper");
        assert!(m.is_static);
        assert!(m.mirror.is_none());
    }

    #[test]
    fn call_on_unresolvable_receiver_falls_back_to_mirror_only() {
        let outcome = collect_source(
            r#"
            package a;
            class Foo {
                void run() {
                    make().finish();
                }
                Object make() { return null; }
            }
            "#,
        );
        let m = outcome.plan.methods().find(|m| m.name.as_str() == "finish").unwrap();
        assert_eq!(m.owner_fqn.as_str(), "unknown.finish");
        assert!(m.mirror.is_none());
    }

    #[test]
    fn local_variable_typed_receiver_resolves_owner() {
        let outcome = collect_source(
            r#"
            package a;
            class Foo {
                void run() {
                    Widget w = new Widget();
                    w.spin();
                }
            }
            "#,
        );
        assert!(outcome.plan.has_type("a.Widget"));
        let m = outcome.plan.methods().find(|m| m.name.as_str() == "spin").unwrap();
        assert_eq!(m.owner_fqn.as_str(), "a.Widget");
    }

    #[test]
    fn missing_field_assignment_is_stubbed_mutable() {
        let outcome = collect_source(
            r#"
            package a;
            class Foo {
                void run() {
                    total = 5;
                }
            }
            "#,
        );
        let f = outcome.plan.fields().find(|f| f.name.as_str() == "total").unwrap();
        assert_eq!(f.owner_fqn.as_str(), "a.Foo");
        assert!(f.mutable);
    }

    #[test]
    fn constructor_call_on_new_type_stubs_ctor() {
        let outcome = collect_source(
            r#"
            package a;
            class Foo {
                void run() {
                    new Widget(1, 2);
                }
            }
            "#,
        );
        let c = outcome.plan.ctors().find(|c| c.owner_fqn.as_str() == "a.Widget").unwrap();
        assert_eq!(c.params.len(), 2);
    }

    #[test]
    fn annotation_usage_stubs_annotation_type() {
        let outcome = collect_source(
            r#"
            package a;
            @Nullable
            class Foo {}
            "#,
        );
        let t = outcome.plan.type_stub("a.Nullable").unwrap();
        assert_eq!(t.kind, TypeKind::Annotation);
    }

    #[test]
    fn static_imported_bare_call_stubs_import_owner_not_enclosing_class() {
        let outcome = collect_source(
            r#"
            package a;
            import static a.b.C.sneakyThrow;
            class Foo {
                void run() {
                    sneakyThrow(1);
                }
            }
            "#,
        );
        assert!(outcome.plan.has_type("a.b.C"));
        let m = outcome.plan.methods().find(|m| m.name.as_str() == "sneakyThrow").unwrap();
        assert_eq!(m.owner_fqn.as_str(), "a.b.C");
        assert!(m.is_static);
        assert!(m.mirror.is_none());
        assert!(outcome.plan.methods_for_owner("a.Foo").next().is_none());
    }

    #[test]
    fn bare_call_without_matching_static_import_still_defaults_to_enclosing_class() {
        let outcome = collect_source(
            r#"
            package a;
            import static a.b.Other.otherThing;
            class Foo {
                void run() {
                    compute();
                }
            }
            "#,
        );
        let m = outcome.plan.methods().find(|m| m.name.as_str() == "compute").unwrap();
        assert_eq!(m.owner_fqn.as_str(), "a.Foo");
        assert!(m.mirror.is_some());
        assert!(!outcome.plan.has_type("a.b.Other"));
    }

    #[test]
    fn bare_call_already_provided_by_newly_stubbed_interface_is_not_duplicated_on_class() {
        let outcome = collect_source(
            r#"
            package a;
            class Foo implements I1 {
                void run(I1 other) {
                    other.helper(1);
                    helper(1);
                }
            }
            "#,
        );
        // The qualified call stubs `helper` onto `I1` (the typed receiver).
        // The bare call right after it refers to the very same member, so
        // `method_known` must recognize `I1` — stubbed moments earlier in
        // this same pass, not something the `ContextIndex` knew about
        // beforehand — rather than also stubbing a duplicate onto `Foo`.
        assert!(outcome.plan.has_type("a.I1"));
        assert_eq!(outcome.plan.methods().filter(|m| m.name.as_str() == "helper").count(), 1);
        let m = outcome.plan.methods().find(|m| m.name.as_str() == "helper").unwrap();
        assert_eq!(m.owner_fqn.as_str(), "a.I1");
        assert!(outcome.plan.methods_for_owner("a.Foo").next().is_none());
    }
}
