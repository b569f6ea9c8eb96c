//! Renders [`TypeStub`] trees and individual member stubs to Java source
//! text (spec §4.4). The reference implementation goes through a reflective
//! AST factory; per the Design Notes (§9) this emits text directly instead.

use javastub_core::{CtorStub, FieldStub, MethodStub, StubPlan, TypeKind, TypeRef, TypeRefKind, TypeStub};

/// Renders one brand-new compilation unit for a top-level [`TypeStub`],
/// including every nested `TypeStub` the plan records under it and every
/// method/field/ctor owned by it or its nested types.
pub fn render_compilation_unit(plan: &StubPlan, top: &TypeStub, package: &str) -> String {
    let mut out = String::new();
    if !package.is_empty() {
        out.push_str("package ");
        out.push_str(package);
        out.push_str(";\n\n");
    }
    render_type(plan, top, &mut out, 0);
    out
}

/// Renders a bare catch-all class hosting every method assigned to an
/// `unknown.<name>` mirror owner (spec §4.4 "Mirror duplication").
pub fn render_mirror_unit(simple_name: &str, methods: &[&MethodStub]) -> String {
    let mut out = String::new();
    out.push_str("package unknown;\n\n");
    out.push_str("public class ");
    out.push_str(simple_name);
    out.push_str(" {\n");
    for m in methods {
        render_method_body(
            m.visibility,
            m.is_static,
            &m.return_type,
            m.name.as_str(),
            &m.params,
            &m.thrown,
            m.varargs,
            false,
            true,
            &mut out,
            1,
        );
    }
    out.push_str("}\n");
    out
}

/// Renders a synthetic type's full declaration (keyword through closing
/// brace) at `indent`, for splicing into an existing real type's body as a
/// new nested-type member rather than as its own compilation unit.
pub fn render_nested_type(plan: &StubPlan, stub: &TypeStub, indent: usize) -> String {
    let mut out = String::new();
    render_type(plan, stub, &mut out, indent);
    out
}

fn render_type(plan: &StubPlan, stub: &TypeStub, out: &mut String, indent: usize) {
    let pad = "    ".repeat(indent);
    out.push_str(&pad);
    out.push_str("public ");
    if indent > 0 && !stub.non_static_inner {
        out.push_str("static ");
    }
    out.push_str(match stub.kind {
        TypeKind::Class | TypeKind::Record => "class ",
        TypeKind::Interface => "interface ",
        TypeKind::Annotation => "@interface ",
        TypeKind::Enum => "enum ",
    });
    out.push_str(stub.simple_name());

    if !stub.type_params.is_empty() {
        out.push('<');
        let names: Vec<&str> = stub.type_params.iter().map(|tp| tp.name.as_str()).collect();
        out.push_str(&names.join(", "));
        out.push('>');
    }

    if let Some(sup) = &stub.superclass {
        out.push_str(" extends ");
        out.push_str(&render_type_ref(sup));
    }
    if !stub.interfaces.is_empty() {
        out.push_str(if stub.kind == TypeKind::Interface { " extends " } else { " implements " });
        let ifaces: Vec<String> = stub.interfaces.iter().map(render_type_ref).collect();
        out.push_str(&ifaces.join(", "));
    }
    out.push_str(" {\n");

    if stub.kind == TypeKind::Enum {
        out.push_str(&pad);
        out.push_str("    ;\n");
    }

    for field in plan.fields_for_owner(stub.fqn.as_str()) {
        render_field(field, out, indent + 1);
    }
    for ctor in plan.ctors_for_owner(stub.fqn.as_str()) {
        render_ctor(stub, ctor, out, indent + 1);
    }
    for method in plan.methods_for_owner(stub.fqn.as_str()) {
        let is_interface_like = matches!(stub.kind, TypeKind::Interface | TypeKind::Annotation);
        let needs_body = !is_interface_like || method.is_static || method.default_on_interface;
        render_method_body(
            method.visibility,
            method.is_static,
            &method.return_type,
            method.name.as_str(),
            &method.params,
            &method.thrown,
            method.varargs,
            method.default_on_interface && is_interface_like,
            needs_body,
            out,
            indent + 1,
        );
    }
    for nested in plan
        .types()
        .filter(|t| t.outer_fqn.as_ref().map(|n| n.as_str()) == Some(stub.fqn.as_str()))
    {
        render_type(plan, nested, out, indent + 1);
    }

    out.push_str(&pad);
    out.push_str("}\n");
}

fn render_field(field: &FieldStub, out: &mut String, indent: usize) {
    let pad = "    ".repeat(indent);
    out.push_str(&pad);
    let vis = field.visibility.keyword();
    if !vis.is_empty() {
        out.push_str(vis);
        out.push(' ');
    }
    if field.is_static {
        out.push_str("static ");
    }
    // Final-and-initialized only when not an assignment target (spec §4.4
    // "Field creation"): a field observed being written needs to stay
    // mutable and is emitted without an initializer.
    let is_final = !field.mutable;
    if is_final {
        out.push_str("final ");
    }
    out.push_str(&render_type_ref(&field.field_type));
    out.push(' ');
    out.push_str(field.name.as_str());
    if is_final {
        out.push_str(" = ");
        out.push_str(&zero_value(&field.field_type));
    }
    out.push_str(";\n");
}

fn render_ctor(owner: &TypeStub, ctor: &CtorStub, out: &mut String, indent: usize) {
    let pad = "    ".repeat(indent);
    out.push_str(&pad);
    out.push_str("public ");
    out.push_str(owner.simple_name());
    out.push('(');
    let params: Vec<String> = ctor
        .params
        .iter()
        .enumerate()
        .map(|(i, ty)| format!("{} arg{i}", render_type_ref(ty)))
        .collect();
    out.push_str(&params.join(", "));
    out.push_str(") {\n");
    out.push_str(&pad);
    out.push_str("}\n");
}

#[allow(clippy::too_many_arguments)]
fn render_method_body(
    visibility: javastub_core::Visibility,
    is_static: bool,
    return_type: &TypeRef,
    name: &str,
    params: &[TypeRef],
    thrown: &[TypeRef],
    varargs: bool,
    is_default: bool,
    needs_body: bool,
    out: &mut String,
    indent: usize,
) {
    let pad = "    ".repeat(indent);
    out.push_str(&pad);
    let vis = visibility.keyword();
    if !vis.is_empty() {
        out.push_str(vis);
        out.push(' ');
    }
    if is_default {
        out.push_str("default ");
    }
    if is_static {
        out.push_str("static ");
    }
    out.push_str(&render_return_type(return_type));
    out.push(' ');
    out.push_str(name);
    out.push('(');
    let mut rendered_params = Vec::with_capacity(params.len());
    for (i, ty) in params.iter().enumerate() {
        let is_last_varargs = varargs && i == params.len() - 1;
        if is_last_varargs {
            let mut elem = ty.clone();
            if elem.array_dims > 0 {
                elem.array_dims -= 1;
            }
            rendered_params.push(format!("{}... arg{i}", render_type_ref(&elem)));
        } else {
            rendered_params.push(format!("{} arg{i}", render_type_ref(ty)));
        }
    }
    out.push_str(&rendered_params.join(", "));
    out.push(')');
    if !thrown.is_empty() {
        out.push_str(" throws ");
        let names: Vec<String> = thrown.iter().map(render_type_ref).collect();
        out.push_str(&names.join(", "));
    }

    if needs_body {
        out.push_str(" {\n");
        if !return_type.is_void() {
            out.push_str(&pad);
            out.push_str("    return ");
            out.push_str(&zero_value(return_type));
            out.push_str(";\n");
        }
        out.push_str(&pad);
        out.push_str("}\n");
    } else {
        out.push_str(";\n");
    }
}

fn render_return_type(ty: &TypeRef) -> String {
    render_type_ref(ty)
}

fn render_type_ref(ty: &TypeRef) -> String {
    let base = match &ty.kind {
        TypeRefKind::Primitive(p) => p.keyword().to_string(),
        TypeRefKind::Void => "void".to_string(),
        TypeRefKind::Reference { canonical_name, type_args } => {
            let dotted = canonical_name.as_str().replace('$', ".");
            if type_args.is_empty() {
                dotted
            } else {
                let args: Vec<String> = type_args.iter().map(render_type_ref).collect();
                format!("{dotted}<{}>", args.join(", "))
            }
        }
    };
    format!("{base}{}", "[]".repeat(ty.array_dims as usize))
}

fn zero_value(ty: &TypeRef) -> String {
    if ty.is_array() {
        return "null".to_string();
    }
    match &ty.kind {
        TypeRefKind::Primitive(p) => p.zero_literal().to_string(),
        TypeRefKind::Void => String::new(),
        TypeRefKind::Reference { .. } => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javastub_core::{MethodStub, Visibility};

    #[test]
    fn renders_class_with_zero_value_method() {
        let mut plan = StubPlan::new();
        let stub = TypeStub::new("foo.Bar", TypeKind::Class);
        plan.add_type(stub.clone());
        plan.add_method(MethodStub {
            owner_fqn: "foo.Bar".into(),
            name: "baz".into(),
            return_type: TypeRef::top(),
            params: Vec::new(),
            is_static: false,
            visibility: Visibility::Public,
            thrown: Vec::new(),
            default_on_interface: false,
            varargs: false,
            mirror: None,
        });
        let out = render_compilation_unit(&plan, &stub, "foo");
        assert!(out.contains("package foo;"));
        assert!(out.contains("public class Bar"));
        assert!(out.contains("public Object baz()"));
        assert!(out.contains("return null;"));
    }

    #[test]
    fn interface_method_without_default_has_no_body() {
        let mut plan = StubPlan::new();
        let mut stub = TypeStub::new("foo.Iface", TypeKind::Interface);
        stub.kind = TypeKind::Interface;
        plan.add_type(stub.clone());
        plan.add_method(MethodStub {
            owner_fqn: "foo.Iface".into(),
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
        let out = render_compilation_unit(&plan, &stub, "foo");
        assert!(out.contains("public interface Iface"));
        assert!(out.contains("void run();"));
        assert!(!out.contains("run() {"));
    }
}
