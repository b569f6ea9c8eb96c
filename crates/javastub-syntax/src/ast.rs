//! Best-effort AST for a sliced source file.
//!
//! Shapes mirror the constructs the collector (C2) needs to classify per
//! spec §4.2: type references, qualified names, method invocations, field
//! accesses, constructor calls, and annotation usages. Anything else
//! (lambda bodies, switch expressions, try-with-resources) is represented
//! loosely enough that the parser can skip through it without losing the
//! surrounding declarations.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Dotted path, e.g. `java.util.List` or `java.util.List.Entry` for a
    /// static import of a nested member.
    pub path: String,
    pub is_static: bool,
    /// `import java.util.*;` / `import static java.util.Map.*;`
    pub is_wildcard: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Interface,
    AnnotationType,
    Enum,
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub is_public: bool,
    pub is_protected: bool,
    pub is_private: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRefSyntax {
    /// The lexeme as written: a simple name, a qualified name joined with
    /// `.`, or a primitive/`void` keyword.
    pub name: String,
    pub type_args: Vec<TypeRefSyntax>,
    pub array_dims: u32,
    pub is_primitive: bool,
    pub is_void: bool,
}

impl TypeRefSyntax {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_args: Vec::new(),
            array_dims: 0,
            is_primitive: false,
            is_void: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<TypeRefSyntax>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    /// Named elements used at this annotation site (`value` for a lone
    /// default-element argument). Values themselves aren't modeled — only
    /// that the element was referenced, which is all stubbing needs.
    pub elements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub kind: DeclKind,
    pub modifiers: Modifiers,
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeRefSyntax>,
    pub implements: Vec<TypeRefSyntax>,
    pub members: Vec<Member>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(CtorDecl),
    NestedType(TypeDecl),
    /// Instance/static initializer block, kept only so the parser can find
    /// its matching brace; body contents are not modeled.
    Initializer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRefSyntax,
    pub name: String,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: TypeRefSyntax,
    pub name: String,
    pub is_varargs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    pub return_type: TypeRefSyntax,
    pub name: String,
    pub params: Vec<Param>,
    pub thrown: Vec<TypeRefSyntax>,
    /// `None` for interface methods with no default body (abstract).
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorDecl {
    pub modifiers: Modifiers,
    pub params: Vec<Param>,
    pub thrown: Vec<TypeRefSyntax>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    LocalVar {
        ty: TypeRefSyntax,
        name: String,
        initializer: Option<Expr>,
    },
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_branch: Box<Block>,
        else_branch: Option<Box<Block>>,
    },
    While {
        cond: Expr,
        body: Box<Block>,
    },
    For {
        body: Box<Block>,
    },
    Throw(Expr),
    Block(Block),
    /// A fragment the parser could not make sense of; recorded so recovery
    /// can continue past it without losing the rest of the method.
    Unparsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    FieldAccess {
        receiver: Box<Expr>,
        name: String,
    },
    MethodCall {
        receiver: Option<Box<Expr>>,
        type_args: Vec<TypeRefSyntax>,
        name: String,
        args: Vec<Expr>,
    },
    New {
        ty: TypeRefSyntax,
        args: Vec<Expr>,
        /// Present for an anonymous class body; members only, no further
        /// nested-expression detail is kept.
        anon_body: Option<Vec<Member>>,
    },
    Cast {
        ty: TypeRefSyntax,
        expr: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        ty: TypeRefSyntax,
    },
    ClassLiteral(TypeRefSyntax),
    /// A dotted reference that hasn't yet been resolved into
    /// ident/field-access/package-prefix, e.g. `com.acme.Foo`.
    QualifiedName(Vec<String>),
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Literal,
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    Unary {
        op: String,
        expr: Box<Expr>,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Paren(Box<Expr>),
    /// Best-effort: parameter names only, body not modeled.
    Lambda(Vec<String>),
}
