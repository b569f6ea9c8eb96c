//! A tolerant, best-effort parser for the sliced source unit handed to the
//! collector. This crate has no knowledge of the repository layout or the
//! stub plan — it only turns source text into a [`CompilationUnit`] that
//! other crates walk.

mod ast;
mod lexer;
mod parser;

pub use ast::{
    Annotation, Block, CompilationUnit, CtorDecl, DeclKind, Expr, FieldDecl, ImportDecl, Member,
    MethodDecl, Modifiers, Param, Stmt, TypeDecl, TypeParam, TypeRefSyntax,
};
pub use parser::parse;
