//! A tolerant recursive-descent parser.
//!
//! Unlike the scanner (C1), which can simply drop an unparseable file, the
//! collector's input slice always contains the target method: parsing must
//! recover from unrecognized fragments rather than abort the whole unit.
//! Recovery is coarse — skip to the next statement/member boundary — which
//! is sufficient because the collector only needs declarations and the
//! handful of expression shapes spec §4.2 classifies.

use crate::ast::*;
use crate::lexer::{lex, Token, TokenKind};

const MODIFIER_WORDS: &[&str] = &[
    "public", "protected", "private", "static", "final", "abstract", "default", "synchronized",
    "native", "transient", "volatile", "strictfp", "sealed", "non-sealed",
];

const PRIMITIVE_WORDS: &[&str] = &[
    "boolean", "byte", "short", "char", "int", "long", "float", "double",
];

pub fn parse(source: &str) -> CompilationUnit {
    let tokens = lex(source);
    let mut p = Parser { tokens, pos: 0 };
    p.parse_compilation_unit()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> TokenKind {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].kind.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at_punct(&self, p: &str) -> bool {
        matches!(self.peek(), TokenKind::Punct(found) if *found == p)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.at_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_ident(&self, word: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(found) if found == word)
    }

    fn ident(&mut self) -> Option<String> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let mut unit = CompilationUnit::default();

        self.skip_annotations();
        if self.at_ident("package") {
            self.advance();
            unit.package = self.dotted_name();
            self.eat_punct(";");
        }

        while self.at_ident("import") {
            self.advance();
            let is_static = if self.at_ident("static") {
                self.advance();
                true
            } else {
                false
            };
            let mut path = String::new();
            let mut is_wildcard = false;
            loop {
                if self.at_punct("*") {
                    self.advance();
                    is_wildcard = true;
                    break;
                }
                match self.ident() {
                    Some(seg) => {
                        if !path.is_empty() {
                            path.push('.');
                        }
                        path.push_str(&seg);
                    }
                    None => break,
                }
                if self.eat_punct(".") {
                    continue;
                }
                break;
            }
            self.eat_punct(";");
            unit.imports.push(ImportDecl {
                path,
                is_static,
                is_wildcard,
            });
        }

        while !self.is_eof() {
            if self.eat_punct(";") {
                continue;
            }
            if let Some(decl) = self.parse_type_decl() {
                unit.types.push(decl);
            } else {
                self.advance();
            }
        }

        unit
    }

    fn dotted_name(&mut self) -> Option<String> {
        let mut out = String::new();
        loop {
            match self.ident() {
                Some(seg) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(&seg);
                }
                None => break,
            }
            if self.eat_punct(".") {
                continue;
            }
            break;
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }

    fn skip_annotations(&mut self) -> Vec<Annotation> {
        let mut out = Vec::new();
        while self.at_punct("@") {
            // `@interface` is a declaration keyword, not an annotation use.
            if matches!(self.peek_at(1), TokenKind::Ident(w) if w == "interface") {
                break;
            }
            self.advance();
            let name = self.dotted_name().unwrap_or_default();
            let elements = if self.eat_punct("(") {
                self.parse_annotation_elements()
            } else {
                Vec::new()
            };
            out.push(Annotation { name, elements });
        }
        out
    }

    /// Parses the comma-separated argument list of an annotation use,
    /// returning just the element names referenced (`name = ...` pairs, or
    /// `value` for a lone default-element argument). The values themselves
    /// aren't modeled; only the zero-arg method they imply on the annotation
    /// type needs to exist.
    fn parse_annotation_elements(&mut self) -> Vec<String> {
        let mut elements = Vec::new();
        if self.eat_punct(")") {
            return elements;
        }
        loop {
            let name = if let TokenKind::Ident(word) = self.peek().clone() {
                if matches!(self.peek_at(1), TokenKind::Punct("="))
                    && !matches!(self.peek_at(2), TokenKind::Punct("="))
                {
                    self.advance();
                    self.advance();
                    word
                } else {
                    "value".to_string()
                }
            } else {
                "value".to_string()
            };
            elements.push(name);
            self.skip_annotation_element_value();
            if self.eat_punct(",") {
                continue;
            }
            break;
        }
        self.eat_punct(")");
        elements
    }

    fn skip_annotation_element_value(&mut self) {
        let mut depth = 0i32;
        while !self.is_eof() {
            if self.at_punct("(") || self.at_punct("{") {
                depth += 1;
            } else if self.at_punct(")") || self.at_punct("}") {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            } else if depth == 0 && self.at_punct(",") {
                return;
            }
            self.advance();
        }
    }

    /// Consumes tokens until the matching close for a bracket already past
    /// its open (the caller already consumed `open`).
    fn skip_balanced(&mut self, open: &str, close: &str) {
        let mut depth = 1;
        while depth > 0 && !self.is_eof() {
            if self.at_punct(open) {
                depth += 1;
            } else if self.at_punct(close) {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    break;
                }
            }
            self.advance();
        }
    }

    fn parse_modifiers(&mut self) -> Modifiers {
        let mut m = Modifiers::default();
        loop {
            self.skip_annotations();
            let word = match self.peek().clone() {
                TokenKind::Ident(w) if MODIFIER_WORDS.contains(&w.as_str()) => w,
                _ => break,
            };
            match word.as_str() {
                "public" => m.is_public = true,
                "protected" => m.is_protected = true,
                "private" => m.is_private = true,
                "static" => m.is_static = true,
                "abstract" => m.is_abstract = true,
                "final" => m.is_final = true,
                "default" => m.is_default = true,
                _ => {}
            }
            self.advance();
        }
        m
    }

    fn parse_type_decl(&mut self) -> Option<TypeDecl> {
        let annotations = self.skip_annotations();
        let modifiers = self.parse_modifiers();

        let kind = if self.at_punct("@") && matches!(self.peek_at(1), TokenKind::Ident(w) if w == "interface") {
            self.advance();
            self.advance();
            DeclKind::AnnotationType
        } else if self.at_ident("class") {
            self.advance();
            DeclKind::Class
        } else if self.at_ident("interface") {
            self.advance();
            DeclKind::Interface
        } else if self.at_ident("enum") {
            self.advance();
            DeclKind::Enum
        } else if self.at_ident("record") {
            self.advance();
            DeclKind::Record
        } else {
            return None;
        };

        let name = self.ident()?;
        let type_params = self.parse_type_params();

        if kind == DeclKind::Record && self.at_punct("(") {
            self.advance();
            self.skip_balanced("(", ")");
        }

        let mut extends = Vec::new();
        let mut implements = Vec::new();

        if self.at_ident("extends") {
            self.advance();
            loop {
                if let Some(t) = self.parse_type_ref() {
                    extends.push(t);
                }
                if self.eat_punct(",") {
                    continue;
                }
                break;
            }
        }
        if self.at_ident("implements") {
            self.advance();
            loop {
                if let Some(t) = self.parse_type_ref() {
                    implements.push(t);
                }
                if self.eat_punct(",") {
                    continue;
                }
                break;
            }
        }
        if self.at_ident("permits") {
            self.advance();
            loop {
                if self.parse_type_ref().is_none() {
                    break;
                }
                if self.eat_punct(",") {
                    continue;
                }
                break;
            }
        }

        if !self.eat_punct("{") {
            return Some(TypeDecl {
                kind,
                modifiers,
                name,
                type_params,
                extends,
                implements,
                members: Vec::new(),
                annotations,
            });
        }

        let mut members = Vec::new();
        while !self.at_punct("}") && !self.is_eof() {
            if self.eat_punct(";") {
                continue;
            }
            // Enum constants: a bare identifier (optionally with an arg
            // list or anonymous body) followed by `,` or `;`. Skip them —
            // they aren't declarations the collector classifies.
            if kind == DeclKind::Enum && self.looks_like_enum_constant() {
                self.ident();
                if self.eat_punct("(") {
                    self.skip_balanced("(", ")");
                }
                if self.eat_punct("{") {
                    self.skip_balanced("{", "}");
                }
                self.eat_punct(",");
                continue;
            }
            if let Some(member) = self.parse_member(&name) {
                members.push(member);
            } else {
                self.recover_to_member_boundary();
            }
        }
        self.eat_punct("}");

        Some(TypeDecl {
            kind,
            modifiers,
            name,
            type_params,
            extends,
            implements,
            members,
            annotations,
        })
    }

    fn looks_like_enum_constant(&self) -> bool {
        if !matches!(self.peek(), TokenKind::Ident(w) if !MODIFIER_WORDS.contains(&w.as_str())) {
            return false;
        }
        matches!(
            self.peek_at(1),
            TokenKind::Punct(",") | TokenKind::Punct(";") | TokenKind::Punct("(") | TokenKind::Punct("{")
        )
    }

    fn recover_to_member_boundary(&mut self) {
        if self.is_eof() {
            return;
        }
        self.advance();
        let mut depth = 0i32;
        while !self.is_eof() {
            if self.at_punct("{") {
                depth += 1;
                self.advance();
                continue;
            }
            if self.at_punct("}") {
                if depth == 0 {
                    return;
                }
                depth -= 1;
                self.advance();
                continue;
            }
            if self.at_punct(";") && depth == 0 {
                self.advance();
                return;
            }
            self.advance();
        }
    }

    fn parse_type_params(&mut self) -> Vec<TypeParam> {
        let mut out = Vec::new();
        if !self.eat_punct("<") {
            return out;
        }
        loop {
            let name = match self.ident() {
                Some(n) => n,
                None => break,
            };
            let mut bounds = Vec::new();
            if self.at_ident("extends") {
                self.advance();
                loop {
                    if let Some(t) = self.parse_type_ref() {
                        bounds.push(t);
                    }
                    if self.eat_punct("&") {
                        continue;
                    }
                    break;
                }
            }
            out.push(TypeParam { name, bounds });
            if self.eat_punct(",") {
                continue;
            }
            break;
        }
        self.eat_punct(">");
        out
    }

    fn parse_type_ref(&mut self) -> Option<TypeRefSyntax> {
        self.skip_annotations();
        let (is_primitive, is_void, base) = match self.peek().clone() {
            TokenKind::Ident(w) if w == "void" => {
                self.advance();
                (false, true, w)
            }
            TokenKind::Ident(w) if PRIMITIVE_WORDS.contains(&w.as_str()) => {
                self.advance();
                (true, false, w)
            }
            TokenKind::Ident(_) => {
                let name = self.dotted_name()?;
                (false, false, name)
            }
            TokenKind::Punct("?") => {
                self.advance();
                if self.at_ident("extends") || self.at_ident("super") {
                    self.advance();
                    return self.parse_type_ref();
                }
                (false, false, "?".to_string())
            }
            _ => return None,
        };

        let type_args = self.parse_type_args();

        let mut array_dims = 0;
        while self.at_punct("[") && matches!(self.peek_at(1), TokenKind::Punct("]")) {
            self.advance();
            self.advance();
            array_dims += 1;
        }

        Some(TypeRefSyntax {
            name: base,
            type_args,
            array_dims,
            is_primitive,
            is_void,
        })
    }

    fn parse_type_args(&mut self) -> Vec<TypeRefSyntax> {
        let mut out = Vec::new();
        if !self.at_punct("<") {
            return out;
        }
        // Diamond: `<>` with no args.
        if matches!(self.peek_at(1), TokenKind::Punct(">")) {
            self.advance();
            self.advance();
            return out;
        }
        let save = self.pos;
        self.advance();
        loop {
            match self.parse_type_ref() {
                Some(t) => out.push(t),
                None => {
                    // Not actually a generic argument list (e.g. `a < b`);
                    // back out and report no type arguments.
                    self.pos = save;
                    return Vec::new();
                }
            }
            if self.eat_punct(",") {
                continue;
            }
            break;
        }
        if !self.eat_punct(">") {
            // `>>` and `>>>` are lexed as single tokens when closing nested
            // generics; split them by re-synthesizing the remainder.
            if self.at_punct(">>") || self.at_punct(">>>") {
                self.advance();
            } else {
                self.pos = save;
                return Vec::new();
            }
        }
        out
    }

    fn parse_member(&mut self, enclosing_name: &str) -> Option<Member> {
        let annotations = self.skip_annotations();
        let modifiers = self.parse_modifiers();

        if self.at_punct("{") {
            self.advance();
            self.skip_balanced("{", "}");
            return Some(Member::Initializer);
        }

        if matches!(
            self.peek(),
            TokenKind::Ident(w) if matches!(w.as_str(), "class" | "interface" | "enum" | "record")
        ) || (self.at_punct("@") && matches!(self.peek_at(1), TokenKind::Ident(w) if w == "interface"))
        {
            let nested = self.parse_type_decl_with(modifiers, annotations)?;
            return Some(Member::NestedType(nested));
        }

        let type_params = self.parse_type_params();

        // Constructor: bare name immediately followed by `(`.
        if let TokenKind::Ident(name) = self.peek().clone() {
            if name == enclosing_name && matches!(self.peek_at(1), TokenKind::Punct("(")) {
                self.advance();
                let params = self.parse_params();
                let thrown = self.parse_throws();
                let body = if self.at_punct("{") {
                    self.parse_block()
                } else {
                    self.eat_punct(";");
                    Block::default()
                };
                return Some(Member::Constructor(CtorDecl {
                    modifiers,
                    params,
                    thrown,
                    body,
                }));
            }
        }

        let return_type = self.parse_type_ref()?;
        let name = self.ident()?;

        if self.at_punct("(") {
            self.advance();
            let params = self.parse_params_inner();
            let thrown = self.parse_throws();
            let body = if self.at_punct("{") {
                Some(self.parse_block())
            } else {
                // Abstract/interface method, or `default` with no body
                // (malformed) — either way, no body to model.
                self.eat_punct(";");
                None
            };
            return Some(Member::Method(MethodDecl {
                modifiers,
                type_params,
                return_type,
                name,
                params,
                thrown,
                body,
            }));
        }

        // Field, possibly multi-declarator (`int a, b = 2;`); only the
        // first declarator is retained since that's all the collector needs
        // per field reference.
        let mut extra_dims = 0u32;
        while self.at_punct("[") && matches!(self.peek_at(1), TokenKind::Punct("]")) {
            self.advance();
            self.advance();
            extra_dims += 1;
        }
        let mut field_ty = return_type;
        field_ty.array_dims += extra_dims;

        let initializer = if self.eat_punct("=") {
            Some(self.parse_expr_skip())
        } else {
            None
        };

        // Skip any further comma-separated declarators to the terminator.
        while self.eat_punct(",") {
            let _ = self.ident();
            while self.at_punct("[") && matches!(self.peek_at(1), TokenKind::Punct("]")) {
                self.advance();
                self.advance();
            }
            if self.eat_punct("=") {
                self.parse_expr_skip();
            }
        }
        self.eat_punct(";");

        Some(Member::Field(FieldDecl {
            modifiers,
            ty: field_ty,
            name,
            initializer,
        }))
    }

    fn parse_type_decl_with(&mut self, modifiers: Modifiers, annotations: Vec<Annotation>) -> Option<TypeDecl> {
        let kind = if self.at_punct("@") {
            self.advance();
            self.advance();
            DeclKind::AnnotationType
        } else if self.at_ident("class") {
            self.advance();
            DeclKind::Class
        } else if self.at_ident("interface") {
            self.advance();
            DeclKind::Interface
        } else if self.at_ident("enum") {
            self.advance();
            DeclKind::Enum
        } else if self.at_ident("record") {
            self.advance();
            DeclKind::Record
        } else {
            return None;
        };
        let name = self.ident()?;
        let type_params = self.parse_type_params();
        if kind == DeclKind::Record && self.at_punct("(") {
            self.advance();
            self.skip_balanced("(", ")");
        }
        let mut extends = Vec::new();
        let mut implements = Vec::new();
        if self.at_ident("extends") {
            self.advance();
            loop {
                if let Some(t) = self.parse_type_ref() {
                    extends.push(t);
                }
                if self.eat_punct(",") {
                    continue;
                }
                break;
            }
        }
        if self.at_ident("implements") {
            self.advance();
            loop {
                if let Some(t) = self.parse_type_ref() {
                    implements.push(t);
                }
                if self.eat_punct(",") {
                    continue;
                }
                break;
            }
        }
        let mut members = Vec::new();
        if self.eat_punct("{") {
            while !self.at_punct("}") && !self.is_eof() {
                if self.eat_punct(";") {
                    continue;
                }
                if kind == DeclKind::Enum && self.looks_like_enum_constant() {
                    self.ident();
                    if self.eat_punct("(") {
                        self.skip_balanced("(", ")");
                    }
                    if self.eat_punct("{") {
                        self.skip_balanced("{", "}");
                    }
                    self.eat_punct(",");
                    continue;
                }
                if let Some(member) = self.parse_member(&name) {
                    members.push(member);
                } else {
                    self.recover_to_member_boundary();
                }
            }
            self.eat_punct("}");
        }
        Some(TypeDecl {
            kind,
            modifiers,
            name,
            type_params,
            extends,
            implements,
            members,
            annotations,
        })
    }

    fn parse_params(&mut self) -> Vec<Param> {
        if !self.eat_punct("(") {
            return Vec::new();
        }
        self.parse_params_inner()
    }

    fn parse_params_inner(&mut self) -> Vec<Param> {
        let mut out = Vec::new();
        if self.eat_punct(")") {
            return out;
        }
        loop {
            self.skip_annotations();
            let _ = self.parse_modifiers();
            let ty = match self.parse_type_ref() {
                Some(t) => t,
                None => {
                    self.skip_balanced("(", ")");
                    return out;
                }
            };
            let is_varargs = self.eat_punct("...");
            let name = self.ident().unwrap_or_default();
            let mut dims = 0;
            while self.at_punct("[") && matches!(self.peek_at(1), TokenKind::Punct("]")) {
                self.advance();
                self.advance();
                dims += 1;
            }
            let mut ty = ty;
            ty.array_dims += dims;
            out.push(Param {
                ty,
                name,
                is_varargs,
            });
            if self.eat_punct(",") {
                continue;
            }
            break;
        }
        self.eat_punct(")");
        out
    }

    fn parse_throws(&mut self) -> Vec<TypeRefSyntax> {
        let mut out = Vec::new();
        if !self.at_ident("throws") {
            return out;
        }
        self.advance();
        loop {
            if let Some(t) = self.parse_type_ref() {
                out.push(t);
            }
            if self.eat_punct(",") {
                continue;
            }
            break;
        }
        out
    }

    fn parse_block(&mut self) -> Block {
        let mut block = Block::default();
        if !self.eat_punct("{") {
            return block;
        }
        while !self.at_punct("}") && !self.is_eof() {
            block.stmts.push(self.parse_stmt());
        }
        self.eat_punct("}");
        block
    }

    fn parse_stmt(&mut self) -> Stmt {
        if self.at_punct("{") {
            return Stmt::Block(self.parse_block());
        }
        if self.at_punct(";") {
            self.advance();
            return Stmt::Unparsed;
        }
        if self.at_ident("return") {
            self.advance();
            if self.at_punct(";") {
                self.advance();
                return Stmt::Return(None);
            }
            let expr = self.parse_expr_skip();
            self.eat_punct(";");
            return Stmt::Return(Some(expr));
        }
        if self.at_ident("throw") {
            self.advance();
            let expr = self.parse_expr_skip();
            self.eat_punct(";");
            return Stmt::Throw(expr);
        }
        if self.at_ident("if") {
            self.advance();
            self.eat_punct("(");
            let cond = self.parse_expr_skip();
            self.skip_to_close_paren();
            let then_branch = Box::new(self.parse_stmt_as_block());
            let else_branch = if self.at_ident("else") {
                self.advance();
                Some(Box::new(self.parse_stmt_as_block()))
            } else {
                None
            };
            return Stmt::If {
                cond,
                then_branch,
                else_branch,
            };
        }
        if self.at_ident("while") {
            self.advance();
            self.eat_punct("(");
            let cond = self.parse_expr_skip();
            self.skip_to_close_paren();
            let body = Box::new(self.parse_stmt_as_block());
            return Stmt::While { cond, body };
        }
        if self.at_ident("for") {
            self.advance();
            if self.eat_punct("(") {
                self.skip_balanced("(", ")");
            }
            let body = Box::new(self.parse_stmt_as_block());
            return Stmt::For { body };
        }
        if matches!(self.peek(), TokenKind::Ident(w) if matches!(w.as_str(), "try" | "switch" | "synchronized" | "do"))
        {
            // Not modeled structurally; consume balanced braces/parens best
            // effort and keep going.
            self.advance();
            if self.at_punct("(") {
                self.advance();
                self.skip_balanced("(", ")");
            }
            if self.at_punct("{") {
                self.advance();
                self.skip_balanced("{", "}");
            }
            return Stmt::Unparsed;
        }

        // Local variable declaration: `Type name = expr;` — disambiguated
        // from a bare expression statement by checking whether a type ref
        // parses cleanly and is followed by an identifier.
        let save = self.pos;
        if let Some(ty) = self.parse_type_ref() {
            if let TokenKind::Ident(name) = self.peek().clone() {
                self.advance();
                let initializer = if self.eat_punct("=") {
                    Some(self.parse_expr_skip())
                } else {
                    None
                };
                while self.eat_punct(",") {
                    let _ = self.ident();
                    if self.eat_punct("=") {
                        self.parse_expr_skip();
                    }
                }
                self.eat_punct(";");
                return Stmt::LocalVar {
                    ty,
                    name,
                    initializer,
                };
            }
        }
        self.pos = save;

        let expr = self.parse_expr_skip();
        self.eat_punct(";");
        Stmt::Expr(expr)
    }

    fn parse_stmt_as_block(&mut self) -> Block {
        if self.at_punct("{") {
            self.parse_block()
        } else {
            Block {
                stmts: vec![self.parse_stmt()],
            }
        }
    }

    fn skip_to_close_paren(&mut self) {
        // Used after already consuming the condition expression inside a
        // `(...)`; closes out any leftover tokens up to and including `)`.
        let mut depth = 0i32;
        while !self.is_eof() {
            if self.at_punct("(") {
                depth += 1;
                self.advance();
                continue;
            }
            if self.at_punct(")") {
                if depth == 0 {
                    self.advance();
                    return;
                }
                depth -= 1;
                self.advance();
                continue;
            }
            if depth == 0 {
                return;
            }
            self.advance();
        }
    }

    /// Parses an expression, falling back to `Expr::Literal` and skipping to
    /// the next statement boundary if nothing recognizable is found.
    fn parse_expr_skip(&mut self) -> Expr {
        let save = self.pos;
        match self.parse_expr(0) {
            Some(e) => e,
            None => {
                self.pos = save;
                self.skip_expr_fragment();
                Expr::Literal
            }
        }
    }

    fn skip_expr_fragment(&mut self) {
        let mut depth = 0i32;
        while !self.is_eof() {
            if self.at_punct("(") || self.at_punct("[") || self.at_punct("{") {
                depth += 1;
            } else if self.at_punct(")") || self.at_punct("]") || self.at_punct("}") {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            } else if depth == 0 && (self.at_punct(";") || self.at_punct(",")) {
                return;
            }
            self.advance();
        }
    }

    fn parse_expr(&mut self, min_prec: u8) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let (op, prec, right_assoc) = match self.peek() {
                TokenKind::Punct(p) if BIN_OPS.iter().any(|(sym, _, _)| sym == p) => {
                    let (_, prec, right_assoc) = BIN_OPS.iter().find(|(sym, _, _)| sym == p).unwrap();
                    (p.to_string(), *prec, *right_assoc)
                }
                _ => break,
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            if op == "=" || op.ends_with('=') && !matches!(op.as_str(), "==" | "!=" | "<=" | ">=") {
                let value = self.parse_expr(if right_assoc { prec } else { prec + 1 })?;
                left = Expr::Assign {
                    target: Box::new(left),
                    value: Box::new(value),
                };
                continue;
            }
            let right = self.parse_expr(prec + 1)?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        if let TokenKind::Punct(p) = self.peek() {
            if matches!(*p, "!" | "~" | "+" | "-" | "++" | "--") {
                let op = p.to_string();
                self.advance();
                let inner = self.parse_unary()?;
                return Some(Expr::Unary {
                    op,
                    expr: Box::new(inner),
                });
            }
        }

        // Cast: `(Type) expr`, disambiguated by checking a type ref parses
        // and is immediately followed by `)` then something unary-looking.
        if self.at_punct("(") {
            let save = self.pos;
            self.advance();
            if let Some(ty) = self.parse_type_ref() {
                if self.eat_punct(")") {
                    if !matches!(
                        self.peek(),
                        TokenKind::Punct(")") | TokenKind::Punct(";") | TokenKind::Punct(",")
                    ) {
                        if let Some(inner) = self.parse_unary() {
                            return Some(Expr::Cast {
                                ty,
                                expr: Box::new(inner),
                            });
                        }
                    }
                }
            }
            self.pos = save;
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_punct(".") {
                if self.at_ident("class") {
                    self.advance();
                    let ty = match &expr {
                        Expr::Ident(n) => TypeRefSyntax::simple(n.clone()),
                        Expr::QualifiedName(segs) => TypeRefSyntax::simple(segs.join(".")),
                        _ => TypeRefSyntax::simple(""),
                    };
                    expr = Expr::ClassLiteral(ty);
                    continue;
                }
                if self.at_ident("new") {
                    // Qualified instance creation, e.g. `outer.new Inner()`.
                    self.advance();
                    let inner = self.parse_new()?;
                    expr = inner;
                    continue;
                }
                let type_args = self.parse_type_args();
                let name = self.ident()?;
                if self.at_punct("(") {
                    self.advance();
                    let args = self.parse_args();
                    expr = Expr::MethodCall {
                        receiver: Some(Box::new(expr)),
                        type_args,
                        name,
                        args,
                    };
                } else {
                    expr = match expr {
                        Expr::QualifiedName(mut segs) => {
                            segs.push(name);
                            Expr::QualifiedName(segs)
                        }
                        other => Expr::FieldAccess {
                            receiver: Box::new(other),
                            name,
                        },
                    };
                }
                continue;
            }
            if self.at_punct("[") {
                self.advance();
                let index = self.parse_expr(0).unwrap_or(Expr::Literal);
                self.eat_punct("]");
                expr = Expr::ArrayAccess {
                    array: Box::new(expr),
                    index: Box::new(index),
                };
                continue;
            }
            if self.at_ident("instanceof") {
                self.advance();
                let ty = self.parse_type_ref()?;
                // Pattern-variable binding, if present, is not modeled.
                let _ = self.ident();
                expr = Expr::InstanceOf {
                    expr: Box::new(expr),
                    ty,
                };
                continue;
            }
            if self.at_punct("++") || self.at_punct("--") {
                let op = if let TokenKind::Punct(p) = self.advance() {
                    p.to_string()
                } else {
                    unreachable!()
                };
                expr = Expr::Unary {
                    op,
                    expr: Box::new(expr),
                };
                continue;
            }
            break;
        }
        Some(expr)
    }

    fn parse_new(&mut self) -> Option<Expr> {
        self.advance(); // `new`
        let _ = self.parse_type_args(); // explicit constructor type witness
        let ty = self.parse_type_ref()?;
        if self.at_punct("[") {
            // Array creation: skip dimension exprs/initializer.
            while self.eat_punct("[") {
                if !self.at_punct("]") {
                    self.parse_expr(0);
                }
                self.eat_punct("]");
            }
            if self.at_punct("{") {
                self.advance();
                self.skip_balanced("{", "}");
            }
            return Some(Expr::New {
                ty,
                args: Vec::new(),
                anon_body: None,
            });
        }
        self.eat_punct("(");
        let args = self.parse_args();
        let anon_body = if self.at_punct("{") {
            let mut members = Vec::new();
            self.advance();
            while !self.at_punct("}") && !self.is_eof() {
                if self.eat_punct(";") {
                    continue;
                }
                if let Some(m) = self.parse_member(&ty.name) {
                    members.push(m);
                } else {
                    self.recover_to_member_boundary();
                }
            }
            self.eat_punct("}");
            Some(members)
        } else {
            None
        };
        Some(Expr::New {
            ty,
            args,
            anon_body,
        })
    }

    fn parse_args(&mut self) -> Vec<Expr> {
        let mut out = Vec::new();
        if self.eat_punct(")") {
            return out;
        }
        loop {
            out.push(self.parse_expr_skip());
            if self.eat_punct(",") {
                continue;
            }
            break;
        }
        self.eat_punct(")");
        out
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.peek().clone() {
            TokenKind::IntLiteral | TokenKind::FloatLiteral | TokenKind::StringLiteral | TokenKind::CharLiteral => {
                self.advance();
                Some(Expr::Literal)
            }
            TokenKind::Ident(w) if w == "new" => self.parse_new(),
            TokenKind::Ident(w) if matches!(w.as_str(), "true" | "false" | "null" | "this" | "super") => {
                self.advance();
                if self.at_punct("(") {
                    self.advance();
                    let args = self.parse_args();
                    return Some(Expr::MethodCall {
                        receiver: None,
                        type_args: Vec::new(),
                        name: w,
                        args,
                    });
                }
                Some(Expr::Ident(w))
            }
            TokenKind::Ident(_) => {
                // Look ahead for a lambda: `ident ->` or `(a, b) ->`.
                if matches!(self.peek_at(1), TokenKind::Punct("->")) {
                    let name = self.ident()?;
                    self.advance();
                    self.skip_lambda_body();
                    return Some(Expr::Lambda(vec![name]));
                }
                let name = self.ident()?;
                if self.at_punct("(") {
                    self.advance();
                    let args = self.parse_args();
                    return Some(Expr::MethodCall {
                        receiver: None,
                        type_args: Vec::new(),
                        name,
                        args,
                    });
                }
                Some(Expr::Ident(name))
            }
            TokenKind::Punct("(") => {
                let save = self.pos;
                self.advance();
                // Possible lambda with a parenthesized parameter list.
                if let Some(params) = self.try_lambda_params() {
                    if self.eat_punct("->") {
                        self.skip_lambda_body();
                        return Some(Expr::Lambda(params));
                    }
                }
                self.pos = save;
                self.advance();
                let inner = self.parse_expr(0)?;
                self.eat_punct(")");
                Some(Expr::Paren(Box::new(inner)))
            }
            _ => None,
        }
    }

    fn try_lambda_params(&mut self) -> Option<Vec<String>> {
        let mut names = Vec::new();
        if self.at_punct(")") {
            self.advance();
            return Some(names);
        }
        loop {
            let _ = self.parse_type_ref();
            let name = self.ident()?;
            names.push(name);
            if self.eat_punct(",") {
                continue;
            }
            break;
        }
        if self.eat_punct(")") {
            Some(names)
        } else {
            None
        }
    }

    fn skip_lambda_body(&mut self) {
        if self.at_punct("{") {
            self.advance();
            self.skip_balanced("{", "}");
        } else {
            self.skip_expr_fragment();
        }
    }
}

/// `(symbol, precedence, right_associative)`, lowest to highest.
const BIN_OPS: &[(&str, u8, bool)] = &[
    ("=", 1, true),
    ("+=", 1, true),
    ("-=", 1, true),
    ("*=", 1, true),
    ("/=", 1, true),
    ("%=", 1, true),
    ("&=", 1, true),
    ("|=", 1, true),
    ("^=", 1, true),
    ("<<=", 1, true),
    (">>=", 1, true),
    ("||", 2, false),
    ("&&", 3, false),
    ("|", 4, false),
    ("^", 5, false),
    ("&", 6, false),
    ("==", 7, false),
    ("!=", 7, false),
    ("<", 8, false),
    (">", 8, false),
    ("<=", 8, false),
    (">=", 8, false),
    ("<<", 9, false),
    (">>", 9, false),
    ("+", 10, false),
    ("-", 10, false),
    ("*", 11, false),
    ("/", 11, false),
    ("%", 11, false),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_and_imports() {
        let unit = parse(
            r#"
            package com.acme.widgets;
            import java.util.List;
            import static java.util.Map.Entry;
            import java.util.*;

            class Foo {}
            "#,
        );
        assert_eq!(unit.package.as_deref(), Some("com.acme.widgets"));
        assert_eq!(unit.imports.len(), 3);
        assert!(unit.imports[1].is_static);
        assert!(unit.imports[2].is_wildcard);
        assert_eq!(unit.types.len(), 1);
        assert_eq!(unit.types[0].name, "Foo");
    }

    #[test]
    fn parses_class_with_superclass_and_interfaces() {
        let unit = parse(
            r#"
            class Widget extends Base implements Runnable, java.io.Closeable {
            }
            "#,
        );
        let t = &unit.types[0];
        assert_eq!(t.extends.len(), 1);
        assert_eq!(t.extends[0].name, "Base");
        assert_eq!(t.implements.len(), 2);
        assert_eq!(t.implements[1].name, "java.io.Closeable");
    }

    #[test]
    fn parses_method_with_generic_return_and_params() {
        let unit = parse(
            r#"
            class Repo {
                public List<Item> find(String id, int limit) throws IOException {
                    return null;
                }
            }
            "#,
        );
        let Member::Method(m) = &unit.types[0].members[0] else {
            panic!("expected method");
        };
        assert_eq!(m.name, "find");
        assert_eq!(m.return_type.name, "List");
        assert_eq!(m.return_type.type_args.len(), 1);
        assert_eq!(m.params.len(), 2);
        assert_eq!(m.thrown.len(), 1);
        assert!(m.body.is_some());
    }

    #[test]
    fn abstract_interface_method_has_no_body() {
        let unit = parse(
            r#"
            interface Greeter {
                String greet(String name);
                default String loudGreet(String name) { return greet(name); }
            }
            "#,
        );
        let Member::Method(m0) = &unit.types[0].members[0] else {
            panic!("expected method");
        };
        assert!(m0.body.is_none());
        let Member::Method(m1) = &unit.types[0].members[1] else {
            panic!("expected method");
        };
        assert!(m1.body.is_some());
    }

    #[test]
    fn recovers_past_unparseable_statement() {
        let unit = parse(
            r#"
            class Weird {
                void run() {
                    switch (x) { case 1 -> System.out.println("a"); default -> {} }
                    int total = compute();
                }
            }
            "#,
        );
        let Member::Method(m) = &unit.types[0].members[0] else {
            panic!("expected method");
        };
        let body = m.body.as_ref().unwrap();
        assert!(body.stmts.iter().any(|s| matches!(s, Stmt::LocalVar { name, .. } if name == "total")));
    }

    #[test]
    fn classifies_static_and_instance_member_invocations() {
        let unit = parse(
            r#"
            class Caller {
                void run() {
                    Helper.doThing();
                    this.value = Helper.CONST;
                    java.util.Objects.requireNonNull(value);
                }
            }
            "#,
        );
        let Member::Method(m) = &unit.types[0].members[0] else {
            panic!("expected method");
        };
        assert_eq!(m.body.as_ref().unwrap().stmts.len(), 3);
    }
}
