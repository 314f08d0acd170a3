//! Recursive-descent parser for the supported Go subset.
//!
//! Stops at the first syntax error. Unsupported constructs (generics,
//! labels, type switches and type assertions) are reported as errors rather
//! than skipped, so a successful parse always round-trips through the
//! printer.

use crate::error::ParseError;
use crate::lexer::{Tok, Token};
use quickfix_types::ast::{
    AssignTok, BranchTok, ChanDir, DeclKeyword, Field, File, FuncDecl, GenDecl, ImportSpec, LitKind,
    Signature, TypeSpec, UnaryOp, ValueSpec,
};
use quickfix_types::ast::Comment;
use quickfix_types::{Ast, Ident, NodeId, NodeKind, Pos, SourceFile, Span};

type PResult<T> = Result<T, ParseError>;

/// Result of parsing a simple statement before the caller knows which
/// context it belongs to.
enum Simple {
    Expr(NodeId),
    Stmt(NodeId),
    Range {
        key: Option<NodeId>,
        value: Option<NodeId>,
        tok: Option<AssignTok>,
        x: NodeId,
    },
}

/// One entry of a parameter list before names and types are paired up.
enum Param {
    Bare(Ident),
    Typed(Option<Ident>, NodeId),
}

pub(crate) struct Parser<'a> {
    file: &'a SourceFile,
    ast: &'a mut Ast,
    tokens: Vec<Token>,
    at: usize,
    prev_end: Pos,
    /// Negative inside control clauses, where `T {` opens a block instead of
    /// a composite literal.
    expr_lev: i32,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(file: &'a SourceFile, ast: &'a mut Ast, tokens: Vec<Token>) -> Self {
        Self {
            file,
            ast,
            tokens,
            at: 0,
            prev_end: file.base(),
            expr_lev: 0,
        }
    }

    // ---- token plumbing ----

    fn tok(&self) -> &Tok {
        &self.tokens[self.at].tok
    }

    fn pos(&self) -> Pos {
        self.tokens[self.at].pos
    }

    fn is(&self, want: &Tok) -> bool {
        self.tok() == want
    }

    fn is_semi(&self) -> bool {
        matches!(self.tok(), Tok::Semi { .. })
    }

    fn next(&mut self) {
        if self.tokens[self.at].tok != Tok::Eof {
            self.prev_end = self.tokens[self.at].end;
            self.at += 1;
        }
    }

    fn error(&self, pos: Pos, message: impl Into<String>) -> ParseError {
        ParseError {
            position: self.file.position(pos),
            message: message.into(),
        }
    }

    fn unexpected(&self, want: &str) -> ParseError {
        let found = match self.tok() {
            Tok::Semi { auto: true } => "newline".to_string(),
            t => format!("'{}'", t.describe()),
        };
        self.error(self.pos(), format!("expected {want}, found {found}"))
    }

    fn expect(&mut self, want: Tok) -> PResult<Pos> {
        if *self.tok() != want {
            return Err(self.unexpected(&format!("'{}'", want.describe())));
        }
        let pos = self.pos();
        self.next();
        Ok(pos)
    }

    /// A statement terminator; may be omitted before a closing `)` or `}`.
    fn expect_semi(&mut self) -> PResult<()> {
        match self.tok() {
            Tok::Semi { .. } => {
                self.next();
                Ok(())
            }
            Tok::RParen | Tok::RBrace => Ok(()),
            _ => Err(self.unexpected("';'")),
        }
    }

    fn span_from(&self, lo: Pos) -> Span {
        Span::new(lo, self.prev_end)
    }

    fn alloc(&mut self, lo: Pos, kind: NodeKind) -> NodeId {
        let span = self.span_from(lo);
        self.ast.alloc(span, kind)
    }

    fn lo(&self, id: NodeId) -> Pos {
        self.ast.span(id).lo
    }

    fn ident(&mut self) -> PResult<Ident> {
        match self.tok() {
            Tok::Ident(name) => {
                let ident = Ident::new(name.clone(), self.pos());
                self.next();
                Ok(ident)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn ident_list(&mut self) -> PResult<Vec<Ident>> {
        let mut names = vec![self.ident()?];
        while self.is(&Tok::Comma) {
            self.next();
            names.push(self.ident()?);
        }
        Ok(names)
    }

    fn ident_node(&mut self, ident: Ident) -> NodeId {
        let span = Span::new(ident.pos, ident.pos.add(ident.name.len()));
        self.ast.alloc(span, NodeKind::Ident { name: ident.name })
    }

    // ---- files and declarations ----

    pub(crate) fn parse_file(&mut self, comments: Vec<Comment>) -> PResult<NodeId> {
        self.expect(Tok::Package)?;
        let package = self.ident()?;
        if package.is_blank() {
            return Err(self.error(package.pos, "invalid package name _"));
        }
        self.expect_semi()?;

        let mut imports = Vec::new();
        let mut decls = Vec::new();

        while self.is(&Tok::Import) {
            let decl = self.gen_decl(DeclKeyword::Import)?;
            if let NodeKind::GenDecl(d) = self.ast.kind(decl) {
                imports.extend(d.specs.iter().copied());
            }
            decls.push(decl);
            self.expect_semi()?;
        }

        while !self.is(&Tok::Eof) {
            let decl = match self.tok() {
                Tok::Var => self.gen_decl(DeclKeyword::Var)?,
                Tok::Const => self.gen_decl(DeclKeyword::Const)?,
                Tok::Type => self.gen_decl(DeclKeyword::Type)?,
                Tok::Func => self.func_decl()?,
                Tok::Import => {
                    return Err(self.error(self.pos(), "imports must appear before other declarations"));
                }
                _ => return Err(self.unexpected("declaration")),
            };
            decls.push(decl);
            if !self.is(&Tok::Eof) {
                if !self.is_semi() {
                    return Err(self.unexpected("';'"));
                }
                self.next();
            }
        }

        let file = File {
            package,
            imports,
            decls,
            comments,
        };
        Ok(self.ast.alloc(self.file.span(), NodeKind::File(file)))
    }

    fn gen_decl(&mut self, keyword: DeclKeyword) -> PResult<NodeId> {
        let lo = self.pos();
        self.next();

        let mut specs = Vec::new();
        let grouped = self.is(&Tok::LParen);
        if grouped {
            self.next();
            while !self.is(&Tok::RParen) && !self.is(&Tok::Eof) {
                let index = specs.len();
                specs.push(self.spec(keyword, index)?);
                self.expect_semi()?;
            }
            self.expect(Tok::RParen)?;
        } else {
            specs.push(self.spec(keyword, 0)?);
        }

        Ok(self.alloc(
            lo,
            NodeKind::GenDecl(GenDecl {
                keyword,
                specs,
                grouped,
            }),
        ))
    }

    fn spec(&mut self, keyword: DeclKeyword, index: usize) -> PResult<NodeId> {
        let lo = self.pos();
        match keyword {
            DeclKeyword::Import => {
                let name = match self.tok() {
                    Tok::Ident(_) => Some(self.ident()?),
                    Tok::Period => {
                        let pos = self.pos();
                        self.next();
                        Some(Ident::new(".", pos))
                    }
                    _ => None,
                };
                let Tok::Str(path) = self.tok().clone() else {
                    return Err(self.unexpected("import path"));
                };
                let path_pos = self.pos();
                self.next();
                Ok(self.alloc(
                    lo,
                    NodeKind::ImportSpec(ImportSpec {
                        name,
                        path,
                        path_pos,
                    }),
                ))
            }
            DeclKeyword::Var | DeclKeyword::Const => {
                let names = self.ident_list()?;
                let ty = if !self.is(&Tok::Assign) && !self.is_semi() && !self.is(&Tok::RParen) {
                    Some(self.ty()?)
                } else {
                    None
                };
                let values = if self.is(&Tok::Assign) {
                    self.next();
                    self.expr_list()?
                } else {
                    Vec::new()
                };
                if keyword == DeclKeyword::Var && ty.is_none() && values.is_empty() {
                    return Err(self.error(lo, "missing variable type or initialization"));
                }
                if keyword == DeclKeyword::Const && index == 0 && values.is_empty() {
                    return Err(self.error(lo, "missing constant value"));
                }
                Ok(self.alloc(lo, NodeKind::ValueSpec(ValueSpec { names, ty, values })))
            }
            DeclKeyword::Type => {
                let name = self.ident()?;
                if self.is(&Tok::LBrack) {
                    return Err(self.error(self.pos(), "type parameters are not supported"));
                }
                let alias = self.is(&Tok::Assign);
                if alias {
                    self.next();
                }
                let ty = self.ty()?;
                Ok(self.alloc(lo, NodeKind::TypeSpec(TypeSpec { name, alias, ty })))
            }
        }
    }

    fn func_decl(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        self.next();

        let recv = if self.is(&Tok::LParen) {
            let at = self.pos();
            let mut params = self.parameters()?;
            if params.len() != 1 {
                return Err(self.error(at, "method must have exactly one receiver"));
            }
            params.pop()
        } else {
            None
        };

        let name = self.ident()?;
        if self.is(&Tok::LBrack) {
            return Err(self.error(self.pos(), "type parameters are not supported"));
        }
        let sig = self.signature()?;
        let body = if self.is(&Tok::LBrace) {
            self.expr_lev += 1;
            let body = self.block();
            self.expr_lev -= 1;
            Some(body?)
        } else {
            None
        };

        Ok(self.alloc(
            lo,
            NodeKind::FuncDecl(FuncDecl {
                recv,
                name,
                sig,
                body,
            }),
        ))
    }

    fn signature(&mut self) -> PResult<Signature> {
        let params = self.parameters()?;
        let results = if self.is(&Tok::LParen) {
            self.parameters()?
        } else if self.starts_type() {
            vec![Field {
                names: Vec::new(),
                ty: self.ty()?,
                tag: None,
            }]
        } else {
            Vec::new()
        };
        Ok(Signature { params, results })
    }

    fn starts_type(&self) -> bool {
        matches!(
            self.tok(),
            Tok::Ident(_)
                | Tok::LBrack
                | Tok::Struct
                | Tok::Mul
                | Tok::Func
                | Tok::Interface
                | Tok::Map
                | Tok::Chan
                | Tok::Arrow
        )
    }

    fn parameters(&mut self) -> PResult<Vec<Field>> {
        let open = self.expect(Tok::LParen)?;

        let mut entries = Vec::new();
        while !self.is(&Tok::RParen) && !self.is(&Tok::Eof) {
            entries.push(self.param_entry()?);
            if !self.is(&Tok::Comma) {
                break;
            }
            self.next();
        }
        self.expect(Tok::RParen)?;

        let named = entries.iter().any(|e| matches!(e, Param::Typed(Some(_), _)));
        if !named {
            return Ok(entries
                .into_iter()
                .map(|e| match e {
                    Param::Bare(ident) => Field {
                        names: Vec::new(),
                        ty: self.ident_node(ident),
                        tag: None,
                    },
                    Param::Typed(_, ty) => Field {
                        names: Vec::new(),
                        ty,
                        tag: None,
                    },
                })
                .collect());
        }

        let mut fields = Vec::new();
        let mut pending = Vec::new();
        for entry in entries {
            match entry {
                Param::Bare(ident) => pending.push(ident),
                Param::Typed(Some(name), ty) => {
                    pending.push(name);
                    fields.push(Field {
                        names: std::mem::take(&mut pending),
                        ty,
                        tag: None,
                    });
                }
                Param::Typed(None, _) => {
                    return Err(self.error(open, "mixed named and unnamed parameters"));
                }
            }
        }
        if !pending.is_empty() {
            return Err(self.error(open, "mixed named and unnamed parameters"));
        }
        Ok(fields)
    }

    fn param_entry(&mut self) -> PResult<Param> {
        let Tok::Ident(_) = self.tok() else {
            return Ok(Param::Typed(None, self.param_type()?));
        };

        let ident = self.ident()?;
        match self.tok() {
            Tok::Comma | Tok::RParen => Ok(Param::Bare(ident)),
            Tok::Period => {
                let lo = ident.pos;
                let x = self.ident_node(ident);
                self.next();
                let sel = self.ident()?;
                Ok(Param::Typed(None, self.alloc(lo, NodeKind::Selector { x, sel })))
            }
            _ => Ok(Param::Typed(Some(ident), self.param_type()?)),
        }
    }

    fn param_type(&mut self) -> PResult<NodeId> {
        if self.is(&Tok::Ellipsis) {
            let lo = self.pos();
            self.next();
            let elt = self.ty()?;
            return Ok(self.alloc(lo, NodeKind::Ellipsis { elt }));
        }
        self.ty()
    }

    // ---- types ----

    fn ty(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        match self.tok() {
            Tok::Ident(_) => self.type_name(),
            Tok::LBrack => {
                self.next();
                let len = if self.is(&Tok::RBrack) {
                    None
                } else {
                    self.expr_lev += 1;
                    let len = self.expr();
                    self.expr_lev -= 1;
                    Some(len?)
                };
                self.expect(Tok::RBrack)?;
                let elt = self.ty()?;
                Ok(self.alloc(lo, NodeKind::ArrayType { len, elt }))
            }
            Tok::Struct => self.struct_type(),
            Tok::Interface => self.interface_type(),
            Tok::Mul => {
                self.next();
                let x = self.ty()?;
                Ok(self.alloc(lo, NodeKind::Star { x }))
            }
            Tok::Func => {
                self.next();
                let sig = self.signature()?;
                Ok(self.alloc(lo, NodeKind::FuncType { sig }))
            }
            Tok::Map => {
                self.next();
                self.expect(Tok::LBrack)?;
                let key = self.ty()?;
                self.expect(Tok::RBrack)?;
                let value = self.ty()?;
                Ok(self.alloc(lo, NodeKind::MapType { key, value }))
            }
            Tok::Chan => {
                self.next();
                let dir = if self.is(&Tok::Arrow) {
                    self.next();
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let value = self.ty()?;
                Ok(self.alloc(lo, NodeKind::ChanType { dir, value }))
            }
            Tok::Arrow => {
                self.next();
                self.expect(Tok::Chan)?;
                let value = self.ty()?;
                Ok(self.alloc(
                    lo,
                    NodeKind::ChanType {
                        dir: ChanDir::Recv,
                        value,
                    },
                ))
            }
            Tok::LParen => {
                self.next();
                let x = self.ty()?;
                self.expect(Tok::RParen)?;
                Ok(self.alloc(lo, NodeKind::Paren { x }))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    /// `T` or `pkg.T`.
    fn type_name(&mut self) -> PResult<NodeId> {
        let ident = self.ident()?;
        let lo = ident.pos;
        let x = self.ident_node(ident);
        if !self.is(&Tok::Period) {
            return Ok(x);
        }
        self.next();
        let sel = self.ident()?;
        Ok(self.alloc(lo, NodeKind::Selector { x, sel }))
    }

    fn struct_type(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        self.next();
        self.expect(Tok::LBrace)?;

        let mut fields = Vec::new();
        while !self.is(&Tok::RBrace) && !self.is(&Tok::Eof) {
            fields.push(self.struct_field()?);
            self.expect_semi()?;
        }
        self.expect(Tok::RBrace)?;
        Ok(self.alloc(lo, NodeKind::StructType { fields }))
    }

    fn struct_field(&mut self) -> PResult<Field> {
        let (names, ty) = match self.tok() {
            Tok::Mul => {
                let lo = self.pos();
                self.next();
                let x = self.type_name()?;
                (Vec::new(), self.alloc(lo, NodeKind::Star { x }))
            }
            Tok::Ident(_) => {
                let first = self.ident()?;
                match self.tok() {
                    Tok::Semi { .. } | Tok::RBrace | Tok::Str(_) => (Vec::new(), self.ident_node(first)),
                    Tok::Period => {
                        let lo = first.pos;
                        let x = self.ident_node(first);
                        self.next();
                        let sel = self.ident()?;
                        (Vec::new(), self.alloc(lo, NodeKind::Selector { x, sel }))
                    }
                    _ => {
                        let mut names = vec![first];
                        while self.is(&Tok::Comma) {
                            self.next();
                            names.push(self.ident()?);
                        }
                        (names, self.ty()?)
                    }
                }
            }
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        let tag = match self.tok() {
            Tok::Str(tag) => {
                let tag = tag.clone();
                self.next();
                Some(tag)
            }
            _ => None,
        };
        Ok(Field { names, ty, tag })
    }

    fn interface_type(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        self.next();
        self.expect(Tok::LBrace)?;

        let mut methods = Vec::new();
        while !self.is(&Tok::RBrace) && !self.is(&Tok::Eof) {
            let name = self.ident()?;
            let field = match self.tok() {
                Tok::LParen => {
                    let at = self.pos();
                    let sig = self.signature()?;
                    let ty = self.alloc(at, NodeKind::FuncType { sig });
                    Field {
                        names: vec![name],
                        ty,
                        tag: None,
                    }
                }
                Tok::Period => {
                    let lo = name.pos;
                    let x = self.ident_node(name);
                    self.next();
                    let sel = self.ident()?;
                    Field {
                        names: Vec::new(),
                        ty: self.alloc(lo, NodeKind::Selector { x, sel }),
                        tag: None,
                    }
                }
                _ => Field {
                    names: Vec::new(),
                    ty: self.ident_node(name),
                    tag: None,
                },
            };
            methods.push(field);
            self.expect_semi()?;
        }
        self.expect(Tok::RBrace)?;
        Ok(self.alloc(lo, NodeKind::InterfaceType { methods }))
    }

    // ---- expressions ----

    fn expr_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut list = vec![self.expr()?];
        while self.is(&Tok::Comma) {
            self.next();
            list.push(self.expr()?);
        }
        Ok(list)
    }

    fn expr(&mut self) -> PResult<NodeId> {
        self.binary_expr(1)
    }

    fn binary_expr(&mut self, prec1: u8) -> PResult<NodeId> {
        let mut x = self.unary_expr()?;
        loop {
            let Some(op) = self.tok().binary_op() else {
                return Ok(x);
            };
            let prec = op.precedence();
            if prec < prec1 {
                return Ok(x);
            }
            self.next();
            let y = self.binary_expr(prec + 1)?;
            let lo = self.lo(x);
            x = self.alloc(lo, NodeKind::Binary { op, x, y });
        }
    }

    fn unary_expr(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        let op = match self.tok() {
            Tok::Add => UnaryOp::Plus,
            Tok::Sub => UnaryOp::Neg,
            Tok::Not => UnaryOp::Not,
            Tok::Xor => UnaryOp::Xor,
            Tok::And => UnaryOp::Addr,
            Tok::Arrow => {
                self.next();
                if self.is(&Tok::Chan) {
                    self.next();
                    let value = self.ty()?;
                    return Ok(self.alloc(
                        lo,
                        NodeKind::ChanType {
                            dir: ChanDir::Recv,
                            value,
                        },
                    ));
                }
                let x = self.unary_expr()?;
                return Ok(self.alloc(
                    lo,
                    NodeKind::Unary {
                        op: UnaryOp::Recv,
                        x,
                    },
                ));
            }
            Tok::Mul => {
                self.next();
                let x = self.unary_expr()?;
                return Ok(self.alloc(lo, NodeKind::Star { x }));
            }
            _ => return self.primary_expr(),
        };
        self.next();
        let x = self.unary_expr()?;
        Ok(self.alloc(lo, NodeKind::Unary { op, x }))
    }

    fn primary_expr(&mut self) -> PResult<NodeId> {
        let mut x = self.operand()?;
        loop {
            let lo = self.lo(x);
            match self.tok() {
                Tok::Period => {
                    self.next();
                    if self.is(&Tok::LParen) {
                        return Err(self.error(self.pos(), "type assertions are not supported"));
                    }
                    let sel = self.ident()?;
                    x = self.alloc(lo, NodeKind::Selector { x, sel });
                }
                Tok::LBrack => {
                    self.next();
                    self.expr_lev += 1;
                    let kind = self.index_or_slice(x);
                    self.expr_lev -= 1;
                    let kind = kind?;
                    self.expect(Tok::RBrack)?;
                    x = self.alloc(lo, kind);
                }
                Tok::LParen => {
                    self.next();
                    self.expr_lev += 1;
                    let args = self.call_args();
                    self.expr_lev -= 1;
                    let (args, ellipsis) = args?;
                    self.expect(Tok::RParen)?;
                    x = self.alloc(
                        lo,
                        NodeKind::Call {
                            fun: x,
                            args,
                            ellipsis,
                        },
                    );
                }
                Tok::LBrace if self.is_literal_type(x) && (self.expr_lev >= 0 || !self.is_type_name(x)) => {
                    x = self.composite_lit(Some(x))?;
                }
                _ => return Ok(x),
            }
        }
    }

    fn index_or_slice(&mut self, x: NodeId) -> PResult<NodeKind> {
        let mut index: [Option<NodeId>; 3] = [None; 3];
        let mut colons = 0;

        if !self.is(&Tok::Colon) {
            index[0] = Some(self.expr()?);
        }
        while self.is(&Tok::Colon) && colons < 2 {
            colons += 1;
            self.next();
            if !self.is(&Tok::Colon) && !self.is(&Tok::RBrack) {
                index[colons] = Some(self.expr()?);
            }
        }

        if colons == 0 {
            let index = index[0].ok_or_else(|| self.unexpected("operand"))?;
            return Ok(NodeKind::Index { x, index });
        }
        if colons == 2 && (index[1].is_none() || index[2].is_none()) {
            return Err(self.error(self.pos(), "middle and final index required in 3-index slice"));
        }
        Ok(NodeKind::Slice {
            x,
            lo: index[0],
            hi: index[1],
            max: index[2],
        })
    }

    fn call_args(&mut self) -> PResult<(Vec<NodeId>, bool)> {
        let mut args = Vec::new();
        let mut ellipsis = false;
        while !self.is(&Tok::RParen) && !self.is(&Tok::Eof) {
            args.push(self.expr()?);
            if self.is(&Tok::Ellipsis) {
                ellipsis = true;
                self.next();
            }
            if !self.is(&Tok::Comma) {
                break;
            }
            self.next();
        }
        Ok((args, ellipsis))
    }

    fn operand(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        let lit = |kind: LitKind, value: &String| NodeKind::BasicLit {
            kind,
            value: value.clone(),
        };
        let kind = match self.tok() {
            Tok::Ident(name) => NodeKind::Ident { name: name.clone() },
            Tok::Int(v) => lit(LitKind::Int, v),
            Tok::Float(v) => lit(LitKind::Float, v),
            Tok::Imag(v) => lit(LitKind::Imag, v),
            Tok::Char(v) => lit(LitKind::Char, v),
            Tok::Str(v) => lit(LitKind::String, v),
            Tok::LParen => {
                self.next();
                self.expr_lev += 1;
                let x = self.expr();
                self.expr_lev -= 1;
                let x = x?;
                self.expect(Tok::RParen)?;
                return Ok(self.alloc(lo, NodeKind::Paren { x }));
            }
            Tok::Func => {
                self.next();
                let sig = self.signature()?;
                if !self.is(&Tok::LBrace) {
                    return Ok(self.alloc(lo, NodeKind::FuncType { sig }));
                }
                self.expr_lev += 1;
                let body = self.block();
                self.expr_lev -= 1;
                let body = body?;
                return Ok(self.alloc(lo, NodeKind::FuncLit { sig, body }));
            }
            Tok::LBrack | Tok::Struct | Tok::Map | Tok::Chan | Tok::Interface => return self.ty(),
            _ => return Err(self.unexpected("operand")),
        };
        self.next();
        Ok(self.alloc(lo, kind))
    }

    fn is_type_name(&self, x: NodeId) -> bool {
        match self.ast.kind(x) {
            NodeKind::Ident { .. } => true,
            NodeKind::Selector { x, .. } => matches!(self.ast.kind(*x), NodeKind::Ident { .. }),
            _ => false,
        }
    }

    fn is_literal_type(&self, x: NodeId) -> bool {
        self.is_type_name(x)
            || matches!(
                self.ast.kind(x),
                NodeKind::ArrayType { .. } | NodeKind::MapType { .. } | NodeKind::StructType { .. }
            )
    }

    fn composite_lit(&mut self, ty: Option<NodeId>) -> PResult<NodeId> {
        let lo = match ty {
            Some(t) => self.lo(t),
            None => self.pos(),
        };
        self.expect(Tok::LBrace)?;
        self.expr_lev += 1;
        let elts = self.composite_elts();
        self.expr_lev -= 1;
        let elts = elts?;
        if self.is_semi() {
            return Err(self.error(self.pos(), "missing ',' before newline in composite literal"));
        }
        self.expect(Tok::RBrace)?;
        Ok(self.alloc(lo, NodeKind::CompositeLit { ty, elts }))
    }

    fn composite_elts(&mut self) -> PResult<Vec<NodeId>> {
        let mut elts = Vec::new();
        while !self.is(&Tok::RBrace) && !self.is(&Tok::Eof) {
            let key = self.element()?;
            let elt = if self.is(&Tok::Colon) {
                self.next();
                let value = self.element()?;
                let lo = self.lo(key);
                self.alloc(lo, NodeKind::KeyValue { key, value })
            } else {
                key
            };
            elts.push(elt);
            if !self.is(&Tok::Comma) {
                break;
            }
            self.next();
        }
        Ok(elts)
    }

    fn element(&mut self) -> PResult<NodeId> {
        if self.is(&Tok::LBrace) {
            self.composite_lit(None)
        } else {
            self.expr()
        }
    }

    // ---- statements ----

    fn block(&mut self) -> PResult<NodeId> {
        let lo = self.expect(Tok::LBrace)?;
        let stmts = self.stmt_list()?;
        self.expect(Tok::RBrace)?;
        Ok(self.alloc(lo, NodeKind::Block { stmts }))
    }

    fn stmt_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut stmts = Vec::new();
        while !matches!(self.tok(), Tok::Case | Tok::Default | Tok::RBrace | Tok::Eof) {
            if self.is_semi() {
                self.next();
                continue;
            }
            stmts.push(self.stmt()?);
            self.expect_semi()?;
        }
        Ok(stmts)
    }

    fn stmt(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        match self.tok() {
            Tok::Var | Tok::Const | Tok::Type => {
                let keyword = match self.tok() {
                    Tok::Var => DeclKeyword::Var,
                    Tok::Const => DeclKeyword::Const,
                    _ => DeclKeyword::Type,
                };
                let decl = self.gen_decl(keyword)?;
                Ok(self.alloc(lo, NodeKind::DeclStmt { decl }))
            }
            Tok::LBrace => self.block(),
            Tok::If => self.if_stmt(),
            Tok::For => self.for_stmt(),
            Tok::Switch => self.switch_stmt(),
            Tok::Select => self.select_stmt(),
            Tok::Return => {
                self.next();
                let results = if self.is_semi() || self.is(&Tok::RBrace) {
                    Vec::new()
                } else {
                    self.expr_list()?
                };
                Ok(self.alloc(lo, NodeKind::Return { results }))
            }
            Tok::Break | Tok::Continue | Tok::Fallthrough => {
                let tok = match self.tok() {
                    Tok::Break => BranchTok::Break,
                    Tok::Continue => BranchTok::Continue,
                    _ => BranchTok::Fallthrough,
                };
                self.next();
                if let Tok::Ident(_) = self.tok() {
                    return Err(self.error(self.pos(), "labels are not supported"));
                }
                Ok(self.alloc(lo, NodeKind::Branch { tok }))
            }
            Tok::Go | Tok::Defer => {
                let is_go = self.is(&Tok::Go);
                self.next();
                let call = self.expr()?;
                if !matches!(self.ast.kind(call), NodeKind::Call { .. }) {
                    let what = if is_go { "go" } else { "defer" };
                    return Err(self.error(self.lo(call), format!("expression in {what} must be function call")));
                }
                let kind = if is_go {
                    NodeKind::Go { call }
                } else {
                    NodeKind::Defer { call }
                };
                Ok(self.alloc(lo, kind))
            }
            Tok::Goto => Err(self.error(lo, "goto is not supported")),
            _ => {
                let simple = self.simple_stmt(false)?;
                self.into_stmt(simple)
            }
        }
    }

    fn simple_stmt(&mut self, range_ok: bool) -> PResult<Simple> {
        if range_ok && self.is(&Tok::Range) {
            self.next();
            let x = self.expr()?;
            return Ok(Simple::Range {
                key: None,
                value: None,
                tok: None,
                x,
            });
        }

        let lhs = self.expr_list()?;
        let lo = self.lo(lhs[0]);

        let tok = match self.tok() {
            Tok::Define => Some(AssignTok::Define),
            Tok::Assign => Some(AssignTok::Assign),
            Tok::OpAssign(op) => Some(AssignTok::Op(*op)),
            _ => None,
        };

        if let Some(tok) = tok {
            let tok_pos = self.pos();
            self.next();

            if range_ok && self.is(&Tok::Range) && !matches!(tok, AssignTok::Op(_)) {
                self.next();
                let x = self.expr()?;
                if lhs.len() > 2 {
                    return Err(self.error(lo, "range clause permits at most two iteration variables"));
                }
                return Ok(Simple::Range {
                    key: lhs.first().copied(),
                    value: lhs.get(1).copied(),
                    tok: Some(tok),
                    x,
                });
            }

            let rhs = self.expr_list()?;
            if matches!(tok, AssignTok::Op(_)) && (lhs.len() > 1 || rhs.len() > 1) {
                return Err(self.error(tok_pos, format!("assignment operation {} requires single-valued expressions", tok.as_str())));
            }
            return Ok(Simple::Stmt(self.alloc(
                lo,
                NodeKind::Assign {
                    lhs,
                    tok,
                    tok_pos,
                    rhs,
                },
            )));
        }

        if lhs.len() > 1 {
            return Err(self.unexpected("':=' or '='"));
        }
        let x = lhs[0];

        match self.tok() {
            Tok::Inc | Tok::Dec => {
                let inc = self.is(&Tok::Inc);
                self.next();
                Ok(Simple::Stmt(self.alloc(lo, NodeKind::IncDec { x, inc })))
            }
            Tok::Arrow => {
                self.next();
                let value = self.expr()?;
                Ok(Simple::Stmt(self.alloc(lo, NodeKind::Send { chan: x, value })))
            }
            Tok::Colon => Err(self.error(self.pos(), "labels are not supported")),
            _ => Ok(Simple::Expr(x)),
        }
    }

    fn into_stmt(&mut self, simple: Simple) -> PResult<NodeId> {
        match simple {
            Simple::Expr(x) => {
                let span = self.ast.span(x);
                Ok(self.ast.alloc(span, NodeKind::ExprStmt { x }))
            }
            Simple::Stmt(s) => Ok(s),
            Simple::Range { x, .. } => Err(self.error(self.lo(x), "unexpected range clause")),
        }
    }

    fn into_expr(&self, simple: Simple, what: &str) -> PResult<NodeId> {
        match simple {
            Simple::Expr(x) => Ok(x),
            Simple::Stmt(s) => Err(self.error(self.lo(s), format!("cannot use statement as {what}"))),
            Simple::Range { x, .. } => Err(self.error(self.lo(x), "unexpected range clause")),
        }
    }

    /// Runs `f` with composite literals disabled at the top level.
    fn control_clause<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let old = self.expr_lev;
        self.expr_lev = -1;
        let out = f(self);
        self.expr_lev = old;
        out
    }

    fn if_stmt(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        self.next();

        let (init, cond) = self.control_clause(|p| {
            if p.is(&Tok::LBrace) {
                return Err(p.error(p.pos(), "missing condition in if statement"));
            }
            let first = if p.is_semi() { None } else { Some(p.simple_stmt(false)?) };
            if p.is_semi() {
                p.next();
                let init = match first {
                    Some(s) => Some(p.into_stmt(s)?),
                    None => None,
                };
                let cond = p.simple_stmt(false)?;
                Ok((init, p.into_expr(cond, "if condition")?))
            } else {
                match first {
                    Some(s) => Ok((None, p.into_expr(s, "if condition")?)),
                    None => Err(p.error(p.pos(), "missing condition in if statement")),
                }
            }
        })?;

        let then = self.block()?;
        let els = if self.is(&Tok::Else) {
            self.next();
            match self.tok() {
                Tok::If => Some(self.if_stmt()?),
                Tok::LBrace => Some(self.block()?),
                _ => return Err(self.error(self.pos(), "else must be followed by if or statement block")),
            }
        } else {
            None
        };

        Ok(self.alloc(
            lo,
            NodeKind::If {
                init,
                cond,
                then,
                els,
            },
        ))
    }

    fn for_stmt(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        self.next();

        let (init, cond, post) = self.control_clause(|p| {
            let mut init = None;
            let mut cond = None;
            let mut post = None;
            if p.is(&Tok::LBrace) {
                return Ok((init, cond, post));
            }
            if !p.is_semi() {
                cond = Some(p.simple_stmt(true)?);
            }
            let is_range = matches!(cond, Some(Simple::Range { .. }));
            if p.is_semi() && !is_range {
                p.next();
                init = cond.take();
                if !p.is_semi() {
                    cond = Some(p.simple_stmt(false)?);
                }
                if !p.is_semi() {
                    return Err(p.unexpected("';'"));
                }
                p.next();
                if !p.is(&Tok::LBrace) {
                    post = Some(p.simple_stmt(false)?);
                }
            }
            Ok((init, cond, post))
        })?;

        let body = self.block()?;

        if let Some(Simple::Range { key, value, tok, x }) = cond {
            return Ok(self.alloc(
                lo,
                NodeKind::Range {
                    key,
                    value,
                    tok,
                    x,
                    body,
                },
            ));
        }

        let init = match init {
            Some(s) => Some(self.into_stmt(s)?),
            None => None,
        };
        let cond = match cond {
            Some(s) => Some(self.into_expr(s, "for condition")?),
            None => None,
        };
        let post = match post {
            Some(s) => Some(self.into_stmt(s)?),
            None => None,
        };
        Ok(self.alloc(
            lo,
            NodeKind::For {
                init,
                cond,
                post,
                body,
            },
        ))
    }

    fn switch_stmt(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        self.next();

        let (init, tag) = self.control_clause(|p| {
            if p.is(&Tok::LBrace) {
                return Ok((None, None));
            }
            let first = if p.is_semi() { None } else { Some(p.simple_stmt(false)?) };
            if p.is_semi() {
                p.next();
                let init = match first {
                    Some(s) => Some(p.into_stmt(s)?),
                    None => None,
                };
                let tag = if p.is(&Tok::LBrace) {
                    None
                } else {
                    let s = p.simple_stmt(false)?;
                    Some(p.into_expr(s, "switch expression")?)
                };
                Ok((init, tag))
            } else {
                match first {
                    Some(s) => Ok((None, Some(p.into_expr(s, "switch expression")?))),
                    None => Ok((None, None)),
                }
            }
        })?;

        let body_lo = self.expect(Tok::LBrace)?;
        let mut clauses = Vec::new();
        while matches!(self.tok(), Tok::Case | Tok::Default) {
            let clause_lo = self.pos();
            let list = if self.is(&Tok::Case) {
                self.next();
                self.expr_list()?
            } else {
                self.next();
                Vec::new()
            };
            self.expect(Tok::Colon)?;
            let body = self.stmt_list()?;
            clauses.push(self.alloc(clause_lo, NodeKind::CaseClause { list, body }));
        }
        self.expect(Tok::RBrace)?;
        let body = self.alloc(body_lo, NodeKind::Block { stmts: clauses });

        Ok(self.alloc(lo, NodeKind::Switch { init, tag, body }))
    }

    fn select_stmt(&mut self) -> PResult<NodeId> {
        let lo = self.pos();
        self.next();

        let body_lo = self.expect(Tok::LBrace)?;
        let mut clauses = Vec::new();
        while matches!(self.tok(), Tok::Case | Tok::Default) {
            let clause_lo = self.pos();
            let comm = if self.is(&Tok::Case) {
                self.next();
                let simple = self.simple_stmt(false)?;
                Some(self.into_stmt(simple)?)
            } else {
                self.next();
                None
            };
            self.expect(Tok::Colon)?;
            let body = self.stmt_list()?;
            clauses.push(self.alloc(clause_lo, NodeKind::CommClause { comm, body }));
        }
        self.expect(Tok::RBrace)?;
        let body = self.alloc(body_lo, NodeKind::Block { stmts: clauses });

        Ok(self.alloc(lo, NodeKind::Select { body }))
    }
}
