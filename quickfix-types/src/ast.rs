//! Arena syntax tree for the supported Go subset.
//!
//! Nodes own their children by [`NodeId`]. Identity of a node is its index and
//! never changes, so ids collected before an edit stay valid after it.

use crate::pos::{Pos, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, span: Span, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { span, kind });
        id
    }

    /// Allocate a node with no source position.
    pub fn synthesize(&mut self, kind: NodeKind) -> NodeId {
        self.alloc(Span::NONE, kind)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn file(&self, id: NodeId) -> Option<&File> {
        match self.kind(id) {
            NodeKind::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn file_mut(&mut self, id: NodeId) -> Option<&mut File> {
        match self.kind_mut(id) {
            NodeKind::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn ident_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Ident { name } => Some(name),
            _ => None,
        }
    }

    /// The statement list owned by a block-like node.
    pub fn stmt_list_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
        match self.kind_mut(id) {
            NodeKind::Block { stmts } => Some(stmts),
            NodeKind::CaseClause { body, .. } | NodeKind::CommClause { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Direct children in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        fn opt(out: &mut Vec<NodeId>, n: &Option<NodeId>) {
            out.extend(n.iter().copied());
        }
        fn fields(out: &mut Vec<NodeId>, fs: &[Field]) {
            out.extend(fs.iter().map(|f| f.ty));
        }

        let mut out = Vec::new();

        match self.kind(id) {
            NodeKind::File(f) => out.extend(&f.decls),
            NodeKind::GenDecl(d) => out.extend(&d.specs),
            NodeKind::ImportSpec(_) => {}
            NodeKind::ValueSpec(s) => {
                opt(&mut out, &s.ty);
                out.extend(&s.values);
            }
            NodeKind::TypeSpec(s) => out.push(s.ty),
            NodeKind::FuncDecl(d) => {
                if let Some(recv) = &d.recv {
                    out.push(recv.ty);
                }
                fields(&mut out, &d.sig.params);
                fields(&mut out, &d.sig.results);
                opt(&mut out, &d.body);
            }
            NodeKind::Block { stmts } => out.extend(stmts),
            NodeKind::ExprStmt { x } => out.push(*x),
            NodeKind::Assign { lhs, rhs, .. } => {
                out.extend(lhs);
                out.extend(rhs);
            }
            NodeKind::IncDec { x, .. } => out.push(*x),
            NodeKind::Send { chan, value } => out.extend([*chan, *value]),
            NodeKind::DeclStmt { decl } => out.push(*decl),
            NodeKind::Return { results } => out.extend(results),
            NodeKind::Branch { .. } => {}
            NodeKind::Go { call } | NodeKind::Defer { call } => out.push(*call),
            NodeKind::If {
                init,
                cond,
                then,
                els,
            } => {
                opt(&mut out, init);
                out.push(*cond);
                out.push(*then);
                opt(&mut out, els);
            }
            NodeKind::For {
                init,
                cond,
                post,
                body,
            } => {
                opt(&mut out, init);
                opt(&mut out, cond);
                opt(&mut out, post);
                out.push(*body);
            }
            NodeKind::Range {
                key,
                value,
                x,
                body,
                ..
            } => {
                opt(&mut out, key);
                opt(&mut out, value);
                out.push(*x);
                out.push(*body);
            }
            NodeKind::Switch { init, tag, body } => {
                opt(&mut out, init);
                opt(&mut out, tag);
                out.push(*body);
            }
            NodeKind::CaseClause { list, body, .. } => {
                out.extend(list);
                out.extend(body);
            }
            NodeKind::Select { body } => out.push(*body),
            NodeKind::CommClause { comm, body } => {
                opt(&mut out, comm);
                out.extend(body);
            }
            NodeKind::Ident { .. } | NodeKind::BasicLit { .. } => {}
            NodeKind::CompositeLit { ty, elts } => {
                opt(&mut out, ty);
                out.extend(elts);
            }
            NodeKind::KeyValue { key, value } => out.extend([*key, *value]),
            NodeKind::FuncLit { sig, body } => {
                fields(&mut out, &sig.params);
                fields(&mut out, &sig.results);
                out.push(*body);
            }
            NodeKind::Paren { x } => out.push(*x),
            NodeKind::Selector { x, .. } => out.push(*x),
            NodeKind::Index { x, index } => out.extend([*x, *index]),
            NodeKind::Slice { x, lo, hi, max } => {
                out.push(*x);
                opt(&mut out, lo);
                opt(&mut out, hi);
                opt(&mut out, max);
            }
            NodeKind::Call { fun, args, .. } => {
                out.push(*fun);
                out.extend(args);
            }
            NodeKind::Star { x } | NodeKind::Unary { x, .. } => out.push(*x),
            NodeKind::Binary { x, y, .. } => out.extend([*x, *y]),
            NodeKind::ArrayType { len, elt } => {
                opt(&mut out, len);
                out.push(*elt);
            }
            NodeKind::Ellipsis { elt } => out.push(*elt),
            NodeKind::MapType { key, value } => out.extend([*key, *value]),
            NodeKind::ChanType { value, .. } => out.push(*value),
            NodeKind::FuncType { sig } => {
                fields(&mut out, &sig.params);
                fields(&mut out, &sig.results);
            }
            NodeKind::StructType { fields: fs } | NodeKind::InterfaceType { methods: fs } => {
                fields(&mut out, fs)
            }
        }

        out
    }

    /// Every node reachable from `root`, parents before children.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut kids = self.children(id);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }
}

/// A name that is not itself an expression node (declared names, selectors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
}

impl Ident {
    pub fn new(name: impl Into<String>, pos: Pos) -> Self {
        Self {
            name: name.into(),
            pos,
        }
    }

    pub fn synthetic(name: impl Into<String>) -> Self {
        Self::new(name, Pos::NONE)
    }

    pub fn is_blank(&self) -> bool {
        self.name == crate::DISCARD
    }
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub pos: Pos,
    /// Raw text including the `//` or `/* */` delimiters.
    pub text: String,
}

impl Comment {
    pub fn is_line(&self) -> bool {
        self.text.starts_with("//")
    }
}

/// One translation unit.
#[derive(Debug, Clone)]
pub struct File {
    pub package: Ident,
    /// Flattened import specs of every import declaration, in source order.
    pub imports: Vec<NodeId>,
    pub decls: Vec<NodeId>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub name: Option<Ident>,
    /// The path literal exactly as written, quotes included.
    pub path: String,
    pub path_pos: Pos,
}

impl ImportSpec {
    /// Unquoted import path.
    pub fn unquoted(&self) -> &str {
        self.path
            .trim_start_matches(['"', '`'])
            .trim_end_matches(['"', '`'])
    }

    pub fn is_blank(&self) -> bool {
        self.name.as_ref().is_some_and(Ident::is_blank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Import,
    Var,
    Const,
    Type,
}

impl DeclKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKeyword::Import => "import",
            DeclKeyword::Var => "var",
            DeclKeyword::Const => "const",
            DeclKeyword::Type => "type",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenDecl {
    pub keyword: DeclKeyword,
    pub specs: Vec<NodeId>,
    /// Written with parentheses.
    pub grouped: bool,
}

#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<NodeId>,
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    /// `type A = B`
    pub alias: bool,
    pub ty: NodeId,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub recv: Option<Field>,
    pub name: Ident,
    pub sig: Signature,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// Parameter, result, struct field or interface method. Embedded fields have
/// no names.
#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: NodeId,
    /// Struct tag literal, quotes included.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignTok {
    /// `:=`
    Define,
    /// `=`
    Assign,
    /// `+=`, `<<=`, ...
    Op(BinaryOp),
}

impl AssignTok {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignTok::Define => ":=",
            AssignTok::Assign => "=",
            AssignTok::Op(op) => op.assign_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchTok {
    Break,
    Continue,
    Fallthrough,
}

impl BranchTok {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchTok::Break => "break",
            BranchTok::Continue => "continue",
            BranchTok::Fallthrough => "fallthrough",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    Xor,
    Addr,
    Recv,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::Xor => "^",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LogOr,
    LogAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    /// Go operator precedence, 1 (lowest) to 5.
    pub fn precedence(self) -> u8 {
        use BinaryOp::*;
        match self {
            LogOr => 1,
            LogAnd => 2,
            Eq | Ne | Lt | Le | Gt | Ge => 3,
            Add | Sub | Or | Xor => 4,
            Mul | Div | Rem | Shl | Shr | And | AndNot => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            LogOr => "||",
            LogAnd => "&&",
            Eq => "==",
            Ne => "!=",
            Lt => "<",
            Le => "<=",
            Gt => ">",
            Ge => ">=",
            Add => "+",
            Sub => "-",
            Or => "|",
            Xor => "^",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Shl => "<<",
            Shr => ">>",
            And => "&",
            AndNot => "&^",
        }
    }

    fn assign_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+=",
            Sub => "-=",
            Or => "|=",
            Xor => "^=",
            Mul => "*=",
            Div => "/=",
            Rem => "%=",
            Shl => "<<=",
            Shr => ">>=",
            And => "&=",
            AndNot => "&^=",
            LogOr | LogAnd | Eq | Ne | Lt | Le | Gt | Ge => "=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    File(File),
    GenDecl(GenDecl),
    ImportSpec(ImportSpec),
    ValueSpec(ValueSpec),
    TypeSpec(TypeSpec),
    FuncDecl(FuncDecl),

    // Statements.
    Block {
        stmts: Vec<NodeId>,
    },
    ExprStmt {
        x: NodeId,
    },
    Assign {
        lhs: Vec<NodeId>,
        tok: AssignTok,
        tok_pos: Pos,
        rhs: Vec<NodeId>,
    },
    IncDec {
        x: NodeId,
        inc: bool,
    },
    Send {
        chan: NodeId,
        value: NodeId,
    },
    DeclStmt {
        decl: NodeId,
    },
    Return {
        results: Vec<NodeId>,
    },
    Branch {
        tok: BranchTok,
    },
    Go {
        call: NodeId,
    },
    Defer {
        call: NodeId,
    },
    If {
        init: Option<NodeId>,
        cond: NodeId,
        then: NodeId,
        els: Option<NodeId>,
    },
    For {
        init: Option<NodeId>,
        cond: Option<NodeId>,
        post: Option<NodeId>,
        body: NodeId,
    },
    Range {
        key: Option<NodeId>,
        value: Option<NodeId>,
        /// `None` for `for range x`.
        tok: Option<AssignTok>,
        x: NodeId,
        body: NodeId,
    },
    Switch {
        init: Option<NodeId>,
        tag: Option<NodeId>,
        /// A block of case clauses.
        body: NodeId,
    },
    CaseClause {
        /// Empty for `default`.
        list: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    Select {
        /// A block of comm clauses.
        body: NodeId,
    },
    CommClause {
        /// `None` for `default`.
        comm: Option<NodeId>,
        body: Vec<NodeId>,
    },

    // Expressions.
    Ident {
        name: String,
    },
    BasicLit {
        kind: LitKind,
        value: String,
    },
    CompositeLit {
        ty: Option<NodeId>,
        elts: Vec<NodeId>,
    },
    KeyValue {
        key: NodeId,
        value: NodeId,
    },
    FuncLit {
        sig: Signature,
        body: NodeId,
    },
    Paren {
        x: NodeId,
    },
    Selector {
        x: NodeId,
        sel: Ident,
    },
    Index {
        x: NodeId,
        index: NodeId,
    },
    Slice {
        x: NodeId,
        lo: Option<NodeId>,
        hi: Option<NodeId>,
        max: Option<NodeId>,
    },
    Call {
        fun: NodeId,
        args: Vec<NodeId>,
        ellipsis: bool,
    },
    /// Pointer type or dereference.
    Star {
        x: NodeId,
    },
    Unary {
        op: UnaryOp,
        x: NodeId,
    },
    Binary {
        op: BinaryOp,
        x: NodeId,
        y: NodeId,
    },

    // Types.
    /// Slice type when `len` is `None`.
    ArrayType {
        len: Option<NodeId>,
        elt: NodeId,
    },
    /// `...T` in a variadic parameter.
    Ellipsis {
        elt: NodeId,
    },
    MapType {
        key: NodeId,
        value: NodeId,
    },
    ChanType {
        dir: ChanDir,
        value: NodeId,
    },
    FuncType {
        sig: Signature,
    },
    StructType {
        fields: Vec<Field>,
    },
    InterfaceType {
        methods: Vec<Field>,
    },
}

impl NodeKind {
    /// `_ = <name>`, the shape of a synthesized discard read.
    pub fn is_discard_of_ident(&self, ast: &Ast) -> bool {
        let NodeKind::Assign { lhs, tok, rhs, .. } = self else {
            return false;
        };
        *tok == AssignTok::Assign
            && lhs.len() == 1
            && rhs.len() == 1
            && ast.ident_name(lhs[0]) == Some(crate::DISCARD)
            && ast.ident_name(rhs[0]).is_some()
    }
}
