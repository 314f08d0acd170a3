//! Per-file name resolution.

use crate::universe::is_predeclared;
use quickfix_types::ast::{AssignTok, DeclKeyword, File, Signature};
use quickfix_types::{Ast, DISCARD, Diagnostic, NodeId, NodeKind, Pos};
use std::collections::{BTreeMap, BTreeSet};

/// One import of the file being checked.
#[derive(Debug, Clone)]
pub(crate) struct Import {
    /// Name the import binds in the file scope.
    pub name: String,
    /// Quoted path for messages.
    pub quoted: String,
    /// Explicit name, when it differs from the package's own name.
    pub renamed: Option<String>,
    /// `import . "p"`: binds no name of its own.
    pub dot: bool,
    pub pos: Pos,
    pub used: bool,
}

#[derive(Debug, Clone, Copy)]
enum Local {
    Var(usize),
    Other,
}

#[derive(Debug)]
struct Var {
    name: String,
    pos: Pos,
    used: bool,
    /// Parameters and results are never reported.
    reportable: bool,
}

pub(crate) struct Walker<'a> {
    ast: &'a Ast,
    package: &'a BTreeSet<String>,
    imports: Vec<Import>,
    scopes: Vec<BTreeMap<String, Local>>,
    vars: Vec<Var>,
    /// Start of the innermost statement or block that has a source position.
    /// Problems found in synthesized nodes are reported here.
    anchor: Pos,
    diags: Vec<Diagnostic>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(ast: &'a Ast, package: &'a BTreeSet<String>, imports: Vec<Import>) -> Self {
        Self {
            ast,
            package,
            imports,
            scopes: Vec::new(),
            vars: Vec::new(),
            anchor: Pos::NONE,
            diags: Vec::new(),
        }
    }

    pub(crate) fn file(mut self, file: &File) -> Vec<Diagnostic> {
        for &decl in &file.decls {
            match self.ast.kind(decl) {
                NodeKind::GenDecl(d) if d.keyword != DeclKeyword::Import => {
                    for &spec in &d.specs {
                        self.package_spec(spec);
                    }
                }
                NodeKind::FuncDecl(d) => {
                    self.push();
                    if let Some(recv) = &d.recv {
                        self.expr(recv.ty);
                        for name in &recv.names {
                            self.declare_param(&name.name, name.pos);
                        }
                    }
                    self.signature(&d.sig);
                    if let Some(body) = d.body {
                        self.body(body);
                    }
                    self.pop();
                }
                _ => {}
            }
        }

        for import in &self.imports {
            if import.used {
                continue;
            }
            let message = match &import.renamed {
                Some(name) => format!("{} imported but not used as {name}", import.quoted),
                None => format!("{} imported but not used", import.quoted),
            };
            self.diags.push(Diagnostic::new(import.pos, message));
        }
        self.diags
    }

    fn package_spec(&mut self, spec: NodeId) {
        match self.ast.kind(spec) {
            NodeKind::ValueSpec(s) => {
                if let Some(ty) = s.ty {
                    self.expr(ty);
                }
                for &value in &s.values {
                    self.expr(value);
                }
            }
            NodeKind::TypeSpec(s) => self.expr(s.ty),
            _ => {}
        }
    }

    // ---- scopes ----

    fn push(&mut self) {
        self.scopes.push(BTreeMap::new());
    }

    fn pop(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        for local in scope.into_values() {
            if let Local::Var(i) = local {
                let var = &self.vars[i];
                if var.reportable && !var.used {
                    self.diags
                        .push(Diagnostic::new(var.pos, format!("{} declared but not used", var.name)));
                }
            }
        }
    }

    fn in_current_scope(&self, name: &str) -> bool {
        self.scopes.last().is_some_and(|s| s.contains_key(name))
    }

    fn declare(&mut self, name: &str, pos: Pos, local: Local) {
        if name == DISCARD {
            return;
        }
        if self.in_current_scope(name) {
            self.diags
                .push(Diagnostic::new(pos, format!("{name} redeclared in this block")));
            return;
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), local);
        }
    }

    fn declare_var(&mut self, name: &str, pos: Pos) {
        self.new_var(name, pos, true);
    }

    fn declare_param(&mut self, name: &str, pos: Pos) {
        self.new_var(name, pos, false);
    }

    fn new_var(&mut self, name: &str, pos: Pos, reportable: bool) {
        if name == DISCARD || self.in_current_scope(name) {
            self.declare(name, pos, Local::Other);
            return;
        }
        self.vars.push(Var {
            name: name.to_string(),
            pos,
            used: false,
            reportable,
        });
        let index = self.vars.len() - 1;
        self.declare(name, pos, Local::Var(index));
    }

    /// Resolve a reference; `read` marks a found variable as used.
    fn resolve(&mut self, name: &str, pos: Pos, read: bool) {
        if name == DISCARD {
            return;
        }
        for scope in self.scopes.iter().rev() {
            if let Some(local) = scope.get(name) {
                if let Local::Var(i) = *local
                    && read
                {
                    self.vars[i].used = true;
                }
                return;
            }
        }
        if let Some(import) = self.imports.iter_mut().find(|i| !i.dot && i.name == name) {
            import.used = true;
            return;
        }
        if self.package.contains(name) || is_predeclared(name) {
            return;
        }
        // Without type information, every dot import may provide the name.
        let mut dotted = false;
        for import in self.imports.iter_mut().filter(|i| i.dot) {
            import.used = true;
            dotted = true;
        }
        if dotted {
            return;
        }
        let pos = if pos.is_valid() { pos } else { self.anchor };
        self.diags.push(Diagnostic::new(pos, format!("undefined: {name}")));
    }

    // ---- functions ----

    /// Parameter and result types resolve outside the function; the names
    /// are then declared in the function scope.
    fn signature(&mut self, sig: &Signature) {
        for field in sig.params.iter().chain(&sig.results) {
            self.expr(field.ty);
        }
        for field in sig.params.iter().chain(&sig.results) {
            for name in &field.names {
                self.declare_param(&name.name, name.pos);
            }
        }
    }

    /// A function body shares the scope of its parameters.
    fn body(&mut self, block: NodeId) {
        if let NodeKind::Block { stmts } = self.ast.kind(block) {
            let outer = self.enter(block);
            for &stmt in stmts {
                self.stmt(stmt);
            }
            self.anchor = outer;
        }
    }

    // ---- statements ----

    /// Move the anchor to `id` when it has a position; returns the old one.
    fn enter(&mut self, id: NodeId) -> Pos {
        let outer = self.anchor;
        let span = self.ast.span(id);
        if span.is_valid() {
            self.anchor = span.lo;
        }
        outer
    }

    fn stmt(&mut self, id: NodeId) {
        let outer = self.enter(id);
        self.stmt_kind(id);
        self.anchor = outer;
    }

    fn stmt_kind(&mut self, id: NodeId) {
        match self.ast.kind(id) {
            NodeKind::Block { stmts } => {
                self.push();
                for &stmt in stmts {
                    self.stmt(stmt);
                }
                self.pop();
            }
            NodeKind::ExprStmt { x } => self.expr(*x),
            NodeKind::Assign {
                lhs,
                tok,
                tok_pos,
                rhs,
            } => {
                for &r in rhs {
                    self.expr(r);
                }
                match tok {
                    AssignTok::Define => self.define(lhs, *tok_pos),
                    AssignTok::Assign => {
                        for &l in lhs {
                            self.assign_target(l);
                        }
                    }
                    AssignTok::Op(_) => {
                        for &l in lhs {
                            self.expr(l);
                        }
                    }
                }
            }
            NodeKind::IncDec { x, .. } => self.expr(*x),
            NodeKind::Send { chan, value } => {
                self.expr(*chan);
                self.expr(*value);
            }
            NodeKind::DeclStmt { decl } => self.local_decl(*decl),
            NodeKind::Return { results } => {
                for &r in results {
                    self.expr(r);
                }
            }
            NodeKind::Branch { .. } => {}
            NodeKind::Go { call } | NodeKind::Defer { call } => self.expr(*call),
            NodeKind::If {
                init,
                cond,
                then,
                els,
            } => {
                self.push();
                if let Some(init) = init {
                    self.stmt(*init);
                }
                self.expr(*cond);
                self.stmt(*then);
                if let Some(els) = els {
                    self.stmt(*els);
                }
                self.pop();
            }
            NodeKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.push();
                if let Some(init) = init {
                    self.stmt(*init);
                }
                if let Some(cond) = cond {
                    self.expr(*cond);
                }
                if let Some(post) = post {
                    self.stmt(*post);
                }
                self.stmt(*body);
                self.pop();
            }
            NodeKind::Range {
                key,
                value,
                tok,
                x,
                body,
            } => {
                self.expr(*x);
                self.push();
                let vars: Vec<NodeId> = key.iter().chain(value.iter()).copied().collect();
                match tok {
                    Some(AssignTok::Define) => {
                        let range_pos = self.ast.span(id).lo;
                        self.define(&vars, range_pos);
                    }
                    Some(_) => {
                        for v in vars {
                            self.assign_target(v);
                        }
                    }
                    None => {}
                }
                self.stmt(*body);
                self.pop();
            }
            NodeKind::Switch { init, tag, body } => {
                self.push();
                if let Some(init) = init {
                    self.stmt(*init);
                }
                if let Some(tag) = tag {
                    self.expr(*tag);
                }
                self.clauses(*body);
                self.pop();
            }
            NodeKind::Select { body } => self.clauses(*body),
            NodeKind::CaseClause { list, body } => {
                for &e in list {
                    self.expr(e);
                }
                self.push();
                for &stmt in body {
                    self.stmt(stmt);
                }
                self.pop();
            }
            NodeKind::CommClause { comm, body } => {
                self.push();
                if let Some(comm) = comm {
                    self.stmt(*comm);
                }
                for &stmt in body {
                    self.stmt(stmt);
                }
                self.pop();
            }
            _ => {}
        }
    }

    fn clauses(&mut self, body: NodeId) {
        if let NodeKind::Block { stmts } = self.ast.kind(body) {
            for &clause in stmts {
                self.stmt(clause);
            }
        }
    }

    /// Left side of `:=`: names not yet declared in the current scope are
    /// new; at least one must be.
    fn define(&mut self, lhs: &[NodeId], tok_pos: Pos) {
        let mut any_new = false;
        for &l in lhs {
            match self.ast.kind(l) {
                NodeKind::Ident { name } => {
                    if name == DISCARD {
                        continue;
                    }
                    if self.in_current_scope(name) {
                        self.resolve(name, self.ast.span(l).lo, false);
                        continue;
                    }
                    self.declare_var(name, self.ast.span(l).lo);
                    any_new = true;
                }
                _ => {
                    self.diags.push(Diagnostic::new(
                        self.ast.span(l).lo,
                        "non-name on left side of :=",
                    ));
                    self.expr(l);
                }
            }
        }
        if !any_new {
            self.diags
                .push(Diagnostic::new(tok_pos, "no new variables on left side of :="));
        }
    }

    /// Plain assignment to a bare name is not a use of it.
    fn assign_target(&mut self, id: NodeId) {
        match self.ast.kind(id) {
            NodeKind::Ident { name } => self.resolve(name, self.ast.span(id).lo, false),
            NodeKind::Paren { x } => self.assign_target(*x),
            _ => self.expr(id),
        }
    }

    fn local_decl(&mut self, decl: NodeId) {
        let NodeKind::GenDecl(d) = self.ast.kind(decl) else {
            return;
        };
        for &spec in &d.specs {
            match self.ast.kind(spec) {
                NodeKind::ValueSpec(s) => {
                    if let Some(ty) = s.ty {
                        self.expr(ty);
                    }
                    for &value in &s.values {
                        self.expr(value);
                    }
                    for name in &s.names {
                        if d.keyword == DeclKeyword::Var {
                            self.declare_var(&name.name, name.pos);
                        } else {
                            self.declare(&name.name, name.pos, Local::Other);
                        }
                    }
                }
                NodeKind::TypeSpec(s) => {
                    self.declare(&s.name.name, s.name.pos, Local::Other);
                    self.expr(s.ty);
                }
                _ => {}
            }
        }
    }

    // ---- expressions ----

    fn expr(&mut self, id: NodeId) {
        match self.ast.kind(id) {
            NodeKind::Ident { name } => self.resolve(name, self.ast.span(id).lo, true),
            NodeKind::BasicLit { .. } => {}
            NodeKind::Selector { x, .. } => self.expr(*x),
            NodeKind::FuncLit { sig, body } => {
                self.push();
                self.signature(sig);
                self.body(*body);
                self.pop();
            }
            NodeKind::CompositeLit { ty, elts } => {
                let keyed_by_value = match ty {
                    Some(ty) => {
                        self.expr(*ty);
                        matches!(
                            self.ast.kind(*ty),
                            NodeKind::MapType { .. } | NodeKind::ArrayType { .. }
                        )
                    }
                    None => false,
                };
                for &elt in elts {
                    match self.ast.kind(elt) {
                        NodeKind::KeyValue { key, value } => {
                            let field_name = matches!(self.ast.kind(*key), NodeKind::Ident { .. });
                            if keyed_by_value || !field_name {
                                self.expr(*key);
                            }
                            self.expr(*value);
                        }
                        _ => self.expr(elt),
                    }
                }
            }
            // Field and method names of struct and interface types are not
            // references; `children` only yields their types.
            _ => {
                for child in self.ast.children(id) {
                    self.expr(child);
                }
            }
        }
    }
}
