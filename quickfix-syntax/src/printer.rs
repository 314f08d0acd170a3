//! gofmt-style printer.
//!
//! Layout follows the source where the tree still has positions: blank lines
//! between statements and declarations are kept (at most one), line breaks
//! inside call arguments and composite literals are kept, and comments are
//! emitted before the first item that follows them or trailing on the line
//! they were on. Synthesized nodes have no position and are printed on a
//! line of their own.

use crate::align::align;
use quickfix_types::ast::{
    AssignTok, ChanDir, Comment, DeclKeyword, Field, FuncDecl, GenDecl, NodeKind, Signature,
};
use quickfix_types::{Ast, FileSet, NodeId, Package, Pos, Span};

/// Render one translation unit of `package`.
pub fn print_file(package: &Package, file: NodeId) -> String {
    let Some(f) = package.ast.file(file) else {
        return String::new();
    };

    let mut p = Printer {
        ast: &package.ast,
        fset: &package.fset,
        comments: &f.comments,
        next_comment: 0,
        out: String::new(),
        indent: 0,
        last_line: 0,
    };

    p.comments_before(f.package.pos, 1);
    p.line_break(p.line(f.package.pos), 1);
    p.w("package ");
    p.w(&f.package.name);
    let line = p.line(f.package.pos);
    p.mark(line);
    p.trailing(line);

    let mut prev: Option<&'static str> = None;
    for &decl in &f.decls {
        let token = match p.ast.kind(decl) {
            NodeKind::GenDecl(d) => d.keyword.as_str(),
            _ => "func",
        };
        let min = if prev == Some(token) { 1 } else { 2 };
        p.item(decl, min, |p| p.decl(decl));
        prev = Some(token);
    }

    p.comments_before(Pos::new(u32::MAX), 1);
    p.out.push('\n');

    align(&p.out)
}

struct Printer<'a> {
    ast: &'a Ast,
    fset: &'a FileSet,
    comments: &'a [Comment],
    next_comment: usize,
    out: String,
    indent: usize,
    /// Source line of the last printed item, 0 before any.
    last_line: usize,
}

impl<'a> Printer<'a> {
    // ---- output primitives ----

    fn w(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newlines(&mut self, n: usize) {
        for _ in 0..n {
            self.out.push('\n');
        }
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    /// Break before something on source line `target`, keeping at most one
    /// blank line from the source.
    fn line_break(&mut self, target: usize, min: usize) {
        if self.out.is_empty() {
            return;
        }
        let n = if target > 0 && self.last_line > 0 {
            target.saturating_sub(self.last_line).clamp(min, 2)
        } else {
            min
        };
        self.newlines(n);
    }

    fn mark(&mut self, line: usize) {
        if line > 0 {
            self.last_line = line;
        }
    }

    fn line(&self, pos: Pos) -> usize {
        self.fset.line(pos)
    }

    fn end_line(&self, span: Span) -> usize {
        if !span.is_valid() {
            return 0;
        }
        let last = if span.hi > span.lo {
            Pos::new(span.hi.raw() - 1)
        } else {
            span.lo
        };
        self.line(last)
    }

    fn close_pos(span: Span) -> Pos {
        if span.is_valid() && span.hi > span.lo {
            Pos::new(span.hi.raw() - 1)
        } else {
            Pos::NONE
        }
    }

    // ---- comments ----

    fn comment_end_line(&self, c: &Comment) -> usize {
        self.line(c.pos.add(c.text.len().saturating_sub(1)))
    }

    /// Emit pending comments located before `pos`, each on its own line.
    fn comments_before(&mut self, pos: Pos, min: usize) -> bool {
        if !pos.is_valid() {
            return false;
        }
        let comments = self.comments;
        let mut printed = false;
        while let Some(c) = comments.get(self.next_comment)
            && c.pos < pos
        {
            self.line_break(self.line(c.pos), if printed { 1 } else { min });
            self.w(&c.text);
            let end = self.comment_end_line(c);
            self.mark(end);
            self.next_comment += 1;
            printed = true;
        }
        printed
    }

    /// Emit pending comments on source line `line` at the end of the
    /// current output line.
    fn trailing(&mut self, line: usize) {
        self.trailing_padded(line, 1);
    }

    fn trailing_padded(&mut self, line: usize, cells: usize) {
        if line == 0 {
            return;
        }
        let comments = self.comments;
        let mut first = true;
        while let Some(c) = comments.get(self.next_comment)
            && self.line(c.pos) == line
        {
            if first {
                for _ in 0..cells {
                    self.w("\u{0b}");
                }
            } else {
                self.w(" ");
            }
            self.w(&c.text);
            let end = self.comment_end_line(c);
            self.mark(end);
            self.next_comment += 1;
            first = false;
        }
    }

    fn has_comment_within(&self, span: Span) -> bool {
        self.comments
            .get(self.next_comment)
            .is_some_and(|c| span.contains(c.pos))
    }

    /// Print one line-level item: leading comments, line break, the item,
    /// then its trailing comments.
    fn item(&mut self, id: NodeId, min: usize, print: impl FnOnce(&mut Self)) {
        let span = self.ast.span(id);
        let flushed = self.comments_before(span.lo, min);
        self.line_break(self.line(span.lo), if flushed { 1 } else { min });
        print(self);
        let end = self.end_line(span);
        self.mark(end);
        self.trailing(end);
    }

    // ---- declarations ----

    fn decl(&mut self, id: NodeId) {
        match self.ast.kind(id) {
            NodeKind::GenDecl(d) => self.gen_decl(id, d),
            NodeKind::FuncDecl(d) => self.func_decl(d),
            _ => {}
        }
    }

    fn gen_decl(&mut self, id: NodeId, d: &GenDecl) {
        self.w(d.keyword.as_str());
        self.w(" ");

        if !d.grouped {
            if let Some(&spec) = d.specs.first() {
                self.spec(spec, false, false);
            }
            return;
        }

        let span = self.ast.span(id);
        self.w("(");
        if d.specs.is_empty() && !self.has_comment_within(span) {
            self.w(")");
            return;
        }
        let open = self.line(span.lo);
        self.mark(open);
        self.trailing(open);

        let keep = match d.keyword {
            DeclKeyword::Var | DeclKeyword::Const => self.keep_type_column(&d.specs),
            _ => vec![false; d.specs.len()],
        };

        self.indent += 1;
        for (i, &spec) in d.specs.iter().enumerate() {
            let spec_span = self.ast.span(spec);
            self.comments_before(spec_span.lo, 1);
            self.line_break(self.line(spec_span.lo), 1);
            let cells = self.spec(spec, true, keep[i]);
            let end = self.end_line(spec_span);
            self.mark(end);
            self.trailing_padded(end, cells);
        }
        self.comments_before(Self::close_pos(span), 1);
        self.indent -= 1;
        self.newlines(1);
        self.w(")");
        self.mark(self.end_line(span));
    }

    /// For runs of value specs with values, whether to keep an (empty) type
    /// column so the `=` signs line up.
    fn keep_type_column(&self, specs: &[NodeId]) -> Vec<bool> {
        let mut keep = vec![false; specs.len()];
        let mut run_start: Option<usize> = None;
        let mut has_type = false;

        for (i, &spec) in specs.iter().enumerate() {
            let NodeKind::ValueSpec(s) = self.ast.kind(spec) else {
                continue;
            };
            if !s.values.is_empty() {
                if run_start.is_none() {
                    run_start = Some(i);
                    has_type = false;
                }
            } else if let Some(start) = run_start.take()
                && has_type
            {
                keep[start..i].fill(true);
            }
            if s.ty.is_some() {
                has_type = true;
            }
        }
        if let Some(start) = run_start
            && has_type
        {
            keep[start..].fill(true);
        }
        keep
    }

    /// Prints one spec and returns how many cell separators a trailing
    /// comment needs to land in the comment column.
    fn spec(&mut self, id: NodeId, grouped: bool, keep_type: bool) -> usize {
        match self.ast.kind(id) {
            NodeKind::ImportSpec(s) => {
                if let Some(name) = &s.name {
                    self.w(&name.name);
                    self.w(" ");
                }
                self.w(&s.path);
                1
            }
            NodeKind::ValueSpec(s) => {
                self.ident_list(s.names.iter().map(|n| n.name.as_str()));
                if !grouped {
                    if let Some(ty) = s.ty {
                        self.w(" ");
                        self.expr(ty);
                    }
                    if !s.values.is_empty() {
                        self.w(" = ");
                        self.expr_list(&s.values, 1);
                    }
                    return 1;
                }

                let mut extra = 3;
                if s.ty.is_some() || keep_type {
                    self.w("\u{0b}");
                    extra -= 1;
                }
                if let Some(ty) = s.ty {
                    self.expr(ty);
                }
                if !s.values.is_empty() {
                    self.w("\u{0b}= ");
                    self.expr_list(&s.values, 1);
                    extra -= 1;
                }
                extra
            }
            NodeKind::TypeSpec(s) => {
                self.w(&s.name.name);
                self.w(if grouped { "\u{0b}" } else { " " });
                if s.alias {
                    self.w("= ");
                }
                self.expr(s.ty);
                1
            }
            _ => 1,
        }
    }

    fn func_decl(&mut self, d: &FuncDecl) {
        self.w("func ");
        if let Some(recv) = &d.recv {
            self.w("(");
            self.field(recv);
            self.w(") ");
        }
        self.w(&d.name.name);
        self.signature(&d.sig);
        if let Some(body) = d.body {
            self.w(" ");
            self.func_body(body);
        }
    }

    fn signature(&mut self, sig: &Signature) {
        self.w("(");
        self.fields(&sig.params);
        self.w(")");
        match sig.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.w(" ");
                self.expr(single.ty);
            }
            results => {
                self.w(" (");
                self.fields(results);
                self.w(")");
            }
        }
    }

    fn fields(&mut self, fields: &[Field]) {
        for (i, f) in fields.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.field(f);
        }
    }

    fn field(&mut self, f: &Field) {
        if !f.names.is_empty() {
            self.ident_list(f.names.iter().map(|n| n.name.as_str()));
            self.w(" ");
        }
        self.expr(f.ty);
    }

    fn ident_list<'n>(&mut self, names: impl Iterator<Item = &'n str>) {
        for (i, name) in names.enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.w(name);
        }
    }

    // ---- statements ----

    /// Function bodies written on one line stay on one line.
    fn func_body(&mut self, id: NodeId) {
        let span = self.ast.span(id);
        let NodeKind::Block { stmts } = self.ast.kind(id) else {
            return;
        };
        let single_line = span.is_valid()
            && self.line(span.lo) == self.end_line(span)
            && stmts.iter().all(|s| self.ast.span(*s).is_valid())
            && !self.has_comment_within(span);
        if !single_line {
            self.block(id);
            return;
        }

        if stmts.is_empty() {
            self.w("{}");
        } else {
            self.w("{ ");
            for (i, &s) in stmts.iter().enumerate() {
                if i > 0 {
                    self.w("; ");
                }
                self.stmt(s);
            }
            self.w(" }");
        }
        self.mark(self.line(span.lo));
    }

    fn block(&mut self, id: NodeId) {
        let span = self.ast.span(id);
        let stmts: &[NodeId] = match self.ast.kind(id) {
            NodeKind::Block { stmts } => stmts,
            _ => &[],
        };

        self.w("{");
        let open = self.line(span.lo);
        self.mark(open);
        self.trailing(open);

        self.indent += 1;
        self.stmt_list(stmts);
        self.comments_before(Self::close_pos(span), 1);
        self.indent -= 1;

        self.newlines(1);
        self.w("}");
        self.mark(self.end_line(span));
    }

    fn stmt_list(&mut self, stmts: &[NodeId]) {
        for &s in stmts {
            self.item(s, 1, |p| p.stmt(s));
        }
    }

    fn stmt(&mut self, id: NodeId) {
        match self.ast.kind(id) {
            NodeKind::Block { .. } => self.block(id),
            NodeKind::ExprStmt { x } => self.expr(*x),
            NodeKind::Assign { lhs, tok, rhs, .. } => {
                let depth = if lhs.len() > 1 && rhs.len() > 1 { 2 } else { 1 };
                self.expr_list(lhs, depth);
                self.w(" ");
                self.w(tok.as_str());
                self.w(" ");
                self.expr_list(rhs, depth);
            }
            NodeKind::IncDec { x, inc } => {
                self.expr0(*x, 2);
                self.w(if *inc { "++" } else { "--" });
            }
            NodeKind::Send { chan, value } => {
                self.expr(*chan);
                self.w(" <- ");
                self.expr(*value);
            }
            NodeKind::DeclStmt { decl } => self.decl(*decl),
            NodeKind::Return { results } => {
                self.w("return");
                if !results.is_empty() {
                    self.w(" ");
                    self.expr_list(results, 1);
                }
            }
            NodeKind::Branch { tok } => self.w(tok.as_str()),
            NodeKind::Go { call } => {
                self.w("go ");
                self.expr(*call);
            }
            NodeKind::Defer { call } => {
                self.w("defer ");
                self.expr(*call);
            }
            NodeKind::If {
                init,
                cond,
                then,
                els,
            } => {
                self.w("if ");
                if let Some(init) = init {
                    self.stmt(*init);
                    self.w("; ");
                }
                let cond = self.strip_parens(*cond);
                self.expr(cond);
                self.w(" ");
                self.block(*then);
                if let Some(els) = els {
                    self.w(" else ");
                    self.stmt(*els);
                }
            }
            NodeKind::For {
                init,
                cond,
                post,
                body,
            } => {
                self.w("for ");
                if init.is_none() && post.is_none() {
                    if let Some(cond) = cond {
                        let cond = self.strip_parens(*cond);
                        self.expr(cond);
                        self.w(" ");
                    }
                } else {
                    if let Some(init) = init {
                        self.stmt(*init);
                    }
                    self.w("; ");
                    if let Some(cond) = cond {
                        let cond = self.strip_parens(*cond);
                        self.expr(cond);
                    }
                    self.w("; ");
                    if let Some(post) = post {
                        self.stmt(*post);
                        self.w(" ");
                    }
                }
                self.block(*body);
            }
            NodeKind::Range {
                key,
                value,
                tok,
                x,
                body,
            } => {
                self.w("for ");
                if let Some(key) = key {
                    self.expr(*key);
                    if let Some(value) = value {
                        self.w(", ");
                        self.expr(*value);
                    }
                    self.w(" ");
                    self.w(tok.unwrap_or(AssignTok::Define).as_str());
                    self.w(" ");
                }
                self.w("range ");
                let x = self.strip_parens(*x);
                self.expr(x);
                self.w(" ");
                self.block(*body);
            }
            NodeKind::Switch { init, tag, body } => {
                self.w("switch ");
                if let Some(init) = init {
                    self.stmt(*init);
                    self.w("; ");
                }
                if let Some(tag) = tag {
                    let tag = self.strip_parens(*tag);
                    self.expr(tag);
                    self.w(" ");
                }
                self.clause_block(*body);
            }
            NodeKind::Select { body } => {
                self.w("select ");
                self.clause_block(*body);
            }
            NodeKind::CaseClause { list, body } => {
                if list.is_empty() {
                    self.w("default:");
                } else {
                    self.w("case ");
                    self.expr_list(list, 1);
                    self.w(":");
                }
                self.clause_body(id, body);
            }
            NodeKind::CommClause { comm, body } => {
                match comm {
                    Some(comm) => {
                        self.w("case ");
                        self.stmt(*comm);
                        self.w(":");
                    }
                    None => self.w("default:"),
                }
                self.clause_body(id, body);
            }
            _ => {}
        }
    }

    /// The body of a switch or select: clauses at the statement's own
    /// indentation.
    fn clause_block(&mut self, id: NodeId) {
        let span = self.ast.span(id);
        let clauses: &[NodeId] = match self.ast.kind(id) {
            NodeKind::Block { stmts } => stmts,
            _ => &[],
        };

        self.w("{");
        let open = self.line(span.lo);
        self.mark(open);
        self.trailing(open);

        for &clause in clauses {
            let clause_span = self.ast.span(clause);
            self.comments_before(clause_span.lo, 1);
            self.line_break(self.line(clause_span.lo), 1);
            self.stmt(clause);
        }
        self.comments_before(Self::close_pos(span), 1);
        self.newlines(1);
        self.w("}");
        self.mark(self.end_line(span));
    }

    fn clause_body(&mut self, clause: NodeId, body: &[NodeId]) {
        let head = self.line(self.ast.span(clause).lo);
        self.mark(head);
        self.trailing(head);
        self.indent += 1;
        self.stmt_list(body);
        self.indent -= 1;
    }

    /// Parentheses around a control clause expression are redundant unless
    /// they guard a composite literal.
    fn strip_parens(&self, mut x: NodeId) -> NodeId {
        while let NodeKind::Paren { x: inner } = self.ast.kind(x) {
            let guards_literal = self
                .ast
                .descendants(*inner)
                .into_iter()
                .any(|n| matches!(self.ast.kind(n), NodeKind::CompositeLit { ty: Some(_), .. }));
            if guards_literal {
                break;
            }
            x = *inner;
        }
        x
    }

    // ---- expressions ----

    fn expr(&mut self, x: NodeId) {
        self.expr0(x, 1);
    }

    fn expr_list(&mut self, list: &[NodeId], depth: usize) {
        for (i, &x) in list.iter().enumerate() {
            if i > 0 {
                self.w(", ");
            }
            self.expr0(x, depth);
        }
    }

    fn expr0(&mut self, id: NodeId, depth: usize) {
        match self.ast.kind(id) {
            NodeKind::Ident { name } => self.w(name),
            NodeKind::BasicLit { value, .. } => self.w(value),
            NodeKind::Binary { .. } => {
                let cutoff = self.cutoff(id, depth);
                self.binary(id, cutoff, depth);
            }
            NodeKind::Unary { op, x } => {
                self.w(op.as_str());
                self.expr0(*x, depth);
            }
            NodeKind::Star { x } => {
                self.w("*");
                self.expr(*x);
            }
            NodeKind::Paren { x } => {
                self.w("(");
                let depth = if matches!(self.ast.kind(*x), NodeKind::Paren { .. }) {
                    depth
                } else {
                    depth.saturating_sub(1).max(1)
                };
                self.expr0(*x, depth);
                self.w(")");
            }
            NodeKind::Selector { x, sel } => {
                self.expr0(*x, depth);
                self.w(".");
                self.w(&sel.name);
            }
            NodeKind::Index { x, index } => {
                self.expr0(*x, 1);
                self.w("[");
                self.expr0(*index, depth + 1);
                self.w("]");
            }
            NodeKind::Slice { x, lo, hi, max } => {
                self.expr0(*x, 1);
                self.w("[");
                let mut indices = vec![*lo, *hi];
                if max.is_some() {
                    indices.push(*max);
                }
                let needs_blanks = depth <= 1
                    && indices.iter().flatten().count() > 1
                    && indices
                        .iter()
                        .flatten()
                        .any(|i| matches!(self.ast.kind(*i), NodeKind::Binary { .. }));
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        if indices[i - 1].is_some() && needs_blanks {
                            self.w(" ");
                        }
                        self.w(":");
                        if index.is_some() && needs_blanks {
                            self.w(" ");
                        }
                    }
                    if let Some(index) = index {
                        self.expr0(*index, depth + 1);
                    }
                }
                self.w("]");
            }
            NodeKind::Call {
                fun,
                args,
                ellipsis,
            } => {
                let depth = if args.len() > 1 { depth + 1 } else { depth };
                if matches!(self.ast.kind(*fun), NodeKind::FuncType { .. }) {
                    self.w("(");
                    self.expr0(*fun, depth);
                    self.w(")");
                } else {
                    self.expr0(*fun, depth);
                }
                self.w("(");
                let span = self.ast.span(id);
                let open = self.end_line(self.ast.span(*fun));
                let close = self.line(Self::close_pos(span));
                self.broken_list(args, open, Self::close_pos(span), close, depth, false, *ellipsis);
                self.w(")");
            }
            NodeKind::CompositeLit { ty, elts } => {
                let span = self.ast.span(id);
                let open = match ty {
                    Some(ty) => {
                        self.expr0(*ty, depth);
                        self.end_line(self.ast.span(*ty))
                    }
                    None => self.line(span.lo),
                };
                self.w("{");
                let close = self.line(Self::close_pos(span));
                self.broken_list(elts, open, Self::close_pos(span), close, 1, true, false);
                self.w("}");
            }
            NodeKind::KeyValue { key, value } => {
                self.expr(*key);
                self.w(": ");
                self.expr(*value);
            }
            NodeKind::FuncLit { sig, body } => {
                self.w("func");
                self.signature(sig);
                self.w(" ");
                self.func_body(*body);
            }
            NodeKind::ArrayType { len, elt } => {
                self.w("[");
                if let Some(len) = len {
                    self.expr(*len);
                }
                self.w("]");
                self.expr(*elt);
            }
            NodeKind::Ellipsis { elt } => {
                self.w("...");
                self.expr(*elt);
            }
            NodeKind::MapType { key, value } => {
                self.w("map[");
                self.expr(*key);
                self.w("]");
                self.expr(*value);
            }
            NodeKind::ChanType { dir, value } => {
                self.w(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(*value);
            }
            NodeKind::FuncType { sig } => {
                self.w("func");
                self.signature(sig);
            }
            NodeKind::StructType { fields } => self.field_block(id, "struct", fields, true),
            NodeKind::InterfaceType { methods } => self.field_block(id, "interface", methods, false),
            _ => {}
        }
    }

    /// Comma-separated list that keeps the source's line breaks. A list
    /// whose closing token sits on its own line gets a trailing comma.
    #[allow(clippy::too_many_arguments)]
    fn broken_list(
        &mut self,
        items: &[NodeId],
        open_line: usize,
        close: Pos,
        close_line: usize,
        depth: usize,
        align_pairs: bool,
        ellipsis: bool,
    ) {
        let mut indented = false;
        let mut prev_end = open_line;

        for (i, &item) in items.iter().enumerate() {
            let span = self.ast.span(item);
            let line = self.line(span.lo);
            let breaks = line > 0 && prev_end > 0 && line > prev_end;

            if i > 0 {
                self.w(",");
                if breaks {
                    self.trailing(prev_end);
                } else {
                    self.w(" ");
                }
            }
            if breaks {
                if !indented {
                    self.indent += 1;
                    indented = true;
                }
                self.mark(prev_end);
                self.comments_before(span.lo, 1);
                self.line_break(line, 1);
            }

            match self.ast.kind(item) {
                NodeKind::KeyValue { key, value } if align_pairs && breaks => {
                    self.expr(*key);
                    self.w(":\u{0b}");
                    self.expr(*value);
                }
                _ => self.expr0(item, depth),
            }

            let end = self.end_line(span);
            if end > 0 {
                prev_end = end;
            }
        }

        if ellipsis {
            self.w("...");
        }

        if !items.is_empty() && close_line > 0 && prev_end > 0 && close_line > prev_end {
            self.w(",");
            self.trailing(prev_end);
            self.mark(prev_end);
            if !indented {
                self.indent += 1;
            }
            self.comments_before(close, 1);
            self.indent -= 1;
            indented = false;
            self.newlines(1);
            self.mark(close_line);
        }
        if indented {
            self.indent -= 1;
        }
    }

    fn field_block(&mut self, id: NodeId, keyword: &str, fields: &[Field], is_struct: bool) {
        let span = self.ast.span(id);
        self.w(keyword);

        let comments_inside = self.has_comment_within(span);
        if fields.is_empty() && !comments_inside {
            self.w("{}");
            return;
        }

        let single_line = span.is_valid() && self.line(span.lo) == self.end_line(span) && !comments_inside;
        if single_line {
            self.w("{ ");
            for (i, f) in fields.iter().enumerate() {
                if i > 0 {
                    self.w("; ");
                }
                self.field_line(f, is_struct, " ");
            }
            self.w(" }");
            return;
        }

        self.w(" {");
        let open = self.line(span.lo);
        self.mark(open);
        self.trailing(open);

        self.indent += 1;
        for f in fields {
            let lo = f.names.first().map(|n| n.pos).unwrap_or_else(|| self.ast.span(f.ty).lo);
            self.comments_before(lo, 1);
            self.line_break(self.line(lo), 1);
            self.field_line(f, is_struct, "\u{0b}");
            let end = self.end_line(self.ast.span(f.ty));
            self.mark(end);
            self.trailing(end);
        }
        self.comments_before(Self::close_pos(span), 1);
        self.indent -= 1;
        self.newlines(1);
        self.w("}");
        self.mark(self.end_line(span));
    }

    fn field_line(&mut self, f: &Field, is_struct: bool, sep: &str) {
        if !is_struct
            && let [name] = f.names.as_slice()
            && let NodeKind::FuncType { sig } = self.ast.kind(f.ty)
        {
            self.w(&name.name);
            self.signature(sig);
            return;
        }
        if !f.names.is_empty() {
            self.ident_list(f.names.iter().map(|n| n.name.as_str()));
            self.w(sep);
        }
        self.expr(f.ty);
        if let Some(tag) = &f.tag {
            self.w(sep);
            self.w(tag);
        }
    }

    fn binary(&mut self, id: NodeId, cutoff: u8, depth: usize) {
        let NodeKind::Binary { op, x, y } = self.ast.kind(id) else {
            return;
        };
        let prec = op.precedence();
        let blank = prec < cutoff;

        let x_depth = depth + self.diff_prec(*x, prec);
        self.expr0(*x, x_depth);
        if blank {
            self.w(" ");
        }
        self.w(op.as_str());
        if blank {
            self.w(" ");
        }
        self.expr0(*y, depth + 1);
    }

    fn diff_prec(&self, x: NodeId, prec: u8) -> usize {
        match self.ast.kind(x) {
            NodeKind::Binary { op, .. } if op.precedence() == prec => 0,
            _ => 1,
        }
    }

    /// Precedence at and above which operators are printed without spaces.
    fn cutoff(&self, e: NodeId, depth: usize) -> u8 {
        let (has4, has5, max_problem) = self.walk_binary(e);
        if max_problem > 0 {
            return max_problem + 1;
        }
        match (has4 && has5, depth == 1) {
            (true, true) => 5,
            (true, false) => 4,
            (false, true) => 6,
            (false, false) => 4,
        }
    }

    fn walk_binary(&self, e: NodeId) -> (bool, bool, u8) {
        let NodeKind::Binary { op, x, y } = self.ast.kind(e) else {
            return (false, false, 0);
        };
        let prec = op.precedence();
        let mut has4 = prec == 4;
        let mut has5 = prec == 5;
        let mut max_problem = 0;

        if let NodeKind::Binary { op: left, .. } = self.ast.kind(*x)
            && left.precedence() >= prec
        {
            let (h4, h5, mp) = self.walk_binary(*x);
            has4 |= h4;
            has5 |= h5;
            max_problem = max_problem.max(mp);
        }

        match self.ast.kind(*y) {
            NodeKind::Binary { op: right, .. } if right.precedence() > prec => {
                let (h4, h5, mp) = self.walk_binary(*y);
                has4 |= h4;
                has5 |= h5;
                max_problem = max_problem.max(mp);
            }
            NodeKind::Star { .. } if op.as_str() == "/" => max_problem = 5,
            NodeKind::Unary { op: unary, .. } => match (op.as_str(), unary.as_str()) {
                ("&", "&") | ("&", "^") => max_problem = 5,
                ("+", "+") | ("-", "-") => max_problem = max_problem.max(4),
                _ => {}
            },
            _ => {}
        }

        (has4, has5, max_problem)
    }
}
