//! Undo quick fixes by shape.
//!
//! No record of applied fixes is kept, so reversal works from what the tree
//! looks like: every `_ = name` statement is taken to be inserted, and every
//! `_` import is taken to be rebound unless it looks like a real side-effect
//! import.

use quickfix_types::{Ast, Importer, NodeId, NodeKind, Package};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Packages commonly imported only for their side effects. A trailing `*`
/// matches any path with that prefix.
pub const DEFAULT_SIDE_EFFECT_IMPORTS: &[&str] = &[
    "embed",
    "expvar",
    "image/gif",
    "image/jpeg",
    "image/png",
    "net/http/pprof",
    "time/tzdata",
    "crypto/*",
    "golang.org/x/image/*",
    "github.com/go-sql-driver/mysql",
    "github.com/lib/pq",
    "github.com/mattn/go-sqlite3",
    "github.com/jackc/pgx/*",
    "github.com/microsoft/go-mssqldb",
    "modernc.org/sqlite",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevertReport {
    pub discards_removed: usize,
    pub imports_restored: usize,
    /// `_` imports judged to be genuine side-effect imports.
    pub imports_kept: usize,
}

impl fmt::Display for RevertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removed {} discard statement(s), restored {} import(s), kept {} side-effect import(s)",
            self.discards_removed, self.imports_restored, self.imports_kept
        )
    }
}

/// The reversal engine. Runs one pass; no oracle is involved.
#[derive(Debug, Clone)]
pub struct Reverter<I> {
    importer: I,
    side_effect_imports: Vec<String>,
}

impl<I: Importer> Reverter<I> {
    pub fn new(importer: I) -> Self {
        Self {
            importer,
            side_effect_imports: DEFAULT_SIDE_EFFECT_IMPORTS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    /// Add patterns to the side-effect list.
    pub fn side_effect_imports<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.side_effect_imports
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn is_side_effect_import(&self, path: &str) -> bool {
        self.side_effect_imports
            .iter()
            .any(|pattern| match pattern.strip_suffix('*') {
                Some(prefix) => path.starts_with(prefix),
                None => path == pattern,
            })
    }

    pub fn revert(&self, package: &mut Package) -> RevertReport {
        let mut report = RevertReport::default();
        for root in package.files.clone() {
            report.discards_removed += remove_discards(&mut package.ast, root);
            self.restore_imports(&mut package.ast, root, &mut report);
        }
        debug!(package = %package.name, %report, "reverted");
        report
    }

    fn restore_imports(&self, ast: &mut Ast, root: NodeId, report: &mut RevertReport) {
        let Some(file) = ast.file(root) else {
            return;
        };
        let imports = file.imports.clone();
        let qualifiers = qualifiers(ast, root);

        for id in imports {
            let NodeKind::ImportSpec(spec) = ast.kind(id) else {
                continue;
            };
            if !spec.is_blank() {
                continue;
            }
            let path = spec.unquoted();
            let referenced = self
                .importer
                .package_name(path)
                .is_some_and(|name| qualifiers.contains(&name));
            if !referenced && self.is_side_effect_import(path) {
                report.imports_kept += 1;
                continue;
            }

            if let NodeKind::ImportSpec(spec) = ast.kind_mut(id) {
                spec.name = None;
            }
            report.imports_restored += 1;
        }
    }
}

/// Drop every `_ = name` statement under `root`.
fn remove_discards(ast: &mut Ast, root: NodeId) -> usize {
    let mut removed = 0;
    for id in ast.descendants(root) {
        let stmts = match ast.kind(id) {
            NodeKind::Block { stmts } => stmts,
            NodeKind::CaseClause { body, .. } | NodeKind::CommClause { body, .. } => body,
            _ => continue,
        };
        let kept: Vec<NodeId> = stmts
            .iter()
            .copied()
            .filter(|&s| !ast.kind(s).is_discard_of_ident(ast))
            .collect();
        let dropped = stmts.len() - kept.len();
        if dropped == 0 {
            continue;
        }
        if let Some(list) = ast.stmt_list_mut(id) {
            *list = kept;
            removed += dropped;
        }
    }
    removed
}

/// Names used as `name.Sel` anywhere in the file.
fn qualifiers(ast: &Ast, root: NodeId) -> BTreeSet<String> {
    ast.descendants(root)
        .into_iter()
        .filter_map(|id| match ast.kind(id) {
            NodeKind::Selector { x, .. } => ast.ident_name(*x).map(str::to_string),
            _ => None,
        })
        .collect()
}
