//! Bundled diagnostic oracle for goquickfix.
//!
//! [`Checker`] resolves every name in a [`Package`] against the universe,
//! package, file and local scopes and reports the problems it finds without
//! stopping at the first. It does not type-check expressions; it knows
//! exactly enough to produce the diagnostics the quick fixes consume, plus
//! `undefined` and `redeclared` errors so that broken input is not mistaken
//! for clean input.

mod importer;
mod scope;
mod universe;

pub use importer::PathImporter;
pub use quickfix_types::Importer;

use quickfix_types::ast::DeclKeyword;
use quickfix_types::{DISCARD, Diagnostic, NodeId, NodeKind, Oracle, Package, Pos};
use scope::{Import, Walker};
use std::collections::BTreeSet;
use tracing::debug;

/// Best-effort scope checker.
#[derive(Debug, Clone)]
pub struct Checker<I = PathImporter> {
    importer: I,
}

impl Default for Checker<PathImporter> {
    fn default() -> Self {
        Self::new(PathImporter::new())
    }
}

impl<I: Importer> Checker<I> {
    pub fn new(importer: I) -> Self {
        Self { importer }
    }

    pub fn importer(&self) -> &I {
        &self.importer
    }

    /// Every diagnostic of `package`, ordered by position.
    pub fn check(&self, package: &Package) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        let names = self.package_names(package, &mut diags);

        for &root in &package.files {
            let Some(file) = package.ast.file(root) else {
                continue;
            };
            let imports = self.file_imports(package, &file.imports);
            let walker = Walker::new(&package.ast, &names, imports);
            diags.extend(walker.file(file));
        }

        diags.sort_by(|a, b| a.pos.cmp(&b.pos).then_with(|| a.message.cmp(&b.message)));
        debug!(
            package = %package.name,
            files = package.files.len(),
            diagnostics = diags.len(),
            "checked"
        );
        diags
    }

    /// Top-level names of every file; duplicates are reported where they
    /// are redeclared.
    fn package_names(&self, package: &Package, diags: &mut Vec<Diagnostic>) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut declare = |name: &str, pos: Pos| {
            if name == DISCARD || name == "init" {
                return;
            }
            if !names.insert(name.to_string()) {
                diags.push(Diagnostic::new(pos, format!("{name} redeclared in this block")));
            }
        };

        for &root in &package.files {
            let Some(file) = package.ast.file(root) else {
                continue;
            };
            for &decl in &file.decls {
                match package.ast.kind(decl) {
                    NodeKind::GenDecl(d) if d.keyword != DeclKeyword::Import => {
                        for &spec in &d.specs {
                            match package.ast.kind(spec) {
                                NodeKind::ValueSpec(s) => {
                                    for name in &s.names {
                                        declare(&name.name, name.pos);
                                    }
                                }
                                NodeKind::TypeSpec(s) => declare(&s.name.name, s.name.pos),
                                _ => {}
                            }
                        }
                    }
                    NodeKind::FuncDecl(d) if d.recv.is_none() => declare(&d.name.name, d.name.pos),
                    _ => {}
                }
            }
        }
        names
    }

    fn file_imports(&self, package: &Package, specs: &[NodeId]) -> Vec<Import> {
        let mut imports = Vec::new();

        for &spec in specs {
            let NodeKind::ImportSpec(spec) = package.ast.kind(spec) else {
                continue;
            };
            let explicit = spec.name.as_ref().map(|n| n.name.as_str());
            let (name, renamed, dot) = match explicit {
                Some(DISCARD) => continue,
                // Dot imports bind no name; any otherwise undefined name may use them.
                Some(".") => (String::new(), None, true),
                _ => {
                    let Some(declared) = self.importer.package_name(spec.unquoted()) else {
                        continue;
                    };
                    match explicit {
                        Some(name) if name != declared => {
                            (name.to_string(), Some(name.to_string()), false)
                        }
                        _ => (declared, None, false),
                    }
                }
            };
            imports.push(Import {
                name,
                quoted: spec.path.clone(),
                renamed,
                dot,
                pos: spec.path_pos,
                used: false,
            });
        }
        imports
    }
}

impl<I: Importer> Oracle for Checker<I> {
    fn check(&self, package: &Package) -> Vec<Diagnostic> {
        Checker::check(self, package)
    }
}
