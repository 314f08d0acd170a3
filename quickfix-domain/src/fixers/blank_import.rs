use crate::classify::{Params, Shape};
use crate::error::FixFailure;
use crate::fixers::Fixer;
use quickfix_types::{Ast, DISCARD, Ident, NodeId, NodeKind};

/// `"p" imported but not used`: rebind the import to `_`.
pub struct BlankImportFixer;

impl Fixer for BlankImportFixer {
    fn shape(&self) -> Shape {
        Shape::ImportedNotUsed
    }

    fn apply(&self, ast: &mut Ast, chain: &[NodeId], params: &Params) -> Result<(), FixFailure> {
        let Params::QuotedPath(path) = params else {
            return Err(FixFailure::ImportNotFound(String::new()));
        };
        let not_found = || FixFailure::ImportNotFound(path.clone());

        let imports = chain
            .iter()
            .find_map(|&id| ast.file(id))
            .map(|file| file.imports.clone())
            .ok_or_else(not_found)?;

        // An import already bound to `_` was handled earlier in this pass.
        let target = imports
            .into_iter()
            .find(|&id| {
                matches!(ast.kind(id), NodeKind::ImportSpec(spec) if spec.path == *path && !spec.is_blank())
            })
            .ok_or_else(not_found)?;

        if let NodeKind::ImportSpec(spec) = ast.kind_mut(target) {
            let pos = spec.name.as_ref().map_or(spec.path_pos, |n| n.pos);
            spec.name = Some(Ident::new(DISCARD, pos));
        }
        Ok(())
    }
}
