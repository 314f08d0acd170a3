use crate::classify::{Params, Shape};
use crate::error::FixFailure;
use crate::fixers::Fixer;
use quickfix_types::ast::AssignTok;
use quickfix_types::{Ast, DISCARD, NodeId, NodeKind, Pos};

/// `x declared but not used`: append `_ = x` to the nearest statement list.
pub struct DiscardBindingFixer;

impl DiscardBindingFixer {
    /// Owner of the innermost statement list in `chain`. Loop headers
    /// resolve to their body.
    fn container(ast: &Ast, chain: &[NodeId]) -> Option<NodeId> {
        for (i, &id) in chain.iter().enumerate().rev() {
            match ast.kind(id) {
                NodeKind::Block { .. } => {
                    // The clause list of a switch or select holds no statements.
                    let clause_list = i > 0
                        && matches!(
                            ast.kind(chain[i - 1]),
                            NodeKind::Switch { .. } | NodeKind::Select { .. }
                        );
                    if !clause_list {
                        return Some(id);
                    }
                }
                NodeKind::CaseClause { .. } | NodeKind::CommClause { .. } => return Some(id),
                NodeKind::For { body, .. } | NodeKind::Range { body, .. } => return Some(*body),
                _ => {}
            }
        }
        None
    }
}

impl Fixer for DiscardBindingFixer {
    fn shape(&self) -> Shape {
        Shape::DeclaredNotUsed
    }

    fn apply(&self, ast: &mut Ast, chain: &[NodeId], params: &Params) -> Result<(), FixFailure> {
        let Params::Ident(name) = params else {
            return Err(FixFailure::NoStatementContainer);
        };
        let container = Self::container(ast, chain).ok_or(FixFailure::NoStatementContainer)?;
        let stmt = discard_stmt(ast, name);
        let list = ast
            .stmt_list_mut(container)
            .ok_or(FixFailure::NoStatementContainer)?;
        list.push(stmt);
        Ok(())
    }
}

/// Synthesize `_ = name`.
pub fn discard_stmt(ast: &mut Ast, name: &str) -> NodeId {
    let lhs = ast.synthesize(NodeKind::Ident {
        name: DISCARD.to_string(),
    });
    let rhs = ast.synthesize(NodeKind::Ident {
        name: name.to_string(),
    });
    ast.synthesize(NodeKind::Assign {
        lhs: vec![lhs],
        tok: AssignTok::Assign,
        tok_pos: Pos::NONE,
        rhs: vec![rhs],
    })
}
