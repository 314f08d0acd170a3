use crate::classify::{Params, Shape};
use crate::error::FixFailure;
use crate::fixers::Fixer;
use quickfix_types::ast::AssignTok;
use quickfix_types::{Ast, NodeId, NodeKind};

/// `no new variables on left side of :=`: turn the nearest `:=` into `=`.
pub struct DefineToAssignFixer;

impl Fixer for DefineToAssignFixer {
    fn shape(&self) -> Shape {
        Shape::NoNewVariables
    }

    fn apply(&self, ast: &mut Ast, chain: &[NodeId], _params: &Params) -> Result<(), FixFailure> {
        for &id in chain.iter().rev() {
            match ast.kind_mut(id) {
                NodeKind::Assign { tok, .. } if *tok == AssignTok::Define => {
                    *tok = AssignTok::Assign;
                    return Ok(());
                }
                NodeKind::Range { tok, .. } if *tok == Some(AssignTok::Define) => {
                    *tok = Some(AssignTok::Assign);
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(FixFailure::NoDefineStatement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickfix_types::{Pos, Span};

    #[test]
    fn nearest_define_wins() {
        let mut ast = Ast::new();
        let span = Span::new(Pos::new(1), Pos::new(10));
        let x = ast.alloc(span, NodeKind::Ident { name: "x".into() });
        let body = ast.alloc(span, NodeKind::Block { stmts: vec![] });
        let range = ast.alloc(
            span,
            NodeKind::Range {
                key: Some(x),
                value: None,
                tok: Some(AssignTok::Define),
                x,
                body,
            },
        );
        let assign = ast.alloc(
            span,
            NodeKind::Assign {
                lhs: vec![x],
                tok: AssignTok::Define,
                tok_pos: Pos::new(3),
                rhs: vec![x],
            },
        );

        DefineToAssignFixer
            .apply(&mut ast, &[range, body, assign], &Params::Empty)
            .expect("assign is in the chain");
        assert!(matches!(ast.kind(assign), NodeKind::Assign { tok: AssignTok::Assign, .. }));
        assert!(matches!(ast.kind(range), NodeKind::Range { tok: Some(AssignTok::Define), .. }));

        DefineToAssignFixer
            .apply(&mut ast, &[range, body, assign], &Params::Empty)
            .expect("range is next");
        assert!(matches!(ast.kind(range), NodeKind::Range { tok: Some(AssignTok::Assign), .. }));

        assert_eq!(
            DefineToAssignFixer.apply(&mut ast, &[range, body, assign], &Params::Empty),
            Err(FixFailure::NoDefineStatement)
        );
    }
}
