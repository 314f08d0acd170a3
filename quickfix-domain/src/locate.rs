//! Position lookup over a package.
//!
//! Nothing here is cached: the chain is recomputed per diagnostic from the
//! file root, so it always reflects the current tree.

use quickfix_types::{Ast, NodeId, Package, Pos};

/// The file whose span holds `pos`.
pub fn find_file(package: &Package, pos: Pos) -> Option<NodeId> {
    package
        .files
        .iter()
        .copied()
        .find(|&root| package.ast.span(root).contains(pos))
}

/// Nodes from `file` down to the innermost node containing `pos`, root first.
///
/// Synthesized nodes have no span and are never entered.
pub fn enclosing_chain(ast: &Ast, file: NodeId, pos: Pos) -> Vec<NodeId> {
    let mut chain = vec![file];
    let mut current = file;
    while let Some(next) = ast
        .children(current)
        .into_iter()
        .find(|&child| ast.span(child).contains(pos))
    {
        chain.push(next);
        current = next;
    }
    chain
}
