//! The compilation scope: all files of one package, type-checked together.

use crate::ast::{Ast, NodeId};
use crate::pos::{FileSet, Pos, Position};

#[derive(Debug, Clone, Default)]
pub struct Package {
    pub name: String,
    pub fset: FileSet,
    pub ast: Ast,
    /// Root `File` node of every translation unit, in load order.
    pub files: Vec<NodeId>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn position(&self, pos: Pos) -> Position {
        self.fset.position(pos)
    }

    /// Name of the source file a root id was parsed from.
    pub fn filename(&self, id: NodeId) -> String {
        self.position(self.ast.span(id).lo).filename.to_string()
    }
}
