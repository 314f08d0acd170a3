//! Shared value types for the goquickfix workspace.
//!
//! # Design constraints
//! - Positions are global: every file of a [`Package`] lives in one [`FileSet`],
//!   so a [`Pos`] resolves to at most one file.
//! - The syntax tree is an arena ([`Ast`]) addressed by [`NodeId`]. There are no
//!   parent links; enclosing context is recomputed from the file root on demand.
//! - Edits are structural. Synthesized nodes carry [`Span::NONE`].

pub mod ast;
pub mod diagnostic;
pub mod importer;
pub mod oracle;
pub mod package;
pub mod pos;

pub use ast::{Ast, Ident, Node, NodeId, NodeKind};
pub use diagnostic::Diagnostic;
pub use importer::Importer;
pub use oracle::Oracle;
pub use package::Package;
pub use pos::{FileSet, Pos, Position, SourceFile, Span};

/// The language's write-only binding target.
pub const DISCARD: &str = "_";
