use crate::pos::{FileSet, Pos};
use std::fmt;

/// One problem reported by an oracle: where, and the rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub pos: Pos,
    pub message: String,
}

impl Diagnostic {
    pub fn new(pos: Pos, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }

    /// `file:line:col: message`
    pub fn render(&self, fset: &FileSet) -> String {
        format!("{}: {}", fset.position(self.pos), self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
