use quickfix_types::{Diagnostic, Position};
use std::fmt;

/// Why a classified fix could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixFailure {
    #[error("no statement container encloses the position")]
    NoStatementContainer,
    #[error("no import with path {0}")]
    ImportNotFound(String),
    #[error("no := statement encloses the position")]
    NoDefineStatement,
}

/// A diagnostic the engine could not dispose of.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unresolved {
    /// The position belongs to no file of the package.
    #[error("cannot find file for error {:?} ({})", .diagnostic.message, .diagnostic.pos)]
    Unlocated { diagnostic: Diagnostic },
    #[error("{position}: {}", .diagnostic.message)]
    Unrecognized {
        diagnostic: Diagnostic,
        position: Position,
    },
    /// Displays the original diagnostic; `reason` is for logs only.
    #[error("{position}: {}", .diagnostic.message)]
    FixFailed {
        diagnostic: Diagnostic,
        position: Position,
        reason: FixFailure,
    },
}

impl Unresolved {
    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            Unresolved::Unlocated { diagnostic }
            | Unresolved::Unrecognized { diagnostic, .. }
            | Unresolved::FixFailed { diagnostic, .. } => diagnostic,
        }
    }
}

/// Every unresolved diagnostic of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList(pub Vec<Unresolved>);

impl ErrorList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Unresolved> {
        self.0.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s):", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n- {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuickFixError {
    /// Diagnostics still unresolved when the pass budget ran out.
    #[error("{0}")]
    Unresolved(ErrorList),
}
