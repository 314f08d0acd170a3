//! Domain logic: turn oracle diagnostics into structural edits until a
//! package builds.
//!
//! This crate owns *what* gets rewritten and when. It does not parse, print
//! or touch the filesystem; callers hand it a parsed [`Package`] and an
//! [`Oracle`], and print the tree afterwards.
//!
//! [`Package`]: quickfix_types::Package
//! [`Oracle`]: quickfix_types::Oracle

mod classify;
mod driver;
mod error;
mod fixers;
mod locate;
mod revert;

pub use classify::{Params, Shape, classify};
pub use driver::{DEFAULT_MAX_TRIES, Fix, PassReport, QuickFixer};
pub use error::{ErrorList, FixFailure, QuickFixError, Unresolved};
pub use fixers::{
    BlankImportFixer, DefineToAssignFixer, DiscardBindingFixer, Fixer, builtin_fixers,
    discard_stmt,
};
pub use locate::{enclosing_chain, find_file};
pub use revert::{DEFAULT_SIDE_EFFECT_IMPORTS, RevertReport, Reverter};
