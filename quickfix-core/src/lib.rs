//! Embeddable core library for goquickfix.
//!
//! Provides a clap-free, I/O-abstracted entry point: load Go sources, group
//! them by package, run the fix-point engine (or its reversal), print the
//! result and hand changed files to an output port.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`SourcePort`](ports::SourcePort): stat, list and read sources
//! - [`OutputPort`](ports::OutputPort): write files in place or emit text
//!
//! The [`adapters`] module provides filesystem-backed and in-memory
//! implementations.

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::{ModeReport, PackageOutcome, RunOutcome, ToolError, run};
pub use settings::{Mode, OutputMode, RunSettings};
