//! Clap-free settings for a goquickfix run.

use camino::Utf8PathBuf;
use quickfix_domain::DEFAULT_MAX_TRIES;
use std::collections::BTreeMap;

/// Forward fixes or their reversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Fix,
    Revert,
}

/// What happens to a file whose printed text changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Emit the new text.
    #[default]
    Stdout,
    /// Replace the file.
    Write,
    /// Emit a unified diff against the original.
    Diff,
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Files, or exactly one directory.
    pub paths: Vec<Utf8PathBuf>,
    pub mode: Mode,
    pub output: OutputMode,
    pub max_tries: usize,
    /// Import path to package name, for packages not named after their path.
    pub import_names: BTreeMap<String, String>,
    /// Added to the built-in side-effect import list used by revert.
    pub side_effect_imports: Vec<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            mode: Mode::default(),
            output: OutputMode::default(),
            max_tries: DEFAULT_MAX_TRIES,
            import_names: BTreeMap::new(),
            side_effect_imports: Vec::new(),
        }
    }
}
