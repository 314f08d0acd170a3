//! Port traits abstracting all I/O away from the pipeline.

use camino::{Utf8Path, Utf8PathBuf};

/// Where Go sources come from.
pub trait SourcePort {
    fn is_dir(&self, path: &Utf8Path) -> anyhow::Result<bool>;
    /// Regular files directly inside `dir`, in any order.
    fn list_files(&self, dir: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>>;
    fn read_to_string(&self, path: &Utf8Path) -> anyhow::Result<String>;
}

/// Where rewritten sources go.
pub trait OutputPort {
    /// Replace the contents of `path`.
    fn write_file(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()>;
    /// Print `text` to the user (standard output for the CLI).
    fn emit(&self, text: &str) -> anyhow::Result<()>;
}
