//! Filesystem-backed and in-memory port implementations.

use crate::ports::{OutputPort, SourcePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;

/// Reads sources from the filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsSource;

impl SourcePort for FsSource {
    fn is_dir(&self, path: &Utf8Path) -> anyhow::Result<bool> {
        let meta = fs::metadata(path).with_context(|| format!("stat {}", path))?;
        Ok(meta.is_dir())
    }

    fn list_files(&self, dir: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir))? {
            let entry = entry.with_context(|| format!("read dir {}", dir))?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = Utf8PathBuf::from_path_buf(entry.path())
                .map_err(|p| anyhow::anyhow!("non-UTF-8 path {}", p.display()))?;
            files.push(path);
        }
        Ok(files)
    }

    fn read_to_string(&self, path: &Utf8Path) -> anyhow::Result<String> {
        fs::read_to_string(path).with_context(|| format!("read {}", path))
    }
}

/// Writes files in place and emits to standard output.
#[derive(Debug, Clone, Default)]
pub struct FsOutput;

impl OutputPort for FsOutput {
    fn write_file(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn emit(&self, text: &str) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|()| stdout.flush())
            .context("write to stdout")
    }
}

/// In-memory source tree for embedding and testing.
///
/// Directories are implied by file paths.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: BTreeMap<Utf8PathBuf, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl SourcePort for InMemorySource {
    fn is_dir(&self, path: &Utf8Path) -> anyhow::Result<bool> {
        if self.files.contains_key(path) {
            return Ok(false);
        }
        if self.files.keys().any(|f| f.starts_with(path)) {
            return Ok(true);
        }
        anyhow::bail!("stat {}: no such file or directory", path)
    }

    fn list_files(&self, dir: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
        Ok(self
            .files
            .keys()
            .filter(|f| f.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn read_to_string(&self, path: &Utf8Path) -> anyhow::Result<String> {
        self.files
            .get(path)
            .cloned()
            .with_context(|| format!("read {}: no such file", path))
    }
}

/// Records writes and emitted text.
#[derive(Debug, Default)]
pub struct InMemoryOutput {
    written: RefCell<BTreeMap<Utf8PathBuf, String>>,
    emitted: RefCell<String>,
}

impl InMemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written(&self) -> BTreeMap<Utf8PathBuf, String> {
        self.written.borrow().clone()
    }

    pub fn emitted(&self) -> String {
        self.emitted.borrow().clone()
    }
}

impl OutputPort for InMemoryOutput {
    fn write_file(&self, path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
        self.written
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn emit(&self, text: &str) -> anyhow::Result<()> {
        self.emitted.borrow_mut().push_str(text);
        Ok(())
    }
}
