//! The load, fix, print pipeline.
//!
//! Everything here is I/O-agnostic: sources are read through a
//! [`SourcePort`] and results leave through an [`OutputPort`]. Nothing is
//! written until every package has been processed, so a failing package
//! leaves all files untouched.

use crate::ports::{OutputPort, SourcePort};
use crate::settings::{Mode, OutputMode, RunSettings};
use anyhow::Context;
use camino::Utf8PathBuf;
use quickfix_check::{Checker, PathImporter};
use quickfix_domain::{PassReport, QuickFixError, QuickFixer, RevertReport, Reverter};
use quickfix_syntax::{package_name, parse_file, print_file};
use quickfix_types::Package;
use tracing::{debug, info};

/// Exit code 1 for both; usage errors never reach the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// A package could not be fixed within the pass budget.
    #[error("{errors}")]
    Unresolved {
        package: String,
        errors: QuickFixError,
    },
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// One source file as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub path: Utf8PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeReport {
    Fixed(PassReport),
    Reverted(RevertReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    pub name: String,
    pub files: Vec<Utf8PathBuf>,
    pub report: ModeReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub packages: Vec<PackageOutcome>,
    /// Files whose printed text differs from the original.
    pub changed: Vec<Utf8PathBuf>,
    pub unchanged: usize,
}

/// Read the files named by `paths`.
///
/// A directory must be the only path; its `*.go` files are read in name
/// order, skipping names starting with `_` or `.`.
pub fn load_sources(
    paths: &[Utf8PathBuf],
    source: &dyn SourcePort,
) -> anyhow::Result<Vec<LoadedFile>> {
    let mut files = Vec::new();
    for path in paths {
        if !source.is_dir(path)? {
            files.push(LoadedFile {
                path: path.clone(),
                contents: source.read_to_string(path)?,
            });
            continue;
        }
        if paths.len() != 1 {
            anyhow::bail!("you can only specify exactly one directory");
        }

        let mut names = source.list_files(path)?;
        names.retain(|p| {
            p.file_name().is_some_and(|name| {
                name.ends_with(".go") && !name.starts_with('_') && !name.starts_with('.')
            })
        });
        names.sort();
        if names.is_empty() {
            anyhow::bail!("no Go files in {}", path);
        }
        for name in names {
            let contents = source.read_to_string(&name)?;
            files.push(LoadedFile {
                path: name,
                contents,
            });
        }
    }
    debug!(files = files.len(), "loaded sources");
    Ok(files)
}

/// Split files by declared package name, keeping first-seen order.
pub fn group_by_package(files: Vec<LoadedFile>) -> Vec<(String, Vec<LoadedFile>)> {
    let mut groups: Vec<(String, Vec<LoadedFile>)> = Vec::new();
    for file in files {
        let name = package_name(&file.contents).unwrap_or_default();
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, members)) => members.push(file),
            None => groups.push((name, vec![file])),
        }
    }
    groups
}

/// Run the whole pipeline.
pub fn run(
    settings: &RunSettings,
    source: &dyn SourcePort,
    output: &dyn OutputPort,
) -> Result<RunOutcome, ToolError> {
    let files = load_sources(&settings.paths, source)?;
    let importer = PathImporter::with_overrides(settings.import_names.clone());

    let mut outcome = RunOutcome::default();
    let mut rendered: Vec<(LoadedFile, String)> = Vec::new();

    for (name, members) in group_by_package(files) {
        let mut package = Package::new(name.clone());
        for file in &members {
            parse_file(&mut package, file.path.clone(), &file.contents)
                .with_context(|| format!("parse {}", file.path))?;
        }

        let report = match settings.mode {
            Mode::Fix => {
                let fixer = QuickFixer::new(Checker::new(&importer)).max_tries(settings.max_tries);
                let report = fixer
                    .quick_fix(&mut package)
                    .map_err(|errors| ToolError::Unresolved {
                        package: name.clone(),
                        errors,
                    })?;
                info!(package = %name, %report, "fixed");
                ModeReport::Fixed(report)
            }
            Mode::Revert => {
                let report = Reverter::new(&importer)
                    .side_effect_imports(settings.side_effect_imports.iter().cloned())
                    .revert(&mut package);
                info!(package = %name, %report, "reverted");
                ModeReport::Reverted(report)
            }
        };

        outcome.packages.push(PackageOutcome {
            name,
            files: members.iter().map(|f| f.path.clone()).collect(),
            report,
        });
        for (file, &root) in members.into_iter().zip(&package.files) {
            let printed = print_file(&package, root);
            rendered.push((file, printed));
        }
    }

    for (file, printed) in rendered {
        if printed == file.contents {
            debug!(path = %file.path, "unchanged, skipped");
            outcome.unchanged += 1;
            continue;
        }
        match settings.output {
            OutputMode::Stdout => output.emit(&printed)?,
            OutputMode::Write => output.write_file(&file.path, &printed)?,
            OutputMode::Diff => output.emit(&unified_diff(&file, &printed))?,
        }
        outcome.changed.push(file.path);
    }

    Ok(outcome)
}

fn unified_diff(file: &LoadedFile, printed: &str) -> String {
    let patch = diffy::create_patch(&file.contents, printed).to_string();
    // Replace diffy's placeholder file names.
    let hunks = patch.splitn(3, '\n').nth(2).unwrap_or_default();

    let mut out = format!("diff -u a/{0} b/{0}\n--- a/{0}\n+++ b/{0}\n", file.path);
    out.push_str(hunks);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
