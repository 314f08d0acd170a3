mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use quickfix_core::adapters::{FsOutput, FsSource};
use quickfix_core::{Mode, ModeReport, OutputMode, RunSettings, ToolError};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "goquickfix",
    version,
    about = "Apply quick fixes to Go sources that are well typed but fail to build.",
    long_about = "Apply quick fixes to Go sources that are well typed but fail to build.\n\n\
        Unused variables get a `_ = x` statement, unused imports are renamed to `_`, \
        and `:=` statements that declare nothing new become `=`."
)]
struct Cli {
    /// Write results back to the source files instead of stdout.
    #[arg(short = 'w', long = "write")]
    write: bool,

    /// Print unified diffs instead of whole files.
    #[arg(short = 'd', long = "diff", conflicts_with = "write")]
    diff: bool,

    /// Undo earlier fixes: drop `_ = x` statements and restore blank imports.
    #[arg(long)]
    revert: bool,

    /// Maximum number of check-and-fix passes (default 10).
    #[arg(long, value_name = "N")]
    max_tries: Option<usize>,

    /// Config file (default: ./goquickfix.toml when present).
    #[arg(long, value_name = "PATH")]
    config: Option<Utf8PathBuf>,

    /// Log at debug level and print a summary per package.
    #[arg(short, long)]
    verbose: bool,

    /// Go files of one package, or exactly one directory.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<Utf8PathBuf>,
}

impl Cli {
    fn settings(&self) -> RunSettings {
        RunSettings {
            paths: self.paths.clone(),
            mode: if self.revert { Mode::Revert } else { Mode::Fix },
            output: if self.write {
                OutputMode::Write
            } else if self.diff {
                OutputMode::Diff
            } else {
                OutputMode::Stdout
            },
            ..RunSettings::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = real_main(&cli) {
        // ToolError already renders its whole chain.
        match e.downcast_ref::<ToolError>() {
            Some(err) => eprintln!("goquickfix: {err}"),
            None => eprintln!("goquickfix: {e:#}"),
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main(cli: &Cli) -> anyhow::Result<()> {
    let default_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let file_config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_or_default(Utf8Path::new("."))
            .context("load goquickfix.toml config")?,
    };

    let mut settings = cli.settings();
    file_config.apply(&mut settings, cli.max_tries);
    debug!(
        "settings: mode={:?}, output={:?}, max_tries={}, import overrides={}",
        settings.mode,
        settings.output,
        settings.max_tries,
        settings.import_names.len()
    );

    let outcome = quickfix_core::run(&settings, &FsSource, &FsOutput)?;

    if cli.verbose {
        for package in &outcome.packages {
            match &package.report {
                ModeReport::Fixed(report) => eprintln!("{}: {}", package.name, report),
                ModeReport::Reverted(report) => eprintln!("{}: {}", package.name, report),
            }
        }
        eprintln!(
            "{} file(s) changed, {} unchanged",
            outcome.changed.len(),
            outcome.unchanged
        );
    }
    Ok(())
}
