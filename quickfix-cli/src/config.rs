//! Configuration file loading for goquickfix.
//!
//! Discovers and loads `goquickfix.toml` from the working directory.
//! Command-line flags take precedence over the file.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use quickfix_core::RunSettings;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "goquickfix.toml";

/// Top-level configuration from goquickfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuickfixConfig {
    /// Pass budget for the fix loop.
    pub max_tries: Option<usize>,

    /// Package names for import paths whose last element is not the name.
    pub imports: BTreeMap<String, String>,

    pub revert: RevertConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevertConfig {
    /// Import path patterns kept blank on revert; a trailing `*` matches a prefix.
    pub side_effect_imports: Vec<String>,
}

/// Look for `goquickfix.toml` directly under `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<QuickfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<QuickfixConfig> {
    let config: QuickfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `dir`, or return the default if there is none.
pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<QuickfixConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(QuickfixConfig::default()),
    }
}

impl QuickfixConfig {
    /// Fold the file settings into `settings`.
    ///
    /// A `max_tries` already given on the command line wins.
    pub fn apply(self, settings: &mut RunSettings, cli_max_tries: Option<usize>) {
        if let Some(n) = cli_max_tries.or(self.max_tries) {
            settings.max_tries = n;
        }
        settings.import_names.extend(self.imports);
        settings
            .side_effect_imports
            .extend(self.revert.side_effect_imports);
    }
}
