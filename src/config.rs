//! Configuration file support.
//!
//! An optional `pkgdeptree.toml` supplies defaults for the command line.
//! It is discovered in the working directory or given explicitly with
//! `--config`; flags on the command line always win.
//!
//! ```toml
//! warn = "fail"
//! depth = 2
//! exclude = ["pip", "setuptools"]
//! unicode = true
//! all = false
//! duplicate_policy = "first-seen"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::graph::DuplicatePolicy;

/// File name looked up by [`discover_config`].
pub const CONFIG_FILENAME: &str = "pkgdeptree.toml";

/// What to do when the analysis finds problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WarnPolicy {
    /// Never print warnings
    Silence,
    /// Print warnings, exit successfully
    #[default]
    Suppress,
    /// Print warnings, exit with status 1 if there were any
    Fail,
}

impl std::fmt::Display for WarnPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarnPolicy::Silence => write!(f, "silence"),
            WarnPolicy::Suppress => write!(f, "suppress"),
            WarnPolicy::Fail => write!(f, "fail"),
        }
    }
}

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration file schema.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub warn: Option<WarnPolicy>,
    pub depth: Option<usize>,
    pub exclude: Option<Vec<String>>,
    pub unicode: Option<bool>,
    pub all: Option<bool>,
    pub duplicate_policy: Option<DuplicatePolicy>,
    /// Keys this version does not know about.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, toml::Value>,
}

/// Loads config from an explicit path.
///
/// # Errors
///
/// Fails when the file cannot be read or is not valid for the schema.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut unknown: Vec<&String> = config.unknown_fields.keys().collect();
    unknown.sort();
    for key in unknown {
        warn!(key = %key, path = %path.display(), "unknown config field will be ignored");
    }
    debug!(path = %path.display(), "loaded configuration");

    Ok(config)
}

/// Looks for [`CONFIG_FILENAME`] in `dir`. Returns `None` when absent.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.is_file() {
        return Ok(None);
    }
    load_config_from_path(&path).map(Some)
}
