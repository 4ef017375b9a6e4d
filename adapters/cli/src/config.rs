//! Optional TOML settings file for the command-line adapter.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use aura_core::TestMode;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}")]
    Read {
        /// Location of the settings file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The settings file is not valid TOML for [`Settings`].
    #[error("invalid settings file {path}")]
    Parse {
        /// Location of the settings file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
}

/// Values that may be supplied through the settings file.
///
/// Command-line flags take precedence over every field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Location of the record store slot.
    pub store_path: Option<PathBuf>,
    /// Master seed for the simulation systems.
    pub seed: Option<u64>,
    /// Mode used by `scan` when no mode flag is given.
    pub default_mode: Option<TestMode>,
}

impl Settings {
    /// Reads and parses the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
