//! Error types for sift configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::{de, ser};

/// Errors that can occur when loading or using configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// Failed to render configuration as TOML.
    #[error("failed to serialize configuration: {0}")]
    SerializeToml(#[from] ser::Error),

    /// A custom match profile is declared without a `fields` array.
    #[error("custom match profile '{profile}' has no fields defined")]
    MissingProfileFields {
        /// Name of the misconfigured profile.
        profile: String,
    },
}
