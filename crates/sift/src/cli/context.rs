//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use sift_config::{Config, discover_config_file};
use tracing::debug;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Configuration file given with `--config`.
    config_override: Option<PathBuf>,
}

impl CommandContext {
    /// Resolves the current directory. Configuration is loaded on demand so that `init` works
    /// even when an existing file is invalid.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self, ExitCode> {
        let cwd = env::current_dir().map_err(|e| {
            eprintln!("error: could not determine current directory: {e}");
            ExitCode::FAILURE
        })?;
        Ok(Self {
            cwd,
            config_override,
        })
    }

    /// Returns the configuration file in effect, if any.
    pub fn config_file(&self) -> Option<PathBuf> {
        match &self.config_override {
            Some(path) => Some(self.cwd.join(path)),
            None => discover_config_file(&self.cwd),
        }
    }

    /// Loads the configuration, falling back to the defaults when no file applies.
    pub fn config(&self) -> Result<Config, ExitCode> {
        match self.config_file() {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration");
                load_config_or_failure(&path)
            }
            None => {
                debug!("no configuration file found, using defaults");
                Ok(Config::with_defaults())
            }
        }
    }

    /// Loads the configuration with the language fallback chain replaced by `languages`.
    pub fn config_with_languages(&self, languages: Option<&[String]>) -> Result<Config, ExitCode> {
        let mut config = self.config()?;
        if let Some(languages) = languages {
            config.search.languages = languages.to_vec();
        }
        Ok(config)
    }
}

/// Loads a configuration file or exits with an error.
fn load_config_or_failure(path: &Path) -> Result<Config, ExitCode> {
    Config::load_file(path).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
