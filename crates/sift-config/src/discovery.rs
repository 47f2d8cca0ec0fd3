//! Configuration file discovery.
//!
//! Finds the `.sift.toml` closest to a starting directory, falling back to the global
//! `~/.sift.toml`.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".sift.toml";

/// Returns the configuration file that applies to `cwd`.
///
/// Walks up from `cwd` to the filesystem root and returns the first `.sift.toml` found. If
/// there is none, returns `~/.sift.toml` when it exists.
pub fn discover_config_file(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|path| path.is_file())
        .or_else(|| global_config_path().filter(|path| path.is_file()))
}

/// Returns the path to the global configuration file (`~/.sift.toml`).
///
/// Returns `None` if the home directory cannot be determined.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}
