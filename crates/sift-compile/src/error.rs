//! Compilation errors.

use sift_config::ConfigError;
use thiserror::Error;

/// Errors that abort query compilation.
///
/// Queries that merely cannot match anything are not errors: they are reported through
/// [`crate::SearchContext`] warnings and the unsatisfiable flag.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The configuration is unusable for this query.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The query uses a keyword no feature is registered for.
    #[error("no keyword feature is registered for '{name}:'")]
    UnknownKeyword {
        /// Keyword name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_pass_through() {
        let err: CompileError = ConfigError::MissingProfileFields {
            profile: "depicts".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "custom match profile 'depicts' has no fields defined"
        );
    }

    #[test]
    fn unknown_keyword_message() {
        let err = CompileError::UnknownKeyword {
            name: "hastemplate".into(),
        };
        assert!(err.to_string().contains("hastemplate:"));
    }
}
