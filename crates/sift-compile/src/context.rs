//! Per-query compilation state.

use std::fmt;

use serde::Serialize;

use crate::Fragment;

/// A user-facing warning, identified by a message key and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Message key.
    pub key: String,
    /// Message parameters.
    pub params: Vec<String>,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}: {}", self.key, self.params.join(", "))
        }
    }
}

/// State shared by every node of one query while it is compiled.
///
/// Keyword features add non-text filters here, and any component may report a warning or
/// declare that the query cannot match anything.
#[derive(Debug, Default)]
pub struct SearchContext {
    /// Filters applied to the whole query.
    filters: Vec<Fragment>,
    /// Warnings collected so far.
    warnings: Vec<Warning>,
    /// Set when no document can match.
    unsatisfiable: bool,
}

impl SearchContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter applied to the whole query.
    pub fn add_filter(&mut self, fragment: Fragment) {
        self.filters.push(fragment);
    }

    /// Records a warning.
    pub fn add_warning<I, S>(&mut self, key: &str, params: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warnings.push(Warning {
            key: key.to_string(),
            params: params.into_iter().map(Into::into).collect(),
        });
    }

    /// Declares that the query cannot match any document.
    pub fn set_unsatisfiable(&mut self) {
        self.unsatisfiable = true;
    }

    /// Returns true if the query cannot match any document.
    pub fn is_unsatisfiable(&self) -> bool {
        self.unsatisfiable
    }

    /// Returns the filters collected so far.
    pub fn filters(&self) -> &[Fragment] {
        &self.filters
    }

    /// Returns the warnings collected so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Splits the context into filters, warnings and the unsatisfiable flag.
    pub fn into_parts(self) -> (Vec<Fragment>, Vec<Warning>, bool) {
        (self.filters, self.warnings, self.unsatisfiable)
    }
}
