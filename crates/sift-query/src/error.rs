//! Query syntax errors.
//!
//! The lexer and the parser each report their own error type. [`QueryError`] pairs either one
//! with the query text so it can be rendered with a caret under the offending byte and a hint.

use std::{error::Error as StdError, fmt};

use thiserror::Error;

/// Tokenization failure at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at byte {position})")]
pub struct LexError {
    /// What went wrong.
    pub message: String,
    /// Byte offset into the query.
    pub position: usize,
}

impl LexError {
    /// Creates a lexer error at `position`.
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Grammar failure at a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Index of the offending token, `None` at end of input.
    pub token_index: Option<usize>,
}

impl ParseError {
    /// Creates a parser error at `token_index`.
    pub fn new(message: impl Into<String>, token_index: Option<usize>) -> Self {
        Self {
            message: message.into(),
            token_index,
        }
    }
}

/// The stage that rejected a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryErrorKind {
    /// The query could not be split into tokens.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The tokens do not form a valid query.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Hints keyed by a fragment of the error message.
const HINTS: &[(&str, &str)] = &[
    ("unclosed quote", "add a closing quote (\") to complete the phrase"),
    ("closing parenthesis", "add a closing parenthesis ) to match the opening one"),
    ("OR", "OR needs an expression on both sides, e.g. 'cat OR dog'"),
    ("keyword", "keywords take a value, e.g. 'custommatch:depicts=Q146'"),
];

/// A query that could not be parsed, with the text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// Stage-specific error.
    pub kind: QueryErrorKind,
    /// The query text.
    pub query: String,
}

impl QueryError {
    /// Attaches the query text to a lexer or parser error.
    pub fn new(kind: impl Into<QueryErrorKind>, query: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            query: query.into(),
        }
    }

    /// Returns the bare error message.
    pub fn message(&self) -> &str {
        match &self.kind {
            QueryErrorKind::Lex(err) => &err.message,
            QueryErrorKind::Parse(err) => &err.message,
        }
    }

    /// Returns the byte offset of the error, when the lexer reported one.
    pub fn position(&self) -> Option<usize> {
        match &self.kind {
            QueryErrorKind::Lex(err) => Some(err.position.min(self.query.len())),
            QueryErrorKind::Parse(_) => None,
        }
    }

    /// Returns a hint for common mistakes.
    pub fn suggestion(&self) -> Option<&'static str> {
        let message = self.message();
        HINTS
            .iter()
            .find(|(needle, _)| message.contains(needle))
            .map(|(_, hint)| *hint)
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "query syntax error: {}", self.message())?;
        writeln!(f, "  {}", self.query)?;
        if let Some(position) = self.position() {
            writeln!(f, "  {:>width$}", "^", width = position + 1)?;
        }
        if let Some(hint) = self.suggestion() {
            write!(f, "hint: {hint}")?;
        }
        Ok(())
    }
}

impl StdError for QueryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.kind)
    }
}
