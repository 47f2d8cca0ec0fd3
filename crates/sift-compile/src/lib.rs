//! Query compilation for sift.
//!
//! Turns a parsed query and its configuration into a weighted boolean query for a document
//! search engine:
//!
//! - [`FieldIterator`] yields the `(field, boost)` pairs that score a term across the field
//!   roster and the language fallback chain, with per-language decay and stemmed-to-plain
//!   substitution;
//! - the [`handlers`] compile words, phrases and single terms, blending in statement matches
//!   for entities an [`EntityRecognizer`] finds in the query;
//! - [`CustomMatchFeature`] implements the `custommatch:<profile>=<term>` keyword;
//! - [`QueryCompiler`] walks the syntax tree and folds everything into one [`Fragment`].
//!
//! # Example
//!
//! ```ignore
//! let config = Config::load(&cwd)?;
//! let recognizer = LexiconRecognizer::new(&config.lexicon);
//! let query = sift_query::parse("\"big cat\" -dog")?;
//! let compiled = QueryCompiler::new(&config, &recognizer).compile(&query)?;
//! ```

#![warn(missing_docs)]

mod clause;
mod compiler;
mod context;
mod custom_match;
mod error;
mod fields;
mod fragment;
pub mod handlers;
mod recognizer;

pub use clause::ClauseBuilder;
pub use compiler::{CompiledQuery, QueryCompiler};
pub use context::{SearchContext, Warning};
pub use custom_match::{
    CUSTOM_MATCH_KEYWORD, CustomMatchFeature, INVALID_SYNTAX_WARNING, KeywordFeature,
    KeywordOutcome, ProfileQuery, UNKNOWN_PROFILE_WARNING,
};
pub use error::CompileError;
pub use fields::{FieldBoost, FieldIterator};
pub use fragment::{
    BoolQuery, DisMaxQuery, Fragment, FunctionScoreQuery, Fuzziness, MatchQuery,
    MultiMatchQuery, PhraseQuery, PrefixQuery,
};
pub use recognizer::{EntityRecognizer, LexiconRecognizer, NoEntities, RecognizedEntity, Synonym};
