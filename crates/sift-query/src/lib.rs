//! Query string parsing and syntax tree for sift.
//!
//! The query language understood by this crate:
//!
//! - **Words**: `cat dog` - adjacent bare words form one words node
//! - **Phrases**: `"black cat"` - exact sequences, `"black cat"~2` allows slop,
//!   a trailing `~` (`"black cats"~`) requests stemmed matching
//! - **Fuzzy terms**: `kitten~` or `kitten~1`
//! - **Prefixes**: `kitt*`
//! - **Negation**: `-dog` - excluded from results
//! - **OR**: `cat OR dog` - alternatives
//! - **Grouping**: `(a b) OR (c d)` - precedence control
//! - **Keywords**: `custommatch:depicts=Q146` - handed to keyword features
//!
//! # Example
//!
//! ```
//! use sift_query::parse;
//!
//! let query = parse("black cat -dog").unwrap();
//! assert_eq!(query.nodes().len(), 2);
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{
    FuzzyNode, KeywordNode, Node, ParsedQuery, PhraseNode, PrefixNode, QueryExpr, WordsNode,
};
pub use error::{LexError, ParseError, QueryError, QueryErrorKind};
pub use lexer::{Token, tokenize};
pub use parser::{DEFAULT_KEYWORDS, parse, parse_with_keywords};
