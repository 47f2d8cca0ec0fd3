//! Builders for the per-field clause of one search string.

use crate::{Fragment, MatchQuery, PhraseQuery, PrefixQuery, fragment::Fuzziness};

/// How one search string is matched against a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseBuilder {
    /// Full-text match.
    Match(String),
    /// Phrase match with slop.
    Phrase {
        /// Phrase text.
        text: String,
        /// Permitted word displacement.
        slop: u32,
    },
    /// Full-text match with edit-distance tolerance.
    Fuzzy {
        /// Term text.
        text: String,
        /// Explicit distance, or `None` for automatic.
        fuzziness: Option<u32>,
    },
    /// Prefix match.
    Prefix(String),
}

impl ClauseBuilder {
    /// Builds the clause for `field` at `boost`.
    pub fn build(&self, field: &str, boost: f64) -> Fragment {
        match self {
            Self::Match(text) => MatchQuery::new(field, text).boost(boost).into(),
            Self::Phrase { text, slop } => PhraseQuery::new(field, text)
                .slop(*slop)
                .boost(boost)
                .into(),
            Self::Fuzzy { text, fuzziness } => MatchQuery::new(field, text)
                .boost(boost)
                .fuzziness(fuzziness.map_or(Fuzziness::Auto, Fuzziness::Distance))
                .into(),
            Self::Prefix(text) => PrefixQuery::new(field, text).boost(boost).into(),
        }
    }
}
