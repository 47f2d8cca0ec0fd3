//! Single-term expansion shared by the simpler term handlers.

use sift_config::{Config, localize};

use crate::{BoolQuery, clause::ClauseBuilder};

/// Weight of a stemmed clause relative to its plain counterpart.
const STEMMED_MULTIPLIER: f64 = 3.0;

/// Expands one search string over every boosted stemmed field and its plain counterpart.
///
/// Stemmed matches score three times their plain counterparts. Language-aware templates are
/// expanded per fallback language with decay; the stemmed field is skipped in languages without
/// query-time stemming.
#[derive(Debug, Clone, Copy)]
pub struct TextHandler<'a> {
    /// Weights, roster and search settings.
    config: &'a Config,
}

impl<'a> TextHandler<'a> {
    /// Creates a handler.
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Builds a `bool` of should clauses. No minimum match is set; callers decide.
    pub fn transform(&self, clause: &ClauseBuilder) -> BoolQuery {
        let roster = &self.config.fields;
        let mut query = BoolQuery::new();

        for field in &roster.stemmed {
            let boost = self.config.boost(field);
            if boost <= 0.0 {
                continue;
            }
            query = query.should(clause.build(field, STEMMED_MULTIPLIER * boost));
            if let Some(plain) = roster.plain_variant(field) {
                query = query.should(clause.build(plain, boost));
            }
        }

        for template in &roster.stemmed_templates {
            let boost = self.config.boost(template);
            let decay = self.config.decay(template);
            let mut weight = boost;
            for language in &self.config.search.languages {
                if weight > 0.0 {
                    if self.config.query_stemming(language) {
                        query = query.should(
                            clause.build(&localize(template, language), STEMMED_MULTIPLIER * weight),
                        );
                    }
                    if let Some(plain) = roster.plain_variant(template) {
                        query = query.should(clause.build(&localize(plain, language), weight));
                    }
                }
                weight *= decay;
            }
        }

        query
    }
}
