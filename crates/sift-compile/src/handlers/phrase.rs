//! Quoted phrases.

use sift_config::Config;
use sift_query::PhraseNode;

use super::EntitiesHandler;
use crate::{BoolQuery, Fragment, PhraseQuery, clause::ClauseBuilder, fields::FieldIterator};

/// Compiles a phrase node and its recognized entities.
#[derive(Debug)]
pub struct PhraseHandler<'a> {
    /// Weights, roster and search settings.
    config: &'a Config,
    /// The node being compiled.
    node: &'a PhraseNode,
    /// Statement matching for the node.
    entities: EntitiesHandler<'a>,
}

impl<'a> PhraseHandler<'a> {
    /// Creates a handler.
    pub fn new(config: &'a Config, node: &'a PhraseNode, entities: EntitiesHandler<'a>) -> Self {
        Self {
            config,
            node,
            entities,
        }
    }

    /// Builds the fragment.
    ///
    /// A stemmed phrase searches the stemmed fields, any other phrase the plain fields. Fields
    /// without position data never take part.
    pub fn transform(&self) -> Fragment {
        let roster = &self.config.fields;
        let search = &self.config.search;
        let (candidates, all_field) = if self.node.stem {
            (roster.stemmed_fields(), &search.all_field)
        } else {
            (roster.plain_fields(), &search.all_plain_field)
        };

        let slop = self.slop();
        let fields = FieldIterator::new(
            self.config,
            candidates
                .into_iter()
                .filter(|field| !roster.lacks_positions(field)),
            search.languages.clone(),
        )
        .excluding(&roster.no_positions);

        let clause = ClauseBuilder::Phrase {
            text: self.node.phrase.clone(),
            slop,
        };
        let phrase = BoolQuery::new()
            .filter(PhraseQuery::new(all_field, &self.node.phrase).slop(slop))
            .should_all(fields.map(|fb| clause.build(&fb.field, fb.boost)))
            .minimum_should_match(0);

        BoolQuery::new()
            .should(phrase)
            .should(self.entities.transform())
            .minimum_should_match(1)
            .into()
    }

    /// Returns the node's slop, clamped to zero.
    fn slop(&self) -> u32 {
        u32::try_from(self.node.slop).unwrap_or(0)
    }
}
