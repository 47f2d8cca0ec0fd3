//! Statement matching for recognized entities.

use std::collections::BTreeMap;

use sift_config::Config;
use sift_query::{Node, ParsedQuery};
use tracing::debug;

use crate::{
    DisMaxQuery, Fragment, MatchQuery,
    recognizer::{EntityRecognizer, RecognizedEntity, Synonym},
};

/// Compiles the entities recognized for one node into a statement-match fragment.
///
/// Recognition runs once, when the handler is created, so the words handler can reuse the
/// recognized entities' synonyms.
#[derive(Debug, Clone)]
pub struct EntitiesHandler<'a> {
    /// Statement field, boost and property weights.
    config: &'a Config,
    /// Entities recognized for the node.
    entities: Vec<RecognizedEntity>,
}

impl<'a> EntitiesHandler<'a> {
    /// Recognizes the entities `node` refers to within `query`.
    pub fn new(
        config: &'a Config,
        recognizer: &dyn EntityRecognizer,
        query: &ParsedQuery,
        node: &Node,
    ) -> Self {
        let entities = recognizer.recognize(query, node);
        debug!(node = %node, entities = entities.len(), "recognized entities");
        Self::with_entities(config, entities)
    }

    /// Creates a handler for already recognized entities.
    pub fn with_entities(config: &'a Config, entities: Vec<RecognizedEntity>) -> Self {
        Self { config, entities }
    }

    /// Builds the statement-match fragment.
    ///
    /// Each entity and configured property contributes a match on `property=entity`; the best
    /// single statement wins. Without entities or properties the fragment matches nothing.
    pub fn transform(&self) -> Fragment {
        let settings = &self.config.entities;
        let clauses: Vec<Fragment> = self
            .entities
            .iter()
            .flat_map(|entity| {
                let confidence = if settings.scale_by_confidence {
                    entity.score
                } else {
                    1.0
                };
                settings.properties.iter().map(move |(property, weight)| {
                    Fragment::from(
                        MatchQuery::new(&settings.field, format!("{property}={}", entity.id))
                            .boost(settings.boost * weight * confidence),
                    )
                })
            })
            .collect();

        if clauses.is_empty() {
            Fragment::MatchNone
        } else {
            DisMaxQuery::new(clauses).into()
        }
    }

    /// Returns the synonyms of every recognized entity, merged by term.
    ///
    /// A term offered by several entities keeps its highest score and the union of its language
    /// restrictions. Synonyms equal to `primary` are dropped.
    pub fn synonyms(&self, primary: &str) -> Vec<Synonym> {
        let primary = primary.to_lowercase();
        let mut merged: BTreeMap<String, Synonym> = BTreeMap::new();

        for synonym in self.entities.iter().flat_map(|entity| &entity.synonyms) {
            let key = synonym.term.to_lowercase();
            if key == primary {
                continue;
            }
            match merged.get_mut(&key) {
                Some(existing) => {
                    existing.score = existing.score.max(synonym.score);
                    existing.languages = union_languages(
                        existing.languages.take(),
                        synonym.languages.as_deref(),
                    );
                }
                None => {
                    merged.insert(key, synonym.clone());
                }
            }
        }

        merged.into_values().collect()
    }
}

/// Unions two language restrictions; `None` means every language.
fn union_languages(current: Option<Vec<String>>, other: Option<&[String]>) -> Option<Vec<String>> {
    let (mut current, other) = (current?, other?);
    for language in other {
        if !current.contains(language) {
            current.push(language.clone());
        }
    }
    Some(current)
}
