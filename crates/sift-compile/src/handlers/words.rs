//! Free words.

use sift_config::Config;
use sift_query::WordsNode;

use super::EntitiesHandler;
use crate::{
    BoolQuery, DisMaxQuery, Fragment, MultiMatchQuery, PhraseQuery,
    clause::ClauseBuilder,
    fields::FieldIterator,
    recognizer::Synonym,
};

/// Compiles a words node, its synonyms and its recognized entities.
///
/// The primary words must all be present in the combined fields. Synonyms are filtered by an
/// exact phrase on the combined stemmed field. The best synonym competes with the primary
/// words in a `dis_max`, and the text and entity parts are combined so that either may match.
#[derive(Debug)]
pub struct WordsHandler<'a> {
    /// Weights, roster and search settings.
    config: &'a Config,
    /// The node being compiled.
    node: &'a WordsNode,
    /// Statement matching for the node.
    entities: EntitiesHandler<'a>,
    /// Synonyms of the node's words.
    synonyms: Vec<Synonym>,
}

impl<'a> WordsHandler<'a> {
    /// Creates a handler using the synonyms of the recognized entities.
    pub fn new(config: &'a Config, node: &'a WordsNode, entities: EntitiesHandler<'a>) -> Self {
        let synonyms = entities.synonyms(&node.text);
        Self {
            config,
            node,
            entities,
            synonyms,
        }
    }

    /// Replaces the synonym set.
    pub fn with_synonyms(mut self, synonyms: Vec<Synonym>) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Builds the fragment.
    pub fn transform(&self) -> Fragment {
        let search = &self.config.search;
        let primary = self.text_part(
            &self.node.text,
            self.fields(search.languages.clone()),
            MultiMatchQuery::all_words(
                &self.node.text,
                [&search.all_field, &search.all_plain_field],
            )
            .into(),
        );

        let text = if self.synonyms.is_empty() {
            primary
        } else {
            let synonyms = self.synonyms.iter().map(|synonym| {
                let fields = self
                    .fields(restrict(&search.languages, synonym.languages.as_deref()))
                    .scaled(synonym.score);
                self.text_part(
                    &synonym.term,
                    fields,
                    PhraseQuery::new(&search.all_field, &synonym.term).into(),
                )
            });
            DisMaxQuery::new([primary, DisMaxQuery::new(synonyms).into()])
                .tie_breaker(search.tie_breaker)
                .into()
        };

        BoolQuery::new()
            .should(text)
            .should(self.entities.transform())
            .minimum_should_match(1)
            .into()
    }

    /// Creates a field iterator over every roster field.
    fn fields(&self, languages: Vec<String>) -> FieldIterator<'a> {
        FieldIterator::new(self.config, self.config.fields.all_fields(), languages)
    }

    /// Filters on `filter` and scores `text` on every field the iterator yields.
    fn text_part(&self, text: &str, fields: FieldIterator<'_>, filter: Fragment) -> Fragment {
        let clause = ClauseBuilder::Match(text.to_string());
        BoolQuery::new()
            .filter(filter)
            .should_all(fields.map(|fb| clause.build(&fb.field, fb.boost)))
            .minimum_should_match(0)
            .into()
    }
}

/// Restricts the fallback chain to `allowed`, keeping chain order.
fn restrict(chain: &[String], allowed: Option<&[String]>) -> Vec<String> {
    match allowed {
        Some(allowed) => chain
            .iter()
            .filter(|language| allowed.contains(language))
            .cloned()
            .collect(),
        None => chain.to_vec(),
    }
}
