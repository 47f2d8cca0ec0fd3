//! Entity recognition.
//!
//! The compiler asks an [`EntityRecognizer`] which structured entities a node refers to. The
//! recognizer must be deterministic for a given query and node within one compilation.

use std::collections::BTreeMap;

use sift_config::LexiconEntry;
use sift_query::{Node, ParsedQuery};

/// A synonym offered for a search string.
#[derive(Debug, Clone, PartialEq)]
pub struct Synonym {
    /// Synonym text.
    pub term: String,
    /// Relevance in (0, 1]; scales every boost of the synonym's clauses.
    pub score: f64,
    /// Languages the synonym applies to; every language when `None`.
    pub languages: Option<Vec<String>>,
}

/// An entity recognized in a query.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedEntity {
    /// Entity identifier.
    pub id: String,
    /// Recognition confidence.
    pub score: f64,
    /// Synonyms attached to the entity.
    pub synonyms: Vec<Synonym>,
}

/// Maps query text to structured entities.
pub trait EntityRecognizer {
    /// Returns the entities `node` refers to, in the context of the whole `query`.
    fn recognize(&self, query: &ParsedQuery, node: &Node) -> Vec<RecognizedEntity>;
}

/// Recognizes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEntities;

impl EntityRecognizer for NoEntities {
    fn recognize(&self, _query: &ParsedQuery, _node: &Node) -> Vec<RecognizedEntity> {
        Vec::new()
    }
}

/// Recognizes entities by exact, case-insensitive lookup of words and phrases in a lexicon.
#[derive(Debug, Clone, Default)]
pub struct LexiconRecognizer {
    /// Normalized term to the entities it names.
    entries: BTreeMap<String, Vec<RecognizedEntity>>,
}

impl LexiconRecognizer {
    /// Builds a recognizer from configured lexicon entries.
    pub fn new(lexicon: &[LexiconEntry]) -> Self {
        let mut entries: BTreeMap<String, Vec<RecognizedEntity>> = BTreeMap::new();
        for entry in lexicon {
            entries
                .entry(normalize(&entry.term))
                .or_default()
                .push(RecognizedEntity {
                    id: entry.id.clone(),
                    score: entry.score,
                    synonyms: entry
                        .synonyms
                        .iter()
                        .map(|synonym| Synonym {
                            term: synonym.term.clone(),
                            score: synonym.score,
                            languages: synonym.languages.clone(),
                        })
                        .collect(),
                });
        }
        Self { entries }
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn recognize(&self, _query: &ParsedQuery, node: &Node) -> Vec<RecognizedEntity> {
        let text = match node {
            Node::Words(words) => &words.text,
            Node::Phrase(phrase) => &phrase.phrase,
            _ => return Vec::new(),
        };
        self.entries
            .get(&normalize(text))
            .cloned()
            .unwrap_or_default()
    }
}

/// Lowercases and collapses whitespace.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
