//! The field roster.
//!
//! Fields come in two catalogs: language-agnostic fields name one physical field, while
//! language-aware templates contain a [`LANGUAGE_PLACEHOLDER`] that is substituted once per
//! language of the fallback chain. Each catalog is split into stemmed and plain variants.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Placeholder substituted with a language code in language-aware field templates.
pub const LANGUAGE_PLACEHOLDER: &str = "{lang}";

/// Substitutes `language` into a field template.
///
/// Names without a placeholder are returned unchanged.
pub fn localize(template: &str, language: &str) -> String {
    template.replace(LANGUAGE_PLACEHOLDER, language)
}

/// The searchable fields and how they relate to each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRoster {
    /// Language-agnostic fields with stemmed analysis.
    pub stemmed: Vec<String>,
    /// Language-agnostic fields with plain analysis.
    pub plain: Vec<String>,
    /// Language-aware templates with stemmed analysis.
    pub stemmed_templates: Vec<String>,
    /// Language-aware templates with plain analysis.
    pub plain_templates: Vec<String>,
    /// Fields indexed without position data; they cannot serve phrase queries.
    pub no_positions: BTreeSet<String>,
    /// Stemmed field name to its plain counterpart.
    pub plain_variants: BTreeMap<String, String>,
}

impl Default for FieldRoster {
    fn default() -> Self {
        let stemmed: Vec<String> = ["title", "category", "redirect.title", "auxiliary_text", "text"]
            .into_iter()
            .map(String::from)
            .collect();
        let stemmed_templates = vec![String::from("descriptions.{lang}")];

        let plain_variants: BTreeMap<String, String> = stemmed
            .iter()
            .chain(&stemmed_templates)
            .map(|field| (field.clone(), format!("{field}.plain")))
            .collect();

        Self {
            plain: stemmed.iter().map(|f| format!("{f}.plain")).collect(),
            plain_templates: stemmed_templates
                .iter()
                .map(|f| format!("{f}.plain"))
                .collect(),
            stemmed,
            stemmed_templates,
            no_positions: ["category", "category.plain"]
                .into_iter()
                .map(String::from)
                .collect(),
            plain_variants,
        }
    }
}

impl FieldRoster {
    /// Returns true if `field` is a language-aware template.
    pub fn is_language_aware(&self, field: &str) -> bool {
        self.stemmed_templates.iter().any(|f| f == field)
            || self.plain_templates.iter().any(|f| f == field)
    }

    /// Returns true if `field` is the stemmed half of a stemmed/plain pair.
    pub fn is_stemmed_variant(&self, field: &str) -> bool {
        self.plain_variants.contains_key(field)
    }

    /// Returns the plain counterpart of a stemmed field.
    pub fn plain_variant(&self, field: &str) -> Option<&str> {
        self.plain_variants.get(field).map(String::as_str)
    }

    /// Returns true if `field` lacks position data.
    pub fn lacks_positions(&self, field: &str) -> bool {
        self.no_positions.contains(field)
    }

    /// Returns true if `field` is in either catalog.
    pub fn contains(&self, field: &str) -> bool {
        self.all_fields().contains(&field)
    }

    /// Returns every field: agnostic stemmed, agnostic plain, then stemmed and plain templates.
    pub fn all_fields(&self) -> Vec<&str> {
        self.stemmed
            .iter()
            .chain(&self.plain)
            .chain(&self.stemmed_templates)
            .chain(&self.plain_templates)
            .map(String::as_str)
            .collect()
    }

    /// Returns every stemmed field, agnostic first.
    pub fn stemmed_fields(&self) -> Vec<&str> {
        self.stemmed
            .iter()
            .chain(&self.stemmed_templates)
            .map(String::as_str)
            .collect()
    }

    /// Returns every plain field, agnostic first.
    pub fn plain_fields(&self) -> Vec<&str> {
        self.plain
            .iter()
            .chain(&self.plain_templates)
            .map(String::as_str)
            .collect()
    }
}
