//! Per-field scoring clauses for one search string.
//!
//! [`FieldIterator`] walks the requested fields and the language fallback chain and yields
//! every `(field, boost)` pair that should score a term:
//!
//! - language-agnostic fields are yielded once with their configured boost;
//! - language-aware templates are yielded once per language at `boost * decay^i`, where `i` is
//!   the language's position in the chain;
//! - a stemmed template is swapped for its plain variant in languages without query-time
//!   stemming, unless the plain variant is already scored on its own.

use std::collections::BTreeSet;

use sift_config::{Config, localize};

/// A field to score and its effective boost.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoost {
    /// Concrete field name, with any language placeholder substituted.
    pub field: String,
    /// Effective boost.
    pub boost: f64,
}

impl FieldBoost {
    /// Creates a field/boost pair.
    pub fn new(field: impl Into<String>, boost: f64) -> Self {
        Self {
            field: field.into(),
            boost,
        }
    }
}

/// Yields the scoring clauses for one search string. Consumed once.
#[derive(Debug, Clone)]
pub struct FieldIterator<'a> {
    /// Weights, stemming settings and roster.
    config: &'a Config,
    /// Requested language-agnostic fields, in request order.
    agnostic: Vec<&'a str>,
    /// Requested language-aware templates, in request order.
    aware: Vec<&'a str>,
    /// Every requested field; unrequested fields have no boost.
    requested: BTreeSet<&'a str>,
    /// Fallback chain, primary first.
    languages: Vec<String>,
    /// Multiplier applied to every configured boost.
    scale: f64,
    /// Field names that must never be yielded.
    excluded: Option<&'a BTreeSet<String>>,
    /// Next agnostic field.
    agnostic_pos: usize,
    /// Current aware template.
    aware_pos: usize,
    /// Next language for the current aware template.
    language_pos: usize,
}

impl<'a> FieldIterator<'a> {
    /// Creates an iterator over `fields` for the given fallback chain.
    pub fn new(
        config: &'a Config,
        fields: impl IntoIterator<Item = &'a str>,
        languages: Vec<String>,
    ) -> Self {
        let requested: Vec<&'a str> = fields.into_iter().collect();
        let (aware, agnostic): (Vec<&str>, Vec<&str>) = requested
            .iter()
            .partition(|field| config.fields.is_language_aware(field));

        Self {
            config,
            agnostic,
            aware,
            requested: requested.into_iter().collect(),
            languages,
            scale: 1.0,
            excluded: None,
            agnostic_pos: 0,
            aware_pos: 0,
            language_pos: 0,
        }
    }

    /// Multiplies every boost by `factor`.
    pub fn scaled(mut self, factor: f64) -> Self {
        self.scale = factor;
        self
    }

    /// Never yields fields named in `excluded`, including substituted plain variants.
    pub fn excluding(mut self, excluded: &'a BTreeSet<String>) -> Self {
        self.excluded = Some(excluded);
        self
    }

    /// Returns the boost of a requested field, 0 for fields that were not requested.
    fn boost(&self, field: &str) -> f64 {
        if self.requested.contains(field) {
            self.config.boost(field) * self.scale
        } else {
            0.0
        }
    }

    /// Returns the boost of `field` at position `index` of the fallback chain.
    fn decayed(&self, field: &str, index: usize) -> f64 {
        let steps = i32::try_from(index).unwrap_or(i32::MAX);
        self.boost(field) * self.config.decay(field).powi(steps)
    }

    /// Returns true if `field` must not be yielded.
    fn is_excluded(&self, field: &str) -> bool {
        self.excluded.is_some_and(|set| set.contains(field))
    }

    /// Resolves one template for the language at `index`.
    fn localized(&self, template: &str, index: usize) -> Option<FieldBoost> {
        let boost = self.decayed(template, index);
        if boost <= 0.0 {
            return None;
        }

        let roster = &self.config.fields;
        let language = &self.languages[index];
        if self.config.query_stemming(language) || !roster.is_stemmed_variant(template) {
            return (!self.is_excluded(template))
                .then(|| FieldBoost::new(localize(template, language), boost));
        }

        let plain = roster.plain_variant(template)?;
        if self.decayed(plain, index) > 0.0 || self.is_excluded(plain) {
            return None;
        }
        Some(FieldBoost::new(localize(plain, language), boost))
    }
}

impl Iterator for FieldIterator<'_> {
    type Item = FieldBoost;

    fn next(&mut self) -> Option<FieldBoost> {
        while let Some(&field) = self.agnostic.get(self.agnostic_pos) {
            self.agnostic_pos += 1;
            let boost = self.boost(field);
            if boost > 0.0 && !self.is_excluded(field) {
                return Some(FieldBoost::new(field, boost));
            }
        }

        while let Some(&template) = self.aware.get(self.aware_pos) {
            while self.language_pos < self.languages.len() {
                let index = self.language_pos;
                self.language_pos += 1;
                if let Some(field) = self.localized(template, index) {
                    return Some(field);
                }
            }
            self.aware_pos += 1;
            self.language_pos = 0;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    /// Config with one language-aware `description` field pair and one agnostic `title` pair.
    fn config(toml_extra: &str) -> Config {
        let toml = format!(
            r#"
[search]
languages = ["en", "fr", "de"]

[fields]
stemmed = ["title"]
plain = ["title.plain"]
stemmed_templates = ["description.{{lang}}"]
plain_templates = ["description.{{lang}}.plain"]

[fields.plain_variants]
"title" = "title.plain"
"description.{{lang}}" = "description.{{lang}}.plain"

{toml_extra}
"#
        );
        Config::from_toml_str(&toml, Path::new("test.toml")).unwrap()
    }

    fn collect(config: &Config, fields: &[&'static str]) -> Vec<(String, f64)> {
        FieldIterator::new(config, fields.iter().copied(), config.search.languages.clone())
            .map(|fb| (fb.field, fb.boost))
            .collect()
    }

    const ALL: &[&str] = &[
        "title",
        "title.plain",
        "description.{lang}",
        "description.{lang}.plain",
    ];

    #[test]
    fn zero_boost_fields_are_never_emitted() {
        for decay in [0.0, 0.5, 1.0, 2.0] {
            let config = config(&format!(
                "[boost]\n\"title\" = 1.0\n\"description.{{lang}}\" = 0.0\n\n[decay]\n\"description.{{lang}}\" = {decay:?}\n"
            ));
            let emitted = collect(&config, ALL);
            assert_eq!(emitted, vec![("title".to_string(), 1.0)], "decay {decay}");
        }
    }

    #[test]
    fn decay_applies_per_fallback_step() {
        let config = config(
            "[boost]\n\"description.{lang}.plain\" = 8.0\n\n[decay]\n\"description.{lang}.plain\" = 0.5\n",
        );
        assert_eq!(
            collect(&config, ALL),
            vec![
                ("description.en.plain".to_string(), 8.0),
                ("description.fr.plain".to_string(), 4.0),
                ("description.de.plain".to_string(), 2.0),
            ]
        );
    }

    #[test]
    fn decay_one_is_uniform_and_decay_zero_keeps_primary_only() {
        let uniform = config("[boost]\n\"description.{lang}.plain\" = 3.0\n");
        let boosts: Vec<f64> = collect(&uniform, ALL).into_iter().map(|(_, b)| b).collect();
        assert_eq!(boosts, vec![3.0, 3.0, 3.0]);

        let primary_only = config(
            "[boost]\n\"description.{lang}.plain\" = 3.0\n\n[decay]\n\"description.{lang}.plain\" = 0.0\n",
        );
        assert_eq!(
            collect(&primary_only, ALL),
            vec![("description.en.plain".to_string(), 3.0)]
        );
    }

    #[test]
    fn stemmed_template_falls_back_to_plain_without_query_stemming() {
        let config = config(
            "[boost]\n\"description.{lang}\" = 10.0\n\n[decay]\n\"description.{lang}\" = 0.5\n",
        );
        assert_eq!(
            collect(&config, ALL),
            vec![
                ("description.en".to_string(), 10.0),
                ("description.fr.plain".to_string(), 5.0),
                ("description.de.plain".to_string(), 2.5),
            ]
        );
    }

    #[test]
    fn plain_fallback_is_skipped_when_plain_is_scored() {
        let config = config(
            "[boost]\n\"description.{lang}\" = 10.0\n\"description.{lang}.plain\" = 1.0\n\n[decay]\n\"description.{lang}\" = 0.5\n",
        );
        assert_eq!(
            collect(&config, ALL),
            vec![
                ("description.en".to_string(), 10.0),
                ("description.en.plain".to_string(), 1.0),
                ("description.fr.plain".to_string(), 1.0),
                ("description.de.plain".to_string(), 1.0),
            ]
        );
    }

    #[test]
    fn plain_fallback_applies_when_plain_is_not_requested() {
        let config = config(
            "[boost]\n\"description.{lang}\" = 10.0\n\"description.{lang}.plain\" = 1.0\n",
        );
        let emitted = collect(&config, &["description.{lang}"]);
        assert_eq!(
            emitted,
            vec![
                ("description.en".to_string(), 10.0),
                ("description.fr.plain".to_string(), 10.0),
                ("description.de.plain".to_string(), 10.0),
            ]
        );
    }

    #[test]
    fn query_stemming_keeps_stemmed_template() {
        let config = config(
            "[boost]\n\"description.{lang}\" = 2.0\n\n[stemming.fr]\nquery = true\n",
        );
        let fields: Vec<String> = collect(&config, ALL).into_iter().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec!["description.en", "description.fr", "description.de.plain"]
        );
    }

    #[test]
    fn scaled_and_excluding() {
        let config = config("[boost]\n\"title\" = 2.0\n\"title.plain\" = 1.0\n");
        let excluded: BTreeSet<String> = BTreeSet::from(["title.plain".to_string()]);
        let emitted: Vec<FieldBoost> =
            FieldIterator::new(&config, ALL.iter().copied(), vec!["en".into()])
                .scaled(0.5)
                .excluding(&excluded)
                .collect();
        assert_eq!(emitted, vec![FieldBoost::new("title", 1.0)]);
    }

    #[test]
    fn unrequested_fields_are_not_scored() {
        let config = config("[boost]\n\"title\" = 2.0\n\"title.plain\" = 1.0\n");
        assert_eq!(
            collect(&config, &["title.plain"]),
            vec![("title.plain".to_string(), 1.0)]
        );
    }

    #[test]
    fn empty_language_chain_yields_only_agnostic_fields() {
        let config = config("[boost]\n\"title\" = 2.0\n\"description.{lang}\" = 1.0\n");
        let emitted: Vec<FieldBoost> =
            FieldIterator::new(&config, ALL.iter().copied(), Vec::new()).collect();
        assert_eq!(emitted, vec![FieldBoost::new("title", 2.0)]);
    }
}
