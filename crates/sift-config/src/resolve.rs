//! Resolution of raw configuration into `Config`.
//!
//! Applies the values present in a `RawConfig` on top of the defaults.

use std::collections::BTreeMap;

use crate::{
    Config, EntitySettings, FieldRoster, LexiconEntry, LexiconSynonym, SearchSettings,
    StemmingSettings,
    parse::{
        RawConfig, RawEntitySettings, RawFieldRoster, RawLexiconEntry, RawSearchSettings,
        RawStemming,
    },
};

/// Default score for lexicon entries and synonyms that do not specify one.
const DEFAULT_LEXICON_SCORE: f64 = 1.0;

/// Resolves a raw configuration against the defaults.
pub fn resolve(raw: RawConfig) -> Config {
    let mut search = SearchSettings::default();
    if let Some(ref settings) = raw.search {
        apply_raw_search(&mut search, settings);
    }

    let fields = match raw.fields {
        Some(roster) => resolve_roster(roster),
        None => FieldRoster::default(),
    };

    let mut stemming = default_stemming();
    for (language, settings) in raw.stemming.unwrap_or_default() {
        let entry = stemming.entry(language).or_default();
        apply_raw_stemming(entry, &settings);
    }

    let mut entities = EntitySettings::default();
    if let Some(settings) = raw.entities {
        apply_raw_entities(&mut entities, settings);
    }

    Config {
        search,
        fields,
        boost: raw.boost.unwrap_or_else(default_boosts),
        decay: raw.decay.unwrap_or_else(default_decays),
        stemming,
        entities,
        custom_match: raw.custom_match.unwrap_or_default(),
        lexicon: raw
            .lexicon
            .unwrap_or_default()
            .into_iter()
            .map(resolve_lexicon_entry)
            .collect(),
        source: None,
    }
}

/// Applies raw search settings, overwriting any present values.
fn apply_raw_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(ref v) = raw.languages {
        result.languages.clone_from(v);
    }
    if let Some(v) = raw.tie_breaker {
        result.tie_breaker = v;
    }
    if let Some(ref v) = raw.all_field {
        result.all_field.clone_from(v);
    }
    if let Some(ref v) = raw.all_plain_field {
        result.all_plain_field.clone_from(v);
    }
}

/// Applies raw stemming flags, overwriting any present values.
fn apply_raw_stemming(result: &mut StemmingSettings, raw: &RawStemming) {
    if let Some(v) = raw.index {
        result.index = v;
    }
    if let Some(v) = raw.query {
        result.query = v;
    }
}

/// Applies raw statement settings, overwriting any present values.
fn apply_raw_entities(result: &mut EntitySettings, raw: RawEntitySettings) {
    if let Some(v) = raw.field {
        result.field = v;
    }
    if let Some(v) = raw.boost {
        result.boost = v;
    }
    if let Some(v) = raw.scale_by_confidence {
        result.scale_by_confidence = v;
    }
    if let Some(v) = raw.properties {
        result.properties = v;
    }
}

/// Builds a roster from a `[fields]` section. Lists that are not given are empty.
fn resolve_roster(raw: RawFieldRoster) -> FieldRoster {
    FieldRoster {
        stemmed: raw.stemmed.unwrap_or_default(),
        plain: raw.plain.unwrap_or_default(),
        stemmed_templates: raw.stemmed_templates.unwrap_or_default(),
        plain_templates: raw.plain_templates.unwrap_or_default(),
        no_positions: raw.no_positions.unwrap_or_default().into_iter().collect(),
        plain_variants: raw.plain_variants.unwrap_or_default(),
    }
}

/// Converts a raw lexicon entry, filling in default scores.
fn resolve_lexicon_entry(raw: RawLexiconEntry) -> LexiconEntry {
    LexiconEntry {
        term: raw.term,
        id: raw.id,
        score: raw.score.unwrap_or(DEFAULT_LEXICON_SCORE),
        synonyms: raw
            .synonyms
            .into_iter()
            .map(|synonym| LexiconSynonym {
                term: synonym.term,
                score: synonym.score.unwrap_or(DEFAULT_LEXICON_SCORE),
                languages: synonym.languages,
            })
            .collect(),
    }
}

/// Default stemming: English is stemmed at index and query time.
fn default_stemming() -> BTreeMap<String, StemmingSettings> {
    BTreeMap::from([(
        String::from("en"),
        StemmingSettings {
            index: true,
            query: true,
        },
    )])
}

/// Default boosts for the default roster.
fn default_boosts() -> BTreeMap<String, f64> {
    [
        ("title", 0.3),
        ("title.plain", 0.1),
        ("category", 0.05),
        ("redirect.title", 0.27),
        ("auxiliary_text", 0.01),
        ("text", 0.01),
        ("descriptions.{lang}", 1.0),
        ("descriptions.{lang}.plain", 0.5),
    ]
    .into_iter()
    .map(|(field, boost)| (field.to_string(), boost))
    .collect()
}

/// Default decays for the default roster.
fn default_decays() -> BTreeMap<String, f64> {
    [("descriptions.{lang}", 0.9), ("descriptions.{lang}.plain", 0.9)]
        .into_iter()
        .map(|(field, decay)| (field.to_string(), decay))
        .collect()
}
