//! Configuration file parsing.
//!
//! Parses a `.sift.toml` file into an intermediate `RawConfig` that preserves which sections
//! and settings were actually present, before defaults are applied.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::{ConfigError, CustomMatchProfile};

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional so that absent sections fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Search settings section.
    pub search: Option<RawSearchSettings>,
    /// Field roster section.
    pub fields: Option<RawFieldRoster>,
    /// Field name to boost.
    pub boost: Option<BTreeMap<String, f64>>,
    /// Field name to decay per fallback step.
    pub decay: Option<BTreeMap<String, f64>>,
    /// Language code to stemming flags.
    pub stemming: Option<BTreeMap<String, RawStemming>>,
    /// Statement matching section.
    pub entities: Option<RawEntitySettings>,
    /// Profile name to custom match profile.
    pub custom_match: Option<BTreeMap<String, CustomMatchProfile>>,
    /// Entity lexicon for the built-in recognizer.
    pub lexicon: Option<Vec<RawLexiconEntry>>,
}

/// Raw search settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Language fallback chain, primary first. Accepts a single code or a list.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub languages: Option<Vec<String>>,
    /// Tie-breaker between the primary term and its synonyms.
    pub tie_breaker: Option<f64>,
    /// Combined stemmed field used for filtering.
    pub all_field: Option<String>,
    /// Combined plain field used for filtering.
    pub all_plain_field: Option<String>,
}

/// Raw field roster.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFieldRoster {
    /// Language-agnostic stemmed fields.
    pub stemmed: Option<Vec<String>>,
    /// Language-agnostic plain fields.
    pub plain: Option<Vec<String>>,
    /// Language-aware stemmed templates.
    pub stemmed_templates: Option<Vec<String>>,
    /// Language-aware plain templates.
    pub plain_templates: Option<Vec<String>>,
    /// Fields without position data. Accepts a single name or a list.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub no_positions: Option<Vec<String>>,
    /// Stemmed field to plain counterpart.
    pub plain_variants: Option<BTreeMap<String, String>>,
}

/// Raw stemming flags for one language.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStemming {
    /// Whether stemmed analysis exists at index time.
    pub index: Option<bool>,
    /// Whether stemmed analysis is used at query time.
    pub query: Option<bool>,
}

/// Raw statement matching settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEntitySettings {
    /// Composite field holding `property=entity` tokens.
    pub field: Option<String>,
    /// Global boost for statement matches.
    pub boost: Option<f64>,
    /// Whether recognition confidence scales the boost.
    pub scale_by_confidence: Option<bool>,
    /// Property identifier to weight.
    pub properties: Option<BTreeMap<String, f64>>,
}

/// Raw lexicon entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLexiconEntry {
    /// Text that triggers recognition.
    pub term: String,
    /// Entity identifier.
    pub id: String,
    /// Recognition confidence.
    pub score: Option<f64>,
    /// Synonyms attached to the entity.
    #[serde(default)]
    pub synonyms: Vec<RawSynonym>,
}

/// Raw synonym of a lexicon entry.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct RawSynonym {
    /// Synonym text.
    pub term: String,
    /// Relevance of the synonym.
    pub score: Option<f64>,
    /// Languages the synonym applies to. Accepts a single code or a list.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    #[serde(default)]
    pub languages: Option<Vec<String>>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context (tests only).
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config_str("", Path::new("test.toml")).unwrap();
        assert!(config.search.is_none());
        assert!(config.fields.is_none());
        assert!(config.boost.is_none());
        assert!(config.custom_match.is_none());
        assert!(config.lexicon.is_none());
    }

    #[test]
    fn test_parse_search_settings() {
        let toml = r#"
[search]
languages = ["en", "fr"]
tie_breaker = 0.5
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let search = config.search.unwrap();
        assert_eq!(
            search.languages,
            Some(vec!["en".to_string(), "fr".to_string()])
        );
        assert_eq!(search.tie_breaker, Some(0.5));
        assert!(search.all_field.is_none());
    }

    #[test]
    fn test_parse_single_language() {
        let toml = r#"
[search]
languages = "de"
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        assert_eq!(config.search.unwrap().languages, Some(vec!["de".to_string()]));
    }

    #[test]
    fn test_parse_fields_roster() {
        let toml = r#"
[fields]
stemmed = ["title"]
plain = ["title.plain"]
stemmed_templates = ["descriptions.{lang}"]
plain_templates = ["descriptions.{lang}.plain"]
no_positions = "category"

[fields.plain_variants]
"title" = "title.plain"
"descriptions.{lang}" = "descriptions.{lang}.plain"
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let fields = config.fields.unwrap();
        assert_eq!(fields.stemmed, Some(vec!["title".to_string()]));
        assert_eq!(fields.no_positions, Some(vec!["category".to_string()]));
        let variants = fields.plain_variants.unwrap();
        assert_eq!(
            variants.get("descriptions.{lang}").map(String::as_str),
            Some("descriptions.{lang}.plain")
        );
    }

    #[test]
    fn test_parse_weights_and_stemming() {
        let toml = r#"
[boost]
"title" = 0.3
"descriptions.{lang}" = 10.0

[decay]
"descriptions.{lang}" = 0.5

[stemming.en]
index = true
query = true

[stemming.fr]
index = true
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let boost = config.boost.unwrap();
        assert_eq!(boost.get("title"), Some(&0.3));
        assert_eq!(config.decay.unwrap().get("descriptions.{lang}"), Some(&0.5));
        let stemming = config.stemming.unwrap();
        assert_eq!(stemming["en"].query, Some(true));
        assert_eq!(stemming["fr"].index, Some(true));
        assert_eq!(stemming["fr"].query, None);
    }

    #[test]
    fn test_parse_entities() {
        let toml = r#"
[entities]
field = "statement_keywords"
boost = 5.0
scale_by_confidence = false

[entities.properties]
P180 = 1.0
P6243 = 0.5
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let entities = config.entities.unwrap();
        assert_eq!(entities.boost, Some(5.0));
        assert_eq!(entities.scale_by_confidence, Some(false));
        assert_eq!(entities.properties.unwrap().len(), 2);
    }

    #[test]
    fn test_parse_custom_match_profiles() {
        let toml = r#"
[custom_match.depicts]
fields = [{ field = "statement_keywords", entries = [{ prefix = "P180=", boost = 9.0 }, { prefix = "P6243=", boost = 8.0 }] }]

[custom_match.depicts.function_score]
script = "_score * params.weight"
params = { weight = 2 }

[custom_match.broken]
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let profiles = config.custom_match.unwrap();
        let depicts = &profiles["depicts"];
        assert_eq!(depicts.fields.as_ref().unwrap().len(), 1);
        let function_score = depicts.function_score.as_ref().unwrap();
        assert_eq!(function_score.params["weight"], serde_json::json!(2));
        assert!(profiles["broken"].fields.is_none());
    }

    #[test]
    fn test_parse_lexicon() {
        let toml = r#"
[[lexicon]]
term = "cat"
id = "Q146"
score = 0.9

[[lexicon.synonyms]]
term = "chat"
score = 0.8
languages = "fr"
"#;
        let config = parse_config_str(toml, Path::new("test.toml")).unwrap();
        let lexicon = config.lexicon.unwrap();
        assert_eq!(lexicon[0].id, "Q146");
        assert_eq!(lexicon[0].synonyms[0].languages, Some(vec!["fr".to_string()]));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_config_str("this is not valid toml [[[", Path::new("test.toml"));
        assert!(matches!(result, Err(ConfigError::ParseToml { .. })));
    }

    #[test]
    fn test_parse_wrong_type_error() {
        let toml = r#"
[boost]
title = "heavy"
"#;
        assert!(parse_config_str(toml, Path::new("test.toml")).is_err());
    }

    #[test]
    fn test_parse_unknown_sections_ignored() {
        let toml = r#"
[unknown_section]
foo = "bar"
"#;
        assert!(parse_config_str(toml, Path::new("test.toml")).is_ok());
    }

    #[test]
    fn test_parse_config_file_not_found() {
        let result = parse_config_file(Path::new("/nonexistent/path/.sift.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
