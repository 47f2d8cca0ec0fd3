//! Configuration system for sift.
//!
//! sift reads a TOML file named `.sift.toml`, found by walking up the directory tree from the
//! current working directory and falling back to `~/.sift.toml`. The file describes the field
//! roster, the boost/decay/stemming weights applied per field and language, statement
//! matching for recognized entities, custom match profiles, and an optional entity lexicon.
//!
//! Sections absent from the file take their defaults; a section present in the file replaces
//! the default wholesale, except `[search]`, `[entities]` and `[stemming]`, whose individual
//! settings override the defaults one by one.

#![warn(missing_docs)]

mod discovery;
mod error;
mod parse;
mod profile;
mod resolve;
mod roster;
mod templates;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_file, global_config_path};
pub use error::ConfigError;
pub use parse::{
    RawConfig, RawEntitySettings, RawFieldRoster, RawLexiconEntry, RawSearchSettings,
    RawStemming, RawSynonym, parse_config_file, parse_config_str,
};
pub use profile::{CustomMatchProfile, FieldSpec, FunctionScore, PrefixBoost};
pub use roster::{FieldRoster, LANGUAGE_PLACEHOLDER, localize};
use serde::Serialize;
pub use templates::config_template;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Config {
    /// Search settings.
    pub search: SearchSettings,
    /// Searchable fields.
    pub fields: FieldRoster,
    /// Field (or template) name to boost. Absent fields are not scored.
    pub boost: BTreeMap<String, f64>,
    /// Field (or template) name to per-fallback-step decay. Absent fields do not decay.
    pub decay: BTreeMap<String, f64>,
    /// Language code to stemming flags.
    pub stemming: BTreeMap<String, StemmingSettings>,
    /// Statement matching for recognized entities.
    pub entities: EntitySettings,
    /// Profile name to custom match profile.
    pub custom_match: BTreeMap<String, CustomMatchProfile>,
    /// Entity lexicon for the built-in recognizer.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lexicon: Vec<LexiconEntry>,
    /// File this configuration was loaded from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Loads the configuration that applies to `cwd`.
    ///
    /// Returns `Ok(Config::with_defaults())` if no configuration file is found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        match discover_config_file(cwd) {
            Some(path) => Self::load_file(&path),
            None => Ok(Self::with_defaults()),
        }
    }

    /// Loads configuration from a specific file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_config_file(path)?;
        let mut config = resolve::resolve(raw);
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration from TOML text. `path` is only used in error messages.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        parse_config_str(contents, path).map(resolve::resolve)
    }

    /// Returns the built-in configuration used when no file is present.
    pub fn with_defaults() -> Self {
        resolve::resolve(RawConfig::default())
    }

    /// Returns the configured boost of a field, 0 when absent.
    pub fn boost(&self, field: &str) -> f64 {
        self.boost.get(field).copied().unwrap_or(0.0)
    }

    /// Returns the configured decay of a field, 1 when absent.
    pub fn decay(&self, field: &str) -> f64 {
        self.decay.get(field).copied().unwrap_or(1.0)
    }

    /// Returns true if stemmed analysis should be queried for `language`.
    pub fn query_stemming(&self, language: &str) -> bool {
        self.stemming
            .get(language)
            .is_some_and(|settings| settings.query)
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Decay factors above 1, which amplify non-primary languages
    /// - Negative boosts or decays
    /// - Weights for fields that are not in the roster
    /// - Plain variants that are not in the roster
    /// - Templates without a language placeholder
    /// - An empty language fallback chain
    /// - Custom match profiles without fields
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Search settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSettings {
    /// Language fallback chain, primary language first.
    pub languages: Vec<String>,
    /// Share of a non-winning synonym branch added to the winning score.
    pub tie_breaker: f64,
    /// Combined stemmed field used for filtering.
    pub all_field: String,
    /// Combined plain field used for filtering.
    pub all_plain_field: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            languages: vec![String::from("en")],
            tie_breaker: 0.3,
            all_field: String::from("all"),
            all_plain_field: String::from("all.plain"),
        }
    }
}

/// Stemming flags for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StemmingSettings {
    /// Whether stemmed analysis exists at index time.
    pub index: bool,
    /// Whether stemmed analysis is used at query time.
    pub query: bool,
}

/// Statement matching settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySettings {
    /// Composite field holding `property=entity` tokens.
    pub field: String,
    /// Global boost for statement matches.
    pub boost: f64,
    /// Whether recognition confidence scales the boost.
    pub scale_by_confidence: bool,
    /// Property identifier to relative weight.
    pub properties: BTreeMap<String, f64>,
}

impl Default for EntitySettings {
    fn default() -> Self {
        Self {
            field: String::from("statement_keywords"),
            boost: 1.0,
            scale_by_confidence: true,
            properties: BTreeMap::from([(String::from("P180"), 1.0)]),
        }
    }
}

/// An entity the built-in recognizer knows about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexiconEntry {
    /// Text that triggers recognition, matched case-insensitively.
    pub term: String,
    /// Entity identifier.
    pub id: String,
    /// Recognition confidence.
    pub score: f64,
    /// Synonyms attached to the entity.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<LexiconSynonym>,
}

/// A synonym attached to a lexicon entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexiconSynonym {
    /// Synonym text.
    pub term: String,
    /// Relevance of the synonym, in (0, 1].
    pub score: f64,
    /// Languages the synonym applies to; all languages when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_settings_defaults() {
        let search = SearchSettings::default();
        assert_eq!(search.languages, vec!["en"]);
        assert!((search.tie_breaker - 0.3).abs() < f64::EPSILON);
        assert_eq!(search.all_field, "all");
        assert_eq!(search.all_plain_field, "all.plain");
    }

    #[test]
    fn test_entity_settings_defaults() {
        let entities = EntitySettings::default();
        assert_eq!(entities.field, "statement_keywords");
        assert!(entities.scale_by_confidence);
        assert_eq!(entities.properties.get("P180"), Some(&1.0));
    }

    #[test]
    fn test_boost_and_decay_fallbacks() {
        let mut config = Config::with_defaults();
        config.boost.insert("title".into(), 2.0);
        config.decay.insert("title".into(), 0.5);
        assert!((config.boost("title") - 2.0).abs() < f64::EPSILON);
        assert!((config.boost("nope")).abs() < f64::EPSILON);
        assert!((config.decay("title") - 0.5).abs() < f64::EPSILON);
        assert!((config.decay("nope") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_query_stemming() {
        let config = Config::with_defaults();
        assert!(config.query_stemming("en"));
        assert!(!config.query_stemming("fr"));
    }

    #[test]
    fn test_to_toml_contains_sections() {
        let toml = Config::with_defaults().to_toml().unwrap();
        assert!(toml.contains("[search]"));
        assert!(toml.contains("[fields]"));
        assert!(toml.contains("[boost]"));
        assert!(toml.contains("[entities]"));

        let parsed: toml::Value =
            toml::from_str(&toml).expect("to_toml should produce valid TOML");
        assert!(parsed.get("search").is_some());
    }

    #[test]
    fn test_to_toml_reloads_to_same_config() {
        let mut config = Config::from_toml_str(
            r#"
[search]
languages = ["en", "fr"]

[custom_match.depicts]
fields = ["title", { field = "statement_keywords", entries = [{ prefix = "P180=", boost = 9.0 }] }]

[[lexicon]]
term = "cat"
id = "Q146"
"#,
            Path::new("test.toml"),
        )
        .unwrap();
        config.source = None;

        let rendered = config.to_toml().unwrap();
        let reloaded = Config::from_toml_str(&rendered, Path::new("rendered.toml")).unwrap();
        assert_eq!(reloaded, config);
    }
}
