//! Keyword features, and the `custommatch:` keyword.
//!
//! `custommatch:<profile>=<term>` matches `term` against the fields configured for `profile`.
//! A bare field name matches the term as-is at boost 1; a field with `{prefix, boost}` entries
//! matches once per entry with the prefix prepended. The matches are combined so that any one
//! suffices, and the profile may rescore the result with a script.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use sift_config::{ConfigError, CustomMatchProfile, FieldSpec};
use tracing::warn;

use crate::{
    BoolQuery, CompileError, Fragment, FunctionScoreQuery, MatchQuery, SearchContext,
};

/// Outcome of applying a keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordOutcome {
    /// The keyword added its clause to the search context; nothing remains to embed.
    Consumed,
    /// A fragment for the caller to embed (or negate).
    Query(Fragment),
    /// The keyword was rejected and the search marked unsatisfiable.
    Rejected,
}

/// A feature triggered by `name:value` syntax.
pub trait KeywordFeature {
    /// Keyword name, lowercase.
    fn name(&self) -> &str;

    /// Applies the keyword with `value`.
    ///
    /// `embedded` is true when the caller places the result itself: for `-name:value` and for
    /// keywords under a negation or an `OR`. An embedded keyword must not add root filters.
    fn apply(
        &self,
        value: &str,
        embedded: bool,
        ctx: &mut SearchContext,
    ) -> Result<KeywordOutcome, CompileError>;
}

/// One parameterized match produced by a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileQuery {
    /// Field to match.
    pub field: String,
    /// Prefixed query text.
    pub query: String,
    /// Boost of the match.
    pub boost: f64,
}

/// Keyword name.
pub const CUSTOM_MATCH_KEYWORD: &str = "custommatch";

/// Warning key for values not of the form `profile=term`.
pub const INVALID_SYNTAX_WARNING: &str = "custommatch-invalid-syntax";

/// Warning key for profiles that are not configured.
pub const UNKNOWN_PROFILE_WARNING: &str = "custommatch-unknown-profile";

/// Splits a keyword value into an ASCII profile name and the term.
static VALUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_]+)=(.+)$").expect("custom match pattern is valid")
});

/// The `custommatch:` keyword.
#[derive(Debug, Clone, Copy)]
pub struct CustomMatchFeature<'a> {
    /// Configured profiles by name.
    profiles: &'a BTreeMap<String, CustomMatchProfile>,
}

impl<'a> CustomMatchFeature<'a> {
    /// Creates the feature over the configured profiles.
    pub fn new(profiles: &'a BTreeMap<String, CustomMatchProfile>) -> Self {
        Self { profiles }
    }

    /// Expands `term` into the profile's parameterized matches.
    ///
    /// Fails when the profile declares no `fields`.
    pub fn profile_queries(
        name: &str,
        profile: &CustomMatchProfile,
        term: &str,
    ) -> Result<Vec<ProfileQuery>, ConfigError> {
        let mut queries = Vec::new();
        for spec in profile.fields(name)? {
            match spec {
                FieldSpec::Bare(field) => queries.push(ProfileQuery {
                    field: field.clone(),
                    query: term.to_string(),
                    boost: 1.0,
                }),
                FieldSpec::Prefixed { field, entries } => {
                    queries.extend(entries.iter().map(|entry| ProfileQuery {
                        field: field.clone(),
                        query: format!("{}{term}", entry.prefix),
                        boost: entry.boost,
                    }));
                }
            }
        }
        Ok(queries)
    }

    /// Builds the profile's fragment, or `None` when it produces no matches.
    pub fn build(
        name: &str,
        profile: &CustomMatchProfile,
        term: &str,
    ) -> Result<Option<Fragment>, ConfigError> {
        let queries = Self::profile_queries(name, profile, term)?;
        if queries.is_empty() {
            return Ok(None);
        }

        let combined = BoolQuery::new()
            .should_all(
                queries
                    .into_iter()
                    .map(|q| MatchQuery::new(q.field, q.query).boost(q.boost)),
            )
            .minimum_should_match(1);

        Ok(Some(match &profile.function_score {
            Some(function_score) => FunctionScoreQuery::new(
                combined,
                &function_score.script,
                function_score.params.clone(),
            )
            .into(),
            None => combined.into(),
        }))
    }
}

impl KeywordFeature for CustomMatchFeature<'_> {
    fn name(&self) -> &str {
        CUSTOM_MATCH_KEYWORD
    }

    fn apply(
        &self,
        value: &str,
        embedded: bool,
        ctx: &mut SearchContext,
    ) -> Result<KeywordOutcome, CompileError> {
        let Some(captures) = VALUE_PATTERN.captures(value) else {
            warn!(value, "rejected custommatch value");
            ctx.add_warning(INVALID_SYNTAX_WARNING, [value]);
            ctx.set_unsatisfiable();
            return Ok(KeywordOutcome::Rejected);
        };
        let (name, term) = (&captures[1], &captures[2]);

        let Some(profile) = self.profiles.get(name) else {
            warn!(profile = name, "unknown custommatch profile");
            ctx.add_warning(UNKNOWN_PROFILE_WARNING, [name]);
            ctx.set_unsatisfiable();
            return Ok(KeywordOutcome::Rejected);
        };

        let Some(fragment) = Self::build(name, profile, term)? else {
            warn!(profile = name, "custommatch profile produced no matches");
            ctx.set_unsatisfiable();
            return Ok(KeywordOutcome::Rejected);
        };

        if embedded {
            Ok(KeywordOutcome::Query(fragment))
        } else {
            ctx.add_filter(fragment);
            Ok(KeywordOutcome::Consumed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;
    use sift_config::Config;

    use super::*;

    fn config() -> Config {
        Config::from_toml_str(
            r#"
[custom_match.depicts]
fields = [{ field = "statement_keywords", entries = [{ prefix = "P180=", boost = 9.0 }, { prefix = "P6243=", boost = 8.0 }] }]

[custom_match.titled]
fields = ["title"]

[custom_match.titled.function_score]
script = "_score * params.weight"
params = { weight = 2 }

[custom_match.empty]
fields = []

[custom_match.broken]
"#,
            Path::new("test.toml"),
        )
        .unwrap()
    }

    #[test]
    fn two_entry_profile_yields_two_prefixed_clauses() {
        let config = config();
        let feature = CustomMatchFeature::new(&config.custom_match);
        let mut ctx = SearchContext::new();

        let outcome = feature.apply("depicts=Q146", false, &mut ctx).unwrap();

        assert_eq!(outcome, KeywordOutcome::Consumed);
        assert!(!ctx.is_unsatisfiable());
        assert_eq!(
            ctx.filters()[0].to_json(),
            json!({ "bool": {
                "should": [
                    { "match": { "statement_keywords": { "query": "P180=Q146", "boost": 9.0 } } },
                    { "match": { "statement_keywords": { "query": "P6243=Q146", "boost": 8.0 } } },
                ],
                "minimum_should_match": 1,
            } })
        );
    }

    #[test]
    fn bare_field_with_function_score() {
        let config = config();
        let fragment = CustomMatchFeature::build(
            "titled",
            &config.custom_match["titled"],
            "sunset",
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            fragment.to_json(),
            json!({ "function_score": {
                "query": { "bool": {
                    "should": [{ "match": { "title": { "query": "sunset", "boost": 1.0 } } }],
                    "minimum_should_match": 1,
                } },
                "script_score": { "script": { "source": "_score * params.weight", "params": { "weight": 2 } } },
            } })
        );
    }

    #[test]
    fn embedded_keyword_returns_fragment() {
        let config = config();
        let feature = CustomMatchFeature::new(&config.custom_match);
        let mut ctx = SearchContext::new();

        let outcome = feature.apply("titled=x", true, &mut ctx).unwrap();

        assert!(matches!(outcome, KeywordOutcome::Query(Fragment::FunctionScore(_))));
        assert!(ctx.filters().is_empty());
    }

    #[test]
    fn unknown_profile_warns_and_is_unsatisfiable() {
        let config = config();
        let feature = CustomMatchFeature::new(&config.custom_match);
        let mut ctx = SearchContext::new();

        let outcome = feature.apply("nope=Q1", false, &mut ctx).unwrap();

        assert_eq!(outcome, KeywordOutcome::Rejected);
        assert!(ctx.is_unsatisfiable());
        assert!(ctx.filters().is_empty());
        assert_eq!(ctx.warnings()[0].key, UNKNOWN_PROFILE_WARNING);
        assert_eq!(ctx.warnings()[0].params, vec!["nope"]);
    }

    #[test]
    fn malformed_value_warns_and_is_unsatisfiable() {
        let config = config();
        let feature = CustomMatchFeature::new(&config.custom_match);
        for value in ["depicts", "=Q1", "depicts=", "two words=x", "dépicts=Q146"] {
            let mut ctx = SearchContext::new();
            let outcome = feature.apply(value, false, &mut ctx).unwrap();
            assert_eq!(outcome, KeywordOutcome::Rejected, "{value}");
            assert_eq!(ctx.warnings()[0].key, INVALID_SYNTAX_WARNING, "{value}");
            assert!(ctx.is_unsatisfiable());
        }
    }

    #[test]
    fn empty_profile_is_unsatisfiable_without_warning() {
        let config = config();
        let feature = CustomMatchFeature::new(&config.custom_match);
        let mut ctx = SearchContext::new();

        let outcome = feature.apply("empty=x", false, &mut ctx).unwrap();

        assert_eq!(outcome, KeywordOutcome::Rejected);
        assert!(ctx.is_unsatisfiable());
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn profile_without_fields_is_a_configuration_error() {
        let config = config();
        let feature = CustomMatchFeature::new(&config.custom_match);
        let mut ctx = SearchContext::new();

        let err = feature.apply("broken=x", false, &mut ctx).unwrap_err();

        assert!(matches!(
            err,
            CompileError::Config(ConfigError::MissingProfileFields { ref profile }) if profile == "broken"
        ));
    }

    #[test]
    fn term_may_contain_equals_and_spaces() {
        let config = config();
        let queries = CustomMatchFeature::profile_queries(
            "depicts",
            &config.custom_match["depicts"],
            "a=b c",
        )
        .unwrap();
        assert_eq!(queries[0].query, "P180=a=b c");
        assert_eq!(queries.len(), 2);
    }
}
