//! Query fragments.
//!
//! A [`Fragment`] is one node of the compiled query tree. Fragments are plain values: handlers
//! build them, the tree walker composes them, and nothing mutates them afterwards. They
//! serialize to the Elasticsearch query DSL.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

/// One node of a compiled query.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Full-text match on one field.
    Match(MatchQuery),
    /// Full-text match across several fields.
    MultiMatch(MultiMatchQuery),
    /// Phrase match on one field.
    Phrase(PhraseQuery),
    /// Prefix match on one field.
    Prefix(PrefixQuery),
    /// Boolean combination.
    Bool(BoolQuery),
    /// Disjunction keeping the best-scoring branch.
    DisMax(DisMaxQuery),
    /// A query rescored by a script.
    FunctionScore(FunctionScoreQuery),
    /// Matches every document.
    MatchAll,
    /// Matches no document.
    MatchNone,
}

impl Fragment {
    /// Returns true for the fragment that matches nothing.
    pub fn is_match_none(&self) -> bool {
        matches!(self, Self::MatchNone)
    }

    /// Renders the fragment as query DSL.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Match(query) => query.to_json(),
            Self::MultiMatch(query) => query.to_json(),
            Self::Phrase(query) => query.to_json(),
            Self::Prefix(query) => query.to_json(),
            Self::Bool(query) => query.to_json(),
            Self::DisMax(query) => query.to_json(),
            Self::FunctionScore(query) => query.to_json(),
            Self::MatchAll => json!({ "match_all": {} }),
            Self::MatchNone => json!({ "match_none": {} }),
        }
    }
}

impl Serialize for Fragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Edit distance tolerated by a fuzzy match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fuzziness {
    /// Distance chosen by the engine from the term length.
    Auto,
    /// Fixed maximum distance.
    Distance(u32),
}

impl Fuzziness {
    /// Renders the fuzziness as query DSL.
    fn to_json(self) -> Value {
        match self {
            Self::Auto => json!("AUTO"),
            Self::Distance(distance) => json!(distance),
        }
    }
}

/// Inserts `boost` into `body` when it is set.
fn put_boost(body: &mut Map<String, Value>, boost: Option<f64>) {
    if let Some(boost) = boost {
        body.insert("boost".into(), json!(boost));
    }
}

/// Wraps a per-field body as `{ kind: { field: body } }`.
fn field_query(kind: &str, field: &str, body: Map<String, Value>) -> Value {
    let mut inner = Map::new();
    inner.insert(field.to_string(), Value::Object(body));
    let mut outer = Map::new();
    outer.insert(kind.to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// A `match` query.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    /// Field to search.
    pub field: String,
    /// Query text.
    pub query: String,
    /// Score multiplier.
    pub boost: Option<f64>,
    /// Edit distance tolerance.
    pub fuzziness: Option<Fuzziness>,
}

impl MatchQuery {
    /// Creates a match of `query` on `field`.
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            boost: None,
            fuzziness: None,
        }
    }

    /// Sets the boost.
    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    /// Sets the fuzziness.
    pub fn fuzziness(mut self, fuzziness: Fuzziness) -> Self {
        self.fuzziness = Some(fuzziness);
        self
    }

    /// Renders the query as DSL.
    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), json!(self.query));
        put_boost(&mut body, self.boost);
        if let Some(fuzziness) = self.fuzziness {
            body.insert("fuzziness".into(), fuzziness.to_json());
        }
        field_query("match", &self.field, body)
    }
}

/// A `multi_match` query requiring every word.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMatchQuery {
    /// Fields to search.
    pub fields: Vec<String>,
    /// Query text.
    pub query: String,
}

impl MultiMatchQuery {
    /// Creates a multi-field match of `query` requiring every word.
    pub fn all_words<I, S>(query: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            query: query.into(),
        }
    }

    /// Renders the query as DSL.
    fn to_json(&self) -> Value {
        json!({
            "multi_match": {
                "query": self.query,
                "fields": self.fields,
                "operator": "and",
            }
        })
    }
}

/// A `match_phrase` query.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseQuery {
    /// Field to search.
    pub field: String,
    /// Phrase text.
    pub query: String,
    /// Permitted word displacement.
    pub slop: u32,
    /// Score multiplier.
    pub boost: Option<f64>,
}

impl PhraseQuery {
    /// Creates an exact phrase match of `query` on `field`.
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            slop: 0,
            boost: None,
        }
    }

    /// Sets the slop.
    pub fn slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    /// Sets the boost.
    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    /// Renders the query as DSL.
    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), json!(self.query));
        body.insert("slop".into(), json!(self.slop));
        put_boost(&mut body, self.boost);
        field_query("match_phrase", &self.field, body)
    }
}

/// A `prefix` query.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixQuery {
    /// Field to search.
    pub field: String,
    /// Prefix value.
    pub value: String,
    /// Score multiplier.
    pub boost: Option<f64>,
}

impl PrefixQuery {
    /// Creates a prefix match of `value` on `field`.
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    /// Sets the boost.
    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    /// Renders the query as DSL.
    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("value".into(), json!(self.value));
        put_boost(&mut body, self.boost);
        field_query("prefix", &self.field, body)
    }
}

/// A `bool` query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoolQuery {
    /// Required, scoring clauses.
    pub must: Vec<Fragment>,
    /// Required, non-scoring clauses.
    pub filter: Vec<Fragment>,
    /// Optional, scoring clauses.
    pub should: Vec<Fragment>,
    /// Excluding clauses.
    pub must_not: Vec<Fragment>,
    /// Number of should clauses that must match.
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    /// Creates an empty boolean query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a must clause.
    pub fn must(mut self, fragment: impl Into<Fragment>) -> Self {
        self.must.push(fragment.into());
        self
    }

    /// Adds a filter clause.
    pub fn filter(mut self, fragment: impl Into<Fragment>) -> Self {
        self.filter.push(fragment.into());
        self
    }

    /// Adds a should clause.
    pub fn should(mut self, fragment: impl Into<Fragment>) -> Self {
        self.should.push(fragment.into());
        self
    }

    /// Adds every fragment as a should clause.
    pub fn should_all<I, F>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        self.should.extend(fragments.into_iter().map(Into::into));
        self
    }

    /// Adds a must_not clause.
    pub fn must_not(mut self, fragment: impl Into<Fragment>) -> Self {
        self.must_not.push(fragment.into());
        self
    }

    /// Sets the minimum number of should clauses that must match.
    pub fn minimum_should_match(mut self, count: u32) -> Self {
        self.minimum_should_match = Some(count);
        self
    }

    /// Renders the query as DSL. Empty clause lists are omitted.
    fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (name, clauses) in [
            ("must", &self.must),
            ("filter", &self.filter),
            ("should", &self.should),
            ("must_not", &self.must_not),
        ] {
            if !clauses.is_empty() {
                body.insert(
                    name.into(),
                    Value::Array(clauses.iter().map(Fragment::to_json).collect()),
                );
            }
        }
        if let Some(count) = self.minimum_should_match {
            body.insert("minimum_should_match".into(), json!(count));
        }
        json!({ "bool": body })
    }
}

/// A `dis_max` query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisMaxQuery {
    /// Alternatives.
    pub queries: Vec<Fragment>,
    /// Share of non-winning branches added to the winning score.
    pub tie_breaker: Option<f64>,
}

impl DisMaxQuery {
    /// Creates a disjunction over `queries`.
    pub fn new<I, F>(queries: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        Self {
            queries: queries.into_iter().map(Into::into).collect(),
            tie_breaker: None,
        }
    }

    /// Sets the tie breaker.
    pub fn tie_breaker(mut self, tie_breaker: f64) -> Self {
        self.tie_breaker = Some(tie_breaker);
        self
    }

    /// Renders the query as DSL.
    fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert(
            "queries".into(),
            Value::Array(self.queries.iter().map(Fragment::to_json).collect()),
        );
        if let Some(tie_breaker) = self.tie_breaker {
            body.insert("tie_breaker".into(), json!(tie_breaker));
        }
        json!({ "dis_max": body })
    }
}

/// A `function_score` query rescoring its inner query with a script.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionScoreQuery {
    /// Query whose score is rewritten.
    pub query: Box<Fragment>,
    /// Script source.
    pub script: String,
    /// Script parameters.
    pub params: BTreeMap<String, Value>,
}

impl FunctionScoreQuery {
    /// Wraps `query` in a script score.
    pub fn new(
        query: impl Into<Fragment>,
        script: impl Into<String>,
        params: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            query: Box::new(query.into()),
            script: script.into(),
            params,
        }
    }

    /// Renders the query as DSL.
    fn to_json(&self) -> Value {
        json!({
            "function_score": {
                "query": self.query.to_json(),
                "script_score": {
                    "script": {
                        "source": self.script,
                        "params": self.params,
                    }
                }
            }
        })
    }
}

/// Implements `From<$ty> for Fragment`.
macro_rules! into_fragment {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Fragment {
                fn from(query: $ty) -> Self {
                    Self::$variant(query)
                }
            }
        )*
    };
}

into_fragment! {
    MatchQuery => Match,
    MultiMatchQuery => MultiMatch,
    PhraseQuery => Phrase,
    PrefixQuery => Prefix,
    BoolQuery => Bool,
    DisMaxQuery => DisMax,
    FunctionScoreQuery => FunctionScore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_serializes_boost_and_fuzziness() {
        let fragment: Fragment = MatchQuery::new("title", "cat")
            .boost(2.5)
            .fuzziness(Fuzziness::Auto)
            .into();
        assert_eq!(
            fragment.to_json(),
            json!({ "match": { "title": { "query": "cat", "boost": 2.5, "fuzziness": "AUTO" } } })
        );
    }

    #[test]
    fn match_without_boost_omits_it() {
        let fragment: Fragment = MatchQuery::new("title", "cat").into();
        assert_eq!(
            fragment.to_json(),
            json!({ "match": { "title": { "query": "cat" } } })
        );
    }

    #[test]
    fn multi_match_uses_and_operator() {
        let fragment: Fragment = MultiMatchQuery::all_words("big cat", ["all", "all.plain"]).into();
        assert_eq!(
            fragment.to_json(),
            json!({ "multi_match": { "query": "big cat", "fields": ["all", "all.plain"], "operator": "and" } })
        );
    }

    #[test]
    fn phrase_always_carries_slop() {
        let fragment: Fragment = PhraseQuery::new("all", "big cat").into();
        assert_eq!(
            fragment.to_json(),
            json!({ "match_phrase": { "all": { "query": "big cat", "slop": 0 } } })
        );
    }

    #[test]
    fn bool_omits_empty_clause_lists() {
        let fragment: Fragment = BoolQuery::new()
            .filter(Fragment::MatchAll)
            .minimum_should_match(0)
            .into();
        assert_eq!(
            fragment.to_json(),
            json!({ "bool": { "filter": [{ "match_all": {} }], "minimum_should_match": 0 } })
        );
    }

    #[test]
    fn dis_max_and_function_score() {
        let inner = DisMaxQuery::new([Fragment::MatchNone]).tie_breaker(0.3);
        let fragment: Fragment = FunctionScoreQuery::new(
            inner,
            "_score * params.w",
            BTreeMap::from([("w".to_string(), json!(2))]),
        )
        .into();
        assert_eq!(
            fragment.to_json(),
            json!({
                "function_score": {
                    "query": { "dis_max": { "queries": [{ "match_none": {} }], "tie_breaker": 0.3 } },
                    "script_score": { "script": { "source": "_score * params.w", "params": { "w": 2 } } }
                }
            })
        );
    }

    #[test]
    fn serialize_matches_to_json() {
        let fragment: Fragment = PrefixQuery::new("title", "ca").boost(1.0).into();
        let text = serde_json::to_string(&fragment).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, fragment.to_json());
    }
}
