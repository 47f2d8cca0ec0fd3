//! Query compiler.
//!
//! Walks a parsed query, dispatches each node to its handler and folds the fragments into one
//! boolean query.

use serde::Serialize;
use sift_config::Config;
use sift_query::{KeywordNode, Node, ParsedQuery, QueryExpr};
use tracing::{debug, warn};

use crate::{
    BoolQuery, CompileError, Fragment, SearchContext, Warning,
    clause::ClauseBuilder,
    custom_match::{CustomMatchFeature, KeywordFeature, KeywordOutcome},
    handlers::{EntitiesHandler, PhraseHandler, TextHandler, WordsHandler},
    recognizer::EntityRecognizer,
};

/// The compiled form of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    /// Root query fragment.
    pub query: Fragment,
    /// Warnings raised while compiling.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    /// True when no document can match; `query` is then `match_none`.
    pub unsatisfiable: bool,
}

/// Compiles parsed queries into weighted boolean queries.
pub struct QueryCompiler<'a> {
    /// Weights, roster and feature settings.
    config: &'a Config,
    /// Entity recognizer consulted for words and phrases.
    recognizer: &'a dyn EntityRecognizer,
    /// Registered keyword features.
    keywords: Vec<Box<dyn KeywordFeature + 'a>>,
}

impl<'a> QueryCompiler<'a> {
    /// Creates a compiler with the `custommatch:` keyword registered.
    pub fn new(config: &'a Config, recognizer: &'a dyn EntityRecognizer) -> Self {
        Self {
            config,
            recognizer,
            keywords: vec![Box::new(CustomMatchFeature::new(&config.custom_match))],
        }
    }

    /// Registers an additional keyword feature.
    pub fn with_keyword(mut self, feature: impl KeywordFeature + 'a) -> Self {
        self.keywords.push(Box::new(feature));
        self
    }

    /// Returns the names of the registered keywords, for the parser.
    pub fn keyword_names(&self) -> Vec<&str> {
        self.keywords.iter().map(|feature| feature.name()).collect()
    }

    /// Compiles a parsed query.
    ///
    /// Returns `None` for empty queries. Configuration problems are errors; queries that cannot
    /// match anything compile to `match_none` with warnings.
    pub fn compile(&self, query: &ParsedQuery) -> Result<Option<CompiledQuery>, CompileError> {
        let Some(root) = query.root() else {
            return Ok(None);
        };

        let mut ctx = SearchContext::new();
        let fragment = self.compile_expr(query, root, Scope::Root, &mut ctx)?;
        let (filters, warnings, unsatisfiable) = ctx.into_parts();

        let query = if unsatisfiable {
            warn!(query = query.raw(), "query cannot match any document");
            Fragment::MatchNone
        } else {
            match (fragment, filters.is_empty()) {
                (Some(fragment), true) => fragment,
                (None, true) => return Ok(None),
                (fragment, false) => Fragment::Bool(BoolQuery {
                    must: fragment.into_iter().collect(),
                    filter: filters,
                    ..BoolQuery::default()
                }),
            }
        };

        Ok(Some(CompiledQuery {
            query,
            warnings,
            unsatisfiable,
        }))
    }

    /// Compiles one expression.
    fn compile_expr(
        &self,
        query: &ParsedQuery,
        expr: &QueryExpr,
        scope: Scope,
        ctx: &mut SearchContext,
    ) -> Result<Option<Fragment>, CompileError> {
        match expr {
            QueryExpr::Node(node) => self.compile_node(query, node, scope, ctx),
            QueryExpr::Not(inner) => self.compile_not(query, inner, ctx),
            QueryExpr::And(exprs) => self.compile_and(query, exprs, scope, ctx),
            QueryExpr::Or(exprs) => self.compile_or(query, exprs, ctx),
        }
    }

    /// Compiles a leaf node.
    fn compile_node(
        &self,
        query: &ParsedQuery,
        node: &Node,
        scope: Scope,
        ctx: &mut SearchContext,
    ) -> Result<Option<Fragment>, CompileError> {
        debug!(node = %node, ?scope, "compiling node");
        let fragment = match node {
            Node::Words(words) => {
                let entities = self.entities(query, node);
                WordsHandler::new(self.config, words, entities).transform()
            }
            Node::Phrase(phrase) => {
                let entities = self.entities(query, node);
                PhraseHandler::new(self.config, phrase, entities).transform()
            }
            Node::Fuzzy(fuzzy) => self.single_term(&ClauseBuilder::Fuzzy {
                text: fuzzy.term.clone(),
                fuzziness: fuzzy.fuzziness,
            }),
            Node::Prefix(prefix) => self.single_term(&ClauseBuilder::Prefix(prefix.prefix.clone())),
            Node::Keyword(keyword) => return self.apply_keyword(keyword, scope, ctx),
        };
        Ok(Some(fragment))
    }

    /// Recognizes the entities of a node.
    fn entities(&self, query: &ParsedQuery, node: &Node) -> EntitiesHandler<'a> {
        EntitiesHandler::new(self.config, self.recognizer, query, node)
    }

    /// Expands a single term over every field; at least one field must match.
    fn single_term(&self, clause: &ClauseBuilder) -> Fragment {
        TextHandler::new(self.config)
            .transform(clause)
            .minimum_should_match(1)
            .into()
    }

    /// Applies a keyword through its registered feature.
    ///
    /// At the root the feature may filter the whole query; elsewhere it must hand back its
    /// fragment.
    fn apply_keyword(
        &self,
        keyword: &KeywordNode,
        scope: Scope,
        ctx: &mut SearchContext,
    ) -> Result<Option<Fragment>, CompileError> {
        let feature = self
            .keywords
            .iter()
            .find(|feature| feature.name() == keyword.name)
            .ok_or_else(|| CompileError::UnknownKeyword {
                name: keyword.name.clone(),
            })?;

        match feature.apply(&keyword.value, scope == Scope::Embedded, ctx)? {
            KeywordOutcome::Query(fragment) => Ok(Some(fragment)),
            KeywordOutcome::Consumed | KeywordOutcome::Rejected => Ok(None),
        }
    }

    /// Compiles a standalone negation as everything except the operand.
    fn compile_not(
        &self,
        query: &ParsedQuery,
        inner: &QueryExpr,
        ctx: &mut SearchContext,
    ) -> Result<Option<Fragment>, CompileError> {
        Ok(self
            .compile_expr(query, inner, Scope::Embedded, ctx)?
            .map(|fragment| {
                BoolQuery::new()
                    .must(Fragment::MatchAll)
                    .must_not(fragment)
                    .into()
            }))
    }

    /// Compiles a conjunction.
    ///
    /// Negated operands become `must_not` clauses. Embedded keywords become local filters. A
    /// conjunction of negations alone is anchored on `match_all`.
    fn compile_and(
        &self,
        query: &ParsedQuery,
        exprs: &[QueryExpr],
        scope: Scope,
        ctx: &mut SearchContext,
    ) -> Result<Option<Fragment>, CompileError> {
        let mut positive: Vec<Fragment> = Vec::new();
        let mut filter: Vec<Fragment> = Vec::new();
        let mut negative: Vec<Fragment> = Vec::new();

        for expr in exprs {
            let (target, fragment) = match expr {
                QueryExpr::Not(inner) => (
                    &mut negative,
                    self.compile_expr(query, inner, Scope::Embedded, ctx)?,
                ),
                QueryExpr::Node(Node::Keyword(_)) => {
                    (&mut filter, self.compile_expr(query, expr, scope, ctx)?)
                }
                other => (&mut positive, self.compile_expr(query, other, scope, ctx)?),
            };
            target.extend(fragment);
        }

        if positive.is_empty() && filter.is_empty() && negative.is_empty() {
            return Ok(None);
        }
        if filter.is_empty() && negative.is_empty() && positive.len() == 1 {
            return Ok(positive.pop());
        }
        if positive.is_empty() && filter.is_empty() {
            positive.push(Fragment::MatchAll);
        }

        Ok(Some(Fragment::Bool(BoolQuery {
            must: positive,
            filter,
            must_not: negative,
            ..BoolQuery::default()
        })))
    }

    /// Compiles a disjunction; at least one operand must match.
    fn compile_or(
        &self,
        query: &ParsedQuery,
        exprs: &[QueryExpr],
        ctx: &mut SearchContext,
    ) -> Result<Option<Fragment>, CompileError> {
        let mut clauses: Vec<Fragment> = Vec::new();
        for expr in exprs {
            clauses.extend(self.compile_expr(query, expr, Scope::Embedded, ctx)?);
        }

        match clauses.len() {
            0 => Ok(None),
            1 => Ok(clauses.pop()),
            _ => Ok(Some(
                BoolQuery::new()
                    .should_all(clauses)
                    .minimum_should_match(1)
                    .into(),
            )),
        }
    }
}

/// Where a compiled expression lands in the final query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Every match of the query must satisfy the expression.
    Root,
    /// Under a negation or a disjunction; the caller places the fragment.
    Embedded,
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;
    use sift_query::parse;

    use super::*;
    use crate::{MatchQuery, recognizer::NoEntities};

    /// `haslabel:<lang>` requires a label in that language.
    struct HasLabel;

    impl KeywordFeature for HasLabel {
        fn name(&self) -> &str {
            "haslabel"
        }

        fn apply(
            &self,
            value: &str,
            embedded: bool,
            ctx: &mut SearchContext,
        ) -> Result<KeywordOutcome, CompileError> {
            let fragment = Fragment::from(MatchQuery::new("labels", value));
            if embedded {
                return Ok(KeywordOutcome::Query(fragment));
            }
            ctx.add_filter(fragment);
            Ok(KeywordOutcome::Consumed)
        }
    }

    fn config() -> Config {
        Config::from_toml_str(
            r#"
[fields]
stemmed = ["title"]
plain = ["title.plain"]

[fields.plain_variants]
"title" = "title.plain"

[boost]
"title" = 1.0

[custom_match.depicts]
fields = ["statement_keywords"]
"#,
            Path::new("test.toml"),
        )
        .unwrap()
    }

    fn compile(config: &Config, input: &str) -> Option<CompiledQuery> {
        QueryCompiler::new(config, &NoEntities)
            .compile(&parse(input).unwrap())
            .unwrap()
    }

    #[test]
    fn empty_query_compiles_to_none() {
        let config = config();
        assert!(compile(&config, "").is_none());
        assert!(compile(&config, "   ").is_none());
    }

    #[test]
    fn single_words_node_is_the_root() {
        let config = config();
        let compiled = compile(&config, "cat").unwrap();
        assert!(!compiled.unsatisfiable);
        let Fragment::Bool(root) = compiled.query else {
            panic!("expected bool");
        };
        assert_eq!(root.minimum_should_match, Some(1));
        assert_eq!(root.should.len(), 2);
    }

    #[test]
    fn negation_becomes_must_not() {
        let config = config();
        let Fragment::Bool(root) = compile(&config, "cat -dog").unwrap().query else {
            panic!("expected bool");
        };
        assert_eq!(root.must.len(), 1);
        assert_eq!(root.must_not.len(), 1);
    }

    #[test]
    fn negation_only_is_anchored_on_match_all() {
        let config = config();
        let Fragment::Bool(root) = compile(&config, "-dog").unwrap().query else {
            panic!("expected bool");
        };
        assert_eq!(root.must, vec![Fragment::MatchAll]);
        assert_eq!(root.must_not.len(), 1);
    }

    #[test]
    fn or_requires_one_branch() {
        let config = config();
        let Fragment::Bool(root) = compile(&config, "cat OR dog").unwrap().query else {
            panic!("expected bool");
        };
        assert_eq!(root.should.len(), 2);
        assert_eq!(root.minimum_should_match, Some(1));
    }

    #[test]
    fn prefix_and_fuzzy_use_single_term_expansion() {
        let config = config();
        let compiled = compile(&config, "ca*").unwrap();
        assert_eq!(
            compiled.query.to_json(),
            json!({ "bool": {
                "should": [
                    { "prefix": { "title": { "value": "ca", "boost": 3.0 } } },
                    { "prefix": { "title.plain": { "value": "ca", "boost": 1.0 } } },
                ],
                "minimum_should_match": 1,
            } })
        );

        let compiled = compile(&config, "cat~1").unwrap();
        assert_eq!(
            compiled.query.to_json()["bool"]["should"][0]["match"]["title"]["fuzziness"],
            1
        );
    }

    #[test]
    fn consumed_keyword_becomes_root_filter() {
        let config = config();
        let compiled = compile(&config, "cat custommatch:depicts=Q146").unwrap();
        let Fragment::Bool(root) = compiled.query else {
            panic!("expected bool");
        };
        assert_eq!(root.must.len(), 1);
        assert_eq!(
            root.filter[0].to_json(),
            json!({ "bool": {
                "should": [{ "match": { "statement_keywords": { "query": "Q146", "boost": 1.0 } } }],
                "minimum_should_match": 1,
            } })
        );
    }

    #[test]
    fn keyword_alone_is_a_pure_filter() {
        let config = config();
        let Fragment::Bool(root) = compile(&config, "custommatch:depicts=Q146").unwrap().query
        else {
            panic!("expected bool");
        };
        assert!(root.must.is_empty());
        assert_eq!(root.filter.len(), 1);
    }

    #[test]
    fn negated_keyword_is_excluded() {
        let config = config();
        let Fragment::Bool(root) = compile(&config, "cat -custommatch:depicts=Q146").unwrap().query
        else {
            panic!("expected bool");
        };
        assert!(root.filter.is_empty());
        assert_eq!(root.must_not.len(), 1);
    }

    #[test]
    fn unknown_profile_is_unsatisfiable() {
        let config = config();
        let compiled = compile(&config, "cat custommatch:nope=Q1").unwrap();
        assert!(compiled.unsatisfiable);
        assert_eq!(compiled.query, Fragment::MatchNone);
        assert_eq!(compiled.warnings[0].key, "custommatch-unknown-profile");
    }

    #[test]
    fn unregistered_keyword_is_an_error() {
        let config = config();
        let query = sift_query::parse_with_keywords("haswbstatement:P180", &["haswbstatement"])
            .unwrap();
        let err = QueryCompiler::new(&config, &NoEntities)
            .compile(&query)
            .unwrap_err();
        assert!(matches!(err, CompileError::UnknownKeyword { ref name } if name == "haswbstatement"));
    }

    #[test]
    fn keyword_names_lists_registered_features() {
        let config = config();
        let compiler = QueryCompiler::new(&config, &NoEntities);
        assert_eq!(compiler.keyword_names(), vec!["custommatch"]);
    }

    #[test]
    fn keyword_in_negated_group_is_excluded_with_it() {
        let config = config();
        let Fragment::Bool(root) = compile(&config, "-(custommatch:depicts=Q146 cat)")
            .unwrap()
            .query
        else {
            panic!("expected bool");
        };
        assert!(root.filter.is_empty());
        assert_eq!(root.must, vec![Fragment::MatchAll]);

        let Fragment::Bool(excluded) = &root.must_not[0] else {
            panic!("expected bool");
        };
        assert_eq!(excluded.must.len(), 1);
        assert_eq!(
            excluded.filter[0].to_json()["bool"]["should"][0]["match"]["statement_keywords"]["query"],
            "Q146"
        );
    }

    #[test]
    fn keyword_in_negated_disjunction_is_excluded_with_it() {
        let config = config();
        let compiled = compile(&config, "cat -(custommatch:depicts=Q146 OR dog)").unwrap();
        let Fragment::Bool(root) = compiled.query else {
            panic!("expected bool");
        };
        assert!(root.filter.is_empty());
        assert_eq!(root.must.len(), 1);

        let excluded = root.must_not[0].to_json();
        assert_eq!(excluded["bool"]["minimum_should_match"], 1);
        assert_eq!(
            excluded["bool"]["should"][0]["bool"]["should"][0]["match"]["statement_keywords"]["query"],
            "Q146"
        );
    }

    #[test]
    fn keyword_inside_or_stays_one_branch() {
        let config = config();
        let Fragment::Bool(root) = compile(&config, "cat OR custommatch:depicts=Q146")
            .unwrap()
            .query
        else {
            panic!("expected bool");
        };
        assert!(root.filter.is_empty());
        assert_eq!(root.minimum_should_match, Some(1));
        assert_eq!(root.should.len(), 2);
        assert_eq!(
            root.should[1].to_json()["bool"]["should"][0]["match"]["statement_keywords"]["query"],
            "Q146"
        );
    }

    #[test]
    fn added_keyword_is_parsed_and_dispatched() {
        let config = config();
        let compiler = QueryCompiler::new(&config, &NoEntities).with_keyword(HasLabel);
        assert_eq!(compiler.keyword_names(), vec!["custommatch", "haslabel"]);
        let label = Fragment::from(MatchQuery::new("labels", "en"));

        let query =
            sift_query::parse_with_keywords("cat haslabel:en", &compiler.keyword_names()).unwrap();
        let Fragment::Bool(root) = compiler.compile(&query).unwrap().unwrap().query else {
            panic!("expected bool");
        };
        assert_eq!(root.must.len(), 1);
        assert_eq!(root.filter, vec![label.clone()]);

        let query =
            sift_query::parse_with_keywords("-haslabel:en", &compiler.keyword_names()).unwrap();
        let Fragment::Bool(root) = compiler.compile(&query).unwrap().unwrap().query else {
            panic!("expected bool");
        };
        assert_eq!(root.must, vec![Fragment::MatchAll]);
        assert_eq!(root.must_not, vec![label]);
    }
}
