//! Query syntax tree.
//!
//! Leaf nodes are the units handed to the query compiler; `QueryExpr` is the boolean structure
//! the tree walker folds them into.

use std::fmt;

/// Free words, matched together as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordsNode {
    /// Raw text of the words, separated by single spaces.
    pub text: String,
}

/// A quoted phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseNode {
    /// Phrase text without the surrounding quotes.
    pub phrase: String,
    /// Permitted word displacement. Negative when the query did not specify one.
    pub slop: i32,
    /// Whether the phrase should match stemmed fields.
    pub stem: bool,
}

impl PhraseNode {
    /// Slop recorded when the query does not carry a `~N` suffix.
    pub const UNSPECIFIED_SLOP: i32 = -1;
}

/// A single term matched with edit-distance tolerance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyNode {
    /// The term.
    pub term: String,
    /// Explicit maximum edit distance, or `None` for automatic.
    pub fuzziness: Option<u32>,
}

/// A single term matched as a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixNode {
    /// The prefix, without the trailing `*`.
    pub prefix: String,
}

/// A `name:value` keyword for a registered keyword feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordNode {
    /// Keyword name, lowercased.
    pub name: String,
    /// Keyword value with quotes stripped.
    pub value: String,
    /// Whether the value was quoted.
    pub quoted: bool,
}

/// A leaf of the query syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Free words.
    Words(WordsNode),
    /// Quoted phrase.
    Phrase(PhraseNode),
    /// Fuzzy term.
    Fuzzy(FuzzyNode),
    /// Prefix term.
    Prefix(PrefixNode),
    /// Keyword.
    Keyword(KeywordNode),
}

impl Node {
    /// Creates a words node.
    pub fn words(text: impl Into<String>) -> Self {
        Self::Words(WordsNode { text: text.into() })
    }

    /// Creates an unstemmed phrase node without explicit slop.
    pub fn phrase(phrase: impl Into<String>) -> Self {
        Self::Phrase(PhraseNode {
            phrase: phrase.into(),
            slop: PhraseNode::UNSPECIFIED_SLOP,
            stem: false,
        })
    }

    /// Returns the text this node searches for, if it is a text node.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Words(node) => Some(&node.text),
            Self::Phrase(node) => Some(&node.phrase),
            Self::Fuzzy(node) => Some(&node.term),
            Self::Prefix(node) => Some(&node.prefix),
            Self::Keyword(_) => None,
        }
    }

    /// Renders the node back into query syntax.
    fn to_query_string(&self) -> String {
        match self {
            Self::Words(node) => node.text.clone(),
            Self::Phrase(node) => {
                let mut out = format!("\"{}\"", node.phrase);
                if node.slop >= 0 {
                    out.push_str(&format!("~{}", node.slop));
                }
                if node.stem {
                    out.push('~');
                }
                out
            }
            Self::Fuzzy(node) => match node.fuzziness {
                Some(distance) => format!("{}~{distance}", node.term),
                None => format!("{}~", node.term),
            },
            Self::Prefix(node) => format!("{}*", node.prefix),
            Self::Keyword(node) => {
                if node.quoted {
                    format!("{}:\"{}\"", node.name, node.value)
                } else {
                    format!("{}:{}", node.name, node.value)
                }
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Words(node) => write!(f, "Words({:?})", node.text),
            Self::Phrase(node) => write!(
                f,
                "Phrase({:?}, slop={}, stem={})",
                node.phrase, node.slop, node.stem
            ),
            Self::Fuzzy(node) => match node.fuzziness {
                Some(distance) => write!(f, "Fuzzy({:?}, {distance})", node.term),
                None => write!(f, "Fuzzy({:?})", node.term),
            },
            Self::Prefix(node) => write!(f, "Prefix({:?})", node.prefix),
            Self::Keyword(node) => write!(f, "Keyword({}={:?})", node.name, node.value),
        }
    }
}

/// Boolean structure over leaf nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpr {
    /// A leaf node.
    Node(Node),

    /// Negation: results must NOT match this expression.
    Not(Box<Self>),

    /// Conjunction: all sub-expressions must match.
    And(Vec<Self>),

    /// Disjunction: at least one sub-expression must match.
    Or(Vec<Self>),
}

impl QueryExpr {
    /// Creates an And expression, flattening nested Ands.
    pub fn and(exprs: Vec<Self>) -> Self {
        let mut flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::And(inner) => inner,
                other => vec![other],
            })
            .collect();

        match flattened.len() {
            1 => flattened.remove(0),
            _ => Self::And(flattened),
        }
    }

    /// Creates an Or expression, flattening nested Ors.
    pub fn or(exprs: Vec<Self>) -> Self {
        let mut flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::Or(inner) => inner,
                other => vec![other],
            })
            .collect();

        match flattened.len() {
            1 => flattened.remove(0),
            _ => Self::Or(flattened),
        }
    }

    /// Drops the empty conjunctions that blank phrases leave behind, returning `None` when
    /// nothing remains.
    pub(crate) fn pruned(self) -> Option<Self> {
        match self {
            Self::Node(_) => Some(self),
            Self::Not(inner) => inner.pruned().map(|inner| Self::Not(Box::new(inner))),
            Self::And(exprs) => prune_all(exprs, Self::and),
            Self::Or(exprs) => prune_all(exprs, Self::or),
        }
    }

    /// Appends every leaf node of this expression to `out`, left to right.
    fn collect_nodes<'a>(&'a self, out: &mut Vec<&'a Node>) {
        match self {
            Self::Node(node) => out.push(node),
            Self::Not(inner) => inner.collect_nodes(out),
            Self::And(exprs) | Self::Or(exprs) => {
                for expr in exprs {
                    expr.collect_nodes(out);
                }
            }
        }
    }

    /// Formats the expression as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Node(node) => writeln!(f, "{prefix}{node}"),
            Self::Not(inner) => {
                writeln!(f, "{prefix}Not")?;
                inner.fmt_tree(f, indent + 1)
            }
            Self::And(exprs) => {
                writeln!(f, "{prefix}And")?;
                for expr in exprs {
                    expr.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Or(exprs) => {
                writeln!(f, "{prefix}Or")?;
                for expr in exprs {
                    expr.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }

    /// Formats the expression as a query string.
    ///
    /// This produces output like: `black cat OR "white dog"~2`
    pub fn to_query_string(&self) -> String {
        self.fmt_query_string(false)
    }

    /// Internal helper for query string formatting.
    fn fmt_query_string(&self, nested: bool) -> String {
        match self {
            Self::Node(node) => node.to_query_string(),
            Self::Not(inner) => format!("-{}", inner.fmt_query_string(true)),
            Self::And(exprs) => {
                let parts: Vec<String> = exprs.iter().map(|e| e.fmt_query_string(true)).collect();
                if nested && exprs.len() > 1 {
                    format!("({})", parts.join(" "))
                } else {
                    parts.join(" ")
                }
            }
            Self::Or(exprs) => {
                let parts: Vec<String> = exprs.iter().map(|e| e.fmt_query_string(true)).collect();
                if nested && exprs.len() > 1 {
                    format!("({})", parts.join(" OR "))
                } else {
                    parts.join(" OR ")
                }
            }
        }
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

/// A parsed query: the raw input plus its syntax tree.
///
/// The full parsed query is the context entity recognition runs against, so it travels
/// alongside each node during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Original query string.
    raw: String,
    /// Root expression, `None` for an empty query.
    root: Option<QueryExpr>,
}

impl ParsedQuery {
    /// Creates a parsed query from its parts.
    pub fn new(raw: impl Into<String>, root: Option<QueryExpr>) -> Self {
        Self {
            raw: raw.into(),
            root,
        }
    }

    /// Returns the original query string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the root expression.
    pub fn root(&self) -> Option<&QueryExpr> {
        self.root.as_ref()
    }

    /// Returns true when the query has no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns every leaf node in query order.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes = Vec::new();
        if let Some(root) = &self.root {
            root.collect_nodes(&mut nodes);
        }
        nodes
    }
}

/// Prunes each operand and recombines the survivors with `combine`.
fn prune_all(
    exprs: Vec<QueryExpr>,
    combine: fn(Vec<QueryExpr>) -> QueryExpr,
) -> Option<QueryExpr> {
    let kept: Vec<QueryExpr> = exprs.into_iter().filter_map(QueryExpr::pruned).collect();
    (!kept.is_empty()).then(|| combine(kept))
}
