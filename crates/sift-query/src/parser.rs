//! Query parser.
//!
//! Parses a token stream into a query syntax tree using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query    → or_expr
//! or_expr  → and_expr ("OR" and_expr)*
//! and_expr → unary+
//! unary    → "-" unary | primary
//! primary  → WORDS | PHRASE | FUZZY | PREFIX | KEYWORD | "(" or_expr ")"
//! ```
//!
//! # Precedence (highest to lowest)
//!
//! 1. Grouping: `(...)`
//! 2. Negation: `-`
//! 3. AND (implicit, between adjacent nodes)
//! 4. OR (explicit keyword)

use std::mem;

use crate::{
    ast::{FuzzyNode, KeywordNode, Node, ParsedQuery, PhraseNode, PrefixNode, QueryExpr},
    error::{ParseError, QueryError},
    lexer::{Token, tokenize},
};

/// Keywords recognized by [`parse`].
pub const DEFAULT_KEYWORDS: &[&str] = &["custommatch"];

/// Recursive descent parser for query expressions.
struct Parser<'k> {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
    /// Registered keyword names, lowercase.
    keywords: &'k [&'k str],
}

impl<'k> Parser<'k> {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>, keywords: &'k [&'k str]) -> Self {
        Self {
            tokens,
            position: 0,
            keywords,
        }
    }

    /// Parses the token stream into a query expression.
    fn parse(mut self) -> Result<Option<QueryExpr>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expr = self.parse_or_expr()?;

        if self.position < self.tokens.len() {
            return Err(ParseError::new(
                format!("unexpected token: {:?}", self.tokens[self.position]),
                Some(self.position),
            ));
        }

        Ok(expr.pruned())
    }

    /// Parses: or_expr → and_expr ("OR" and_expr)*
    fn parse_or_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut left = self.parse_and_expr()?;

        while self.check(&Token::Or) {
            self.advance(); // consume OR
            let right = self.parse_and_expr()?;
            left = QueryExpr::or(vec![left, right]);
        }

        Ok(left)
    }

    /// Parses: and_expr → unary+
    fn parse_and_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut exprs = vec![self.parse_unary(true)?];

        while self.can_start_unary() {
            exprs.push(self.parse_unary(true)?);
        }

        Ok(QueryExpr::and(exprs))
    }

    /// Checks if the current token can start a unary expression.
    fn can_start_unary(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Term(_)
                    | Token::Phrase(_)
                    | Token::Not
                    | Token::LParen
                    | Token::KeywordPrefix(_)
            )
        )
    }

    /// Parses: unary → "-" unary | primary
    ///
    /// `merge` controls whether adjacent bare terms fold into one words node; a negation
    /// only ever applies to the single term that follows it.
    fn parse_unary(&mut self, merge: bool) -> Result<QueryExpr, ParseError> {
        if self.check(&Token::Not) {
            self.advance(); // consume -
            let expr = self.parse_unary(false)?;
            return Ok(QueryExpr::Not(Box::new(expr)));
        }

        self.parse_primary(merge)
    }

    /// Parses: primary → WORDS | PHRASE | FUZZY | PREFIX | KEYWORD | "(" or_expr ")"
    fn parse_primary(&mut self, merge: bool) -> Result<QueryExpr, ParseError> {
        match self.peek().cloned() {
            Some(Token::Term(text)) => {
                self.advance();
                Ok(self.parse_term(text, merge))
            }

            Some(Token::Phrase(text)) => {
                self.advance();
                Ok(self.parse_phrase(text))
            }

            Some(Token::KeywordPrefix(name)) => {
                self.advance();
                self.parse_keyword(name)
            }

            Some(Token::LParen) => self.parse_group(),

            Some(Token::RParen) => Err(ParseError::new(
                "unexpected closing parenthesis",
                Some(self.position),
            )),

            Some(Token::Or) => Err(ParseError::new(
                "unexpected OR (needs expression before it)",
                Some(self.position),
            )),

            Some(Token::Tilde(_)) => Err(ParseError::new(
                "unexpected '~' (needs a term or phrase before it)",
                Some(self.position),
            )),

            Some(Token::Not) => Err(ParseError::new("unexpected negation", Some(self.position))),

            None => Err(ParseError::new("unexpected end of query", None)),
        }
    }

    /// Builds a node from a bare term whose token was already consumed.
    fn parse_term(&mut self, text: String, merge: bool) -> QueryExpr {
        if let Some(Token::Tilde(fuzziness)) = self.peek().cloned() {
            self.advance();
            return QueryExpr::Node(Node::Fuzzy(FuzzyNode {
                term: text,
                fuzziness,
            }));
        }

        if let Some(prefix) = prefix_of(&text) {
            return QueryExpr::Node(Node::Prefix(PrefixNode {
                prefix: prefix.to_string(),
            }));
        }

        let mut words = vec![text];
        while merge && self.next_is_plain_term() {
            if let Some(Token::Term(next)) = self.peek().cloned() {
                words.push(next);
            }
            self.advance();
        }

        QueryExpr::Node(Node::words(words.join(" ")))
    }

    /// Returns true when the current token is a bare term that would become a words node.
    fn next_is_plain_term(&self) -> bool {
        match self.peek() {
            Some(Token::Term(text)) => {
                prefix_of(text).is_none()
                    && !matches!(self.tokens.get(self.position + 1), Some(Token::Tilde(_)))
            }
            _ => false,
        }
    }

    /// Builds a phrase node, consuming any `~N` and `~` suffixes.
    fn parse_phrase(&mut self, text: String) -> QueryExpr {
        let phrase = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut slop = PhraseNode::UNSPECIFIED_SLOP;
        let mut stem = false;

        if let Some(Token::Tilde(Some(value))) = self.peek() {
            slop = i32::try_from(*value).unwrap_or(i32::MAX);
            self.advance();
        }
        if let Some(Token::Tilde(None)) = self.peek() {
            stem = true;
            self.advance();
        }

        if phrase.is_empty() {
            return QueryExpr::And(vec![]);
        }
        QueryExpr::Node(Node::Phrase(PhraseNode { phrase, slop, stem }))
    }

    /// Parses the value after a keyword prefix.
    ///
    /// Unregistered keywords are not keywords at all: the prefix and a following bare term
    /// are searched as words.
    fn parse_keyword(&mut self, name: String) -> Result<QueryExpr, ParseError> {
        let lowered = name.to_lowercase();
        if !self.keywords.contains(&lowered.as_str()) {
            if let Some(Token::Term(value)) = self.peek().cloned() {
                self.advance();
                return Ok(QueryExpr::Node(Node::words(format!("{name}:{value}"))));
            }
            return Ok(QueryExpr::Node(Node::words(format!("{name}:"))));
        }

        let (value, quoted) = match self.peek().cloned() {
            Some(Token::Term(value)) => (value, false),
            Some(Token::Phrase(value)) => (value, true),
            _ => {
                return Err(ParseError::new(
                    format!("expected value after keyword '{name}:'"),
                    Some(self.position),
                ));
            }
        };
        self.advance();

        Ok(QueryExpr::Node(Node::Keyword(KeywordNode {
            name: lowered,
            value,
            quoted,
        })))
    }

    /// Parses a parenthesized group, consuming the surrounding parentheses.
    fn parse_group(&mut self) -> Result<QueryExpr, ParseError> {
        self.advance(); // consume (
        let inner = self.parse_or_expr()?;

        if !self.check(&Token::RParen) {
            return Err(ParseError::new(
                "expected closing parenthesis",
                Some(self.position),
            ));
        }
        self.advance(); // consume )

        Ok(inner)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Checks if the current token matches the given token.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| mem::discriminant(t) == mem::discriminant(token))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Returns the prefix of a `prefix*` term.
fn prefix_of(text: &str) -> Option<&str> {
    text.strip_suffix('*').filter(|prefix| !prefix.is_empty())
}

/// Parses a query string into a syntax tree, recognizing [`DEFAULT_KEYWORDS`].
///
/// Empty queries produce a [`ParsedQuery`] without a root.
pub fn parse(input: &str) -> Result<ParsedQuery, QueryError> {
    parse_with_keywords(input, DEFAULT_KEYWORDS)
}

/// Parses a query string, treating only `keywords` (lowercase) as keyword prefixes.
pub fn parse_with_keywords(input: &str, keywords: &[&str]) -> Result<ParsedQuery, QueryError> {
    let tokens = tokenize(input).map_err(|err| QueryError::new(err, input))?;
    let root = Parser::new(tokens, keywords)
        .parse()
        .map_err(|err| QueryError::new(err, input))?;
    Ok(ParsedQuery::new(input, root))
}
