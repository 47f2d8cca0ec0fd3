//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of tokens for the parser.

use std::{iter::Peekable, str::Chars};

use crate::error::LexError;

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word (search term).
    Term(String),

    /// A quoted phrase (the quotes are stripped, content preserved).
    Phrase(String),

    /// The OR keyword.
    Or,

    /// Negation prefix (-).
    Not,

    /// Left parenthesis.
    LParen,

    /// Right parenthesis.
    RParen,

    /// Keyword prefix (e.g., "custommatch:" produces KeywordPrefix("custommatch")).
    KeywordPrefix(String),

    /// A `~` suffix glued to the preceding term or phrase, with an optional number.
    Tilde(Option<u32>),
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
    /// Set right after a keyword prefix: the next term is read verbatim.
    raw_value: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
            raw_value: false,
        }
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            self.raw_value = matches!(token, Token::KeywordPrefix(_));
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let spaced = self.skip_whitespace();

        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        match ch {
            '"' => self.read_phrase(),
            '(' if !self.raw_value => {
                self.advance();
                Ok(Some(Token::LParen))
            }
            ')' if !self.raw_value => {
                self.advance();
                Ok(Some(Token::RParen))
            }
            '-' if !self.raw_value => {
                self.advance();
                Ok(Some(Token::Not))
            }
            '~' if !spaced && self.position > 0 => self.read_tilde(),
            _ => Ok(self.read_term_or_keyword()),
        }
    }

    /// Reads a quoted phrase.
    fn read_phrase(&mut self) -> Result<Option<Token>, LexError> {
        let start_pos = self.position;
        self.advance(); // consume opening quote

        let mut content = String::new();

        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance(); // consume closing quote
                    return Ok(Some(Token::Phrase(content)));
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => return Err(LexError::new("unclosed quote", start_pos)),
            }
        }
    }

    /// Reads a term, the OR keyword, or a keyword prefix.
    fn read_term_or_keyword(&mut self) -> Option<Token> {
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || ch == '"' {
                break;
            }

            if !self.raw_value {
                if ch == '(' || ch == ')' || (ch == '~' && !word.is_empty()) {
                    break;
                }

                // A word ending in a colon introduces a keyword value.
                if ch == ':' && !word.is_empty() {
                    self.advance();
                    return Some(Token::KeywordPrefix(word));
                }
            }

            word.push(ch);
            self.advance();
        }

        if word.is_empty() {
            return None;
        }

        if !self.raw_value && word.eq_ignore_ascii_case("OR") {
            return Some(Token::Or);
        }

        Some(Token::Term(word))
    }

    /// Reads a `~` suffix (`~` or `~N`).
    fn read_tilde(&mut self) -> Result<Option<Token>, LexError> {
        let start_pos = self.position;
        self.advance(); // consume '~'

        let number = self.take_while(|ch| ch.is_ascii_digit());
        if number.is_empty() {
            return Ok(Some(Token::Tilde(None)));
        }

        number
            .parse::<u32>()
            .map(|value| Some(Token::Tilde(Some(value))))
            .map_err(|_| LexError::new(format!("invalid value after '~': {number}"), start_pos))
    }

    /// Skips whitespace characters, returning whether any were skipped.
    fn skip_whitespace(&mut self) -> bool {
        !self.take_while(char::is_whitespace).is_empty()
    }

    /// Consumes characters while `accept` holds and returns them.
    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(&ch) = self.chars.peek().filter(|&&ch| accept(ch)) {
            taken.push(ch);
            self.advance();
        }
        taken
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Convenience function to tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> Token {
        Token::Term(s.into())
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize("").unwrap(), vec![]);
        assert_eq!(tokenize("   ").unwrap(), vec![]);
    }

    #[test]
    fn multiple_terms() {
        assert_eq!(
            tokenize("black cat").unwrap(),
            vec![term("black"), term("cat")]
        );
    }

    #[test]
    fn quoted_phrase() {
        assert_eq!(
            tokenize("\"black cat\"").unwrap(),
            vec![Token::Phrase("black cat".into())]
        );
    }

    #[test]
    fn unclosed_quote_error() {
        let err = tokenize("cat \"black dog").unwrap_err();
        assert_eq!(err.position, 4);
        assert!(err.message.contains("unclosed"));
    }

    #[test]
    fn or_case_insensitive() {
        assert_eq!(
            tokenize("cat or dog").unwrap(),
            vec![term("cat"), Token::Or, term("dog")]
        );
        assert_eq!(
            tokenize("cat Or dog").unwrap(),
            vec![term("cat"), Token::Or, term("dog")]
        );
    }

    #[test]
    fn negation_and_groups() {
        assert_eq!(
            tokenize("(cat -dog)").unwrap(),
            vec![
                Token::LParen,
                term("cat"),
                Token::Not,
                term("dog"),
                Token::RParen
            ]
        );
    }

    #[test]
    fn hyphen_inside_word_is_kept() {
        assert_eq!(tokenize("jack-o-lantern").unwrap(), vec![term("jack-o-lantern")]);
    }

    #[test]
    fn phrase_slop_and_stem_suffixes() {
        assert_eq!(
            tokenize("\"black cat\"~2~").unwrap(),
            vec![
                Token::Phrase("black cat".into()),
                Token::Tilde(Some(2)),
                Token::Tilde(None)
            ]
        );
    }

    #[test]
    fn fuzzy_term_suffix() {
        assert_eq!(
            tokenize("kitten~1").unwrap(),
            vec![term("kitten"), Token::Tilde(Some(1))]
        );
    }

    #[test]
    fn detached_tilde_is_a_term() {
        assert_eq!(tokenize("cat ~dog").unwrap(), vec![term("cat"), term("~dog")]);
    }

    #[test]
    fn oversized_tilde_value_errors() {
        let err = tokenize("\"a b\"~99999999999").unwrap_err();
        assert_eq!(err.position, 5);
    }

    #[test]
    fn prefix_term_keeps_star() {
        assert_eq!(tokenize("kitt*").unwrap(), vec![term("kitt*")]);
    }

    #[test]
    fn keyword_prefix() {
        assert_eq!(
            tokenize("custommatch:depicts=Q146").unwrap(),
            vec![
                Token::KeywordPrefix("custommatch".into()),
                term("depicts=Q146")
            ]
        );
    }

    #[test]
    fn keyword_value_is_read_verbatim() {
        assert_eq!(
            tokenize("custommatch:p=a:b(c)~ cat").unwrap(),
            vec![
                Token::KeywordPrefix("custommatch".into()),
                term("p=a:b(c)~"),
                term("cat")
            ]
        );
    }

    #[test]
    fn quoted_keyword_value() {
        assert_eq!(
            tokenize("-custommatch:\"depicts=black cat\"").unwrap(),
            vec![
                Token::Not,
                Token::KeywordPrefix("custommatch".into()),
                Token::Phrase("depicts=black cat".into())
            ]
        );
    }
}
