use std::mem;

use thiserror::Error;

use crate::ast::{Token, TokenKind};

/// Errors raised while splitting query text into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A quote with no matching closing quote later in the text
    #[error("unterminated string literal at position {position}: {fragment}")]
    UnterminatedString { position: usize, fragment: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    /// An operator character was consumed; the next character decides
    /// whether it extends to a two-character operator.
    InOperator(char),
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    state: State,
    run: String,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            state: State::Normal,
            run: String::new(),
            tokens: Vec::new(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>) {
        self.tokens.push(Token::new(kind, text));
    }

    /// Emits the pending bare word, as a number when the whole word parses as one.
    fn close_run(&mut self) {
        if self.run.is_empty() {
            return;
        }
        let text = mem::take(&mut self.run);
        let kind = if text.parse::<f64>().is_ok() {
            TokenKind::Number
        } else {
            TokenKind::Unknown
        };
        self.push(kind, text);
    }

    fn read_string(&mut self, quote: char) -> Result<(), LexError> {
        let start = self.position;
        self.advance(); // opening quote

        let rest = &self.input[self.position..];
        match rest.iter().position(|&c| c == quote) {
            Some(len) => {
                let text: String = rest[..len].iter().collect();
                self.position += len + 1;
                self.push(TokenKind::String, text);
                Ok(())
            }
            None => Err(LexError::UnterminatedString {
                position: start,
                fragment: self.input[start..].iter().collect(),
            }),
        }
    }

    fn scan_normal(&mut self, ch: char) -> Result<(), LexError> {
        match ch {
            c if c.is_whitespace() => {
                self.close_run();
                self.advance();
            }
            '\'' | '"' => {
                self.close_run();
                self.read_string(ch)?;
            }
            '(' => {
                self.close_run();
                self.push(TokenKind::LeftParen, "(");
                self.advance();
            }
            ')' => {
                self.close_run();
                self.push(TokenKind::RightParen, ")");
                self.advance();
            }
            ',' => {
                self.close_run();
                self.push(TokenKind::Keyword, ",");
                self.advance();
            }
            '+' | '-' | '*' | '/' | '%' | '=' | '>' | '!' | '<' => {
                self.close_run();
                self.state = State::InOperator(ch);
                self.advance();
            }
            _ => {
                self.run.push(ch);
                self.advance();
            }
        }
        Ok(())
    }

    /// Commits the operator that began with `first`; `next` is not consumed
    /// unless it completes a two-character operator.
    fn finish_operator(&mut self, first: char, next: Option<char>) {
        self.state = State::Normal;

        // `select * from t`: a lone star is the select-all marker.
        if first == '*' && next.is_none_or(char::is_whitespace) {
            self.push(TokenKind::Unknown, "*");
            return;
        }

        match next {
            Some(second) if matches!((first, second), ('!' | '<' | '>', '=') | ('<', '>')) => {
                self.advance();
                self.push(TokenKind::Operator, format!("{first}{second}"));
            }
            _ => self.push(TokenKind::Operator, first.to_string()),
        }
    }

    /// Splits the whole input into tokens.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            match (self.state, self.current_char()) {
                (State::InOperator(first), next) => self.finish_operator(first, next),
                (State::Normal, Some(ch)) => self.scan_normal(ch)?,
                (State::Normal, None) => break,
            }
        }
        self.close_run();
        Ok(self.tokens)
    }
}

/// Tokenizes a query string.
///
/// # Examples
///
/// ```
/// use json_filter::{TokenKind, lexer::tokenize};
///
/// let tokens = tokenize("age >= 18").unwrap();
/// let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, vec![TokenKind::Unknown, TokenKind::Operator, TokenKind::Number]);
/// ```
pub fn tokenize(query: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(query).tokenize()
}

#[test]
fn test_two_char_operators() {
    let tokens = tokenize("a<=b c<>d e!=f g>=h").unwrap();
    let ops: Vec<&str> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Operator)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(ops, vec!["<=", "<>", "!=", ">="]);
}

#[test]
fn test_star_before_whitespace() {
    let tokens = tokenize("select * from t").unwrap();
    assert_eq!(tokens[1], Token::new(TokenKind::Unknown, "*"));

    let tokens = tokenize("a*2").unwrap();
    assert_eq!(tokens[1], Token::new(TokenKind::Operator, "*"));
}

#[test]
fn test_unterminated_string() {
    let err = tokenize("name = 'abc").unwrap_err();
    assert_eq!(
        err,
        LexError::UnterminatedString {
            position: 7,
            fragment: "'abc".to_string()
        }
    );
}
