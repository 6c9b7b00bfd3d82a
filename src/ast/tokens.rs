use std::fmt;

/// Lexical category of a [`Token`].
///
/// The lexer never decides whether a bare word is a keyword. Words such as
/// `and`, `in` or `null` come out as [`TokenKind::Unknown`] and the parser
/// recognizes them by position and case-insensitive comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Bare word: a field name, a dotted path, or an unclassified keyword
    ///
    /// # Examples
    /// ```text
    /// age
    /// user.address.city
    /// select
    /// ```
    Unknown,

    /// Quoted literal, stored without its quote marks
    ///
    /// # Examples
    /// ```text
    /// 'Alice'
    /// "A%"
    /// ```
    String,

    /// Bare word that parses as a 64-bit float
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 5.5
    /// 1e3
    /// ```
    Number,

    /// Arithmetic or comparison operator
    ///
    /// # Examples
    /// ```text
    /// +  -  *  /  %
    /// =  <>  !=  <  >  <=  >=
    /// ```
    Operator,

    /// Separator punctuation; only `,` is produced
    Keyword,

    /// Left parenthesis
    LeftParen,

    /// Right parenthesis
    RightParen,
}

/// A single lexical token of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            kind,
        }
    }

    /// True if this is a bare word equal to `word`, ignoring ASCII case.
    ///
    /// String literals never match, so `'null'` is not the `null` keyword.
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Unknown && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_comma(&self) -> bool {
        self.kind == TokenKind::Keyword && self.text == ","
    }

    pub fn is_left_paren(&self) -> bool {
        self.kind == TokenKind::LeftParen
    }

    pub fn is_right_paren(&self) -> bool {
        self.kind == TokenKind::RightParen
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "'{}'", self.text),
            _ => f.write_str(&self.text),
        }
    }
}

/// Renders a token span back into query text, tokens separated by spaces.
pub fn fragment(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
