use std::{fmt, ops::Range};

use thiserror::Error;

use crate::{
    ast::{ArithOp, CmpOp, Node, Token, TokenKind, fragment},
    value::Value,
};

/// Deepest nesting of parentheses and same-tier operator chains accepted.
pub const MAX_DEPTH: usize = 256;

/// Which operand of a binary operator an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Errors raised while building a predicate tree from WHERE-clause tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    EmptyExpression,

    #[error("missing {side} operand of `{op}`")]
    MissingOperand { op: String, side: Side },

    #[error("unbalanced parentheses in `{0}`")]
    UnbalancedParens(String),

    #[error("expression nested more than {0} levels deep")]
    TooDeep(usize),

    /// An operand lacks the capability its operator needs, e.g. `'a' > 1`
    #[error("{side} operand of `{op}` must be {expected}, found `{operand}`")]
    Capability {
        op: String,
        side: Side,
        expected: &'static str,
        operand: String,
    },

    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("expected a field name before `{keyword}`, found `{found}`")]
    ExpectedField { keyword: &'static str, found: String },

    #[error("invalid value list `{0}`")]
    InvalidList(String),

    #[error("unrecognized expression shape: `{0}`")]
    UnrecognizedShape(String),

    #[error("expression is not a predicate: `{0}`")]
    NotPredicate(String),
}

/// Builds a predicate tree from the tokens of a WHERE clause.
///
/// Precedence is resolved structurally. The span is split at the first
/// top-level `and`/`or`; failing that at the first top-level comparison;
/// failing that at the first top-level arithmetic operator. Both halves are
/// parsed recursively, so chains within one tier group to the right. A span
/// wrapped entirely in parentheses is unwrapped first, and spans with no
/// operator are matched against the fixed shapes (`is null`, `like`, `in`, ...)
/// or read as a single literal or field.
///
/// # Examples
///
/// ```
/// use json_filter::{Node, NodeType, Parser, lexer::tokenize};
///
/// let tokens = tokenize("age > 18 and name like 'A%'").unwrap();
/// let node = Parser::new(&tokens).parse_predicate().unwrap();
/// assert_eq!(node.node_type(), NodeType::And);
/// ```
pub struct Parser<'t> {
    tokens: &'t [Token],
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Parser { tokens }
    }

    /// Parses the whole token sequence into a node of any capability.
    pub fn parse(&self) -> Result<Node, ParseError> {
        self.check_balanced()?;
        self.parse_span(0..self.tokens.len(), 0)
    }

    /// Parses the whole token sequence and requires a boolean root.
    pub fn parse_predicate(&self) -> Result<Node, ParseError> {
        let node = self.parse()?;
        if !node.is_boolean() {
            return Err(ParseError::NotPredicate(node.to_string()));
        }
        Ok(node)
    }

    fn check_balanced(&self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        for token in self.tokens {
            if token.is_left_paren() {
                depth += 1;
            } else if token.is_right_paren() {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ParseError::UnbalancedParens(fragment(self.tokens)))?;
            }
        }
        if depth != 0 {
            return Err(ParseError::UnbalancedParens(fragment(self.tokens)));
        }
        Ok(())
    }

    fn parse_span(&self, span: Range<usize>, depth: usize) -> Result<Node, ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep(MAX_DEPTH));
        }
        let tokens = &self.tokens[span.clone()];
        match tokens {
            [] => return Err(ParseError::EmptyExpression),
            [token] => return parse_leaf(token),
            _ => {}
        }

        if is_enclosed(tokens) {
            return self.parse_span(span.start + 1..span.end - 1, depth + 1);
        }

        // Tier 1: and / or
        if let Some(at) = self.find_split(&span, |i| is_logical(&self.tokens[i])) {
            return self.parse_logical(&span, at, depth);
        }

        // Tier 2: comparisons
        if let Some(at) = self.find_split(&span, |i| cmp_op(&self.tokens[i]).is_some()) {
            return self.parse_comparison(&span, at, depth);
        }

        // Tier 3: arithmetic
        if let Some(at) = self.find_split(&span, |i| self.is_binary_arith(&span, i)) {
            return self.parse_arithmetic(&span, at, depth);
        }

        if let Some(node) = self.parse_unary(&span, depth)? {
            return Ok(node);
        }

        parse_shape(tokens)
    }

    /// First index in `span` outside parentheses where `is_split` holds.
    fn find_split(&self, span: &Range<usize>, is_split: impl Fn(usize) -> bool) -> Option<usize> {
        let mut depth = 0usize;
        for i in span.clone() {
            let token = &self.tokens[i];
            if token.is_left_paren() {
                depth += 1;
            } else if token.is_right_paren() {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && is_split(i) {
                return Some(i);
            }
        }
        None
    }

    /// An arithmetic operator is binary when an operand precedes it; `-x` at
    /// the start of a span or after another operator is unary.
    fn is_binary_arith(&self, span: &Range<usize>, i: usize) -> bool {
        if arith_op(&self.tokens[i]).is_none() || i == span.start || i + 1 == span.end {
            return false;
        }
        let prev = &self.tokens[i - 1];
        match prev.kind {
            TokenKind::String | TokenKind::Number | TokenKind::RightParen => true,
            TokenKind::Unknown => arith_op(prev).is_none(),
            TokenKind::Operator | TokenKind::Keyword | TokenKind::LeftParen => false,
        }
    }

    fn operands(
        &self,
        span: &Range<usize>,
        at: usize,
        depth: usize,
    ) -> Result<(Node, Node), ParseError> {
        let op = self.tokens[at].to_string();
        if at == span.start {
            return Err(ParseError::MissingOperand {
                op,
                side: Side::Left,
            });
        }
        if at + 1 == span.end {
            return Err(ParseError::MissingOperand {
                op,
                side: Side::Right,
            });
        }
        let left = self.parse_span(span.start..at, depth + 1)?;
        let right = self.parse_span(at + 1..span.end, depth + 1)?;
        Ok((left, right))
    }

    fn parse_logical(
        &self,
        span: &Range<usize>,
        at: usize,
        depth: usize,
    ) -> Result<Node, ParseError> {
        let token = &self.tokens[at];
        let (left, right) = self.operands(span, at, depth)?;
        require(&left, Node::is_boolean, token, Side::Left, "a predicate")?;
        require(&right, Node::is_boolean, token, Side::Right, "a predicate")?;

        if token.is_word("or") {
            Ok(Node::Or(Box::new(left), Box::new(right)))
        } else {
            Ok(Node::And(Box::new(left), Box::new(right)))
        }
    }

    fn parse_comparison(
        &self,
        span: &Range<usize>,
        at: usize,
        depth: usize,
    ) -> Result<Node, ParseError> {
        let token = &self.tokens[at];
        let op = cmp_op(token).ok_or_else(|| ParseError::UnexpectedToken(token.to_string()))?;
        let (left, right) = self.operands(span, at, depth)?;

        if op.is_equality() {
            require(&left, Node::is_value, token, Side::Left, "a value")?;
            require(&right, Node::is_value, token, Side::Right, "a value")?;
        } else {
            require(&left, Node::is_numeric, token, Side::Left, "numeric")?;
            require(&right, Node::is_numeric, token, Side::Right, "numeric")?;
        }

        Ok(Node::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_arithmetic(
        &self,
        span: &Range<usize>,
        at: usize,
        depth: usize,
    ) -> Result<Node, ParseError> {
        let token = &self.tokens[at];
        let op = arith_op(token).ok_or_else(|| ParseError::UnexpectedToken(token.to_string()))?;
        let (left, right) = self.operands(span, at, depth)?;
        require(&left, Node::is_numeric, token, Side::Left, "numeric")?;
        require(&right, Node::is_numeric, token, Side::Right, "numeric")?;

        Ok(Node::Arith {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// `-expr` / `+expr`. Negated literals fold into the literal; any other
    /// negation becomes `0 - expr`.
    fn parse_unary(&self, span: &Range<usize>, depth: usize) -> Result<Option<Node>, ParseError> {
        let first = &self.tokens[span.start];
        if first.kind != TokenKind::Operator {
            return Ok(None);
        }
        let negate = match first.text.as_str() {
            "-" => true,
            "+" => false,
            _ => return Ok(None),
        };

        let operand = self.parse_span(span.start + 1..span.end, depth + 1)?;
        require(&operand, Node::is_numeric, first, Side::Right, "numeric")?;

        let node = match operand {
            Node::Number(n) if negate => Node::Number(-n),
            operand if negate => Node::Arith {
                op: ArithOp::Subtract,
                left: Box::new(Node::Number(0.0)),
                right: Box::new(operand),
            },
            operand => operand,
        };
        Ok(Some(node))
    }
}

fn require(
    node: &Node,
    capable: fn(&Node) -> bool,
    op: &Token,
    side: Side,
    expected: &'static str,
) -> Result<(), ParseError> {
    if capable(node) {
        return Ok(());
    }
    Err(ParseError::Capability {
        op: op.to_string(),
        side,
        expected,
        operand: node.to_string(),
    })
}

fn is_logical(token: &Token) -> bool {
    token.is_word("and") || token.is_word("or")
}

fn cmp_op(token: &Token) -> Option<CmpOp> {
    match token.kind {
        TokenKind::Operator => CmpOp::from_symbol(&token.text),
        _ => None,
    }
}

/// A bare `*` that the lexer closed as a word still multiplies between operands.
fn arith_op(token: &Token) -> Option<ArithOp> {
    match token.kind {
        TokenKind::Operator => ArithOp::from_symbol(&token.text),
        TokenKind::Unknown if token.text == "*" => Some(ArithOp::Multiply),
        _ => None,
    }
}

/// True when the first token opens a parenthesis closed by the last token.
fn is_enclosed(tokens: &[Token]) -> bool {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return false;
    };
    if !first.is_left_paren() || !last.is_right_paren() {
        return false;
    }

    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_left_paren() {
            depth += 1;
        } else if token.is_right_paren() {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return i == tokens.len() - 1;
            }
        }
    }
    false
}

fn parse_leaf(token: &Token) -> Result<Node, ParseError> {
    match token.kind {
        TokenKind::String => Ok(Node::String(token.text.clone())),
        TokenKind::Number => parse_number(token).map(Node::Number),
        TokenKind::Unknown => Ok(Node::Field(token.text.clone())),
        TokenKind::Operator | TokenKind::Keyword | TokenKind::LeftParen | TokenKind::RightParen => {
            Err(ParseError::UnexpectedToken(token.to_string()))
        }
    }
}

fn parse_number(token: &Token) -> Result<f64, ParseError> {
    token
        .text
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber(token.text.clone()))
}

fn field_key(token: &Token, keyword: &'static str) -> Result<String, ParseError> {
    match token.kind {
        TokenKind::Unknown => Ok(token.text.clone()),
        _ => Err(ParseError::ExpectedField {
            keyword,
            found: token.to_string(),
        }),
    }
}

/// Matches the fixed multi-token predicates.
fn parse_shape(tokens: &[Token]) -> Result<Node, ParseError> {
    match tokens {
        [key, is, null] if is.is_word("is") && null.is_word("null") => {
            Ok(Node::IsNull(field_key(key, "is")?))
        }
        [key, is, not, null] if is.is_word("is") && not.is_word("not") && null.is_word("null") => {
            Ok(Node::IsNotNull(field_key(key, "is")?))
        }
        [key, like, pattern] if like.is_word("like") && pattern.kind == TokenKind::String => {
            Ok(Node::Like {
                key: field_key(key, "like")?,
                pattern: pattern.text.clone(),
            })
        }
        [key, not, like, pattern]
            if not.is_word("not") && like.is_word("like") && pattern.kind == TokenKind::String =>
        {
            Ok(Node::NotLike {
                key: field_key(key, "not")?,
                pattern: pattern.text.clone(),
            })
        }
        [key, kw_in, open, items @ .., close]
            if kw_in.is_word("in")
                && open.is_left_paren()
                && close.is_right_paren()
                && !items.is_empty() =>
        {
            Ok(Node::In {
                key: field_key(key, "in")?,
                list: parse_list(items)?,
            })
        }
        [key, not, kw_in, open, items @ .., close]
            if not.is_word("not")
                && kw_in.is_word("in")
                && open.is_left_paren()
                && close.is_right_paren()
                && !items.is_empty() =>
        {
            Ok(Node::NotIn {
                key: field_key(key, "not")?,
                list: parse_list(items)?,
            })
        }
        _ => Err(ParseError::UnrecognizedShape(fragment(tokens))),
    }
}

/// Reads the comma-separated literals of an IN list.
fn parse_list(items: &[Token]) -> Result<Vec<Value>, ParseError> {
    items
        .split(Token::is_comma)
        .map(|item| match item {
            [token] => match token.kind {
                TokenKind::String | TokenKind::Unknown => Ok(Value::String(token.text.clone())),
                TokenKind::Number => parse_number(token).map(Value::Number),
                _ => Err(ParseError::InvalidList(fragment(items))),
            },
            [sign, number] if sign.kind == TokenKind::Operator && number.kind == TokenKind::Number => {
                match sign.text.as_str() {
                    "-" => parse_number(number).map(|n| Value::Number(-n)),
                    "+" => parse_number(number).map(Value::Number),
                    _ => Err(ParseError::InvalidList(fragment(items))),
                }
            }
            _ => Err(ParseError::InvalidList(fragment(items))),
        })
        .collect()
}
