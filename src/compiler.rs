//! Compiles `SELECT <fields> FROM t [WHERE <predicate>]` into a [`QueryPlan`].

use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Node, QueryPlan, SELECT_ALL, Token, TokenKind},
    lexer::{LexError, tokenize},
    parser::{ParseError, Parser},
};

/// The only table name a query may select from.
pub const TABLE_NAME: &str = "t";

/// Errors in the overall shape of a query, outside the WHERE expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("empty query")]
    EmptyQuery,

    #[error("query must start with `select`, found `{0}`")]
    MissingSelect(String),

    #[error("missing `from t`")]
    MissingFrom,

    #[error("unknown table `{0}`, only `t` is supported")]
    UnknownTable(String),

    #[error("no fields selected")]
    EmptyFieldList,

    #[error("invalid field `{0}` in select list")]
    InvalidField(String),

    #[error("expected `where` after `from t`, found `{found}` at token {position}")]
    ExpectedWhere { found: String, position: usize },

    #[error("empty `where` clause")]
    EmptyWhere,
}

/// A query failed to compile; the variant names the phase that failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("tokenize error: {0}")]
    Tokenize(#[from] LexError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Compiles a query string.
///
/// # Examples
///
/// ```
/// use json_filter::{NodeType, compile};
///
/// let plan = compile("select name, age from t where age > 18").unwrap();
/// assert_eq!(plan.fields, vec!["name", "age"]);
/// assert_eq!(plan.predicate.node_type(), NodeType::GreaterThan);
///
/// let plan = compile("SELECT * FROM t").unwrap();
/// assert!(plan.selects_all());
/// assert_eq!(plan.predicate.node_type(), NodeType::True);
/// ```
pub fn compile(query: &str) -> Result<QueryPlan, CompileError> {
    let tokens = tokenize(query)?;

    let first = tokens.first().ok_or(SyntaxError::EmptyQuery)?;
    if !first.is_word("select") {
        return Err(SyntaxError::MissingSelect(first.to_string()).into());
    }

    let from = find_from(&tokens)?;
    let fields = select_list(&tokens[1..from])?;

    let after_table = from + 2;
    let predicate = match tokens.get(after_table) {
        None => Node::True,
        Some(token) if token.is_word("where") => {
            let clause = &tokens[after_table + 1..];
            if clause.is_empty() {
                return Err(SyntaxError::EmptyWhere.into());
            }
            Parser::new(clause).parse_predicate()?
        }
        Some(token) => {
            return Err(SyntaxError::ExpectedWhere {
                found: token.to_string(),
                position: after_table,
            }
            .into());
        }
    };

    let plan = QueryPlan { fields, predicate };
    debug!(fields = ?plan.fields, predicate = %plan.predicate, "compiled query");
    Ok(plan)
}

/// Index of the `from` keyword that is immediately followed by `t`.
fn find_from(tokens: &[Token]) -> Result<usize, SyntaxError> {
    let mut unknown_table = None;
    for (i, pair) in tokens.windows(2).enumerate().skip(1) {
        if !pair[0].is_word("from") {
            continue;
        }
        if pair[1].is_word(TABLE_NAME) {
            return Ok(i);
        }
        unknown_table.get_or_insert_with(|| pair[1].to_string());
    }
    Err(unknown_table.map_or(SyntaxError::MissingFrom, SyntaxError::UnknownTable))
}

/// Field names between `select` and `from`, commas dropped.
fn select_list(tokens: &[Token]) -> Result<Vec<String>, SyntaxError> {
    let mut fields = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::Keyword if token.is_comma() => continue,
            TokenKind::Unknown | TokenKind::String | TokenKind::Number => {
                fields.push(token.text.clone())
            }
            TokenKind::Operator if token.text == SELECT_ALL => fields.push(token.text.clone()),
            _ => return Err(SyntaxError::InvalidField(token.to_string())),
        }
    }
    if fields.is_empty() {
        return Err(SyntaxError::EmptyFieldList);
    }
    Ok(fields)
}
