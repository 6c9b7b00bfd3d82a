use std::fmt;

use crate::{
    ast::{ArithOp, CmpOp},
    value::Value,
};

/// Introspection tag for a [`Node`].
///
/// One tag per concrete operator, so callers can dispatch on the shape of a
/// tree without evaluating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    String,
    Number,
    Field,
    And,
    Or,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Like,
    NotLike,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    True,
}

/// Node of a compiled WHERE predicate.
///
/// Trees are built only by the parser, own their children, and are never
/// mutated afterwards. Each variant supports a subset of the three
/// evaluation capabilities (value, number, boolean); see
/// [`Node::is_value`], [`Node::is_numeric`] and [`Node::is_boolean`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Value-producing leaves
    /// String literal
    ///
    /// # Example
    /// ```text
    /// 'Alice'
    /// ```
    String(String),

    /// Numeric literal
    ///
    /// # Example
    /// ```text
    /// 5.5
    /// ```
    Number(f64),

    /// Field reference, resolved through the record getter
    ///
    /// # Examples
    /// ```text
    /// age
    /// user.address.city
    /// [keys]
    /// ```
    Field(String),

    // Logical
    /// Short-circuit conjunction
    And(Box<Node>, Box<Node>),

    /// Short-circuit disjunction
    Or(Box<Node>, Box<Node>),

    // Fixed-shape predicates over a single key
    /// `key in (v1, v2, ...)`
    In { key: String, list: Vec<Value> },

    /// `key not in (v1, v2, ...)`
    NotIn { key: String, list: Vec<Value> },

    /// `key is null`
    IsNull(String),

    /// `key is not null`
    IsNotNull(String),

    /// `key like 'pattern'`
    Like { key: String, pattern: String },

    /// `key not like 'pattern'`
    NotLike { key: String, pattern: String },

    // Binary operations
    /// Equality or ordering comparison
    Compare {
        op: CmpOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Decimal-exact arithmetic
    Arith {
        op: ArithOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Predicate of a query without a WHERE clause
    True,
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::String(_) => NodeType::String,
            Node::Number(_) => NodeType::Number,
            Node::Field(_) => NodeType::Field,
            Node::And(..) => NodeType::And,
            Node::Or(..) => NodeType::Or,
            Node::In { .. } => NodeType::In,
            Node::NotIn { .. } => NodeType::NotIn,
            Node::IsNull(_) => NodeType::IsNull,
            Node::IsNotNull(_) => NodeType::IsNotNull,
            Node::Like { .. } => NodeType::Like,
            Node::NotLike { .. } => NodeType::NotLike,
            Node::Compare { op, .. } => match op {
                CmpOp::Equal => NodeType::Equal,
                CmpOp::NotEqual => NodeType::NotEqual,
                CmpOp::LessThan => NodeType::LessThan,
                CmpOp::LessEqual => NodeType::LessEqual,
                CmpOp::GreaterThan => NodeType::GreaterThan,
                CmpOp::GreaterEqual => NodeType::GreaterEqual,
            },
            Node::Arith { op, .. } => match op {
                ArithOp::Add => NodeType::Plus,
                ArithOp::Subtract => NodeType::Minus,
                ArithOp::Multiply => NodeType::Mult,
                ArithOp::Divide => NodeType::Div,
                ArithOp::Modulo => NodeType::Mod,
            },
            Node::True => NodeType::True,
        }
    }

    /// Supports [`Node::as_value`]: literals, fields and arithmetic.
    pub fn is_value(&self) -> bool {
        match self {
            Node::String(_) | Node::Number(_) | Node::Field(_) | Node::Arith { .. } => true,
            Node::And(..)
            | Node::Or(..)
            | Node::In { .. }
            | Node::NotIn { .. }
            | Node::IsNull(_)
            | Node::IsNotNull(_)
            | Node::Like { .. }
            | Node::NotLike { .. }
            | Node::Compare { .. }
            | Node::True => false,
        }
    }

    /// Supports [`Node::as_number`]: numeric literals, fields and arithmetic.
    pub fn is_numeric(&self) -> bool {
        match self {
            Node::Number(_) | Node::Field(_) | Node::Arith { .. } => true,
            Node::String(_)
            | Node::And(..)
            | Node::Or(..)
            | Node::In { .. }
            | Node::NotIn { .. }
            | Node::IsNull(_)
            | Node::IsNotNull(_)
            | Node::Like { .. }
            | Node::NotLike { .. }
            | Node::Compare { .. }
            | Node::True => false,
        }
    }

    /// Supports [`Node::as_bool`]: every predicate-shaped node.
    pub fn is_boolean(&self) -> bool {
        match self {
            Node::And(..)
            | Node::Or(..)
            | Node::In { .. }
            | Node::NotIn { .. }
            | Node::IsNull(_)
            | Node::IsNotNull(_)
            | Node::Like { .. }
            | Node::NotLike { .. }
            | Node::Compare { .. }
            | Node::True => true,
            Node::String(_) | Node::Number(_) | Node::Field(_) | Node::Arith { .. } => false,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, list: &[Value]) -> fmt::Result {
    f.write_str("(")?;
    for (i, item) in list.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match item {
            Value::String(s) => write!(f, "'{}'", s)?,
            Value::Number(n) => write!(f, "{}", n)?,
            other => write!(f, "{:?}", other)?,
        }
    }
    f.write_str(")")
}

/// Renders the tree back into query syntax, parenthesizing every binary node.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::String(s) => write!(f, "'{}'", s),
            Node::Number(n) => write!(f, "{}", n),
            Node::Field(key) => f.write_str(key),
            Node::And(left, right) => write!(f, "({} and {})", left, right),
            Node::Or(left, right) => write!(f, "({} or {})", left, right),
            Node::In { key, list } => {
                write!(f, "{} in ", key)?;
                write_list(f, list)
            }
            Node::NotIn { key, list } => {
                write!(f, "{} not in ", key)?;
                write_list(f, list)
            }
            Node::IsNull(key) => write!(f, "{} is null", key),
            Node::IsNotNull(key) => write!(f, "{} is not null", key),
            Node::Like { key, pattern } => write!(f, "{} like '{}'", key, pattern),
            Node::NotLike { key, pattern } => write!(f, "{} not like '{}'", key, pattern),
            Node::Compare { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Node::Arith { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Node::True => f.write_str("true"),
        }
    }
}
