use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    ast::{ArithOp, CmpOp, Node},
    pattern,
    value::Value,
};

/// Errors that can occur while evaluating a predicate against one record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Type mismatch or invalid operation for the given value
    #[error("Type error: {0}")]
    TypeError(String),

    /// The record could not be read at the requested key
    #[error("Access error: {0}")]
    AccessError(String),

    /// Division or modulo by zero
    #[error("Division by zero")]
    DivisionByZero,
}

/// Read access to the record currently being evaluated.
///
/// `key` is a plain field name, a dotted path such as `user.address.city`, or
/// the `[keys]` pseudo-field. A missing key is not an error: it resolves to
/// [`Value::Absent`].
pub trait Getter {
    fn get(&self, key: &str) -> Result<Value, EvalError>;
}

impl Getter for HashMap<String, Value> {
    fn get(&self, key: &str) -> Result<Value, EvalError> {
        Ok(HashMap::get(self, key).cloned().unwrap_or_default())
    }
}

impl Getter for BTreeMap<String, Value> {
    fn get(&self, key: &str) -> Result<Value, EvalError> {
        Ok(BTreeMap::get(self, key).cloned().unwrap_or_default())
    }
}

impl<G: Getter + ?Sized> Getter for &G {
    fn get(&self, key: &str) -> Result<Value, EvalError> {
        (**self).get(key)
    }
}

impl Node {
    /// Resolves a value-producing node to a dynamic [`Value`].
    ///
    /// # Examples
    ///
    /// ```
    /// use json_filter::{Node, Value};
    /// use std::collections::HashMap;
    ///
    /// let mut record = HashMap::new();
    /// record.insert("name".to_string(), Value::String("Alice".to_string()));
    ///
    /// let field = Node::Field("name".to_string());
    /// assert_eq!(field.as_value(&record).unwrap(), Value::String("Alice".to_string()));
    /// ```
    pub fn as_value<G: Getter + ?Sized>(&self, getter: &G) -> Result<Value, EvalError> {
        match self {
            Node::String(s) => Ok(Value::String(s.clone())),
            Node::Number(n) => Ok(Value::Number(*n)),
            Node::Field(key) => getter.get(key),
            Node::Arith { .. } => self.as_number(getter).map(Value::Number),
            Node::And(..)
            | Node::Or(..)
            | Node::In { .. }
            | Node::NotIn { .. }
            | Node::IsNull(_)
            | Node::IsNotNull(_)
            | Node::Like { .. }
            | Node::NotLike { .. }
            | Node::Compare { .. }
            | Node::True => Err(EvalError::TypeError(format!(
                "`{}` does not produce a value",
                self
            ))),
        }
    }

    /// Resolves a numeric node to a float.
    ///
    /// Fields accept numbers and strings whose whole text parses as a float.
    /// Arithmetic runs in decimal so `0.1 + 0.2` yields exactly `0.3`.
    pub fn as_number<G: Getter + ?Sized>(&self, getter: &G) -> Result<f64, EvalError> {
        match self {
            Node::Number(n) => Ok(*n),
            Node::Field(key) => {
                let value = getter.get(key)?;
                value.as_number().ok_or_else(|| match &value {
                    Value::String(s) => EvalError::TypeError(format!(
                        "field `{}` holds non-numeric string {:?}",
                        key, s
                    )),
                    other => EvalError::TypeError(format!(
                        "field `{}` is {}, expected a number",
                        key,
                        other.type_name()
                    )),
                })
            }
            Node::Arith { op, left, right } => {
                let a = left.as_number(getter)?;
                let b = right.as_number(getter)?;
                apply_arith(*op, a, b)
            }
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
            | Node::True => Err(EvalError::TypeError(format!(
                "`{}` does not produce a number",
                self
            ))),
        }
    }

    /// Resolves a boolean node; this is the per-record keep/drop decision.
    pub fn as_bool<G: Getter + ?Sized>(&self, getter: &G) -> Result<bool, EvalError> {
        match self {
            Node::True => Ok(true),
            Node::And(left, right) => Ok(left.as_bool(getter)? && right.as_bool(getter)?),
            Node::Or(left, right) => Ok(left.as_bool(getter)? || right.as_bool(getter)?),
            Node::In { key, list } => {
                let value = getter.get(key)?;
                Ok(contains(list, &value))
            }
            Node::NotIn { key, list } => {
                let value = getter.get(key)?;
                Ok(!contains(list, &value))
            }
            Node::IsNull(key) => Ok(getter.get(key)?.is_absent()),
            Node::IsNotNull(key) => Ok(!getter.get(key)?.is_absent()),
            // A non-string target never matches, under either form.
            Node::Like { key, pattern } => match getter.get(key)? {
                Value::String(s) => Ok(pattern::matches(pattern, &s)),
                _ => Ok(false),
            },
            Node::NotLike { key, pattern } => match getter.get(key)? {
                Value::String(s) => Ok(!pattern::matches(pattern, &s)),
                _ => Ok(false),
            },
            Node::Compare { op, left, right } => compare(*op, left, right, getter),
            Node::String(_) | Node::Number(_) | Node::Field(_) | Node::Arith { .. } => Err(
                EvalError::TypeError(format!("`{}` is not a predicate", self)),
            ),
        }
    }
}

fn contains(list: &[Value], value: &Value) -> bool {
    list.iter().any(|item| item.loose_eq(value))
}

fn compare<G: Getter + ?Sized>(
    op: CmpOp,
    left: &Node,
    right: &Node,
    getter: &G,
) -> Result<bool, EvalError> {
    match op {
        CmpOp::Equal => Ok(left.as_value(getter)?.loose_eq(&right.as_value(getter)?)),
        CmpOp::NotEqual => Ok(!left.as_value(getter)?.loose_eq(&right.as_value(getter)?)),
        CmpOp::LessThan => Ok(left.as_number(getter)? < right.as_number(getter)?),
        CmpOp::LessEqual => Ok(left.as_number(getter)? <= right.as_number(getter)?),
        CmpOp::GreaterThan => Ok(left.as_number(getter)? > right.as_number(getter)?),
        CmpOp::GreaterEqual => Ok(left.as_number(getter)? >= right.as_number(getter)?),
    }
}

/// Relative gap between a decimal product or quotient and its float
/// counterpart beyond which the decimal result is taken to have lost digits.
const PRECISION_LOSS: f64 = 1e-9;

/// Converts through the shortest round-trip decimal text of the float, so
/// `0.1` becomes exactly `0.1` rather than its binary expansion.
///
/// Returns `None` when the value does not survive the trip, e.g. `1e-30`
/// needs more fractional digits than a `Decimal` holds.
fn to_decimal(n: f64) -> Option<Decimal> {
    if !n.is_finite() {
        return None;
    }
    let d = n.to_string().parse::<Decimal>().ok()?;
    (from_decimal(d)? == n).then_some(d)
}

fn from_decimal(d: Decimal) -> Option<f64> {
    d.to_string().parse::<f64>().ok()
}

fn float_arith(op: ArithOp, a: f64, b: f64) -> f64 {
    match op {
        ArithOp::Add => a + b,
        ArithOp::Subtract => a - b,
        ArithOp::Multiply => a * b,
        ArithOp::Divide => a / b,
        ArithOp::Modulo => a % b,
    }
}

fn decimal_arith(op: ArithOp, a: Decimal, b: Decimal) -> Option<Decimal> {
    match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Subtract => a.checked_sub(b),
        ArithOp::Multiply => a.checked_mul(b),
        ArithOp::Divide => a.checked_div(b),
        ArithOp::Modulo => a.checked_rem(b),
    }
}

/// Products and quotients are rounded to 28 fractional digits, which wipes
/// out tiny results. Sums, differences and remainders of exact operands
/// stay exact.
fn lost_precision(op: ArithOp, decimal: f64, float: f64) -> bool {
    match op {
        ArithOp::Multiply | ArithOp::Divide => {
            (decimal - float).abs() > float.abs() * PRECISION_LOSS
        }
        ArithOp::Add | ArithOp::Subtract | ArithOp::Modulo => false,
    }
}

/// Applies `op` in decimal, falling back to float arithmetic when an operand
/// or the result does not fit a `Decimal`.
fn apply_arith(op: ArithOp, a: f64, b: f64) -> Result<f64, EvalError> {
    if matches!(op, ArithOp::Divide | ArithOp::Modulo) && b == 0.0 {
        return Err(EvalError::DivisionByZero);
    }

    let float = float_arith(op, a, b);
    if let Some(ad) = to_decimal(a)
        && let Some(bd) = to_decimal(b)
        && let Some(decimal) = decimal_arith(op, ad, bd).and_then(from_decimal)
        && !lost_precision(op, decimal, float)
    {
        return Ok(decimal);
    }
    Ok(float)
}
