use std::collections::BTreeMap;

/// A dynamically typed value flowing through predicate evaluation.
///
/// Records are JSON, so every JSON shape has a variant. JSON `null` and a
/// key missing from the record both collapse to [`Value::Absent`].
///
/// # Examples
///
/// ```
/// use json_filter::Value;
///
/// let name = Value::String("Alice".to_string());
/// let age = Value::Number(20.0);
///
/// assert_eq!(name.as_str(), Some("Alice"));
/// assert_eq!(age.as_number(), Some(20.0));
/// assert!(Value::Absent.is_absent());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing key or JSON null
    #[default]
    Absent,

    /// JSON boolean
    Boolean(bool),

    /// Any JSON number, held as a 64-bit float
    Number(f64),

    /// UTF-8 string
    String(String),

    /// JSON array
    Array(Vec<Value>),

    /// JSON object, keys kept sorted
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value.
    ///
    /// Numbers convert directly; strings convert when their whole text parses
    /// as a float (`"42"`, `"5.5"`). Everything else has no numeric view.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Human-readable type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Equality used by `=`, `!=`, `IN` and `NOT IN`.
    ///
    /// Values of different kinds are never equal; in particular a string is
    /// never equal to a number even when its text reads as one. Two absent
    /// values are equal.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Absent, Value::Absent) => true,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.loose_eq(vb))
            }
            _ => false,
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Absent,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Absent, Value::Number),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => Value::Array(arr.iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}
