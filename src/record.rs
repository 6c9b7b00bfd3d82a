//! One NDJSON record and the lookups the predicate and projection need.

use serde_json::Map;

use crate::{ast::SELECT_ALL, evaluator::EvalError, evaluator::Getter, value::Value};

/// Pseudo-field resolving to the record's sorted, comma-joined top-level keys.
pub const KEYS_FIELD: &str = "[keys]";

/// Separator between the segments of a dotted path.
const PATH_SEPARATOR: char = '.';

/// A parsed input line.
///
/// Lives for exactly one record: built when the line is read, dropped once
/// the keep/drop decision and projection are done.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    raw: &'a str,
    document: serde_json::Value,
}

impl<'a> Record<'a> {
    /// Parses one line; surrounding whitespace is not part of the record.
    pub fn parse(line: &'a str) -> Result<Self, serde_json::Error> {
        let raw = line.trim();
        let document = serde_json::from_str(raw)?;
        Ok(Record { raw, document })
    }

    /// The record text exactly as read, minus surrounding whitespace.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Follows a dotted path such as `user.tags.0`.
    ///
    /// Object segments look up a key. Array segments are integer indices,
    /// negative ones counting from the end (`-1` is the last element).
    /// Returns `None` as soon as a step has nothing to follow.
    pub fn lookup(&self, path: &str) -> Option<&serde_json::Value> {
        path.split(PATH_SEPARATOR)
            .try_fold(&self.document, |current, segment| step(current, segment))
    }

    /// Sorted, comma-joined top-level keys of the record.
    pub fn keys(&self) -> Result<String, EvalError> {
        match &self.document {
            serde_json::Value::Object(map) => {
                let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
                keys.sort_unstable();
                Ok(keys.join(","))
            }
            other => Err(EvalError::TypeError(format!(
                "{} requires an object record, got {}",
                KEYS_FIELD,
                json_type_name(other)
            ))),
        }
    }

    /// Resolves a projected field to the JSON it should be written as.
    ///
    /// Missing paths project as `null`.
    pub fn resolve(&self, field: &str) -> Result<serde_json::Value, EvalError> {
        if field == KEYS_FIELD {
            return self.keys().map(serde_json::Value::String);
        }
        Ok(self.lookup(field).cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Builds the output object for `fields`; `*` entries are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use json_filter::Record;
    ///
    /// let record = Record::parse(r#"{"name":"Alice","age":20,"city":"X"}"#).unwrap();
    /// let fields = vec!["name".to_string(), "age".to_string()];
    /// let projected = serde_json::to_string(&record.project(&fields).unwrap()).unwrap();
    /// assert_eq!(projected, r#"{"age":20,"name":"Alice"}"#);
    /// ```
    pub fn project(&self, fields: &[String]) -> Result<serde_json::Value, EvalError> {
        let mut out = Map::new();
        for field in fields.iter().filter(|f| f.as_str() != SELECT_ALL) {
            out.insert(field.clone(), self.resolve(field)?);
        }
        Ok(serde_json::Value::Object(out))
    }
}

impl Getter for Record<'_> {
    fn get(&self, key: &str) -> Result<Value, EvalError> {
        if key == KEYS_FIELD {
            return self.keys().map(Value::String);
        }
        Ok(self.lookup(key).map(Value::from).unwrap_or_default())
    }
}

fn step<'v>(current: &'v serde_json::Value, segment: &str) -> Option<&'v serde_json::Value> {
    match current {
        serde_json::Value::Object(map) => map.get(segment),
        serde_json::Value::Array(arr) => {
            let index = segment.parse::<i64>().ok()?;
            let index = if index < 0 {
                arr.len().checked_sub(usize::try_from(index.unsigned_abs()).ok()?)?
            } else {
                usize::try_from(index).ok()?
            };
            arr.get(index)
        }
        _ => None,
    }
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
