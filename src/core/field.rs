//! Key/value fields attached to log events
//!
//! Arguments travel as a flat, alternating `key, value, key, value, ...`
//! slice of [`FieldValue`]s. [`Fields`] pairs them up for rendering:
//! a dangling trailing key gets [`MISSING_VALUE`], and a key that appears
//! more than once keeps its first position but takes its last value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value substituted for a key that has no value after it
pub const MISSING_VALUE: &str = "MISSING_VALUE";

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Capture anything printable as a string value
    pub fn display(value: impl fmt::Display) -> Self {
        FieldValue::String(value.to_string())
    }

    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Uint(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::Uint(u64::from(u))
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Ordered key/value pairs with last-write-wins keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    pairs: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Pair up a flat alternating slice, appending to the existing fields
    pub fn extend_from_args(&mut self, args: &[FieldValue]) {
        let mut chunks = args.chunks_exact(2);
        for pair in &mut chunks {
            self.insert(pair[0].to_string(), pair[1].clone());
        }
        if let [dangling] = chunks.remainder() {
            self.insert(dangling.to_string(), FieldValue::from(MISSING_VALUE));
        }
    }

    pub fn from_args(args: &[FieldValue]) -> Self {
        let mut fields = Self::new();
        fields.extend_from_args(args);
        fields
    }

    /// Add a field; an existing key keeps its position and takes the new value
    pub fn insert(&mut self, key: String, value: FieldValue) {
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Flatten back into an alternating key/value argument list
    pub fn into_args(self) -> Vec<FieldValue> {
        let mut args = Vec::with_capacity(self.pairs.len() * 2);
        for (key, value) in self.pairs {
            args.push(FieldValue::String(key));
            args.push(value);
        }
        args
    }
}
