//! Structured-to-text encoder.
//!
//! The "grammar" of a sentence is a fixed field order; every present field
//! becomes a `FIELD_value` token. Absent fields are skipped silently.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record must be a JSON object")]
    NotAnObject,
    #[error("field '{0}' is not a scalar")]
    NotScalar(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("field order is empty")]
    EmptyOrder,
    #[error("field order contains a blank name")]
    BlankField,
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Num(Number),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Num(n) => write!(f, "{}", n),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Num(n.into())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Num(n.into())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// One structured event, e.g. a server log entry. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Record {
    fields: BTreeMap<String, Scalar>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Builds a record from a JSON object; `null` fields count as absent.
    pub fn from_json(value: &Value) -> Result<Self, RecordError> {
        let object = value.as_object().ok_or(RecordError::NotAnObject)?;
        let mut fields = BTreeMap::new();
        for (key, value) in object {
            let scalar = match value {
                Value::Null => continue,
                Value::Bool(b) => Scalar::Bool(*b),
                Value::Number(n) => Scalar::Num(n.clone()),
                Value::String(s) => Scalar::Str(s.clone()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(RecordError::NotScalar(key.clone()))
                }
            };
            fields.insert(key.clone(), scalar);
        }
        Ok(Self { fields })
    }

    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Value> for Record {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Record::from_json(&value)
    }
}

/// Ordered, non-empty list of field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOrder(Vec<String>);

impl FieldOrder {
    pub fn new<I, S>(fields: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(EncodeError::EmptyOrder);
        }
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(EncodeError::BlankField);
        }
        Ok(Self(fields))
    }

    /// status → method → path → latency → user agent
    pub fn server_log() -> Self {
        Self(
            ["status", "method", "path", "latency_ms", "user_agent"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for FieldOrder {
    type Err = EncodeError;

    /// Comma-separated field names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(EncodeError::EmptyOrder);
        }
        Self::new(s.split(',').map(str::trim))
    }
}

/// Flattens `record` into a log sentence following `order`.
pub fn encode(record: &Record, order: &FieldOrder) -> String {
    order
        .fields()
        .iter()
        .filter_map(|field| {
            record
                .get(field)
                .map(|value| format!("{}_{}", field.to_uppercase(), value))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
