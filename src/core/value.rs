use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;

use super::types::{ColumnType, JsonObject};

/// A coerced cell of the current row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Nested document, left structured.
    Object(JsonObject),
    IntegerArray(Vec<i64>),
    TextArray(Vec<String>),
    BooleanArray(Vec<bool>),
    ObjectArray(Vec<JsonObject>),
    /// Placeholder for empty arrays and arrays of unsupported element type.
    Empty,
}

impl CellValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Boolean(_) => "BOOLEAN",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Timestamp(_) => "TIMESTAMP",
            Self::Object(_) => "OBJECT",
            Self::IntegerArray(_) => "INTEGER[]",
            Self::TextArray(_) => "TEXT[]",
            Self::BooleanArray(_) => "BOOLEAN[]",
            Self::ObjectArray(_) => "OBJECT[]",
            Self::Empty => "EMPTY",
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Null | Self::Empty => ColumnType::Unknown,
            Self::Boolean(_) => ColumnType::Boolean,
            Self::Integer(_) => ColumnType::Integer,
            Self::Float(_) => ColumnType::Float,
            Self::Text(_) => ColumnType::Text,
            Self::Timestamp(_) => ColumnType::Timestamp,
            Self::Object(_) => ColumnType::Object,
            Self::IntegerArray(_) => ColumnType::IntegerArray,
            Self::TextArray(_) => ColumnType::TextArray,
            Self::BooleanArray(_) => ColumnType::BooleanArray,
            Self::ObjectArray(_) => ColumnType::ObjectArray,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) => {
                if f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Renders the cell back into JSON so a consumer can decode it into a
    /// typed record. Timestamps become RFC 3339 strings.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Boolean(b) => JsonValue::Bool(*b),
            Self::Integer(i) => JsonValue::from(*i),
            Self::Float(f) => JsonValue::from(*f),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Timestamp(ts) => JsonValue::String(format_timestamp(ts)),
            Self::Object(obj) => JsonValue::Object(obj.clone()),
            Self::IntegerArray(items) => items.iter().copied().map(JsonValue::from).collect(),
            Self::TextArray(items) => items.iter().cloned().map(JsonValue::String).collect(),
            Self::BooleanArray(items) => items.iter().copied().map(JsonValue::Bool).collect(),
            Self::ObjectArray(items) => items.iter().cloned().map(JsonValue::Object).collect(),
            Self::Empty => JsonValue::Array(Vec::new()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(fl) => write!(f, "{}", fl),
            Self::Text(s) => write!(f, "{}", s),
            Self::Timestamp(ts) => write!(f, "{}", format_timestamp(ts)),
            Self::Empty => write!(f, ""),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}
