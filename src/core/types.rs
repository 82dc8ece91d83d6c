use std::fmt;
use std::sync::Arc;

/// One query-result item as produced by the query engine.
///
/// Usually a JSON object, but `SELECT RAW` style projections yield bare
/// scalars or arrays.
pub type Document = serde_json::Value;

/// A nested JSON object, kept structured for the consumer to decode.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Type reported for a column of the current row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Null, absent, or an array whose element type cannot be determined.
    Unknown,
    Boolean,
    Integer,
    Float,
    Text,
    Timestamp,
    Object,
    IntegerArray,
    TextArray,
    BooleanArray,
    ObjectArray,
}

impl ColumnType {
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::IntegerArray | Self::TextArray | Self::BooleanArray | Self::ObjectArray
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Integer => write!(f, "INTEGER"),
            Self::Float => write!(f, "FLOAT"),
            Self::Text => write!(f, "TEXT"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Object => write!(f, "OBJECT"),
            Self::IntegerArray => write!(f, "INTEGER[]"),
            Self::TextArray => write!(f, "TEXT[]"),
            Self::BooleanArray => write!(f, "BOOLEAN[]"),
            Self::ObjectArray => write!(f, "OBJECT[]"),
        }
    }
}

/// Ordered field names discovered from the first document of a result stream.
///
/// Built once and never mutated afterwards; clones share the same storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    names: Arc<[String]>,
}

impl ColumnSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names: names.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::empty()
    }
}
