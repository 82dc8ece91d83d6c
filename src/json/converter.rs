//! JSON to cell value conversion
//!
//! Classifies raw JSON values into column types and materializes them as
//! [`CellValue`]s. Arrays are typed by their first element only; later
//! elements must coerce to that type or the conversion fails.

use crate::core::{CellValue, ColumnType, DbError, Document, Result};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

/// Knobs for value coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionOptions {
    /// Treat RFC 3339 strings as timestamps.
    pub parse_dates: bool,
}

impl Default for CoercionOptions {
    fn default() -> Self {
        Self { parse_dates: true }
    }
}

/// Converts JSON values to [`CellValue`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonToValueConverter {
    options: CoercionOptions,
}

impl JsonToValueConverter {
    pub fn new(options: CoercionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CoercionOptions {
        self.options
    }

    /// Infer the column type of a single JSON value
    pub fn infer_type(&self, value: &JsonValue) -> ColumnType {
        match value {
            JsonValue::Null => ColumnType::Unknown,
            JsonValue::Bool(_) => ColumnType::Boolean,
            JsonValue::Number(n) => {
                if n.is_i64() {
                    ColumnType::Integer
                } else {
                    ColumnType::Float
                }
            }
            JsonValue::String(s) => {
                if self.parse_timestamp(s).is_some() {
                    ColumnType::Timestamp
                } else {
                    ColumnType::Text
                }
            }
            JsonValue::Object(_) => ColumnType::Object,
            JsonValue::Array(items) => array_type(items),
        }
    }

    /// Convert a single JSON value to a [`CellValue`]
    pub fn convert(&self, value: &JsonValue) -> Result<CellValue> {
        match value {
            JsonValue::Null => Ok(CellValue::Null),
            JsonValue::Bool(b) => Ok(CellValue::Boolean(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(CellValue::Integer(i))
                } else {
                    n.as_f64().map(CellValue::Float).ok_or_else(|| {
                        DbError::TypeMismatch(format!("Cannot convert {} to a number", n))
                    })
                }
            }
            JsonValue::String(s) => Ok(match self.parse_timestamp(s) {
                Some(ts) => CellValue::Timestamp(ts),
                None => CellValue::Text(s.clone()),
            }),
            JsonValue::Object(obj) => Ok(CellValue::Object(obj.clone())),
            JsonValue::Array(items) => convert_array(items),
        }
    }

    fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        if !self.options.parse_dates {
            return None;
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Look up a field of a document by name.
///
/// Non-object documents have no fields.
pub fn lookup_field<'a>(document: &'a Document, name: &str) -> Option<&'a JsonValue> {
    document.as_object().and_then(|obj| obj.get(name))
}

fn array_type(items: &[JsonValue]) -> ColumnType {
    match items.first() {
        Some(JsonValue::Number(n)) if n.is_i64() => ColumnType::IntegerArray,
        Some(JsonValue::String(_)) => ColumnType::TextArray,
        Some(JsonValue::Bool(_)) => ColumnType::BooleanArray,
        Some(JsonValue::Object(_)) => ColumnType::ObjectArray,
        _ => ColumnType::Unknown,
    }
}

fn convert_array(items: &[JsonValue]) -> Result<CellValue> {
    match array_type(items) {
        ColumnType::IntegerArray => items
            .iter()
            .map(|item| coerce_integer(item).ok_or_else(|| element_mismatch(item, "INTEGER")))
            .collect::<Result<Vec<_>>>()
            .map(CellValue::IntegerArray),
        ColumnType::TextArray => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => Ok(s.clone()),
                JsonValue::Number(_) | JsonValue::Bool(_) => Ok(item.to_string()),
                _ => Err(element_mismatch(item, "TEXT")),
            })
            .collect::<Result<Vec<_>>>()
            .map(CellValue::TextArray),
        ColumnType::BooleanArray => items
            .iter()
            .map(|item| coerce_boolean(item).ok_or_else(|| element_mismatch(item, "BOOLEAN")))
            .collect::<Result<Vec<_>>>()
            .map(CellValue::BooleanArray),
        ColumnType::ObjectArray => items
            .iter()
            .map(|item| {
                item.as_object()
                    .cloned()
                    .ok_or_else(|| element_mismatch(item, "OBJECT"))
            })
            .collect::<Result<Vec<_>>>()
            .map(CellValue::ObjectArray),
        _ => Ok(CellValue::Empty),
    }
}

/// Integral floats, numeric strings and booleans all have an integer reading.
fn coerce_integer(item: &JsonValue) -> Option<i64> {
    match item {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse().ok(),
        JsonValue::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn coerce_boolean(item: &JsonValue) -> Option<bool> {
    match item {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        JsonValue::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        JsonValue::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

fn element_mismatch(item: &JsonValue, expected: &str) -> DbError {
    DbError::TypeMismatch(format!(
        "Array element {} does not match element type {}",
        item, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn converter() -> JsonToValueConverter {
        JsonToValueConverter::default()
    }

    #[test]
    fn test_scalar_types() {
        let c = converter();
        assert_eq!(c.infer_type(&json!(13)), ColumnType::Integer);
        assert_eq!(c.infer_type(&json!(1.5)), ColumnType::Float);
        assert_eq!(c.infer_type(&json!("Matt")), ColumnType::Text);
        assert_eq!(c.infer_type(&json!(false)), ColumnType::Boolean);
        assert_eq!(c.infer_type(&json!(null)), ColumnType::Unknown);
        assert_eq!(c.infer_type(&json!({"foo": "bar"})), ColumnType::Object);
    }

    #[test]
    fn test_array_types_use_first_element() {
        let c = converter();
        assert_eq!(c.infer_type(&json!([1, 2, 3])), ColumnType::IntegerArray);
        assert_eq!(c.infer_type(&json!(["a", 1])), ColumnType::TextArray);
        assert_eq!(c.infer_type(&json!([true])), ColumnType::BooleanArray);
        assert_eq!(c.infer_type(&json!([{"a": 1}])), ColumnType::ObjectArray);
        assert_eq!(c.infer_type(&json!([])), ColumnType::Unknown);
        assert_eq!(c.infer_type(&json!([1.5, 2.5])), ColumnType::Unknown);
        assert_eq!(c.infer_type(&json!([[1], [2]])), ColumnType::Unknown);
    }

    #[test]
    fn test_convert_integer_array() {
        let value = converter().convert(&json!([1, 2, 3])).unwrap();
        assert_eq!(value, CellValue::IntegerArray(vec![1, 2, 3]));
    }

    #[test]
    fn test_convert_object_array() {
        let value = converter()
            .convert(&json!([{"foo": "bar"}, {"foo": "baz"}]))
            .unwrap();
        match value {
            CellValue::ObjectArray(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0]["foo"], "bar");
                assert_eq!(items[1]["foo"], "baz");
            }
            other => panic!("expected object array, got {:?}", other),
        }
    }

    #[test]
    fn test_text_array_stringifies_scalars() {
        let value = converter().convert(&json!(["a", 1, true])).unwrap();
        assert_eq!(
            value,
            CellValue::TextArray(vec!["a".into(), "1".into(), "true".into()])
        );
    }

    #[test]
    fn test_integer_array_coerces_later_elements() {
        let value = converter().convert(&json!([1, 2.0, "3", true])).unwrap();
        assert_eq!(value, CellValue::IntegerArray(vec![1, 2, 3, 1]));

        let err = converter().convert(&json!([1, 2.5])).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch(_)));
    }

    #[test]
    fn test_boolean_array_coerces_later_elements() {
        let value = converter()
            .convert(&json!([true, "false", "TRUE", 0]))
            .unwrap();
        assert_eq!(value, CellValue::BooleanArray(vec![true, false, true, false]));

        let err = converter().convert(&json!([true, "yes"])).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch(_)));

        let err = converter().convert(&json!([false, {"a": 1}])).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch(_)));
    }

    #[test]
    fn test_heterogeneous_array_fails() {
        let err = converter().convert(&json!([1, "two"])).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch(_)));

        let err = converter().convert(&json!([{"a": 1}, 2])).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch(_)));
    }

    #[test]
    fn test_unsupported_arrays_degrade_to_empty() {
        assert_eq!(converter().convert(&json!([])).unwrap(), CellValue::Empty);
        assert_eq!(
            converter().convert(&json!([null, 1])).unwrap(),
            CellValue::Empty
        );
    }

    #[test]
    fn test_null_is_explicit() {
        assert_eq!(converter().convert(&json!(null)).unwrap(), CellValue::Null);
    }

    #[test]
    fn test_dates() {
        let c = converter();
        let raw = json!("2024-03-01T12:30:00Z");
        assert_eq!(c.infer_type(&raw), ColumnType::Timestamp);
        match c.convert(&raw).unwrap() {
            CellValue::Timestamp(ts) => assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:00+00:00"),
            other => panic!("expected timestamp, got {:?}", other),
        }

        let plain = JsonToValueConverter::new(CoercionOptions { parse_dates: false });
        assert_eq!(plain.infer_type(&raw), ColumnType::Text);
        assert_eq!(
            plain.convert(&raw).unwrap(),
            CellValue::Text("2024-03-01T12:30:00Z".into())
        );
    }

    #[test]
    fn test_lookup_field() {
        let doc = json!({"name": "Matt"});
        assert_eq!(lookup_field(&doc, "name"), Some(&json!("Matt")));
        assert_eq!(lookup_field(&doc, "missing"), None);
        assert_eq!(lookup_field(&json!(42), "name"), None);
    }
}
