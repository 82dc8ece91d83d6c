//! Typed row decoding
//!
//! Rows are rendered back into JSON objects (column name to source value) and
//! decoded with serde, so nested objects and arrays of objects land in
//! whatever record types the caller declares. Source values are used rather
//! than coerced cells so date-like strings reach `String` fields untouched.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::core::Result;
use crate::interface::DataReader;

/// The current row as a JSON object.
pub fn row_to_json<R: DataReader + ?Sized>(reader: &R) -> Result<JsonValue> {
    let mut row = Map::with_capacity(reader.field_count());
    for ordinal in 0..reader.field_count() {
        let name = reader.name(ordinal)?.to_string();
        row.insert(name, reader.json_value(ordinal)?);
    }
    Ok(JsonValue::Object(row))
}

/// Drain the reader, decoding every remaining row into `T`, then close it.
pub async fn read_all<T, R>(reader: &mut R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: DataReader + ?Sized,
{
    let mut records = Vec::new();
    while reader.read().await? {
        let row = row_to_json(&*reader)?;
        records.push(serde_json::from_value(row)?);
    }
    reader.close();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionConfig;
    use crate::core::DbError;
    use crate::result::DocumentCursor;
    use futures::{StreamExt, stream};
    use serde::Deserialize;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Profile {
        name: String,
        #[serde(rename = "shoeSize")]
        shoe_size: i32,
    }

    async fn cursor(docs: Vec<JsonValue>) -> DocumentCursor {
        let rows = stream::iter(docs.into_iter().map(Ok)).boxed();
        DocumentCursor::open(rows, &ConnectionConfig::default(), CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_read_all() {
        let mut reader = cursor(vec![
            json!({"name": "Matt", "shoeSize": 13}),
            json!({"name": "Ann", "shoeSize": 7}),
        ])
        .await;

        let profiles: Vec<Profile> = read_all(&mut reader).await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1], Profile { name: "Ann".into(), shoe_size: 7 });
        assert!(reader.is_closed());
    }

    #[tokio::test]
    async fn test_row_to_json() {
        let mut reader = cursor(vec![json!({"a": [1, 2], "b": {"c": true}})]).await;
        reader.read().await.unwrap();
        assert_eq!(row_to_json(&reader).unwrap(), json!({"a": [1, 2], "b": {"c": true}}));
    }

    #[tokio::test]
    async fn test_row_to_json_keeps_source_text() {
        let mut reader = cursor(vec![json!({"at": "2024-01-02T03:04:05.000+02:00"})]).await;
        reader.read().await.unwrap();
        assert!(matches!(reader.value(0).unwrap(), crate::core::CellValue::Timestamp(_)));
        assert_eq!(
            row_to_json(&reader).unwrap(),
            json!({"at": "2024-01-02T03:04:05.000+02:00"})
        );
    }

    #[tokio::test]
    async fn test_decode_failure() {
        let mut reader = cursor(vec![json!({"name": 5, "shoeSize": 13})]).await;
        let result: Result<Vec<Profile>> = read_all(&mut reader).await;
        assert!(matches!(result, Err(DbError::Mapping(_))));
    }
}
