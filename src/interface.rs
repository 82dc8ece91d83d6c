use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;

use crate::core::{CellValue, ColumnType, Result};
use crate::result::DocumentCursor;

/// The tabular cursor protocol consumed by row-mapping code.
///
/// Only what a forward-only, single-result-set reader can honour: column
/// metadata, cell access for the current row, advancing, and closing.
#[async_trait]
pub trait DataReader: Send {
    fn field_count(&self) -> usize;

    fn name(&self, ordinal: usize) -> Result<&str>;

    fn field_type(&self, ordinal: usize) -> Result<ColumnType>;

    fn value(&self, ordinal: usize) -> Result<CellValue>;

    /// The cell as the source produced it, before any coercion.
    fn json_value(&self, ordinal: usize) -> Result<JsonValue> {
        self.value(ordinal).map(|value| value.to_json())
    }

    /// Advance to the next row; `false` once there are no more rows.
    async fn read(&mut self) -> Result<bool>;

    /// Like [`read`](Self::read), also ending iteration when `cancel` fires.
    async fn read_with(&mut self, cancel: &CancellationToken) -> Result<bool>;

    /// Advance to the next result set.
    async fn next_result(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

#[async_trait]
impl DataReader for DocumentCursor {
    fn field_count(&self) -> usize {
        DocumentCursor::field_count(self)
    }

    fn name(&self, ordinal: usize) -> Result<&str> {
        DocumentCursor::name(self, ordinal)
    }

    fn field_type(&self, ordinal: usize) -> Result<ColumnType> {
        DocumentCursor::field_type(self, ordinal)
    }

    fn value(&self, ordinal: usize) -> Result<CellValue> {
        DocumentCursor::value(self, ordinal)
    }

    fn json_value(&self, ordinal: usize) -> Result<JsonValue> {
        DocumentCursor::raw_value(self, ordinal).cloned()
    }

    async fn read(&mut self) -> Result<bool> {
        DocumentCursor::read(self).await
    }

    async fn read_with(&mut self, cancel: &CancellationToken) -> Result<bool> {
        DocumentCursor::read_with(self, cancel).await
    }

    async fn next_result(&mut self) -> Result<bool> {
        DocumentCursor::next_result(self).await
    }

    fn close(&mut self) {
        DocumentCursor::close(self)
    }

    fn is_closed(&self) -> bool {
        DocumentCursor::is_closed(self)
    }
}
