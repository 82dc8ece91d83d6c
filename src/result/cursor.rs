//! Forward-only cursor over a lazy document stream.
//!
//! The first document is pulled when the cursor is opened so the column
//! schema is known before the consumer asks for metadata. The first
//! [`read`](DocumentCursor::read) hands out that preloaded document; every
//! later call pulls the next one from the stream.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::connection::config::{ConnectionConfig, IterationErrorPolicy};
use crate::core::{CellValue, ColumnSchema, ColumnType, DbError, Document, Result};
use crate::engine::DocumentStream;
use crate::json::{JsonToValueConverter, infer_schema, lookup_field};
use crate::result::QueryResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Opened; the preloaded document (if any) has not been handed out yet.
    NotStarted,
    RowLoaded,
    Exhausted,
    Closed,
}

enum Fetched {
    Row(Document),
    End,
    Cancelled,
    Failed(DbError),
}

pub struct DocumentCursor {
    rows: Option<DocumentStream>,
    preloaded: Option<Document>,
    current: Option<Document>,
    schema: ColumnSchema,
    converter: JsonToValueConverter,
    policy: IterationErrorPolicy,
    cancel: CancellationToken,
    state: CursorState,
    rows_read: u64,
}

impl DocumentCursor {
    /// Wrap a document stream, pulling its first document to discover the
    /// column schema.
    ///
    /// A failed preload follows the configured [`IterationErrorPolicy`]: it
    /// either yields an empty cursor or returns the error.
    pub async fn open(
        rows: DocumentStream,
        config: &ConnectionConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let policy = config.iteration_errors;
        let mut rows = Some(rows);
        let first = pull(&mut rows, &cancel, None, policy).await?;
        let schema = infer_schema(first.as_ref());

        debug!(columns = schema.column_count(), empty = first.is_none(), "cursor opened");

        Ok(Self {
            rows,
            preloaded: first,
            current: None,
            schema,
            converter: JsonToValueConverter::new(config.coercion()),
            policy,
            cancel,
            state: CursorState::NotStarted,
            rows_read: 0,
        })
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    /// Number of columns; zero when the stream produced no documents.
    pub fn field_count(&self) -> usize {
        self.schema.column_count()
    }

    pub fn name(&self, ordinal: usize) -> Result<&str> {
        self.schema
            .name(ordinal)
            .ok_or(DbError::ColumnOutOfRange(ordinal, self.schema.column_count()))
    }

    pub fn ordinal(&self, name: &str) -> Result<usize> {
        self.schema
            .find_column_index(name)
            .ok_or_else(|| DbError::FieldNotFound(name.to_string()))
    }

    /// The document of the current row.
    pub fn current_document(&self) -> Result<&Document> {
        match self.state {
            CursorState::Closed => Err(DbError::CursorClosed),
            _ => self.current.as_ref().ok_or(DbError::NoCurrentRow),
        }
    }

    /// Type of the column in the current row. Absent and null fields
    /// report [`ColumnType::Unknown`].
    pub fn field_type(&self, ordinal: usize) -> Result<ColumnType> {
        let name = self.name(ordinal)?;
        let document = self.current_document()?;
        Ok(lookup_field(document, name)
            .map(|raw| self.converter.infer_type(raw))
            .unwrap_or(ColumnType::Unknown))
    }

    pub fn value(&self, ordinal: usize) -> Result<CellValue> {
        let raw = self.raw_value(ordinal)?;
        self.converter.convert(raw)
    }

    pub fn is_null(&self, ordinal: usize) -> Result<bool> {
        Ok(self.raw_value(ordinal)?.is_null())
    }

    /// The field of the current row exactly as the engine returned it.
    pub fn raw_value(&self, ordinal: usize) -> Result<&serde_json::Value> {
        let name = self.name(ordinal)?;
        let document = self.current_document()?;
        lookup_field(document, name).ok_or_else(|| DbError::FieldNotFound(name.to_string()))
    }

    /// Advance to the next row.
    ///
    /// Cancellation through the cursor's token reports `false`. Fetch
    /// failures report `false` under [`IterationErrorPolicy::Swallow`].
    pub async fn read(&mut self) -> Result<bool> {
        self.advance(None).await
    }

    /// Like [`read`](Self::read), but a fired `cancel` also ends iteration.
    pub async fn read_with(&mut self, cancel: &CancellationToken) -> Result<bool> {
        self.advance(Some(cancel)).await
    }

    async fn advance(&mut self, extra: Option<&CancellationToken>) -> Result<bool> {
        match self.state {
            CursorState::Closed => return Err(DbError::CursorClosed),
            CursorState::Exhausted => return Ok(false),
            _ => {}
        }

        if self.cancel.is_cancelled() || extra.is_some_and(CancellationToken::is_cancelled) {
            debug!(rows_read = self.rows_read, "cursor cancelled");
            self.finish();
            return Ok(false);
        }

        let next = match self.state {
            CursorState::NotStarted => self.preloaded.take(),
            _ => match pull(&mut self.rows, &self.cancel, extra, self.policy).await {
                Ok(next) => next,
                Err(err) => {
                    self.finish();
                    return Err(err);
                }
            },
        };

        match next {
            Some(document) => {
                self.current = Some(document);
                self.state = CursorState::RowLoaded;
                self.rows_read += 1;
                trace!(row = self.rows_read, "cursor advanced");
                Ok(true)
            }
            None => {
                self.finish();
                Ok(false)
            }
        }
    }

    /// There is exactly one result stream per query.
    pub async fn next_result(&mut self) -> Result<bool> {
        Ok(false)
    }

    pub fn close(&mut self) {
        if self.state != CursorState::Closed {
            debug!(rows_read = self.rows_read, "cursor closed");
        }
        self.rows = None;
        self.preloaded = None;
        self.current = None;
        self.state = CursorState::Closed;
    }

    pub fn is_closed(&self) -> bool {
        self.state == CursorState::Closed
    }

    /// Token the cursor watches while fetching; cancel it from anywhere to
    /// end iteration.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Drain the remaining rows into a materialized table.
    pub async fn collect(mut self) -> Result<QueryResult> {
        let columns = self.schema.names().to_vec();
        let mut rows = Vec::new();

        while self.read().await? {
            let row = (0..columns.len())
                .map(|i| self.value(i))
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }

        self.close();
        Ok(QueryResult::new(columns, rows))
    }

    fn finish(&mut self) {
        self.rows = None;
        self.preloaded = None;
        self.current = None;
        self.state = CursorState::Exhausted;
    }
}

impl std::fmt::Debug for DocumentCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCursor")
            .field("state", &self.state)
            .field("schema", &self.schema)
            .field("rows_read", &self.rows_read)
            .finish()
    }
}

/// Fetch the next document, dropping the stream once it ends, fails or is
/// cancelled.
async fn pull(
    rows: &mut Option<DocumentStream>,
    cancel: &CancellationToken,
    extra: Option<&CancellationToken>,
    policy: IterationErrorPolicy,
) -> Result<Option<Document>> {
    let Some(stream) = rows.as_mut() else {
        return Ok(None);
    };

    let fetched = tokio::select! {
        biased;
        _ = cancel.cancelled() => Fetched::Cancelled,
        _ = cancelled(extra) => Fetched::Cancelled,
        next = stream.next() => match next {
            Some(Ok(document)) => Fetched::Row(document),
            Some(Err(err)) => Fetched::Failed(err),
            None => Fetched::End,
        },
    };

    match fetched {
        Fetched::Row(document) => Ok(Some(document)),
        Fetched::End => {
            *rows = None;
            Ok(None)
        }
        Fetched::Cancelled => {
            debug!("document fetch cancelled");
            *rows = None;
            Ok(None)
        }
        Fetched::Failed(err) => {
            *rows = None;
            match policy {
                IterationErrorPolicy::Swallow => {
                    warn!(error = %err, "document fetch failed, reporting end of results");
                    Ok(None)
                }
                IterationErrorPolicy::Surface => Err(DbError::Iteration(err.to_string())),
            }
        }
    }
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}
