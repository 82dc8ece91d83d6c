//! Statements bound to a connection and executed in one of three modes:
//! as a cursor, as a single scalar, or for a mutation count.

use futures::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;

use super::parameter::{Parameter, ParameterCollection};
use super::{Connection, ConnectionState};
use crate::core::{CellValue, DbError, Document, Result};
use crate::engine::QueryOptions;
use crate::json::JsonToValueConverter;
use crate::mapping;
use crate::result::DocumentCursor;

#[derive(Debug, Clone, Default)]
pub struct Command {
    connection: Option<Connection>,
    text: String,
    parameters: ParameterCollection,
}

impl Command {
    /// A command not yet attached to a connection.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            connection: None,
            text: text.into(),
            parameters: ParameterCollection::new(),
        }
    }

    pub(crate) fn with_connection(connection: Connection, text: impl Into<String>) -> Self {
        Self {
            connection: Some(connection),
            ..Self::new(text)
        }
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn set_connection(&mut self, connection: Connection) {
        self.connection = Some(connection);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn parameters(&self) -> &ParameterCollection {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterCollection {
        &mut self.parameters
    }

    /// Append a named parameter.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.parameters.add(Parameter::new(name, value));
        self
    }

    /// Append every top-level field of `args` as a named parameter.
    pub fn bind_all<T: Serialize + ?Sized>(mut self, args: &T) -> Result<Self> {
        for parameter in ParameterCollection::from_serializable(args)?.iter() {
            self.parameters.add(parameter.clone());
        }
        Ok(self)
    }

    /// Run the statement and wrap its rows in a cursor.
    pub async fn execute_reader(&self) -> Result<DocumentCursor> {
        self.execute_reader_with(CancellationToken::new()).await
    }

    /// Like [`execute_reader`](Self::execute_reader), with a token that ends
    /// iteration when cancelled.
    pub async fn execute_reader_with(&self, cancel: CancellationToken) -> Result<DocumentCursor> {
        let connection = self.open_connection()?;
        let rows = connection
            .submit_query(&self.text, self.options(connection))
            .await?;
        DocumentCursor::open(rows, connection.config(), cancel).await
    }

    /// Run the statement and return the first value of the first row.
    ///
    /// A bare scalar row (`SELECT RAW`/`SELECT VALUE`) is returned as is. For
    /// an object row the value of the alphabetically first field name is
    /// returned, since JSON objects carry no usable column order. Returns
    /// `None` when there are no rows or the first row is an empty object.
    ///
    /// A failure fetching the first document is always returned, whatever
    /// the connection's [`IterationErrorPolicy`](super::IterationErrorPolicy).
    pub async fn execute_scalar(&self) -> Result<Option<CellValue>> {
        let connection = self.open_connection()?;
        let mut rows = connection
            .submit_query(&self.text, self.options(connection))
            .await?;

        let first = rows.next().await.transpose()?;
        drop(rows);

        let converter = JsonToValueConverter::new(connection.config().coercion());
        match first {
            Some(document) => scalar_value(&document, &converter),
            None => Ok(None),
        }
    }

    /// Run the statement and return the number of documents it mutated.
    pub async fn execute_non_query(&self) -> Result<u32> {
        let connection = self.open_connection()?;
        let meta = connection
            .submit_execute(&self.text, self.options(connection))
            .await?;
        Ok(meta.metrics.mutation_count)
    }

    /// Run the statement and decode every row into `T`.
    pub async fn query_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let mut cursor = self.execute_reader().await?;
        mapping::read_all(&mut cursor).await
    }

    fn open_connection(&self) -> Result<&Connection> {
        match &self.connection {
            Some(connection) if connection.state() == ConnectionState::Open => Ok(connection),
            _ => Err(DbError::ConnectionState("The connection is not open".into())),
        }
    }

    fn options(&self, connection: &Connection) -> QueryOptions {
        let mut options = connection.config().query_options();
        options.named_parameters = self.parameters.to_named_arguments();
        options
    }
}

fn scalar_value(document: &Document, converter: &JsonToValueConverter) -> Result<Option<CellValue>> {
    match document {
        JsonValue::Object(fields) => match fields.keys().min() {
            Some(name) => converter.convert(&fields[name]).map(Some),
            None => Ok(None),
        },
        raw => converter.convert(raw).map(Some),
    }
}
