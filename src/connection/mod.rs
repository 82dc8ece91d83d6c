pub mod command;
pub mod config;
pub mod parameter;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::{CellValue, Result};
use crate::engine::{DocumentStream, QueryEngine, QueryMetaData, QueryOptions};
use crate::result::DocumentCursor;
pub use command::Command;
pub use config::{ConnectionConfig, IterationErrorPolicy};
pub use parameter::{Parameter, ParameterCollection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed,
}

/// Connection handle over a query engine
///
/// The engine client is created and kept alive by the application, so the
/// handle is always open and `open`/`close` do nothing. It carries no
/// per-query state: clones are cheap and commands issued from any clone may
/// run concurrently.
///
/// # Examples
///
/// ```
/// # use std::sync::Arc;
/// # use doctab::{CellValue, Connection};
/// # use doctab::engine::memory::{ScriptedResponse, StaticQueryEngine};
/// # use serde_json::json;
/// # #[tokio::main]
/// # async fn main() -> doctab::Result<()> {
/// let engine = StaticQueryEngine::new().with_response(
///     "SELECT COUNT(*) FROM profiles",
///     ScriptedResponse::rows(vec![json!({"$1": 3})]),
/// );
/// let conn = Connection::new(Arc::new(engine));
///
/// let count = conn
///     .create_command("SELECT COUNT(*) FROM profiles")
///     .execute_scalar()
///     .await?;
/// assert_eq!(count, Some(CellValue::Integer(3)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Connection {
    engine: Arc<dyn QueryEngine>,
    config: Arc<ConnectionConfig>,
}

impl Connection {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self::with_config(engine, ConnectionConfig::default())
    }

    pub fn with_config(engine: Arc<dyn QueryEngine>, config: ConnectionConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::Open
    }

    /// No-op; the engine client is ready once constructed.
    pub fn open(&self) {}

    /// No-op; the engine client lives as long as the application.
    pub fn close(&self) {}

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn create_command(&self, text: impl Into<String>) -> Command {
        Command::with_connection(self.clone(), text)
    }

    /// Run a statement with parameters taken from the fields of `params`
    /// and return a cursor over its rows. Pass `&()` for no parameters.
    pub async fn query<P: Serialize + ?Sized>(&self, statement: &str, params: &P) -> Result<DocumentCursor> {
        self.create_command(statement)
            .bind_all(params)?
            .execute_reader()
            .await
    }

    /// Run a statement and decode every row into `T`.
    pub async fn query_as<T, P>(&self, statement: &str, params: &P) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.create_command(statement)
            .bind_all(params)?
            .query_as()
            .await
    }

    pub async fn execute_scalar<P: Serialize + ?Sized>(&self, statement: &str, params: &P) -> Result<Option<CellValue>> {
        self.create_command(statement)
            .bind_all(params)?
            .execute_scalar()
            .await
    }

    /// Run a mutating statement and return the mutation count.
    pub async fn execute<P: Serialize + ?Sized>(&self, statement: &str, params: &P) -> Result<u32> {
        self.create_command(statement)
            .bind_all(params)?
            .execute_non_query()
            .await
    }

    pub(crate) async fn submit_query(&self, statement: &str, options: QueryOptions) -> Result<DocumentStream> {
        debug!(
            statement,
            parameters = options.named_parameters.len(),
            client_context_id = %options.client_context_id,
            "submitting query"
        );
        self.engine.query(statement, options).await
    }

    pub(crate) async fn submit_execute(&self, statement: &str, options: QueryOptions) -> Result<QueryMetaData> {
        debug!(
            statement,
            parameters = options.named_parameters.len(),
            client_context_id = %options.client_context_id,
            "submitting statement"
        );
        let meta = self.engine.execute(statement, options).await?;
        debug!(
            client_context_id = %meta.client_context_id,
            mutations = meta.metrics.mutation_count,
            "statement completed"
        );
        Ok(meta)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
