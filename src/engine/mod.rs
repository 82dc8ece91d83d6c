//! Query engine seam
//!
//! The document database client is owned by the application. The adapter
//! only needs to submit statement text with named parameters and get back
//! either a lazy document stream or the mutation metrics.

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::core::{Document, Result};

/// Lazily produced query rows.
pub type DocumentStream = BoxStream<'static, Result<Document>>;

/// Consistency requirement forwarded to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanConsistency {
    #[default]
    NotBounded,
    RequestPlus,
}

/// Options sent with every submission.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Named placeholder values, in binding order. Names are passed verbatim.
    pub named_parameters: Map<String, JsonValue>,
    pub timeout: Option<Duration>,
    pub readonly: bool,
    pub scan_consistency: ScanConsistency,
    pub client_context_id: String,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self {
            named_parameters: Map::new(),
            timeout: None,
            readonly: false,
            scan_consistency: ScanConsistency::default(),
            client_context_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.named_parameters.insert(name.into(), value);
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryMetrics {
    pub mutation_count: u32,
    pub result_count: u64,
}

/// Metadata reported by the engine for a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMetaData {
    pub client_context_id: String,
    pub metrics: QueryMetrics,
}

/// A document-database client able to run SQL-like statements over JSON.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Submit a statement and return its rows as a lazy stream.
    async fn query(&self, statement: &str, options: QueryOptions) -> Result<DocumentStream>;

    /// Submit a statement for its side effects and return the metadata.
    async fn execute(&self, statement: &str, options: QueryOptions) -> Result<QueryMetaData>;
}
