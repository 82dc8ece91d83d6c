//! In-memory query engine
//!
//! Answers statements from scripted responses and records every submission.
//! Useful for exercising code built on the adapter without a running
//! document database.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use futures::{StreamExt, future, stream};

use super::{DocumentStream, QueryEngine, QueryMetaData, QueryMetrics, QueryOptions};
use crate::core::{DbError, Document, Result};

/// One scripted step of a result stream.
#[derive(Debug, Clone)]
pub enum ScriptedRow {
    Document(Document),
    /// Fails the fetch of this row.
    Error(String),
    /// Never resolves.
    Stall,
}

/// Canned answer for one statement.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponse {
    rows: Vec<ScriptedRow>,
    mutation_count: u32,
}

impl ScriptedResponse {
    pub fn rows(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            rows: documents.into_iter().map(ScriptedRow::Document).collect(),
            mutation_count: 0,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn mutations(count: u32) -> Self {
        Self {
            rows: Vec::new(),
            mutation_count: count,
        }
    }

    pub fn then_row(mut self, document: Document) -> Self {
        self.rows.push(ScriptedRow::Document(document));
        self
    }

    pub fn then_error(mut self, message: impl Into<String>) -> Self {
        self.rows.push(ScriptedRow::Error(message.into()));
        self
    }

    pub fn then_stall(mut self) -> Self {
        self.rows.push(ScriptedRow::Stall);
        self
    }

    fn document_count(&self) -> u64 {
        self.rows
            .iter()
            .filter(|row| matches!(row, ScriptedRow::Document(_)))
            .count() as u64
    }
}

/// A statement as the engine received it.
#[derive(Debug, Clone)]
pub struct Submission {
    pub statement: String,
    pub options: QueryOptions,
}

#[derive(Debug, Default)]
pub struct StaticQueryEngine {
    responses: RwLock<HashMap<String, ScriptedResponse>>,
    submissions: Mutex<Vec<Submission>>,
}

impl StaticQueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`respond`](Self::respond).
    ///
    /// Takes the engine by value, so a poisoned response map is recovered
    /// instead of the response being dropped.
    pub fn with_response(mut self, statement: impl Into<String>, response: ScriptedResponse) -> Self {
        self.responses
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(statement.into(), response);
        self.responses.clear_poison();
        self
    }

    pub fn respond(&self, statement: impl Into<String>, response: ScriptedResponse) -> Result<()> {
        self.responses.write()?.insert(statement.into(), response);
        Ok(())
    }

    /// Everything submitted so far, oldest first.
    pub fn submissions(&self) -> Result<Vec<Submission>> {
        Ok(self.submissions.lock()?.clone())
    }

    fn answer(&self, statement: &str, options: QueryOptions) -> Result<ScriptedResponse> {
        self.submissions.lock()?.push(Submission {
            statement: statement.to_string(),
            options,
        });

        self.responses
            .read()?
            .get(statement)
            .cloned()
            .ok_or_else(|| DbError::Query(format!("No response scripted for '{}'", statement)))
    }
}

#[async_trait]
impl QueryEngine for StaticQueryEngine {
    async fn query(&self, statement: &str, options: QueryOptions) -> Result<DocumentStream> {
        let response = self.answer(statement, options)?;

        let rows = stream::iter(response.rows).then(|row| async move {
            match row {
                ScriptedRow::Document(doc) => Ok(doc),
                ScriptedRow::Error(message) => Err(DbError::Query(message)),
                ScriptedRow::Stall => future::pending::<Result<Document>>().await,
            }
        });

        Ok(rows.boxed())
    }

    async fn execute(&self, statement: &str, options: QueryOptions) -> Result<QueryMetaData> {
        let client_context_id = options.client_context_id.clone();
        let response = self.answer(statement, options)?;

        Ok(QueryMetaData {
            client_context_id,
            metrics: QueryMetrics {
                mutation_count: response.mutation_count,
                result_count: response.document_count(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_rows() {
        let engine = StaticQueryEngine::new()
            .with_response("SELECT 1", ScriptedResponse::rows(vec![json!({"a": 1}), json!({"a": 2})]));

        let rows: Vec<Document> = engine
            .query("SELECT 1", QueryOptions::new())
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(rows, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[tokio::test]
    async fn test_scripted_error_row() {
        let engine = StaticQueryEngine::new().with_response(
            "SELECT 1",
            ScriptedResponse::rows(vec![json!({"a": 1})]).then_error("boom"),
        );

        let mut rows = engine.query("SELECT 1", QueryOptions::new()).await.unwrap();
        assert!(rows.next().await.unwrap().is_ok());
        assert!(matches!(rows.next().await, Some(Err(DbError::Query(_)))));
        assert!(rows.next().await.is_none());
    }

    #[tokio::test]
    async fn test_with_response_recovers_poisoned_map() {
        let engine = StaticQueryEngine::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = engine.responses.write().unwrap();
            panic!("writer died");
        }));
        assert!(matches!(
            engine.respond("SELECT 1", ScriptedResponse::empty()),
            Err(DbError::LockError(_))
        ));

        let engine = engine.with_response("SELECT 1", ScriptedResponse::rows(vec![json!(1)]));
        let rows: Vec<Document> = engine
            .query("SELECT 1", QueryOptions::new())
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(rows, vec![json!(1)]);
    }

    #[tokio::test]
    async fn test_unknown_statement() {
        let engine = StaticQueryEngine::new();
        let result = engine.execute("DELETE FROM x", QueryOptions::new()).await;
        assert!(matches!(result, Err(DbError::Query(_))));
        assert_eq!(engine.submissions().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_reports_mutations() {
        let engine = StaticQueryEngine::new().with_response("UPSERT", ScriptedResponse::mutations(3));
        let options = QueryOptions::new().parameter("key", json!("k1"));
        let meta = engine.execute("UPSERT", options.clone()).await.unwrap();

        assert_eq!(meta.metrics.mutation_count, 3);
        assert_eq!(meta.client_context_id, options.client_context_id);

        let submissions = engine.submissions().unwrap();
        assert_eq!(submissions[0].options.named_parameters["key"], "k1");
    }
}
