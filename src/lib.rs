// ============================================================================
// doctab: tabular cursors over JSON document query results
// ============================================================================

pub mod core;
pub mod connection;
pub mod engine;
pub mod interface;
pub mod json;
pub mod mapping;
pub mod result;

// Re-export main types for convenience
pub use crate::core::{CellValue, ColumnSchema, ColumnType, DbError, Document, JsonObject, Result};
pub use crate::connection::{
    Command, Connection, ConnectionConfig, ConnectionState, IterationErrorPolicy, Parameter,
    ParameterCollection,
};
pub use engine::{DocumentStream, QueryEngine, QueryMetaData, QueryMetrics, QueryOptions, ScanConsistency};
pub use interface::DataReader;
pub use result::{CursorState, DocumentCursor, QueryResult};
