use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection error: {0}")]
    ConnectionState(String),

    #[error("No parameter found with name '{0}'")]
    ParameterNotFound(String),

    #[error("Parameter index {0} out of range (count {1})")]
    ParameterIndexOutOfRange(usize, usize),

    #[error("Column index {0} out of range (count {1})")]
    ColumnOutOfRange(usize, usize),

    #[error("Field '{0}' not found in current document")]
    FieldNotFound(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("No current row")]
    NoCurrentRow,

    #[error("Cursor is closed")]
    CursorClosed,

    #[error("Query error: {0}")]
    Query(String),

    #[error("Iteration failed: {0}")]
    Iteration(String),

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl<T> From<std::sync::PoisonError<T>> for DbError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Mapping(err.to_string())
    }
}
