pub mod error;
pub mod types;
pub mod value;

pub use error::{DbError, Result};
pub use types::{ColumnSchema, ColumnType, Document, JsonObject};
pub use value::CellValue;
