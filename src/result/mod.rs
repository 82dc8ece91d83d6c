pub mod cursor;
#[allow(clippy::module_inception)]
mod result;

pub use cursor::{CursorState, DocumentCursor};
pub use result::{QueryResult, Row};
