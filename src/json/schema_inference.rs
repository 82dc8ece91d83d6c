//! Column discovery
//!
//! Result streams carry no schema, so the column set is taken from the first
//! document and assumed for the rest of the stream. Later documents are not
//! re-validated.

use crate::core::{ColumnSchema, Document};

/// Derive the column schema from the first document of a result stream.
///
/// Column order follows the field order of the document. Non-object
/// documents (raw scalar projections) and an absent document yield an empty
/// schema.
pub fn infer_schema(first: Option<&Document>) -> ColumnSchema {
    match first.and_then(Document::as_object) {
        Some(obj) => ColumnSchema::new(obj.keys().cloned().collect()),
        None => ColumnSchema::empty(),
    }
}
