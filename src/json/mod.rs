//! JSON coercion module
//!
//! Maps schema-less JSON documents onto the tabular model.
//!
//! # Architecture
//!
//! - `converter.rs` - value classification and coercion
//! - `schema_inference.rs` - column discovery from the first document

mod converter;
mod schema_inference;

pub use converter::{CoercionOptions, JsonToValueConverter, lookup_field};
pub use schema_inference::infer_schema;
