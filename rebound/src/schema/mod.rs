//! Schema capability bound to a model.
//!
//! A schema supplies the mapping a model reconciles against the engine, the
//! index-level options, document validation, and the transformation that
//! turns a caller document into its storage body.

mod field_schema;

pub use field_schema::{Field, FieldKind, FieldSchema};

use serde_json::Value;

use rebound_shared::{Document, IndexOptions};

/// Validation, transformation and mapping for one kind of document.
///
/// Implementations are shared read-only across models and tasks.
pub trait Schema: Send + Sync {
    /// Mapping descriptor applied to the model's index/type.
    fn index_mapping(&self) -> Value;

    /// Index-level options, if the schema declares any.
    fn index_options(&self) -> Option<IndexOptions>;

    /// Validate `doc`. An empty result means the document is valid.
    fn validate(&self, doc: &Document) -> Vec<String>;

    /// Transform a valid document into its storage body.
    fn apply(&self, doc: &Document) -> Document;
}
