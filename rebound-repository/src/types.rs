//! Request types for document and query operations.
//!
//! Each request is a transient value assembled per call, always scoped to an
//! index and a document type. `params` carries any extra engine parameters
//! the caller supplied.

use std::collections::BTreeMap;

use serde_json::Value;

use rebound_shared::DocumentId;

/// Extra engine parameters attached to a request.
pub type RequestParams = BTreeMap<String, Value>;

/// Request to create a new document.
///
/// When `id` is `None` the engine assigns one.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    /// Target index.
    pub index: String,
    /// Target document type.
    pub doc_type: String,
    /// Caller-chosen document id.
    pub id: Option<DocumentId>,
    /// Storage-ready document body.
    pub body: Value,
    /// Extra engine parameters.
    pub params: RequestParams,
}

/// Request to partially update an existing document.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    /// Target index.
    pub index: String,
    /// Target document type.
    pub doc_type: String,
    /// Id of the document to update.
    pub id: DocumentId,
    /// Update body, normally `{"doc": {...}}`.
    pub body: Value,
    /// Extra engine parameters.
    pub params: RequestParams,
}

/// Request to delete a single document.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    /// Target index.
    pub index: String,
    /// Target document type.
    pub doc_type: String,
    /// Id of the document to delete.
    pub id: DocumentId,
    /// Extra engine parameters.
    pub params: RequestParams,
}

/// Request to delete every document matching a query.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteByQueryRequest {
    /// Target index.
    pub index: String,
    /// Target document type.
    pub doc_type: String,
    /// Query body, e.g. `{"query": {...}}`.
    pub body: Value,
    /// Extra engine parameters.
    pub params: RequestParams,
}

/// Request to search (or count) documents of one index/type.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Target index.
    pub index: String,
    /// Target document type.
    pub doc_type: String,
    /// Search body.
    pub body: Value,
    /// Extra engine parameters.
    pub params: RequestParams,
}
