//! Search connection trait definition.
//!
//! This module defines the abstract interface a model uses to reach the
//! search engine: index administration plus type-scoped document operations.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::types::{
    CreateRequest, DeleteByQueryRequest, DeleteRequest, SearchRequest, UpdateRequest,
};

/// Abstract interface for search engine operations.
///
/// Document operations return the engine's response body unchanged; callers
/// above this layer do not interpret it.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so one connection can be shared
/// by many models across async tasks.
#[async_trait]
pub trait SearchConnection: Send + Sync {
    /// Check whether `index` exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The index exists
    /// * `Ok(false)` - The engine reported it missing
    /// * `Err(SearchError)` - The check itself failed
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// Create `index` with engine-default settings.
    async fn create_index(&self, index: &str) -> Result<Value, SearchError>;

    /// Apply `mapping` to the given index and document type.
    async fn put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mapping: &Value,
    ) -> Result<Value, SearchError>;

    /// Fetch a single named setting of `index`.
    async fn get_settings(&self, index: &str, name: &str) -> Result<Value, SearchError>;

    /// Create a document, at `request.id` or at an engine-assigned id.
    async fn create(&self, request: &CreateRequest) -> Result<Value, SearchError>;

    /// Partially update an existing document.
    async fn update(&self, request: &UpdateRequest) -> Result<Value, SearchError>;

    /// Delete a document by id.
    async fn delete(&self, request: &DeleteRequest) -> Result<Value, SearchError>;

    /// Delete every document matching the request's query body.
    async fn delete_by_query(&self, request: &DeleteByQueryRequest) -> Result<Value, SearchError>;

    /// Run a search.
    async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError>;

    /// Count documents matching the request's query body.
    async fn count(&self, request: &SearchRequest) -> Result<Value, SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the cluster status is green or yellow
    /// * `Ok(false)` - If the cluster status is red
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
