//! # Rebound Repository
//!
//! This crate provides the connection layer models delegate to. It includes
//! the error type for delegated calls, the `SearchConnection` interface, the
//! request types and their option-merge rules, and a concrete implementation
//! for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod merge;
pub mod opensearch;
pub mod types;

pub use config::ConnectionConfig;
pub use errors::SearchError;
pub use interfaces::SearchConnection;
pub use opensearch::OpenSearchConnection;
pub use types::{
    CreateRequest, DeleteByQueryRequest, DeleteRequest, RequestParams, SearchRequest,
    UpdateRequest,
};
