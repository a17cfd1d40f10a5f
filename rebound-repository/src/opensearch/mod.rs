//! OpenSearch implementation of the search connection.
//!
//! This module provides a concrete implementation of `SearchConnection`
//! using OpenSearch as the backend.

mod client;
mod paths;

pub use client::OpenSearchConnection;
