//! Interface definitions for the search engine connection.
//!
//! This module defines the abstract `SearchConnection` trait that models
//! depend on, allowing the OpenSearch backend to be swapped for a mock.

mod search_connection;

pub use search_connection::SearchConnection;
