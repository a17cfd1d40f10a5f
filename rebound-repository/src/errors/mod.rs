//! Error types for the connection layer.

mod search_error;

pub use search_error::SearchError;
