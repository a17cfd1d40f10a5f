//! # Rebound Shared
//!
//! Plain data types shared by the connection layer and the model layer:
//! documents, document identifiers and the option records callers pass in.

mod document;
mod options;

pub use document::{Document, DocumentId};
pub use options::{IndexOptions, ModelDefaults, ModelOptions, RequestOptions};
