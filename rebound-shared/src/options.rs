//! Option records supplied by callers when binding models and issuing requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::DocumentId;

/// Shared fallback values for every model bound through the same setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefaults {
    /// Index used when a model does not name one.
    pub index: Option<String>,
    /// Document type used when a model does not name one.
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
}

impl ModelDefaults {
    /// Create defaults for the given index and type.
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
            doc_type: Some(doc_type.into()),
        }
    }
}

/// Per-model overrides of [`ModelDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Overrides the default index.
    pub index: Option<String>,
    /// Overrides the default document type.
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
}

impl ModelOptions {
    /// Options with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the index.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Override the document type.
    pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }
}

/// Index-level options declared by a schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Whether the engine may infer mappings for unseen fields.
    pub dynamic: Option<bool>,
}

impl IndexOptions {
    /// True unless the options explicitly allow dynamic mapping.
    pub fn is_strict(&self) -> bool {
        !self.dynamic.unwrap_or(false)
    }
}

/// Caller-supplied options merged into a single document request.
///
/// The structural fields replace the model's values on conflict; everything
/// else lands in `params` and travels with the request as engine parameters
/// (`refresh`, `routing`, `timeout`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Target index override.
    pub index: Option<String>,
    /// Target document type override.
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    /// Document id. On create this selects the id instead of letting the
    /// engine assign one.
    pub id: Option<DocumentId>,
    /// Request body override.
    pub body: Option<Value>,
    /// Additional engine parameters.
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

impl RequestOptions {
    /// Options with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target index.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the target document type.
    pub fn with_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Set the document id.
    pub fn with_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the body override.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add an engine parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_options_builder() {
        let opts = RequestOptions::new()
            .with_id(7u64)
            .with_param("refresh", "wait_for");

        assert_eq!(opts.id, Some(DocumentId::from("7")));
        assert_eq!(opts.params.get("refresh"), Some(&json!("wait_for")));
        assert!(opts.index.is_none());
    }

    #[test]
    fn test_request_options_from_json_collects_params() {
        let opts: RequestOptions = serde_json::from_value(json!({
            "type": "post",
            "id": "a1",
            "refresh": true,
            "routing": "user-1"
        }))
        .unwrap();

        assert_eq!(opts.doc_type.as_deref(), Some("post"));
        assert_eq!(opts.id, Some(DocumentId::from("a1")));
        assert_eq!(opts.params.len(), 2);
        assert_eq!(opts.params["refresh"], json!(true));
    }

    #[test]
    fn test_request_options_accepts_numeric_id() {
        let opts: RequestOptions =
            serde_json::from_value(json!({"id": 5, "refresh": "wait_for"})).unwrap();

        assert_eq!(opts.id, Some(DocumentId::from("5")));
        assert_eq!(opts.params.len(), 1);
    }

    #[test]
    fn test_index_options_strictness() {
        assert!(IndexOptions { dynamic: Some(false) }.is_strict());
        assert!(IndexOptions { dynamic: None }.is_strict());
        assert!(!IndexOptions { dynamic: Some(true) }.is_strict());
    }
}
