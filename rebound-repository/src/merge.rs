//! Assembly of requests from model scope, operation input and caller options.
//!
//! Precedence, per operation:
//!
//! | Operation          | Base                                   | Caller options applied |
//! |--------------------|----------------------------------------|------------------------|
//! | create             | `{index, type, id: opt.id}` + `{body}` | `id` only              |
//! | update             | `{index, type, id, body: {doc}}`       | all                    |
//! | delete             | `{index, type, id}`                    | all but `body`         |
//! | delete by query    | `{index, type, body}`                  | all but `id`           |
//! | search / count     | `{index, type, body}`                  | all but `id`           |
//!
//! Caller `index`, `type` and `id` replace the base values. A caller `body`
//! that is an object overlays the base body one level deep (caller keys win);
//! any other caller `body` replaces it. Remaining caller keys become `params`.

use serde_json::{json, Value};

use rebound_shared::{Document, DocumentId, RequestOptions};

use crate::types::{
    CreateRequest, DeleteByQueryRequest, DeleteRequest, RequestParams, SearchRequest,
    UpdateRequest,
};

/// Overlay a caller body onto a base body.
pub fn merge_body(base: Value, overlay: Option<Value>) -> Value {
    match (base, overlay) {
        (base, None) => base,
        (Value::Object(mut base), Some(Value::Object(overlay))) => {
            for (key, value) in overlay {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, Some(overlay)) => overlay,
    }
}

/// Model scope plus caller options, resolved field by field.
struct Resolved {
    index: String,
    doc_type: String,
    id: Option<DocumentId>,
    body: Option<Value>,
    params: RequestParams,
}

fn resolve(index: &str, doc_type: &str, opts: RequestOptions) -> Resolved {
    Resolved {
        index: opts.index.unwrap_or_else(|| index.to_string()),
        doc_type: opts.doc_type.unwrap_or_else(|| doc_type.to_string()),
        id: opts.id,
        body: opts.body,
        params: opts.params,
    }
}

impl CreateRequest {
    /// Assemble a create request. Only the caller's `id` is taken from
    /// `opts`; the body is always the supplied storage body.
    pub fn assemble(index: &str, doc_type: &str, body: Document, opts: &RequestOptions) -> Self {
        Self {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            id: opts.id.clone(),
            body: Value::Object(body),
            params: RequestParams::new(),
        }
    }
}

impl UpdateRequest {
    /// Assemble a partial update of `id` with `doc`, caller options winning.
    pub fn assemble(
        index: &str,
        doc_type: &str,
        id: DocumentId,
        doc: Document,
        opts: RequestOptions,
    ) -> Self {
        let resolved = resolve(index, doc_type, opts);
        Self {
            index: resolved.index,
            doc_type: resolved.doc_type,
            id: resolved.id.unwrap_or(id),
            body: merge_body(json!({ "doc": doc }), resolved.body),
            params: resolved.params,
        }
    }
}

impl DeleteRequest {
    /// Assemble a delete of `id`, caller options winning.
    pub fn assemble(index: &str, doc_type: &str, id: DocumentId, opts: RequestOptions) -> Self {
        let resolved = resolve(index, doc_type, opts);
        Self {
            index: resolved.index,
            doc_type: resolved.doc_type,
            id: resolved.id.unwrap_or(id),
            params: resolved.params,
        }
    }
}

impl DeleteByQueryRequest {
    /// Assemble a delete-by-query with `body`, caller options winning.
    pub fn assemble(index: &str, doc_type: &str, body: Value, opts: RequestOptions) -> Self {
        let resolved = resolve(index, doc_type, opts);
        Self {
            index: resolved.index,
            doc_type: resolved.doc_type,
            body: merge_body(body, resolved.body),
            params: resolved.params,
        }
    }
}

impl SearchRequest {
    /// Assemble a search with `body`, caller options winning.
    pub fn assemble(index: &str, doc_type: &str, body: Value, opts: RequestOptions) -> Self {
        let resolved = resolve(index, doc_type, opts);
        Self {
            index: resolved.index,
            doc_type: resolved.doc_type,
            body: merge_body(body, resolved.body),
            params: resolved.params,
        }
    }
}
