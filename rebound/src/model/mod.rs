//! Document model bound to one index/type pair.
//!
//! A model validates and transforms documents through its schema before
//! creating them, and delegates every write to the shared connection. Binding
//! a model kicks off a background reconciliation of the remote index and
//! mapping; its outcome is observable but never blocks or fails the binding.

mod callback;
mod reconcile;

pub use reconcile::ReconcileStatus;

pub(crate) use callback::dispatch;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use rebound_repository::{
    CreateRequest, DeleteByQueryRequest, DeleteRequest, SearchConnection, UpdateRequest,
};
use rebound_shared::{Document, DocumentId, ModelDefaults, ModelOptions, RequestOptions};

use crate::errors::ModelError;
use crate::model::reconcile::Reconciler;
use crate::query::{Query, QueryBuilder};
use crate::schema::Schema;
use crate::search::SearchBuilder;

/// Binding between a document schema and a remote index/type.
///
/// Cloning is cheap: clones share the connection, the schema and the
/// reconciliation status.
///
/// # Example
///
/// ```ignore
/// let defaults = ModelDefaults::new("blog", "_doc");
/// let posts = Model::new(connection, &defaults, ModelOptions::new().with_type("post"), schema);
///
/// let reply = posts
///     .create(doc, RequestOptions::new().with_id("hello-world"))
///     .await?;
/// ```
#[derive(Clone)]
pub struct Model {
    index: String,
    doc_type: String,
    connection: Arc<dyn SearchConnection>,
    schema: Arc<dyn Schema>,
    status: watch::Receiver<ReconcileStatus>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("index", &self.index)
            .field("doc_type", &self.doc_type)
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Bind a model and start reconciling its index and mapping.
    ///
    /// `opts` overrides `defaults` field by field; empty strings count as
    /// unset. Reconciliation runs on the ambient Tokio runtime and its
    /// failures are only logged and reported through
    /// [`reconcile_status`](Self::reconcile_status). Without a runtime it is
    /// skipped and the status becomes [`ReconcileStatus::Failed`].
    pub fn new(
        connection: Arc<dyn SearchConnection>,
        defaults: &ModelDefaults,
        opts: ModelOptions,
        schema: Arc<dyn Schema>,
    ) -> Self {
        let index = resolve_scope("index", opts.index, &defaults.index);
        let doc_type = resolve_scope("type", opts.doc_type, &defaults.doc_type);

        let (status_tx, status_rx) = watch::channel(ReconcileStatus::Pending);
        let reconciler = Reconciler {
            connection: connection.clone(),
            index: index.clone(),
            doc_type: doc_type.clone(),
            mapping: schema.index_mapping(),
            options: schema.index_options(),
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let status = reconciler.run().await;
                    status_tx.send_replace(status);
                });
            }
            Err(_) => {
                warn!(index = %index, doc_type = %doc_type, "No async runtime, skipping index reconciliation");
                status_tx.send_replace(ReconcileStatus::Failed("no async runtime".to_string()));
            }
        }

        Self {
            index,
            doc_type,
            connection,
            schema,
            status: status_rx,
        }
    }

    /// Index this model is bound to.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Document type this model is bound to.
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// Latest reconciliation status.
    pub fn reconcile_status(&self) -> ReconcileStatus {
        self.status.borrow().clone()
    }

    /// Wait until reconciliation has finished and return its outcome.
    pub async fn reconciled(&self) -> ReconcileStatus {
        let mut status = self.status.clone();
        status
            .wait_for(ReconcileStatus::is_terminal)
            .await
            .map(|current| current.clone())
            .unwrap_or_else(|_| {
                ReconcileStatus::Failed("reconciliation ended without a result".to_string())
            })
    }

    /// Validate, transform and create a document.
    ///
    /// Set `opts.id` to choose the document id; otherwise the engine assigns
    /// one. Only `opts.id` is read. A document the schema rejects resolves to
    /// [`ModelError::Validation`] without reaching the connection.
    #[instrument(skip(self, doc, opts), fields(index = %self.index, doc_type = %self.doc_type))]
    pub async fn create(&self, doc: Document, opts: RequestOptions) -> Result<Value, ModelError> {
        self.validate(&doc)?;
        self.store(doc, opts).await
    }

    /// Callback form of [`create`](Self::create).
    ///
    /// A validation failure invokes `callback` before this method returns.
    pub fn create_with<C>(&self, doc: Document, opts: RequestOptions, callback: C)
    where
        C: FnOnce(Result<Value, ModelError>) + Send + 'static,
    {
        if let Err(e) = self.validate(&doc) {
            callback(Err(e));
            return;
        }

        let model = self.clone();
        dispatch("create", async move { model.store(doc, opts).await }, callback);
    }

    /// Partially update document `id` with `doc`.
    ///
    /// `doc` is sent as-is under `body.doc`; the schema is not consulted.
    /// Caller options replace same-named request fields.
    #[instrument(skip(self, id, doc, opts), fields(index = %self.index, doc_type = %self.doc_type))]
    pub async fn update(
        &self,
        id: impl Into<DocumentId>,
        doc: Document,
        opts: RequestOptions,
    ) -> Result<Value, ModelError> {
        let request = UpdateRequest::assemble(&self.index, &self.doc_type, id.into(), doc, opts);
        Ok(self.connection.update(&request).await?)
    }

    /// Callback form of [`update`](Self::update).
    pub fn update_with<C>(
        &self,
        id: impl Into<DocumentId>,
        doc: Document,
        opts: RequestOptions,
        callback: C,
    ) where
        C: FnOnce(Result<Value, ModelError>) + Send + 'static,
    {
        let model = self.clone();
        let id = id.into();
        dispatch(
            "update",
            async move { model.update(id, doc, opts).await },
            callback,
        );
    }

    /// Delete document `id`.
    #[instrument(skip(self, id, opts), fields(index = %self.index, doc_type = %self.doc_type))]
    pub async fn delete(
        &self,
        id: impl Into<DocumentId>,
        opts: RequestOptions,
    ) -> Result<Value, ModelError> {
        let request = DeleteRequest::assemble(&self.index, &self.doc_type, id.into(), opts);
        Ok(self.connection.delete(&request).await?)
    }

    /// Callback form of [`delete`](Self::delete).
    pub fn delete_with<C>(&self, id: impl Into<DocumentId>, opts: RequestOptions, callback: C)
    where
        C: FnOnce(Result<Value, ModelError>) + Send + 'static,
    {
        let model = self.clone();
        let id = id.into();
        dispatch("delete", async move { model.delete(id, opts).await }, callback);
    }

    /// Delete every document of this index/type matching `body`.
    #[instrument(skip(self, body, opts), fields(index = %self.index, doc_type = %self.doc_type))]
    pub async fn delete_by_query(
        &self,
        body: Value,
        opts: RequestOptions,
    ) -> Result<Value, ModelError> {
        let request = DeleteByQueryRequest::assemble(&self.index, &self.doc_type, body, opts);
        Ok(self.connection.delete_by_query(&request).await?)
    }

    /// Callback form of [`delete_by_query`](Self::delete_by_query).
    pub fn delete_by_query_with<C>(&self, body: Value, opts: RequestOptions, callback: C)
    where
        C: FnOnce(Result<Value, ModelError>) + Send + 'static,
    {
        let model = self.clone();
        dispatch(
            "delete_by_query",
            async move { model.delete_by_query(body, opts).await },
            callback,
        );
    }

    /// Start a query scoped to this model.
    pub fn query(&self, query: impl Into<Query>) -> QueryBuilder {
        QueryBuilder::new(self.clone(), query.into())
    }

    /// Start a search scoped to this model.
    pub fn search(&self) -> SearchBuilder {
        SearchBuilder::new(self.clone())
    }

    pub(crate) fn connection(&self) -> &Arc<dyn SearchConnection> {
        &self.connection
    }

    fn validate(&self, doc: &Document) -> Result<(), ModelError> {
        let messages = self.schema.validate(doc);
        if messages.is_empty() {
            return Ok(());
        }

        debug!(count = messages.len(), "Document rejected by schema");
        Err(ModelError::validation(messages))
    }

    async fn store(&self, doc: Document, opts: RequestOptions) -> Result<Value, ModelError> {
        let body = self.schema.apply(&doc);
        let request = CreateRequest::assemble(&self.index, &self.doc_type, body, &opts);
        Ok(self.connection.create(&request).await?)
    }
}

/// Pick the override, else the default, treating empty strings as unset.
fn resolve_scope(field: &'static str, value: Option<String>, fallback: &Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .or_else(|| fallback.clone().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| {
            warn!(field, "Model scope has no value, requests will be rejected");
            String::new()
        })
}
