//! In-memory test doubles for the connection and the schema.

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use rebound_repository::{
    CreateRequest, DeleteByQueryRequest, DeleteRequest, SearchConnection, SearchError,
    SearchRequest, UpdateRequest,
};
use rebound_shared::{Document, IndexOptions};

use crate::schema::Schema;

/// Build a document from a JSON object literal.
pub(crate) fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("test documents must be objects"),
    }
}

/// A call observed by [`MockConnection`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    IndexExists(String),
    CreateIndex(String),
    PutMapping {
        index: String,
        doc_type: String,
        mapping: Value,
    },
    GetSettings {
        index: String,
        name: String,
    },
    Create(CreateRequest),
    Update(UpdateRequest),
    Delete(DeleteRequest),
    DeleteByQuery(DeleteByQueryRequest),
    Search(SearchRequest),
    Count(SearchRequest),
}

/// Mock connection recording every call.
pub(crate) struct MockConnection {
    calls: Mutex<Vec<Call>>,
    index_exists: Result<bool, SearchError>,
    admin_failure: Option<SearchError>,
    settings_failure: Option<SearchError>,
    document_failure: Option<SearchError>,
    search_reply: Value,
    count_reply: Value,
    healthy: bool,
}

impl MockConnection {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            index_exists: Ok(true),
            admin_failure: None,
            settings_failure: None,
            document_failure: None,
            search_reply: json!({"took": 1, "hits": {"total": {"value": 0}, "hits": []}}),
            count_reply: json!({"count": 0}),
            healthy: true,
        }
    }

    pub(crate) fn with_index_exists(mut self, result: Result<bool, SearchError>) -> Self {
        self.index_exists = result;
        self
    }

    /// Fail `create_index` and `put_mapping`.
    pub(crate) fn with_admin_failure(mut self, error: SearchError) -> Self {
        self.admin_failure = Some(error);
        self
    }

    pub(crate) fn with_settings_failure(mut self, error: SearchError) -> Self {
        self.settings_failure = Some(error);
        self
    }

    /// Fail every document, search and count operation.
    pub(crate) fn with_document_failure(mut self, error: SearchError) -> Self {
        self.document_failure = Some(error);
        self
    }

    pub(crate) fn with_search_reply(mut self, reply: Value) -> Self {
        self.search_reply = reply;
        self
    }

    pub(crate) fn with_count_reply(mut self, reply: Value) -> Self {
        self.count_reply = reply;
        self
    }

    pub(crate) fn with_healthy(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    pub(crate) async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn creates(&self) -> Vec<CreateRequest> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub(crate) async fn updates(&self) -> Vec<UpdateRequest> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub(crate) async fn deletes(&self) -> Vec<DeleteRequest> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub(crate) async fn deletes_by_query(&self) -> Vec<DeleteByQueryRequest> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteByQuery(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub(crate) async fn searches(&self) -> Vec<SearchRequest> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                Call::Search(request) | Call::Count(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().await.push(call);
    }

    fn document_reply(&self, reply: Value) -> Result<Value, SearchError> {
        match &self.document_failure {
            Some(error) => Err(error.clone()),
            None => Ok(reply),
        }
    }

    fn admin_reply(&self) -> Result<Value, SearchError> {
        match &self.admin_failure {
            Some(error) => Err(error.clone()),
            None => Ok(json!({"acknowledged": true})),
        }
    }
}

#[async_trait]
impl SearchConnection for MockConnection {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        self.record(Call::IndexExists(index.to_string())).await;
        self.index_exists.clone()
    }

    async fn create_index(&self, index: &str) -> Result<Value, SearchError> {
        self.record(Call::CreateIndex(index.to_string())).await;
        self.admin_reply()
    }

    async fn put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mapping: &Value,
    ) -> Result<Value, SearchError> {
        self.record(Call::PutMapping {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            mapping: mapping.clone(),
        })
        .await;
        self.admin_reply()
    }

    async fn get_settings(&self, index: &str, name: &str) -> Result<Value, SearchError> {
        self.record(Call::GetSettings {
            index: index.to_string(),
            name: name.to_string(),
        })
        .await;
        match &self.settings_failure {
            Some(error) => Err(error.clone()),
            None => Ok(json!({"settings": {}})),
        }
    }

    async fn create(&self, request: &CreateRequest) -> Result<Value, SearchError> {
        self.record(Call::Create(request.clone())).await;
        let id = request
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "generated".to_string());
        self.document_reply(json!({"_id": id, "result": "created"}))
    }

    async fn update(&self, request: &UpdateRequest) -> Result<Value, SearchError> {
        self.record(Call::Update(request.clone())).await;
        self.document_reply(json!({"_id": request.id.as_str(), "result": "updated"}))
    }

    async fn delete(&self, request: &DeleteRequest) -> Result<Value, SearchError> {
        self.record(Call::Delete(request.clone())).await;
        self.document_reply(json!({"_id": request.id.as_str(), "result": "deleted"}))
    }

    async fn delete_by_query(&self, request: &DeleteByQueryRequest) -> Result<Value, SearchError> {
        self.record(Call::DeleteByQuery(request.clone())).await;
        self.document_reply(json!({"deleted": 0}))
    }

    async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError> {
        self.record(Call::Search(request.clone())).await;
        self.document_reply(self.search_reply.clone())
    }

    async fn count(&self, request: &SearchRequest) -> Result<Value, SearchError> {
        self.record(Call::Count(request.clone())).await;
        self.document_reply(self.count_reply.clone())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(self.healthy)
    }
}

/// Schema stub with canned validation output.
pub(crate) struct StubSchema {
    pub(crate) messages: Vec<String>,
    pub(crate) mapping: Value,
}

impl StubSchema {
    /// Accepts every document.
    pub(crate) fn valid() -> Self {
        Self {
            messages: Vec::new(),
            mapping: json!({"properties": {"title": {"type": "text"}}}),
        }
    }

    /// Rejects every document with `messages`.
    pub(crate) fn rejecting(messages: &[&str]) -> Self {
        Self {
            messages: messages.iter().map(|m| m.to_string()).collect(),
            ..Self::valid()
        }
    }
}

impl Schema for StubSchema {
    fn index_mapping(&self) -> Value {
        self.mapping.clone()
    }

    fn index_options(&self) -> Option<IndexOptions> {
        None
    }

    fn validate(&self, _doc: &Document) -> Vec<String> {
        self.messages.clone()
    }

    fn apply(&self, doc: &Document) -> Document {
        let mut body = doc.clone();
        body.insert("schema_applied".to_string(), json!(true));
        body
    }
}
