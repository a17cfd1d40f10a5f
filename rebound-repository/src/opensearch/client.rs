//! OpenSearch connection implementation.
//!
//! This module provides the concrete implementation of `SearchConnection`
//! using the OpenSearch Rust client. Index-level administration goes through
//! the typed `indices()` API; type-scoped document and mapping calls go
//! through the client's generic `send` with typed REST paths.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::{
        headers::HeaderMap,
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesGetSettingsParts},
    OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::ConnectionConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchConnection;
use crate::opensearch::paths::{endpoint, query_pairs};
use crate::types::{
    CreateRequest, DeleteByQueryRequest, DeleteRequest, RequestParams, SearchRequest,
    UpdateRequest,
};

/// OpenSearch-backed connection shared by models.
///
/// Document, mapping and query calls use typed REST paths
/// (`/{index}/{type}/...`, `/{index}/_mapping/{type}`), so the target engine
/// must still serve mapping types, as Elasticsearch 6.x does. Elasticsearch
/// 7.x and OpenSearch 1.x reject the typed mapping path without
/// `include_type_name=true`, and OpenSearch 2.x has no typed endpoints; against
/// those clusters mapping reconciliation reports a failure.
///
/// # Example
///
/// ```ignore
/// use rebound_repository::{ConnectionConfig, OpenSearchConnection};
///
/// let connection = OpenSearchConnection::new(&ConnectionConfig::new("http://localhost:9200"))?;
/// let healthy = connection.health_check().await?;
/// ```
pub struct OpenSearchConnection {
    client: OpenSearch,
    timeout: Option<Duration>,
}

impl OpenSearchConnection {
    /// Create a new connection to the configured URL.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchConnection)` - A new connection instance
    /// * `Err(SearchError)` - If the URL is invalid or the transport cannot be built
    pub fn new(config: &ConnectionConfig) -> Result<Self, SearchError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(url = %config.url, timeout = ?config.timeout, "Created OpenSearch connection");

        Ok(Self {
            client: OpenSearch::new(transport),
            timeout: config.timeout,
        })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: OpenSearch) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Send a JSON request to `path` and read the JSON reply.
    async fn send_json(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        params: &RequestParams,
        body: Option<&Value>,
    ) -> Result<Value, SearchError> {
        let pairs = query_pairs(params);
        let query = if pairs.is_empty() { None } else { Some(&pairs) };
        let body = body.map(|body| JsonBody::new(body.clone()));

        let response = self
            .client
            .send(method, path, HeaderMap::new(), query, body, self.timeout)
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Self::read_json(operation, response).await
    }

    /// Turn a reply into its JSON body, or into a `RequestError` when the
    /// status is not a success.
    async fn read_json(operation: &'static str, response: Response) -> Result<Value, SearchError> {
        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(operation, status = %status, body = %error_body, "Request failed");
            return Err(SearchError::request(operation, status.as_u16(), error_body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }
}

#[async_trait]
impl SearchConnection for OpenSearchConnection {
    #[instrument(skip(self))]
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        match status.as_u16() {
            404 => Ok(false),
            _ if status.is_success() => Ok(true),
            code => Err(SearchError::request("index_exists", code, String::new())),
        }
    }

    #[instrument(skip(self))]
    async fn create_index(&self, index: &str) -> Result<Value, SearchError> {
        if index.is_empty() {
            return Err(SearchError::invalid_request("index name is empty"));
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let reply = Self::read_json("create_index", response).await?;
        debug!(index, "Index created");
        Ok(reply)
    }

    #[instrument(skip(self, mapping))]
    async fn put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mapping: &Value,
    ) -> Result<Value, SearchError> {
        let path = endpoint(&[index, "_mapping", doc_type])?;
        self.send_json(
            "put_mapping",
            Method::Put,
            &path,
            &RequestParams::new(),
            Some(mapping),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_settings(&self, index: &str, name: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .indices()
            .get_settings(IndicesGetSettingsParts::IndexName(&[index], &[name]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Self::read_json("get_settings", response).await
    }

    #[instrument(skip(self, request), fields(index = %request.index, doc_type = %request.doc_type))]
    async fn create(&self, request: &CreateRequest) -> Result<Value, SearchError> {
        let (method, path) = match &request.id {
            Some(id) => (
                Method::Put,
                endpoint(&[&request.index, &request.doc_type, id.as_str(), "_create"])?,
            ),
            None => (
                Method::Post,
                endpoint(&[&request.index, &request.doc_type])?,
            ),
        };

        let reply = self
            .send_json("create", method, &path, &request.params, Some(&request.body))
            .await?;
        debug!(id = ?reply.get("_id"), "Document created");
        Ok(reply)
    }

    #[instrument(skip(self, request), fields(index = %request.index, doc_type = %request.doc_type, id = %request.id))]
    async fn update(&self, request: &UpdateRequest) -> Result<Value, SearchError> {
        let path = endpoint(&[
            &request.index,
            &request.doc_type,
            request.id.as_str(),
            "_update",
        ])?;
        self.send_json("update", Method::Post, &path, &request.params, Some(&request.body))
            .await
    }

    #[instrument(skip(self, request), fields(index = %request.index, doc_type = %request.doc_type, id = %request.id))]
    async fn delete(&self, request: &DeleteRequest) -> Result<Value, SearchError> {
        let path = endpoint(&[&request.index, &request.doc_type, request.id.as_str()])?;
        self.send_json("delete", Method::Delete, &path, &request.params, None)
            .await
    }

    #[instrument(skip(self, request), fields(index = %request.index, doc_type = %request.doc_type))]
    async fn delete_by_query(&self, request: &DeleteByQueryRequest) -> Result<Value, SearchError> {
        let path = endpoint(&[&request.index, &request.doc_type, "_delete_by_query"])?;
        self.send_json(
            "delete_by_query",
            Method::Post,
            &path,
            &request.params,
            Some(&request.body),
        )
        .await
    }

    #[instrument(skip(self, request), fields(index = %request.index, doc_type = %request.doc_type))]
    async fn search(&self, request: &SearchRequest) -> Result<Value, SearchError> {
        let path = endpoint(&[&request.index, &request.doc_type, "_search"])?;
        self.send_json("search", Method::Post, &path, &request.params, Some(&request.body))
            .await
    }

    #[instrument(skip(self, request), fields(index = %request.index, doc_type = %request.doc_type))]
    async fn count(&self, request: &SearchRequest) -> Result<Value, SearchError> {
        let path = endpoint(&[&request.index, &request.doc_type, "_count"])?;
        self.send_json("count", Method::Post, &path, &request.params, Some(&request.body))
            .await
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let body = Self::read_json("health_check", response).await?;
        let cluster_status = body
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown");

        debug!(status = cluster_status, "Cluster health");
        Ok(cluster_status == "green" || cluster_status == "yellow")
    }
}
