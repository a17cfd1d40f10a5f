//! Search request builder and response parsing.

use std::fmt;

use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use rebound_repository::{SearchError, SearchRequest};
use rebound_shared::RequestOptions;

use crate::errors::ModelError;
use crate::model::{dispatch, Model};
use crate::query::Query;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Builder for a search scoped to one model.
///
/// ```ignore
/// let page = posts
///     .search()
///     .query(Query::matching("title", "rust"))
///     .sort("published_at", SortOrder::Desc)
///     .size(20)
///     .send()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct SearchBuilder {
    model: Model,
    query: Option<Query>,
    from: Option<u64>,
    size: Option<u64>,
    sort: Vec<Value>,
    source: Option<Vec<String>>,
    aggregations: Map<String, Value>,
    opts: RequestOptions,
}

impl SearchBuilder {
    pub(crate) fn new(model: Model) -> Self {
        Self {
            model,
            query: None,
            from: None,
            size: None,
            sort: Vec::new(),
            source: None,
            aggregations: Map::new(),
            opts: RequestOptions::default(),
        }
    }

    /// Set the query clause, replacing any earlier one.
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Offset of the first hit.
    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// Maximum number of hits.
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Append a sort key. Keys apply in the order they were added.
    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort.push(json!({ field: { "order": order.to_string() } }));
        self
    }

    /// Restrict `_source` to the given fields.
    pub fn source<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Add a named aggregation.
    pub fn aggregation(mut self, name: &str, aggregation: Value) -> Self {
        self.aggregations.insert(name.to_string(), aggregation);
        self
    }

    /// Merge caller options into the request.
    pub fn with_options(mut self, opts: RequestOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Request body built so far. Unset parts are omitted.
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        if let Some(query) = &self.query {
            body.insert("query".to_string(), query.as_value().clone());
        }
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if !self.sort.is_empty() {
            body.insert("sort".to_string(), Value::Array(self.sort.clone()));
        }
        if let Some(source) = &self.source {
            body.insert("_source".to_string(), json!(source));
        }
        if !self.aggregations.is_empty() {
            body.insert(
                "aggs".to_string(),
                Value::Object(self.aggregations.clone()),
            );
        }
        Value::Object(body)
    }

    /// Run the search.
    #[instrument(skip(self), fields(index = %self.model.index(), doc_type = %self.model.doc_type()))]
    pub async fn send(self) -> Result<SearchResponse, ModelError> {
        let request = SearchRequest::assemble(
            self.model.index(),
            self.model.doc_type(),
            self.body(),
            self.opts.clone(),
        );
        let reply = self.model.connection().search(&request).await?;
        let response = SearchResponse::from_value(&reply)?;

        debug!(total = response.total, returned = response.hits.len(), "Search completed");
        Ok(response)
    }

    /// Callback form of [`send`](Self::send).
    pub fn send_with<C>(self, callback: C)
    where
        C: FnOnce(Result<SearchResponse, ModelError>) + Send + 'static,
    {
        dispatch("search", self.send(), callback);
    }
}

/// One matching document.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Document id.
    pub id: String,
    /// Relevance score, absent when sorting by field.
    pub score: Option<f64>,
    /// Stored document, `Null` when `_source` was excluded.
    pub source: Value,
}

/// Parsed search reply.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// Total number of matches, not just the returned page.
    pub total: u64,
    /// Highest score among the matches.
    pub max_score: Option<f64>,
    /// Returned page of hits.
    pub hits: Vec<SearchHit>,
    /// Raw aggregation results, keyed by aggregation name.
    pub aggregations: Option<Value>,
    /// Engine-side duration in milliseconds.
    pub took: Option<u64>,
}

impl SearchResponse {
    /// Parse an engine reply.
    ///
    /// `hits.total` may be a bare number or a `{"value": n}` object. Hits
    /// without an `_id` are skipped.
    pub fn from_value(reply: &Value) -> Result<Self, SearchError> {
        let hits = reply
            .get("hits")
            .ok_or_else(|| SearchError::parse("search reply without hits"))?;

        let total = match hits.get("total") {
            Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
            Some(total) => total.as_u64(),
            None => None,
        }
        .unwrap_or(0);

        let hits_list = hits
            .get("hits")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(parse_hit).collect())
            .unwrap_or_default();

        Ok(Self {
            total,
            max_score: hits.get("max_score").and_then(Value::as_f64),
            hits: hits_list,
            aggregations: reply.get("aggregations").cloned(),
            took: reply.get("took").and_then(Value::as_u64),
        })
    }

    /// Sources of every hit, in order.
    pub fn sources(&self) -> Vec<&Value> {
        self.hits.iter().map(|hit| &hit.source).collect()
    }
}

fn parse_hit(hit: &Value) -> Option<SearchHit> {
    Some(SearchHit {
        id: hit.get("_id")?.as_str()?.to_string(),
        score: hit.get("_score").and_then(Value::as_f64),
        source: hit.get("_source").cloned().unwrap_or(Value::Null),
    })
}
