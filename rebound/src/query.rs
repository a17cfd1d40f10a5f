//! Query DSL builders and model-scoped query execution.
//!
//! [`Query`] values are plain JSON query clauses. A [`QueryBuilder`] pairs one
//! with a model and runs it as a count, a search or a delete-by-query against
//! that model's index/type.

use serde_json::{json, Map, Value};
use tracing::instrument;

use rebound_repository::{DeleteByQueryRequest, SearchError, SearchRequest};
use rebound_shared::{DocumentId, RequestOptions};

use crate::errors::ModelError;
use crate::model::{dispatch, Model};
use crate::search::SearchResponse;

/// A single query clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Query(Value);

impl Query {
    /// Match every document.
    pub fn match_all() -> Self {
        Self(json!({ "match_all": {} }))
    }

    /// Exact match on a single value.
    pub fn term(field: &str, value: impl Into<Value>) -> Self {
        Self(json!({ "term": { field: value.into() } }))
    }

    /// Exact match on any of several values.
    pub fn terms<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self(json!({ "terms": { field: values } }))
    }

    /// Full-text match.
    pub fn matching(field: &str, text: impl Into<Value>) -> Self {
        Self(json!({ "match": { field: text.into() } }))
    }

    /// Documents with any of the given ids.
    pub fn ids<I, D>(ids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DocumentId>,
    {
        let ids: Vec<String> = ids
            .into_iter()
            .map(|id| Into::<DocumentId>::into(id).to_string())
            .collect();
        Self(json!({ "ids": { "values": ids } }))
    }

    /// Documents where `field` has a value.
    pub fn exists(field: &str) -> Self {
        Self(json!({ "exists": { "field": field } }))
    }

    /// Start a range clause on `field`.
    pub fn range(field: &str) -> RangeQuery {
        RangeQuery {
            field: field.to_string(),
            bounds: Map::new(),
        }
    }

    /// Start a boolean combination.
    pub fn boolean() -> BoolQuery {
        BoolQuery::default()
    }

    /// Wrap an already built clause.
    pub fn raw(clause: Value) -> Self {
        Self(clause)
    }

    /// Borrow the clause.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the clause.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Request body carrying this clause: `{"query": ...}`.
    pub fn to_body(&self) -> Value {
        json!({ "query": self.0 })
    }
}

impl From<Value> for Query {
    fn from(clause: Value) -> Self {
        Self(clause)
    }
}

/// Builder for a `range` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    field: String,
    bounds: Map<String, Value>,
}

impl RangeQuery {
    /// Greater than or equal to.
    pub fn gte(self, value: impl Into<Value>) -> Self {
        self.bound("gte", value.into())
    }

    /// Strictly greater than.
    pub fn gt(self, value: impl Into<Value>) -> Self {
        self.bound("gt", value.into())
    }

    /// Less than or equal to.
    pub fn lte(self, value: impl Into<Value>) -> Self {
        self.bound("lte", value.into())
    }

    /// Strictly less than.
    pub fn lt(self, value: impl Into<Value>) -> Self {
        self.bound("lt", value.into())
    }

    fn bound(mut self, key: &str, value: Value) -> Self {
        self.bounds.insert(key.to_string(), value);
        self
    }
}

impl From<RangeQuery> for Query {
    fn from(range: RangeQuery) -> Self {
        let RangeQuery { field, bounds } = range;
        Self(json!({ "range": { field: bounds } }))
    }
}

/// Builder for a `bool` clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    must: Vec<Value>,
    should: Vec<Value>,
    filter: Vec<Value>,
    must_not: Vec<Value>,
    minimum_should_match: Option<u32>,
}

impl BoolQuery {
    /// Clause that must match and contributes to the score.
    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.must.push(query.into().into_value());
        self
    }

    /// Clause that should match.
    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.should.push(query.into().into_value());
        self
    }

    /// Clause that must match without scoring.
    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.filter.push(query.into().into_value());
        self
    }

    /// Clause that must not match.
    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.must_not.push(query.into().into_value());
        self
    }

    /// Number of `should` clauses that must match.
    pub fn minimum_should_match(mut self, count: u32) -> Self {
        self.minimum_should_match = Some(count);
        self
    }
}

impl From<BoolQuery> for Query {
    fn from(query: BoolQuery) -> Self {
        let mut clauses = Map::new();
        for (key, values) in [
            ("must", query.must),
            ("should", query.should),
            ("filter", query.filter),
            ("must_not", query.must_not),
        ] {
            if !values.is_empty() {
                clauses.insert(key.to_string(), Value::Array(values));
            }
        }
        if let Some(count) = query.minimum_should_match {
            clauses.insert("minimum_should_match".to_string(), json!(count));
        }

        Self(json!({ "bool": clauses }))
    }
}

/// A query bound to a model's index/type.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    model: Model,
    query: Query,
    opts: RequestOptions,
}

impl QueryBuilder {
    pub(crate) fn new(model: Model, query: Query) -> Self {
        Self {
            model,
            query,
            opts: RequestOptions::default(),
        }
    }

    /// Merge caller options into every request this builder sends.
    pub fn with_options(mut self, opts: RequestOptions) -> Self {
        self.opts = opts;
        self
    }

    /// The clause this builder runs.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Count matching documents.
    #[instrument(skip(self), fields(index = %self.model.index(), doc_type = %self.model.doc_type()))]
    pub async fn count(self) -> Result<u64, ModelError> {
        let request = self.search_request();
        let reply = self.model.connection().count(&request).await?;

        reply
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| SearchError::parse("count reply without a count").into())
    }

    /// Callback form of [`count`](Self::count).
    pub fn count_with<C>(self, callback: C)
    where
        C: FnOnce(Result<u64, ModelError>) + Send + 'static,
    {
        dispatch("count", self.count(), callback);
    }

    /// Fetch matching documents.
    #[instrument(skip(self), fields(index = %self.model.index(), doc_type = %self.model.doc_type()))]
    pub async fn find(self) -> Result<SearchResponse, ModelError> {
        let request = self.search_request();
        let reply = self.model.connection().search(&request).await?;
        Ok(SearchResponse::from_value(&reply)?)
    }

    /// Callback form of [`find`](Self::find).
    pub fn find_with<C>(self, callback: C)
    where
        C: FnOnce(Result<SearchResponse, ModelError>) + Send + 'static,
    {
        dispatch("find", self.find(), callback);
    }

    /// Delete matching documents.
    #[instrument(skip(self), fields(index = %self.model.index(), doc_type = %self.model.doc_type()))]
    pub async fn delete(self) -> Result<Value, ModelError> {
        let request = DeleteByQueryRequest::assemble(
            self.model.index(),
            self.model.doc_type(),
            self.query.to_body(),
            self.opts,
        );
        Ok(self.model.connection().delete_by_query(&request).await?)
    }

    /// Callback form of [`delete`](Self::delete).
    pub fn delete_with<C>(self, callback: C)
    where
        C: FnOnce(Result<Value, ModelError>) + Send + 'static,
    {
        dispatch("delete_by_query", self.delete(), callback);
    }

    fn search_request(&self) -> SearchRequest {
        SearchRequest::assemble(
            self.model.index(),
            self.model.doc_type(),
            self.query.to_body(),
            self.opts.clone(),
        )
    }
}
