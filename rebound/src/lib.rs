//! # Rebound
//!
//! Schema-validated document models over a search engine connection.
//!
//! A [`Model`] binds a [`Schema`] to one index/type pair. Binding reconciles
//! the remote index and mapping in the background; afterwards the model
//! creates, updates and deletes documents, and builds scoped queries and
//! searches. Every operation is an async fn with a callback twin.
//!
//! ```ignore
//! let config = ReboundConfig::from_env()?;
//! init_tracing(config.log_format)?;
//!
//! let deps = Dependencies::new(&config).await?;
//! let schema = FieldSchema::new()
//!     .with_field(Field::new("title", FieldKind::Text).required())
//!     .with_field(Field::new("views", FieldKind::Integer).with_default(0));
//! let posts = deps.model(ModelOptions::new().with_type("post"), Arc::new(schema));
//!
//! posts.create(doc, RequestOptions::new().with_id("hello")).await?;
//! let hits = posts.query(Query::term("author", "ana")).find().await?;
//! ```

pub mod config;
pub mod errors;
pub mod model;
pub mod query;
pub mod schema;
pub mod search;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use config::{Dependencies, LogFormat, ReboundConfig};
pub use errors::{ConfigError, ModelError};
pub use model::{Model, ReconcileStatus};
pub use query::{BoolQuery, Query, QueryBuilder, RangeQuery};
pub use schema::{Field, FieldKind, FieldSchema, Schema};
pub use search::{SearchBuilder, SearchHit, SearchResponse, SortOrder};
pub use telemetry::init_tracing;

pub use rebound_repository::{ConnectionConfig, OpenSearchConnection, SearchConnection, SearchError};
pub use rebound_shared::{
    Document, DocumentId, IndexOptions, ModelDefaults, ModelOptions, RequestOptions,
};
