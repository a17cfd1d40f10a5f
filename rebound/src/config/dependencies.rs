//! Connection wiring shared by every model of a process.

use std::sync::Arc;

use tracing::info;

use rebound_repository::SearchConnection;
use rebound_shared::{ModelDefaults, ModelOptions};

use crate::config::ReboundConfig;
use crate::errors::ConfigError;
use crate::model::Model;
use crate::schema::Schema;

/// A verified connection plus the defaults models are bound with.
#[derive(Clone)]
pub struct Dependencies {
    /// Connection shared by every model.
    pub connection: Arc<dyn SearchConnection>,
    /// Index/type fallbacks applied when binding models.
    pub defaults: ModelDefaults,
}

impl Dependencies {
    /// Connect using `config` and verify the cluster is healthy.
    pub async fn new(config: &ReboundConfig) -> Result<Self, ConfigError> {
        info!(
            opensearch_url = %config.connection.url,
            index = ?config.defaults.index,
            doc_type = ?config.defaults.doc_type,
            "Initializing dependencies"
        );

        let connection = config.connect()?;
        Self::verified(Arc::new(connection), config.defaults.clone()).await
    }

    /// Load [`ReboundConfig`] from the environment, then connect.
    pub async fn from_env() -> Result<Self, ConfigError> {
        let config = ReboundConfig::from_env()?;
        Self::new(&config).await
    }

    /// Wrap an existing connection after a health check.
    pub async fn verified(
        connection: Arc<dyn SearchConnection>,
        defaults: ModelDefaults,
    ) -> Result<Self, ConfigError> {
        if !connection.health_check().await? {
            return Err(ConfigError::Unhealthy);
        }

        info!("OpenSearch connection verified");

        Ok(Self {
            connection,
            defaults,
        })
    }

    /// Bind a model with these defaults.
    pub fn model(&self, opts: ModelOptions, schema: Arc<dyn Schema>) -> Model {
        Model::new(self.connection.clone(), &self.defaults, opts, schema)
    }
}
