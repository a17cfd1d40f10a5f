//! Settings loaded from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use rebound_repository::{config::DEFAULT_OPENSEARCH_URL, ConnectionConfig, OpenSearchConnection};
use rebound_shared::ModelDefaults;

use crate::errors::ConfigError;

/// Document type used when `REBOUND_TYPE` is unset.
const DEFAULT_DOC_TYPE: &str = "_doc";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::invalid("REBOUND_LOG_FORMAT", s)),
        }
    }
}

/// Everything needed to connect and bind models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReboundConfig {
    /// OpenSearch URL and request timeout.
    pub connection: ConnectionConfig,
    /// Index/type fallbacks for models.
    pub defaults: ModelDefaults,
    /// Output format for [`init_tracing`](crate::telemetry::init_tracing).
    pub log_format: LogFormat,
}

impl ReboundConfig {
    /// Load configuration from the process environment, reading a `.env`
    /// file first when one exists.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_TIMEOUT_MS`: per-request timeout in milliseconds (optional)
    /// - `REBOUND_INDEX`: default index for models (optional)
    /// - `REBOUND_TYPE`: default document type for models (default: _doc)
    /// - `REBOUND_LOG_FORMAT`: `pretty` or `json` (default: pretty)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut connection = ConnectionConfig::new(
            var("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
        );
        if let Some(raw) = var("OPENSEARCH_TIMEOUT_MS") {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("OPENSEARCH_TIMEOUT_MS", &raw))?;
            connection = connection.with_timeout(Duration::from_millis(millis));
        }

        let defaults = ModelDefaults {
            index: var("REBOUND_INDEX"),
            doc_type: Some(var("REBOUND_TYPE").unwrap_or_else(|| DEFAULT_DOC_TYPE.to_string())),
        };

        let log_format = match var("REBOUND_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            connection,
            defaults,
            log_format,
        })
    }

    /// Build an OpenSearch connection from these settings.
    pub fn connect(&self) -> Result<OpenSearchConnection, ConfigError> {
        Ok(OpenSearchConnection::new(&self.connection)?)
    }
}
