//! Tracing subscriber setup.

use tracing::Subscriber;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::errors::ConfigError;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` controls filtering and defaults to `info`. Fails when a
/// global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), ConfigError> {
    subscriber(format)
        .try_init()
        .map_err(|e| ConfigError::Telemetry(e.to_string()))
}

/// Build the fmt subscriber for `format` without installing it.
pub fn subscriber(format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Pretty => Box::new(builder.finish()),
        LogFormat::Json => Box::new(builder.json().finish()),
    }
}
