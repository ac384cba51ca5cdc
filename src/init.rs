// Initialization utilities
//
// Store client and logging/tracing setup

use std::sync::Arc;

use anyhow::{Context, Result};
use otlp2columnar_config::{LogFormat, RuntimeConfig};
use otlp2columnar_writer::{HttpStoreConfig, HttpTableStore, WriterOptions};
use tracing::info;

use crate::Exporter;

/// Build the store client and exporter from RuntimeConfig
pub fn init_exporter(config: &RuntimeConfig) -> Result<Exporter> {
    info!(
        host = %config.store.host,
        schema = %config.store.schema,
        chunk_size = config.writer.chunk_size,
        "Initializing exporter"
    );

    let store = HttpTableStore::new(HttpStoreConfig {
        endpoint: config.store.host.clone(),
        username: config.store.username.clone(),
        password: config.store.password.clone(),
        bypass_ssl_cert_check: config.store.bypass_ssl_cert_check,
        timeout: config.store.timeout(),
    })
    .context("Failed to initialize store client")?;

    Ok(Exporter::new(
        Arc::new(store),
        WriterOptions {
            schema: config.store.schema.clone(),
            chunk_size: config.writer.chunk_size,
        },
    ))
}

/// Initialize tracing/logging from RuntimeConfig
pub fn init_tracing(config: &RuntimeConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Parse log level from config
    let env_filter =
        EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Try to set the global subscriber; ignore error if already set (idempotent)
    let _ = match config.log.format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().json()))
        }
        LogFormat::Text => tracing::subscriber::set_global_default(registry.with(fmt::layer())),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exporter_uses_configured_schema_and_chunk_size() {
        let mut config = RuntimeConfig::default();
        config.store.schema = "telemetry".to_string();
        config.writer.chunk_size = 500;

        let exporter = init_exporter(&config).unwrap();
        assert_eq!(exporter.writer().options().chunk_size, 500);
        assert_eq!(
            exporter
                .writer()
                .qualified_table(otlp2columnar_core::Table::Log),
            "telemetry.log"
        );
    }

    #[test]
    fn init_tracing_is_idempotent() {
        let config = RuntimeConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
