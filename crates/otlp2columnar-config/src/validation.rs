// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Context, Result};
use tracing::warn;
use url::Url;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_store_config(&config.store)?;
    validate_writer_config(&config.writer)?;
    Ok(())
}

fn validate_store_config(config: &StoreConfig) -> Result<()> {
    if config.host.trim().is_empty() {
        bail!("store.host must not be empty");
    }

    let url = Url::parse(&config.host)
        .with_context(|| format!("store.host '{}' is not a valid URL", config.host))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Protocol must be either `http` or `https`");
    }

    if config.timeout_secs == 0 {
        bail!("store.timeout_secs must be greater than 0");
    }

    if config.username.is_some() && config.password.is_none() {
        warn!("store.username is set without store.password; sending an empty password");
    }

    if config.bypass_ssl_cert_check {
        warn!("store.bypass_ssl_cert_check is enabled; TLS certificates will not be verified");
    }

    Ok(())
}

fn validate_writer_config(config: &WriterConfig) -> Result<()> {
    if config.chunk_size == 0 {
        bail!("writer.chunk_size must be greater than 0");
    }

    // Warn about very large chunks
    if config.chunk_size > 1_000_000 {
        warn!(
            chunk_size = config.chunk_size,
            "writer.chunk_size is very large; requests may exceed store limits"
        );
    }

    Ok(())
}
