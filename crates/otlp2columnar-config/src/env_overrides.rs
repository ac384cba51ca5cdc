use crate::{LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "OTLP2COLUMNAR_";

/// Abstraction over environment-variable lookups so tests and embedders can
/// supply their own source of overrides.
pub trait EnvSource {
    /// Get a variable by its key without the `OTLP2COLUMNAR_` prefix.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Store connection
    if let Some(host) = get_env_string(env, "HOST") {
        config.store.host = host;
    }
    if let Some(schema) = get_env_string(env, "SCHEMA") {
        config.store.schema = schema;
    }
    if let Some(username) = get_env_string(env, "USERNAME") {
        config.store.username = non_empty(username);
    }
    if let Some(password) = get_env_string(env, "PASSWORD") {
        config.store.password = non_empty(password);
    }
    if let Some(val) = get_env_bool(env, "BYPASS_SSL_CERT_CHECK")? {
        config.store.bypass_ssl_cert_check = val;
    }
    if let Some(val) = get_env_u64(env, "TIMEOUT_SECS")? {
        config.store.timeout_secs = val;
    }

    // Writer
    if let Some(val) = get_env_usize(env, "CHUNK_SIZE")? {
        config.writer.chunk_size = val;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.log.format = format
            .parse::<LogFormat>()
            .context("Invalid OTLP2COLUMNAR_LOG_FORMAT value")?;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
}

fn get_env_usize<E: EnvSource>(env: &E, key: &str) -> Result<Option<usize>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<usize>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = match val.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(anyhow!(
                        "Failed to parse {}{} (expected bool): {}",
                        ENV_PREFIX,
                        key,
                        other
                    ))
                }
            };
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
