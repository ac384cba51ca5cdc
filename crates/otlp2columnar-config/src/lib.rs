// otlp2columnar-config - Layered exporter configuration
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file given on the command line
// 3. Config file path from OTLP2COLUMNAR_CONFIG env var
// 4. Config file contents from OTLP2COLUMNAR_CONFIG_CONTENT env var
// 5. Default config file locations (./config.toml, ./.otlp2columnar.toml)
// 6. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, StdEnvSource, ENV_PREFIX};

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub writer: WriterConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Destination store connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the store's HTTP API.
    pub host: String,
    /// Table namespace; empty writes unqualified table names.
    pub schema: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bypass_ssl_cert_check: bool,
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:9191".to_string(),
            schema: "otel".to_string(),
            username: None,
            password: None,
            bypass_ssl_cert_check: false,
            timeout_secs: 30,
        }
    }
}

/// Bulk writer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub chunk_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { chunk_size: 10_000 }
    }
}

/// Diagnostic output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config(&StdEnvSource, None)
    }

    /// Load configuration from a specific file path (for CLI --config flag).
    /// Fails if the file is missing or malformed.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_config(&StdEnvSource, Some(path.as_ref()))
    }

    /// Load configuration with graceful fallback to defaults.
    /// Unreadable default config files are ignored instead of failing.
    pub fn load_or_default() -> Result<Self> {
        sources::load_or_default(&StdEnvSource)
    }

    /// Load configuration using a custom environment source.
    pub fn load_with_env<E: EnvSource>(env: &E, path: Option<&Path>) -> Result<Self> {
        sources::load_config(env, path)
    }

    /// Parse TOML config content.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config content")
    }

    /// Merge another config into this one (used for TOML layering).
    pub fn merge(&mut self, other: RuntimeConfig) {
        self.store = other.store;
        self.writer = other.writer;
        self.log = other.log;
    }

    /// Apply environment overrides from a custom source.
    pub fn apply_env_overrides_from<E: EnvSource>(&mut self, env: &E) -> Result<()> {
        env_overrides::apply_env_overrides(self, env)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
