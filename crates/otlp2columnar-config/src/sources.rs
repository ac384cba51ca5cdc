// Configuration source loading.
//
// Priority order:
// 1. Environment variables (OTLP2COLUMNAR_* prefix)
// 2. Explicit config file path (CLI --config)
// 3. Config file path from OTLP2COLUMNAR_CONFIG
// 4. Inline config content from OTLP2COLUMNAR_CONFIG_CONTENT
// 5. Default config files (./config.toml, ./.otlp2columnar.toml)
// 6. Built-in defaults

use crate::env_overrides::{self, EnvSource};
use crate::RuntimeConfig;
use anyhow::{Context, Result};
use std::path::Path;

const DEFAULT_CONFIG_FILES: &[&str] = &["./config.toml", "./.otlp2columnar.toml"];

/// Load configuration, failing on any unreadable or malformed source.
pub fn load_config<E: EnvSource>(env: &E, explicit: Option<&Path>) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::default();

    let file_config = match explicit {
        Some(path) => Some(read_config_file(path)?),
        None => load_from_file(env)?,
    };
    if let Some(file_config) = file_config {
        config.merge(file_config);
    }

    env_overrides::apply_env_overrides(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration with graceful fallback to defaults.
pub fn load_or_default<E: EnvSource>(env: &E) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::default();

    // Try to load from file, but don't fail if not found
    if let Ok(Some(file_config)) = load_from_file(env) {
        config.merge(file_config);
    }

    env_overrides::apply_env_overrides(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

fn load_from_file<E: EnvSource>(env: &E) -> Result<Option<RuntimeConfig>> {
    if let Some(path) = env.get("CONFIG") {
        return read_config_file(Path::new(&path)).map(Some);
    }

    if let Some(content) = env.get("CONFIG_CONTENT") {
        let config: RuntimeConfig = toml::from_str(&content)
            .context("Failed to parse inline config from OTLP2COLUMNAR_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    for path in DEFAULT_CONFIG_FILES {
        let path = Path::new(path);
        if path.exists() {
            return read_config_file(path).map(Some);
        }
    }

    Ok(None)
}

fn read_config_file(path: &Path) -> Result<RuntimeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapEnv(HashMap<String, String>);

    impl MapEnv {
        fn with(mut self, key: &str, value: &str) -> Self {
            self.0.insert(key.to_string(), value.to_string());
            self
        }
    }

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
    }

    #[test]
    fn inline_content_then_env_overrides() {
        let env = MapEnv::default()
            .with(
                "CONFIG_CONTENT",
                "[store]\nhost = \"http://inline:9191\"\nschema = \"inline\"\n",
            )
            .with("SCHEMA", "from_env");

        let config = load_config(&env, None).unwrap();
        assert_eq!(config.store.host, "http://inline:9191");
        assert_eq!(config.store.schema, "from_env");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config(
            &MapEnv::default(),
            Some(Path::new("/nonexistent/otlp2columnar.toml")),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn malformed_inline_content_is_an_error() {
        let env = MapEnv::default().with("CONFIG_CONTENT", "[store\nhost=");
        assert!(load_config(&env, None).is_err());
    }

    #[test]
    fn invalid_result_fails_validation() {
        let env = MapEnv::default().with("HOST", "ftp://db.example.com");
        let err = load_config(&env, None).unwrap_err();
        assert!(err.to_string().contains("Protocol must be either"));
    }
}
