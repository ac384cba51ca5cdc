// Destination store contract and its HTTP implementation
//
// The writer only needs "insert these rows into this table". The HTTP store
// speaks the JSON bulk-insert endpoint of the column store.

use std::time::Duration;

use async_trait::async_trait;
use otlp2columnar_core::Row;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Result, WriterError};

const INSERT_PATH: &str = "insert/records/json";

/// Bulk-insert contract required of the destination store.
///
/// Implementations must be safe to call concurrently: the writer shares one
/// store across every in-flight chunk.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Insert `rows` into the fully qualified `table` as one request.
    async fn insert_records(&self, table: &str, rows: &[Row]) -> Result<()>;
}

/// Connection settings for [`HttpTableStore`].
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub bypass_ssl_cert_check: bool,
    pub timeout: Duration,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9191".to_string(),
            username: None,
            password: None,
            bypass_ssl_cert_check: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Store client over the HTTP JSON insert API.
pub struct HttpTableStore {
    client: reqwest::Client,
    endpoint: Url,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InsertResponse {
    status: String,
    message: String,
}

impl HttpTableStore {
    pub fn new(config: HttpStoreConfig) -> Result<Self> {
        let mut endpoint = Url::parse(&config.endpoint).map_err(|e| {
            WriterError::invalid_config(format!("invalid store endpoint '{}': {e}", config.endpoint))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(WriterError::invalid_config(format!(
                "store endpoint '{}' must use http or https",
                config.endpoint
            )));
        }
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.bypass_ssl_cert_check)
            .build()
            .map_err(|e| WriterError::invalid_config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            username: config.username.filter(|u| !u.is_empty()),
            password: config.password,
        })
    }

    fn insert_url(&self, table: &str) -> Result<Url> {
        let mut url = self.endpoint.join(INSERT_PATH).map_err(|e| {
            WriterError::invalid_config(format!("invalid insert url for '{}': {e}", self.endpoint))
        })?;
        url.query_pairs_mut().append_pair("table_name", table);
        Ok(url)
    }
}

#[async_trait]
impl TableStore for HttpTableStore {
    async fn insert_records(&self, table: &str, rows: &[Row]) -> Result<()> {
        let url = self.insert_url(table)?;
        let mut request = self.client.post(url).json(rows);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await.map_err(|e| {
            WriterError::store_unreachable(self.endpoint.to_string(), e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(WriterError::invalid_credentials(
                self.endpoint.to_string(),
                status.as_u16(),
            ));
        }

        let body = response.text().await.map_err(|e| {
            WriterError::write_failure(table.to_string(), format!("failed to read response: {e}"))
        })?;
        check_insert_response(table, status, &body)?;

        debug!(table, rows = rows.len(), "Inserted records");
        Ok(())
    }
}

fn check_insert_response(table: &str, status: StatusCode, body: &str) -> Result<()> {
    let parsed: InsertResponse = serde_json::from_str(body).unwrap_or_default();

    if !status.is_success() {
        let detail = if parsed.message.is_empty() {
            body.trim()
        } else {
            parsed.message.as_str()
        };
        return Err(WriterError::write_failure(
            table.to_string(),
            format!("HTTP {}: {detail}", status.as_u16()),
        ));
    }

    if parsed.status.eq_ignore_ascii_case("error") {
        return Err(WriterError::write_failure(table.to_string(), parsed.message));
    }

    Ok(())
}
