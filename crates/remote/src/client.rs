//! REST client for the remote datastore.
//!
//! Speaks a PostgREST-style row API: one resource per table, filters in the
//! query string, structured error bodies carrying an SQLSTATE code.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use cajaflow_core::sync::{ConnectivityProbe, RemoteDataStore, RemoteError, SyncTable};

use crate::error::{RemoteClientError, Result};

/// Default timeout for API requests. Expiry surfaces as a transient failure,
/// leaving the queue entry for the next trigger.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Timeout for the connectivity probe; a reachability check should fail fast.
const PROBE_TIMEOUT_SECS: u64 = 5;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Structured error body returned by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    code: Option<String>,
    message: Option<String>,
}

/// Client for the remote row API.
#[derive(Debug, Clone)]
pub struct RestRemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestRemoteStore {
    /// Create a new remote store client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the remote API
    /// * `api_key` - The service key sent with every request
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: SyncTable) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.table_name())
    }

    fn record_url(&self, table: SyncTable, record_id: &str) -> String {
        format!(
            "{}?id=eq.{}",
            self.table_url(table),
            urlencoding::encode(record_id)
        )
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        let key_value = HeaderValue::from_str(&self.api_key)
            .map_err(|_| RemoteClientError::InvalidRequest("Invalid API key format".to_string()))?;
        headers.insert("apikey", key_value);
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| RemoteClientError::InvalidRequest("Invalid API key format".to_string()))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Consumes a mutation response, turning non-success statuses into
    /// structured API errors.
    async fn check_response(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if status.is_success() {
            return Ok(());
        }

        if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
            return Err(RemoteClientError::api(
                status.as_u16(),
                error.code,
                error.message.unwrap_or_else(|| body.clone()),
            ));
        }
        Err(RemoteClientError::api(
            status.as_u16(),
            None,
            format!("Request failed: {body}"),
        ))
    }

    async fn insert_row(&self, table: SyncTable, row: serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .headers(self.headers()?)
            .json(&row)
            .send()
            .await?;
        Self::check_response(response).await
    }

    async fn update_row(
        &self,
        table: SyncTable,
        record_id: &str,
        row: serde_json::Value,
    ) -> Result<()> {
        let response = self
            .client
            .patch(self.record_url(table, record_id))
            .headers(self.headers()?)
            .json(&row)
            .send()
            .await?;
        Self::check_response(response).await
    }

    async fn delete_row(&self, table: SyncTable, record_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.record_url(table, record_id))
            .headers(self.headers()?)
            .send()
            .await?;
        Self::check_response(response).await
    }

    async fn fetch_rows(&self, table: SyncTable) -> Result<Vec<serde_json::Value>> {
        let response = self
            .client
            .get(format!("{}?select=*", self.table_url(table)))
            .headers(self.headers()?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);
        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(RemoteClientError::api(
                    status.as_u16(),
                    error.code,
                    error.message.unwrap_or_else(|| body.clone()),
                ));
            }
            return Err(RemoteClientError::api(
                status.as_u16(),
                None,
                format!("Request failed: {body}"),
            ));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RemoteDataStore for RestRemoteStore {
    async fn insert(
        &self,
        table: SyncTable,
        row: serde_json::Value,
    ) -> std::result::Result<(), RemoteError> {
        self.insert_row(table, row).await.map_err(RemoteError::from)
    }

    async fn update(
        &self,
        table: SyncTable,
        record_id: &str,
        row: serde_json::Value,
    ) -> std::result::Result<(), RemoteError> {
        self.update_row(table, record_id, row)
            .await
            .map_err(RemoteError::from)
    }

    async fn delete(
        &self,
        table: SyncTable,
        record_id: &str,
    ) -> std::result::Result<(), RemoteError> {
        self.delete_row(table, record_id)
            .await
            .map_err(RemoteError::from)
    }

    async fn fetch_table(
        &self,
        table: SyncTable,
    ) -> std::result::Result<Vec<serde_json::Value>, RemoteError> {
        self.fetch_rows(table).await.map_err(RemoteError::from)
    }
}

/// Reachability oracle: a fast HEAD request against the API base URL.
#[derive(Debug, Clone)]
pub struct HttpConnectivityProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpConnectivityProbe {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn is_online(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(_) => true,
            Err(err) => {
                debug!("Connectivity probe failed: {err}");
                false
            }
        }
    }
}
