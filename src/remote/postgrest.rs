use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::RemoteError;
use crate::remote::{NewRemoteRow, RemoteConnector, RemoteRow, RemoteTable};

pub const TABLE_NAME: &str = "attendance_records";

#[derive(Deserialize, Default)]
struct PostgrestErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Connects to a PostgREST endpoint (Supabase `rest/v1`) using an API key.
pub struct PostgrestConnector {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl PostgrestConnector {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.remote_url,
            &config.remote_key,
            Duration::from_secs(config.remote_timeout_secs),
        )
    }

    fn headers(&self) -> Result<HeaderMap, RemoteError> {
        let invalid = |_| RemoteError::NotReady("remote key is not a valid header value".into());

        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&self.api_key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(invalid)?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl RemoteConnector for PostgrestConnector {
    async fn connect(&self) -> Result<Arc<dyn RemoteTable>, RemoteError> {
        if self.base_url.is_empty() || self.api_key.is_empty() {
            return Err(RemoteError::NotReady("remote endpoint is not configured".into()));
        }

        let client = reqwest::Client::builder()
            .default_headers(self.headers()?)
            .timeout(self.timeout)
            .build()
            .map_err(|e| RemoteError::NotReady(e.to_string()))?;

        let table = PostgrestTable {
            client,
            url: format!("{}/rest/v1/{}", self.base_url, TABLE_NAME),
        };
        table.probe().await?;

        Ok(Arc::new(table))
    }
}

pub struct PostgrestTable {
    client: reqwest::Client,
    url: String,
}

impl PostgrestTable {
    /// Zero-row select; proves the endpoint, key and table are all usable.
    async fn probe(&self) -> Result<(), RemoteError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("select", "id"), ("limit", "0")])
            .send()
            .await
            .map_err(|e| RemoteError::NotReady(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let (message, _) = error_details(response).await;
            Err(RemoteError::NotReady(message))
        }
    }
}

/// Message and code from a PostgREST error response.
async fn error_details(response: reqwest::Response) -> (String, Option<String>) {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: PostgrestErrorBody = serde_json::from_str(&text).unwrap_or_default();

    debug!(
        %status,
        details = body.details.as_deref().unwrap_or(""),
        hint = body.hint.as_deref().unwrap_or(""),
        "Remote error response"
    );

    let message = body
        .message
        .unwrap_or_else(|| format!("HTTP {status}: {}", text.trim()));
    (message, body.code)
}

/// `0-0/42` or `*/42` → 42.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

#[async_trait]
impl RemoteTable for PostgrestTable {
    async fn insert(&self, row: &NewRemoteRow) -> Result<Vec<RemoteRow>, RemoteError> {
        let response = self
            .client
            .post(&self.url)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await
            .map_err(|e| RemoteError::InsertFailed {
                message: e.to_string(),
                code: None,
            })?;

        if !response.status().is_success() {
            let (message, code) = error_details(response).await;
            return Err(RemoteError::InsertFailed { message, code });
        }

        response
            .json::<Vec<RemoteRow>>()
            .await
            .map_err(|e| RemoteError::InsertFailed {
                message: format!("unreadable insert response: {e}"),
                code: None,
            })
    }

    async fn select_by_date(&self, date: &str) -> Result<Vec<RemoteRow>, RemoteError> {
        let filter = format!("eq.{date}");
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("select", "*"),
                ("attendance_date", filter.as_str()),
                ("order", "submitted_at.desc"),
            ])
            .send()
            .await
            .map_err(|e| RemoteError::QueryFailed(e.to_string()))?;

        if !response.status().is_success() {
            let (message, _) = error_details(response).await;
            return Err(RemoteError::QueryFailed(message));
        }

        response
            .json::<Vec<RemoteRow>>()
            .await
            .map_err(|e| RemoteError::QueryFailed(format!("unreadable query response: {e}")))
    }

    async fn count(&self, filters: &[(&str, &str)]) -> Result<u64, RemoteError> {
        let mut query: Vec<(String, String)> = vec![
            ("select".to_string(), "id".to_string()),
            ("limit".to_string(), "1".to_string()),
        ];
        query.extend(
            filters
                .iter()
                .map(|(column, value)| (column.to_string(), format!("eq.{value}"))),
        );

        let response = self
            .client
            .get(&self.url)
            .header("Prefer", "count=exact")
            .query(&query)
            .send()
            .await
            .map_err(|e| RemoteError::QueryFailed(e.to_string()))?;

        if !response.status().is_success() {
            let (message, _) = error_details(response).await;
            return Err(RemoteError::QueryFailed(message));
        }

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| RemoteError::QueryFailed("missing row count in response".into()))
    }
}
