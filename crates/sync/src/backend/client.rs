//! REST client for a PostgREST-style hosted backend.
//!
//! Tables live under `{url}/rest/v1/{table}`. Filters use the `column=eq.value`
//! query convention and `Prefer: return=representation` asks the backend to
//! echo written rows back.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;

use super::{Backend, BackendError};

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// HTTP implementation of [`Backend`].
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<RestBackendInner>,
}

struct RestBackendInner {
    client: reqwest::Client,
    /// Base for table URLs, always ending in `/rest/v1/`.
    endpoint: Url,
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl RestBackend {
    /// Create a client for `config`, bounding every request by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the credential is not a valid header value or
    /// the HTTP client cannot be built.
    pub fn new(config: &BackendConfig, timeout: Duration) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(config.api_key())
            .map_err(|e| BackendError::InvalidRequest(format!("credential: {e}")))?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|e| BackendError::InvalidRequest(format!("credential: {e}")))?;
        bearer.set_sensitive(true);

        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let endpoint = Url::parse(&format!(
            "{}/rest/v1/",
            config.url.as_str().trim_end_matches('/')
        ))
        .map_err(|e| BackendError::InvalidRequest(format!("endpoint: {e}")))?;

        Ok(Self {
            inner: Arc::new(RestBackendInner { client, endpoint }),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, BackendError> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(BackendError::InvalidRequest(format!(
                "invalid table name: {table}"
            )));
        }

        self.inner
            .endpoint
            .join(table)
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))
    }
}

impl Backend for RestBackend {
    #[instrument(skip(self))]
    async fn select_all(&self, table: &str) -> Result<Vec<Value>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.table_url(table)?)
            .query(&[("select", "*")])
            .send()
            .await?;

        let rows = read_rows(response).await?;
        debug!(table, rows = rows.len(), "Fetched rows");
        Ok(rows)
    }

    #[instrument(skip(self, row))]
    async fn insert(
        &self,
        table: &str,
        row: &Value,
        idempotency_key: &str,
    ) -> Result<Option<Value>, BackendError> {
        let response = self
            .inner
            .client
            .post(self.table_url(table)?)
            .header("Prefer", "return=representation")
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(row)
            .send()
            .await?;

        Ok(read_rows(response).await?.into_iter().next())
    }

    #[instrument(skip(self, row))]
    async fn update(
        &self,
        table: &str,
        id: &str,
        row: &Value,
        idempotency_key: &str,
    ) -> Result<Option<Value>, BackendError> {
        let response = self
            .inner
            .client
            .patch(self.table_url(table)?)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(row)
            .send()
            .await?;

        Ok(read_rows(response).await?.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        table: &str,
        id: &str,
        idempotency_key: &str,
    ) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .delete(self.table_url(table)?)
            .query(&[("id", format!("eq.{id}"))])
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

/// Map non-success statuses to errors.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(BackendError::RateLimited(retry_after));
    }

    let body = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(BackendError::Unauthorized(body));
    }

    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Read a body that is either an array of rows, a single row, or empty.
async fn read_rows(response: reqwest::Response) -> Result<Vec<Value>, BackendError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(&body)? {
        Value::Array(rows) => Ok(rows),
        row @ Value::Object(_) => Ok(vec![row]),
        other => Err(BackendError::UnexpectedShape(format!(
            "expected rows, got {other}"
        ))),
    }
}
