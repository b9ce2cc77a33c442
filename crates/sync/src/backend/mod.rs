//! Remote backend boundary.
//!
//! # Architecture
//!
//! - One table per domain entity, rows are loosely typed snake_case JSON
//! - Bulk "select all" reads and targeted insert/update/delete writes
//! - Every write carries an idempotency key so a replayed mutation is applied
//!   at most once
//!
//! Only the data access facade and the replay service call across this
//! boundary. Rows come back raw; [`conversions`] turns them into domain types.
//!
//! # Example
//!
//! ```rust,ignore
//! use siteline_sync::backend::{Backend, RestBackend};
//!
//! let backend = RestBackend::new(&backend_config, timeout)?;
//! let rows = backend.select_all("products").await?;
//! ```

mod client;
pub mod conversions;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

pub use client::RestBackend;

/// Errors that can occur when talking to the remote backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Credential rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The response was valid JSON but not the expected shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// Request could not be built (bad table name, header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Operations the data layer needs from a remote backend.
pub trait Backend: Send + Sync {
    /// Fetch every row of `table`.
    fn select_all(
        &self,
        table: &str,
    ) -> impl Future<Output = Result<Vec<Value>, BackendError>> + Send;

    /// Insert `row`, returning the stored representation when the backend
    /// provides one.
    fn insert(
        &self,
        table: &str,
        row: &Value,
        idempotency_key: &str,
    ) -> impl Future<Output = Result<Option<Value>, BackendError>> + Send;

    /// Update the row with `id`, returning the stored representation when the
    /// backend provides one.
    fn update(
        &self,
        table: &str,
        id: &str,
        row: &Value,
        idempotency_key: &str,
    ) -> impl Future<Output = Result<Option<Value>, BackendError>> + Send;

    /// Delete the row with `id`.
    fn delete(
        &self,
        table: &str,
        id: &str,
        idempotency_key: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}
