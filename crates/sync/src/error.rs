//! Why a remote read produced no usable data.
//!
//! These never leave the data access facade; its public reads collapse every
//! outcome to plain data. They exist so the fallback decision is explicit and
//! so logs and telemetry can say what happened.

use thiserror::Error;

use crate::backend::BackendError;

/// A remote read that fell back to the synthetic dataset.
#[derive(Debug, Error)]
pub enum FetchOutcome {
    /// No backend is configured; the synthetic dataset is authoritative.
    #[error("remote backend not configured")]
    Unconfigured,

    /// The backend answered with zero rows.
    #[error("remote backend returned no rows")]
    Empty,

    /// The remote call failed.
    #[error("remote read failed: {0}")]
    Failed(#[from] BackendError),
}
