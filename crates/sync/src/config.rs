//! Sync configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Backend (both required for live mode; either convention works)
//! - `SITELINE_BACKEND_URL` / `BACKEND_URL` - Remote backend endpoint (https)
//! - `SITELINE_BACKEND_KEY` / `BACKEND_KEY` - Remote backend credential
//!
//! A missing, malformed or placeholder backend is not an error: it switches the
//! data layer to the synthetic dataset for the lifetime of the process.
//!
//! ## Optional
//! - `SITELINE_QUEUE_PATH` - `SQLite` file for the mutation queue (default: siteline-queue.db)
//! - `SITELINE_QUEUE_OFFLINE_WRITES` - Record writes made without a backend (default: true)
//! - `SITELINE_REQUEST_TIMEOUT_SECS` - Timeout for every remote call, non-zero (default: 15)
//! - `SITELINE_REPLAY_BATCH` - Maximum queue entries attempted per replay pass, non-zero (default: 100)
//! - `SITELINE_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::probe::{
    BACKEND_KEY_KEYS, BACKEND_URL_KEYS, ProcessEnv, SettingSource, is_backend_configured,
    looks_like_placeholder, resolve_from,
};

const DEFAULT_QUEUE_PATH: &str = "siteline-queue.db";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_REPLAY_BATCH: usize = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Sync layer configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote backend, present only when the capability probe passed
    pub backend: Option<BackendConfig>,
    /// Location of the mutation queue database
    pub queue_path: PathBuf,
    /// Whether writes made in synthetic-only mode are queued
    pub queue_offline_writes: bool,
    /// Upper bound on each remote call
    pub request_timeout: Duration,
    /// Maximum entries replayed per pass
    pub replay_batch: usize,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

/// Remote backend endpoint and credential.
///
/// Implements `Debug` manually to redact the credential.
#[derive(Clone)]
pub struct BackendConfig {
    /// Validated https endpoint
    pub url: Url,
    /// API credential
    pub api_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl BackendConfig {
    /// Resolve and validate the backend settings.
    ///
    /// Returns `None` whenever the capability probe fails.
    pub fn resolve(source: &dyn SettingSource) -> Option<Self> {
        let url = resolve_from(source, BACKEND_URL_KEYS).unwrap_or_default();
        let key = resolve_from(source, BACKEND_KEY_KEYS).unwrap_or_default();

        if !is_backend_configured(&url, &key) {
            tracing::info!("Remote backend not configured, using synthetic dataset");
            return None;
        }

        if looks_like_placeholder(&key) {
            tracing::warn!("Backend credential looks like a placeholder value");
        }

        // is_backend_configured already parsed it
        let url = Url::parse(&url).ok()?;
        Some(Self {
            url,
            api_key: SecretString::from(key),
        })
    }

    /// The credential, for building request headers.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an optional setting is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(&ProcessEnv)
    }

    /// Load configuration from an arbitrary setting source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an optional setting is present but malformed.
    pub fn from_source(source: &dyn SettingSource) -> Result<Self, ConfigError> {
        let backend = BackendConfig::resolve(source);
        let queue_path = get_optional(source, "SITELINE_QUEUE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_QUEUE_PATH), PathBuf::from);
        let queue_offline_writes =
            parse_bool(source, "SITELINE_QUEUE_OFFLINE_WRITES")?.unwrap_or(true);
        let request_timeout = parse_number::<NonZeroU64>(source, "SITELINE_REQUEST_TIMEOUT_SECS")?
            .map_or(DEFAULT_REQUEST_TIMEOUT_SECS, NonZeroU64::get);
        let replay_batch = parse_number::<NonZeroUsize>(source, "SITELINE_REPLAY_BATCH")?
            .map_or(DEFAULT_REPLAY_BATCH, NonZeroUsize::get);
        let log_format = match get_optional(source, "SITELINE_LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "SITELINE_LOG_FORMAT".to_string(),
                    format!("expected 'text' or 'json', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            backend,
            queue_path,
            queue_offline_writes,
            request_timeout: Duration::from_secs(request_timeout),
            replay_batch,
            log_format,
            sentry_dsn: get_optional(source, "SENTRY_DSN"),
            sentry_environment: get_optional(source, "SENTRY_ENVIRONMENT"),
        })
    }

    /// The capability flag: whether a remote backend will be attempted.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.backend.is_some()
    }

    /// Returns a reference to the backend configuration, if available.
    #[must_use]
    pub const fn backend(&self) -> Option<&BackendConfig> {
        self.backend.as_ref()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional, non-empty setting.
fn get_optional(source: &dyn SettingSource, key: &str) -> Option<String> {
    source
        .lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T>(source: &dyn SettingSource, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional(source, key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

fn parse_bool(source: &dyn SettingSource, key: &str) -> Result<Option<bool>, ConfigError> {
    get_optional(source, key)
        .map(|raw| match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got '{raw}'"),
            )),
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_backend() {
        let config = SyncConfig::from_source(&source(&[])).unwrap();
        assert!(!config.is_live());
        assert_eq!(config.queue_path, PathBuf::from(DEFAULT_QUEUE_PATH));
        assert!(config.queue_offline_writes);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.replay_batch, 100);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_live_backend() {
        let config = SyncConfig::from_source(&source(&[
            ("SITELINE_BACKEND_URL", "https://db.siteline.dev"),
            ("SITELINE_BACKEND_KEY", "k3y-aB9x"),
        ]))
        .unwrap();
        assert!(config.is_live());
        let backend = config.backend().unwrap();
        assert_eq!(backend.url.host_str(), Some("db.siteline.dev"));
        assert_eq!(backend.api_key(), "k3y-aB9x");
    }

    #[test]
    fn test_placeholder_backend_is_not_live() {
        let config = SyncConfig::from_source(&source(&[
            ("BACKEND_URL", "https://x.example.co/placeholder-node"),
            ("BACKEND_KEY", "abc"),
        ]))
        .unwrap();
        assert!(!config.is_live());
    }

    #[test]
    fn test_backend_debug_redacts_key() {
        let backend = BackendConfig {
            url: Url::parse("https://db.siteline.dev").unwrap(),
            api_key: SecretString::from("super-secret-value"),
        };
        let debug = format!("{backend:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = SyncConfig::from_source(&source(&[("SITELINE_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SITELINE_REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn test_zero_timeout_and_batch_are_rejected() {
        for key in ["SITELINE_REQUEST_TIMEOUT_SECS", "SITELINE_REPLAY_BATCH"] {
            let err = SyncConfig::from_source(&source(&[(key, "0")])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == key));
        }

        let config =
            SyncConfig::from_source(&source(&[("SITELINE_REQUEST_TIMEOUT_SECS", "3")])).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_offline_writes_toggle() {
        let config =
            SyncConfig::from_source(&source(&[("SITELINE_QUEUE_OFFLINE_WRITES", "off")])).unwrap();
        assert!(!config.queue_offline_writes);

        let err = SyncConfig::from_source(&source(&[("SITELINE_QUEUE_OFFLINE_WRITES", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_json_log_format() {
        let config = SyncConfig::from_source(&source(&[("SITELINE_LOG_FORMAT", "json")])).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(SyncConfig::from_source(&source(&[("SITELINE_LOG_FORMAT", "xml")])).is_err());
    }
}
