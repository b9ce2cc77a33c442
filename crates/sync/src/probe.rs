//! Backend availability probe.
//!
//! Decides, from configuration alone, whether a remote backend is configured
//! well enough to attempt using it. This is not a liveness check: a reachable
//! but failing backend still probes as available, and the data access layer
//! copes with that by falling back to the synthetic dataset.
//!
//! Settings are resolved through an ordered list of [`Lookup`] strategies so
//! that more than one naming convention can be honoured explicitly.

use std::collections::HashMap;

use url::Url;

/// Naming conventions for the backend endpoint, in priority order.
pub const BACKEND_URL_KEYS: &[&str] = &["SITELINE_BACKEND_URL", "BACKEND_URL"];

/// Naming conventions for the backend credential, in priority order.
pub const BACKEND_KEY_KEYS: &[&str] = &["SITELINE_BACKEND_KEY", "BACKEND_KEY"];

/// Markers of template values that were never filled in (case-insensitive).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "placeholder",
    "your-project",
    "your-backend",
    "changeme",
    "replace-me",
];

/// A source of named string settings.
pub trait SettingSource {
    /// Return the raw value stored under `key`, if any.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl SettingSource for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl SettingSource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// One lookup strategy: a key to try against a source.
#[derive(Clone, Copy)]
pub struct Lookup<'a> {
    pub source: &'a dyn SettingSource,
    pub key: &'a str,
}

impl<'a> Lookup<'a> {
    #[must_use]
    pub const fn new(source: &'a dyn SettingSource, key: &'a str) -> Self {
        Self { source, key }
    }
}

impl std::fmt::Debug for Lookup<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lookup").field("key", &self.key).finish()
    }
}

/// Return the first non-empty (trimmed) value produced by `strategies`.
#[must_use]
pub fn resolve_setting(strategies: &[Lookup<'_>]) -> Option<String> {
    strategies.iter().find_map(|strategy| {
        strategy
            .source
            .lookup(strategy.key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Resolve the first non-empty value among `keys` in a single source.
#[must_use]
pub fn resolve_from(source: &dyn SettingSource, keys: &[&str]) -> Option<String> {
    let strategies: Vec<Lookup<'_>> = keys.iter().map(|key| Lookup::new(source, key)).collect();
    resolve_setting(&strategies)
}

/// Whether `value` contains one of the known placeholder markers.
#[must_use]
pub fn looks_like_placeholder(value: &str) -> bool {
    let lower = value.to_lowercase();
    PLACEHOLDER_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Evaluate the capability flag for an endpoint/credential pair.
///
/// True only when the URL is non-empty, parses as an absolute `https` URL with
/// a host, is not a known placeholder, and the credential is non-empty.
#[must_use]
pub fn is_backend_configured(url: &str, key: &str) -> bool {
    let url = url.trim();
    if url.is_empty() || key.trim().is_empty() {
        return false;
    }

    if looks_like_placeholder(url) {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => parsed.scheme() == "https" && parsed.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Resolve endpoint and credential from `source` and evaluate the flag.
#[must_use]
pub fn probe(source: &dyn SettingSource) -> bool {
    let url = resolve_from(source, BACKEND_URL_KEYS).unwrap_or_default();
    let key = resolve_from(source, BACKEND_KEY_KEYS).unwrap_or_default();
    is_backend_configured(&url, &key)
}
