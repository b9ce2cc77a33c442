//! Configuration probe.
//!
//! # Usage
//!
//! ```bash
//! sl-cli probe
//! ```
//!
//! Reports the capability flag, the backend host (never the credential) and the
//! state of the mutation queue. Makes no network call: a configured backend may
//! still be unreachable.

use siteline_sync::{MutationQueue, SyncConfig};

/// Log the resolved configuration.
pub async fn report(config: &SyncConfig) {
    match config.backend() {
        Some(backend) => tracing::info!(
            host = backend.url.host_str().unwrap_or_default(),
            timeout_secs = config.request_timeout.as_secs(),
            "Remote backend configured, live mode"
        ),
        None => tracing::info!("Remote backend not configured, synthetic dataset only"),
    }

    let queue = MutationQueue::open(&config.queue_path).await;
    tracing::info!(
        path = %config.queue_path.display(),
        durable = queue.is_durable(),
        pending = queue.len().await,
        offline_writes = config.queue_offline_writes,
        "Mutation queue"
    );
}
