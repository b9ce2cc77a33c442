//! Services built on the queue, the backend and the synthetic dataset.
//!
//! - `data_access` - The read/write facade used by the dashboard
//! - `replay` - Draining queued mutations back into the remote backend

pub mod data_access;
pub mod replay;

pub use data_access::DataAccess;
pub use replay::{QueuedMutation, ReplayReport, idempotency_key, replay_pending};
