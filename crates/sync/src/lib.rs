//! Siteline data synchronization.
//!
//! Keeps the dashboard working whether or not a remote backend is reachable or
//! even configured. Reads go to the backend when the capability probe passes
//! and fall back to a synthetic in-memory dataset otherwise; writes are
//! recorded in a durable mutation queue so they can be replayed later.
//!
//! # Modules
//!
//! - [`probe`] - Backend availability probe and setting resolution
//! - [`config`] - Environment configuration
//! - [`db`] - Durable mutation queue (`SQLite`)
//! - [`backend`] - Remote backend trait, REST client and row conversions
//! - [`entity`] - Binding of domain types to tables, topics and collections
//! - [`dataset`] - Synthetic dataset fixtures
//! - [`events`] - Change event bus
//! - [`state`] - Shared context owning the dataset and the bus
//! - [`services`] - Data access facade and queue replay

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod dataset;
pub mod db;
pub mod entity;
pub mod error;
pub mod events;
pub mod probe;
pub mod services;
pub mod state;

pub use backend::{Backend, BackendError, RestBackend};
pub use config::{BackendConfig, ConfigError, LogFormat, SyncConfig};
pub use dataset::SyntheticDataset;
pub use db::{MutationQueue, QueueEntry};
pub use entity::Entity;
pub use error::FetchOutcome;
pub use events::{DATA_CHANGED, EventBus, ListenerId};
pub use services::{DataAccess, ReplayReport};
pub use state::SyncContext;
