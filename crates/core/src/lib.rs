//! Siteline Core - Shared domain types.
//!
//! This crate provides the typed, application-facing shape of every record the
//! dashboard works with:
//! - `sync` - Mutation queue, backend probe, entity mapping and data access
//! - `cli` - Operator tooling for the mutation queue and synthetic dataset
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Translating loosely-typed backend rows into these types is the job
//! of the mapper in `siteline-sync`.
//!
//! # Modules
//!
//! - [`types`] - Domain entities, status enums and currency codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
