//! Core types for Siteline.
//!
//! This module provides the domain entities and the enumerations they carry.

pub mod entity;
pub mod price;
pub mod status;

pub use entity::{Customer, Order, OrderItem, Product, Project};
pub use price::CurrencyCode;
pub use status::*;

/// Identifier given to a record whose source row carried no usable id.
pub const UNKNOWN_ID: &str = "unknown";
