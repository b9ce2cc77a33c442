//! Synthetic dataset dump.
//!
//! # Usage
//!
//! ```bash
//! # Every collection
//! sl-cli dataset
//!
//! # One collection
//! sl-cli dataset --entity projects
//! ```

use clap::ValueEnum;
use siteline_sync::SyntheticDataset;

/// Collections of the synthetic dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Products,
    Orders,
    Projects,
    Customers,
}

/// Log the seeded fixtures as JSON.
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn dump(entity: Option<EntityKind>) -> Result<(), serde_json::Error> {
    let dataset = SyntheticDataset::seeded();

    let json = match entity {
        None => serde_json::to_string_pretty(&dataset)?,
        Some(EntityKind::Products) => serde_json::to_string_pretty(&dataset.products)?,
        Some(EntityKind::Orders) => serde_json::to_string_pretty(&dataset.orders)?,
        Some(EntityKind::Projects) => serde_json::to_string_pretty(&dataset.projects)?,
        Some(EntityKind::Customers) => serde_json::to_string_pretty(&dataset.customers)?,
    };

    tracing::info!(rows = dataset.len(), "Synthetic dataset\n{json}");
    Ok(())
}
