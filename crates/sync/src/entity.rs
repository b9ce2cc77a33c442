//! Binding between domain types and their storage.
//!
//! Each [`Entity`] names its remote table, the noun used in queued action tags
//! (`create-order`, `delete-customer`, ...), its change topic, its row mappers
//! and its collection in the [`SyntheticDataset`]. The data access facade is
//! written once against this trait.

use serde_json::Value;
use siteline_core::{Customer, Order, Product, Project};

use crate::backend::conversions::{
    customer_row, map_customer, map_order, map_product, map_project, order_row, product_row,
    project_row,
};
use crate::dataset::SyntheticDataset;

/// A domain type the data layer can read and write.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Remote table name.
    const TABLE: &'static str;
    /// Noun in queued action tags.
    const NOUN: &'static str;
    /// Event emitted after every write.
    const TOPIC: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    fn from_row(row: &Value) -> Self;
    fn to_row(&self) -> Value;

    fn collection(dataset: &SyntheticDataset) -> &[Self];
    fn collection_mut(dataset: &mut SyntheticDataset) -> &mut Vec<Self>;
}

/// Implements [`Entity`] for a type with an `id: String` field.
macro_rules! impl_entity {
    ($ty:ty, $table:literal, $noun:literal, $field:ident, $from_row:ident, $to_row:ident) => {
        impl Entity for $ty {
            const TABLE: &'static str = $table;
            const NOUN: &'static str = $noun;
            const TOPIC: &'static str = concat!($table, "-changed");

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn from_row(row: &Value) -> Self {
                $from_row(row)
            }

            fn to_row(&self) -> Value {
                $to_row(self)
            }

            fn collection(dataset: &SyntheticDataset) -> &[Self] {
                &dataset.$field
            }

            fn collection_mut(dataset: &mut SyntheticDataset) -> &mut Vec<Self> {
                &mut dataset.$field
            }
        }
    };
}

impl_entity!(Product, "products", "product", products, map_product, product_row);
impl_entity!(Order, "orders", "order", orders, map_order, order_row);
impl_entity!(Project, "projects", "project", projects, map_project, project_row);
impl_entity!(Customer, "customers", "customer", customers, map_customer, customer_row);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_topics() {
        assert_eq!(Product::TOPIC, "products-changed");
        assert_eq!(Order::TOPIC, "orders-changed");
        assert_eq!(Project::TOPIC, "projects-changed");
        assert_eq!(Customer::TOPIC, "customers-changed");
    }

    #[test]
    fn test_collections_follow_type() {
        let dataset = SyntheticDataset::seeded();
        assert_eq!(Order::collection(&dataset).len(), dataset.orders.len());
        assert_eq!(Customer::collection(&dataset).len(), dataset.customers.len());
    }

    #[test]
    fn test_row_round_trip_through_trait() {
        let row = json!({"id": "pr-5", "name": "Retaining wall", "progress": 10});
        let mut project = Project::from_row(&row);
        assert_eq!(project.id(), "pr-5");

        project.set_id("pr-6".to_string());
        assert_eq!(project.to_row()["id"], "pr-6");
    }
}
