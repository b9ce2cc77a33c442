//! Property-based tests for the entity mappers.
//!
//! Any JSON value, well formed or not, must map to an entity without panicking,
//! and every numeric field must land inside its documented range.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use siteline_core::{Customer, Order, Product, Project, UNKNOWN_ID};
use siteline_sync::entity::Entity;

// =============================================================================
// Strategies
// =============================================================================

fn number_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        any::<f64>().prop_map(|f| serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)),
        // Decimal-looking strings, including values at and beyond the Decimal bounds
        prop::string::string_regex("-?[0-9]{1,32}(\\.[0-9]{0,12})?")
            .unwrap()
            .prop_map(Value::String),
    ]
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        number_strategy(),
        prop::string::string_regex("[a-zA-Z0-9 :.-]{0,24}")
            .unwrap()
            .prop_map(Value::String),
    ]
}

fn json_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::hash_map("[a-z_]{1,12}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

const FIELDS: [&str; 14] = [
    "id",
    "name",
    "price",
    "total",
    "items",
    "quantity",
    "unit_price",
    "status",
    "progress",
    "budget",
    "active",
    "created_at",
    "start_date",
    "total_spent",
];

/// Rows using real column names with arbitrary values.
fn row_strategy() -> impl Strategy<Value = Value> {
    let item = prop::collection::hash_map(
        prop::sample::select(vec!["quantity", "unit_price", "name", "product_id"]),
        prop_oneof![number_strategy(), json_strategy()],
        0..4,
    )
    .prop_map(|m| {
        Value::Object(
            m.into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<Map<_, _>>(),
        )
    });

    (
        prop::collection::hash_map(prop::sample::select(FIELDS.to_vec()), json_strategy(), 0..8),
        prop::option::of(prop::collection::vec(item, 0..5)),
    )
        .prop_map(|(fields, items)| {
            let mut row: Map<String, Value> =
                fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
            if let Some(items) = items {
                row.insert("items".to_string(), Value::Array(items));
            }
            Value::Object(row)
        })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn any_value_maps_without_panicking(value in json_strategy()) {
        let product = Product::from_row(&value);
        let order = Order::from_row(&value);
        let project = Project::from_row(&value);
        let customer = Customer::from_row(&value);

        prop_assert!(!product.id.is_empty());
        prop_assert!(!order.id.is_empty());
        prop_assert!(project.progress <= 100);
        prop_assert!(!customer.id.is_empty());
    }

    #[test]
    fn rows_with_real_columns_stay_in_range(row in row_strategy()) {
        let order = Order::from_row(&row);
        prop_assert!(order.items.iter().all(|item| item.quantity >= 0));
        if row.get("total").is_none() {
            prop_assert_eq!(order.total, order.items_total());
        }

        let project = Project::from_row(&row);
        prop_assert!(project.progress <= 100);

        let product = Product::from_row(&row);
        if row.get("id").is_none() {
            prop_assert_eq!(product.id, UNKNOWN_ID);
        }
    }

    #[test]
    fn mapped_rows_map_back_to_themselves(row in row_strategy()) {
        let order = Order::from_row(&row);
        let again = Order::from_row(&order.to_row());
        prop_assert_eq!(again.items, order.items);
        prop_assert_eq!(again.total, order.total);
        prop_assert_eq!(again.status, order.status);
    }
}

#[test]
fn test_order_at_decimal_bounds() {
    let row = json!({"items": [{"quantity": 2, "unit_price": "79228162514264337593543950335"}]});
    assert_eq!(Order::from_row(&row).total, rust_decimal::Decimal::MAX);
}
