//! Order row conversions.
//!
//! Line items travel inline as a JSON array under `items`.

use rust_decimal::Decimal;
use serde_json::{Value, json};
use siteline_core::{Order, OrderItem};

use super::{decimal, decimal_opt, enumeration, id, integer_i32, text, text_or, timestamp};

// =============================================================================
// Line items
// =============================================================================

/// Map one element of an order's `items` array.
#[must_use]
pub fn map_order_item(row: &Value) -> OrderItem {
    OrderItem {
        product_id: text_or(row, "product_id", ""),
        name: text_or(row, "name", ""),
        quantity: integer_i32(row, "quantity").max(0),
        unit_price: decimal(row, "unit_price"),
    }
}

fn order_item_row(item: &OrderItem) -> Value {
    json!({
        "product_id": item.product_id,
        "name": item.name,
        "quantity": item.quantity,
        "unit_price": item.unit_price.to_string(),
    })
}

// =============================================================================
// Orders
// =============================================================================

/// Map an `orders` row. An absent `total` is derived from the line items.
#[must_use]
pub fn map_order(row: &Value) -> Order {
    let items: Vec<OrderItem> = row
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(map_order_item)
                .collect()
        })
        .unwrap_or_default();

    let mut order = Order {
        id: id(row),
        order_number: text_or(row, "order_number", ""),
        customer_id: text(row, "customer_id"),
        customer_name: text_or(row, "customer_name", ""),
        items,
        total: Decimal::ZERO,
        currency: enumeration(row, "currency"),
        status: enumeration(row, "status"),
        created_at: timestamp(row, "created_at"),
    };
    order.total = decimal_opt(row, "total").unwrap_or_else(|| order.items_total());
    order
}

/// Build the `orders` row for `order`.
#[must_use]
pub fn order_row(order: &Order) -> Value {
    json!({
        "id": order.id,
        "order_number": order.order_number,
        "customer_id": order.customer_id,
        "customer_name": order.customer_name,
        "items": order.items.iter().map(order_item_row).collect::<Vec<_>>(),
        "total": order.total.to_string(),
        "currency": order.currency.to_string(),
        "status": order.status.to_string(),
        "created_at": order.created_at.map(|t| t.to_rfc3339()),
    })
}
