//! Domain entities shown on the dashboard.
//!
//! These are the application-facing shapes: camelCase on the wire, every field
//! typed, nothing nullable that has a sensible default. `Default` produces an
//! entity with an empty id, which the data layer treats as "not yet assigned".

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::price::CurrencyCode;
use super::status::{OrderStatus, ProductCategory, ProjectStatus};

/// A catalog product (materials, equipment, services).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub price: Decimal,
    pub currency: CurrencyCode,
    /// Units on hand.
    pub stock: i32,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    /// Whether the product is offered for sale.
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItem {
    /// `quantity * unit_price`, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Human facing order number (e.g. "SO-1042").
    pub order_number: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub currency: CurrencyCode,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of all line totals, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items
            .iter()
            .map(OrderItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

/// A site project tracked from quote to completion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub client_name: String,
    pub site_address: Option<String>,
    pub status: ProjectStatus,
    pub budget: Decimal,
    pub currency: CurrencyCode,
    /// Completion percentage, `0..=100`.
    pub progress: u8,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

/// A customer account.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    /// Lifetime spend, in the dashboard's reporting currency.
    pub total_spent: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}
