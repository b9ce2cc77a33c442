//! Product row conversions.

use serde_json::{Value, json};
use siteline_core::Product;

use super::{boolean, decimal, enumeration, id, integer_i32, text, text_or, timestamp};

/// Map a `products` row.
#[must_use]
pub fn map_product(row: &Value) -> Product {
    Product {
        id: id(row),
        name: text_or(row, "name", ""),
        description: text_or(row, "description", ""),
        category: enumeration(row, "category"),
        price: decimal(row, "price"),
        currency: enumeration(row, "currency"),
        stock: integer_i32(row, "stock"),
        sku: text(row, "sku"),
        image_url: text(row, "image_url"),
        active: boolean(row, "active", true),
        created_at: timestamp(row, "created_at"),
    }
}

/// Build the `products` row for `product`.
#[must_use]
pub fn product_row(product: &Product) -> Value {
    json!({
        "id": product.id,
        "name": product.name,
        "description": product.description,
        "category": product.category.to_string(),
        "price": product.price.to_string(),
        "currency": product.currency.to_string(),
        "stock": product.stock,
        "sku": product.sku,
        "image_url": product.image_url,
        "active": product.active,
        "created_at": product.created_at.map(|t| t.to_rfc3339()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use siteline_core::{CurrencyCode, ProductCategory, UNKNOWN_ID};

    use super::*;

    #[test]
    fn test_map_full_row() {
        let row = json!({
            "id": "p-100",
            "name": "Portland cement 25kg",
            "description": "General purpose",
            "category": "materials",
            "price": "12.40",
            "currency": "eur",
            "stock": 85,
            "sku": "CEM-25",
            "image_url": null,
            "active": false,
            "created_at": "2026-01-05T09:00:00Z"
        });

        let product = map_product(&row);
        assert_eq!(product.id, "p-100");
        assert_eq!(product.category, ProductCategory::Materials);
        assert_eq!(product.price, Decimal::new(1240, 2));
        assert_eq!(product.currency, CurrencyCode::EUR);
        assert_eq!(product.stock, 85);
        assert_eq!(product.sku.as_deref(), Some("CEM-25"));
        assert_eq!(product.image_url, None);
        assert!(!product.active);
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_map_empty_row_is_fully_defaulted() {
        let product = map_product(&json!({}));
        assert_eq!(product.id, UNKNOWN_ID);
        assert_eq!(product.name, "");
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.category, ProductCategory::Other);
        assert_eq!(product.currency, CurrencyCode::USD);
        assert_eq!(product.stock, 0);
        assert!(product.active);
        assert_eq!(product.created_at, None);
    }

    #[test]
    fn test_map_wrong_types() {
        let row = json!({
            "id": 17,
            "name": ["not", "a", "name"],
            "price": {"amount": 3},
            "category": "spaceships",
            "stock": "12",
            "active": "nope"
        });

        let product = map_product(&row);
        assert_eq!(product.id, "17");
        assert_eq!(product.name, "");
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.category, ProductCategory::Other);
        assert_eq!(product.stock, 12);
        assert!(product.active);
    }

    #[test]
    fn test_row_writes_snake_case_and_string_decimals() {
        let product = Product {
            id: "p-1".to_string(),
            price: Decimal::new(1999, 2),
            image_url: Some("https://cdn.example.com/p-1.jpg".to_string()),
            ..Product::default()
        };

        let row = product_row(&product);
        assert_eq!(row["price"], "19.99");
        assert_eq!(row["image_url"], "https://cdn.example.com/p-1.jpg");
        assert_eq!(row["category"], "other");
        assert!(row.get("imageUrl").is_none());

        let back = map_product(&row);
        assert_eq!(back.price, product.price);
        assert_eq!(back.image_url, product.image_url);
    }
}
