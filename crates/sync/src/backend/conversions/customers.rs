//! Customer row conversions.

use serde_json::{Value, json};
use siteline_core::Customer;

use super::{decimal, id, text, text_or, timestamp};

/// Map a `customers` row.
#[must_use]
pub fn map_customer(row: &Value) -> Customer {
    Customer {
        id: id(row),
        name: text_or(row, "name", ""),
        email: text(row, "email"),
        phone: text(row, "phone"),
        company: text(row, "company"),
        total_spent: decimal(row, "total_spent"),
        created_at: timestamp(row, "created_at"),
    }
}

/// Build the `customers` row for `customer`.
#[must_use]
pub fn customer_row(customer: &Customer) -> Value {
    json!({
        "id": customer.id,
        "name": customer.name,
        "email": customer.email,
        "phone": customer.phone,
        "company": customer.company,
        "total_spent": customer.total_spent.to_string(),
        "created_at": customer.created_at.map(|t| t.to_rfc3339()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use siteline_core::UNKNOWN_ID;

    use super::*;

    #[test]
    fn test_map_customer() {
        let row = json!({
            "id": "c-1",
            "name": "Dana Ortiz",
            "email": "dana@harborworks.example",
            "phone": "",
            "company": "Harbor Works",
            "total_spent": 1520.75
        });

        let customer = map_customer(&row);
        assert_eq!(customer.name, "Dana Ortiz");
        assert_eq!(customer.phone, None);
        assert_eq!(customer.total_spent, Decimal::new(152_075, 2));
    }

    #[test]
    fn test_malformed_customer_is_fully_defaulted() {
        let customer = map_customer(&json!({"email": false, "total_spent": "lots"}));
        assert_eq!(customer.id, UNKNOWN_ID);
        assert_eq!(customer.email, None);
        assert_eq!(customer.total_spent, Decimal::ZERO);
    }

    #[test]
    fn test_customer_row() {
        let customer = Customer {
            id: "c-2".to_string(),
            name: "Lee Park".to_string(),
            total_spent: Decimal::new(4200, 2),
            ..Customer::default()
        };

        let row = customer_row(&customer);
        assert_eq!(row["total_spent"], "42.00");
        assert_eq!(row["email"], Value::Null);
        assert_eq!(map_customer(&row), customer);
    }
}
