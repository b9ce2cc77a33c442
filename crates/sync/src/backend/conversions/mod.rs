//! Type conversions between backend rows and domain types.
//!
//! Rows are loosely typed snake_case JSON. Every field read here is defensive:
//! a missing, null or wrongly typed value becomes the field's documented
//! default, and enumerations fall back to their default member. Mapping never
//! fails and has no side effects, so it may be repeated freely.
//!
//! The inverse direction (`*_row`) writes decimals as strings to preserve
//! precision.

mod customers;
mod orders;
mod products;
mod projects;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use siteline_core::UNKNOWN_ID;

pub use customers::{customer_row, map_customer};
pub use orders::{map_order, map_order_item, order_row};
pub use products::{map_product, product_row};
pub use projects::{map_project, project_row};

// =============================================================================
// Field readers
// =============================================================================

/// A string field; numbers are rendered, blank strings count as absent.
pub(crate) fn text(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A string field with a default.
pub(crate) fn text_or(row: &Value, key: &str, default: &str) -> String {
    text(row, key).unwrap_or_else(|| default.to_string())
}

/// The row's id, or [`UNKNOWN_ID`].
pub(crate) fn id(row: &Value) -> String {
    text_or(row, "id", UNKNOWN_ID)
}

/// A decimal from a JSON number or numeric string, else zero.
pub(crate) fn decimal(row: &Value, key: &str) -> Decimal {
    decimal_opt(row, key).unwrap_or(Decimal::ZERO)
}

pub(crate) fn decimal_opt(row: &Value, key: &str) -> Option<Decimal> {
    match row.get(key)? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// An integer from an integral number, a float (truncated) or a numeric string.
pub(crate) fn integer(row: &Value, key: &str) -> i64 {
    match row.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate_f64))
            .unwrap_or(0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().and_then(truncate_f64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// An `i32` field, saturating at the type's bounds.
pub(crate) fn integer_i32(row: &Value, key: &str) -> i32 {
    let value = integer(row, key);
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)] // bounds checked before the cast
fn truncate_f64(f: f64) -> Option<i64> {
    (f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64).then(|| f.trunc() as i64)
}

/// A boolean from a bool, `"true"`/`"false"`, or `0`/`1`.
pub(crate) fn boolean(row: &Value, key: &str, default: bool) -> bool {
    match row.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().map_or(default, |v| v != 0),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => default,
        },
        _ => default,
    }
}

/// An RFC 3339 timestamp.
pub(crate) fn timestamp(row: &Value, key: &str) -> Option<DateTime<Utc>> {
    let raw = text(row, key)?;
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A `YYYY-MM-DD` date, or the date part of an RFC 3339 timestamp.
pub(crate) fn date(row: &Value, key: &str) -> Option<NaiveDate> {
    let raw = text(row, key)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| timestamp(row, key).map(|dt| dt.date_naive()))
}

/// An enumerated field, falling back to the enum's default member.
pub(crate) fn enumeration<T>(row: &Value, key: &str) -> T
where
    T: FromStr + Default,
{
    text(row, key)
        .and_then(|raw| raw.parse::<T>().ok())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use siteline_core::OrderStatus;

    use super::*;

    #[test]
    fn test_text_accepts_numbers_and_rejects_blank() {
        let row = json!({"a": 42, "b": "  ", "c": "x", "d": null});
        assert_eq!(text(&row, "a").as_deref(), Some("42"));
        assert_eq!(text(&row, "b"), None);
        assert_eq!(text(&row, "c").as_deref(), Some("x"));
        assert_eq!(text(&row, "d"), None);
    }

    #[test]
    fn test_decimal_coercions() {
        let row = json!({"n": 19.99, "s": "5.50", "bad": "abc", "obj": {}});
        assert_eq!(decimal(&row, "n"), Decimal::new(1999, 2));
        assert_eq!(decimal(&row, "s"), Decimal::new(550, 2));
        assert_eq!(decimal(&row, "bad"), Decimal::ZERO);
        assert_eq!(decimal(&row, "obj"), Decimal::ZERO);
        assert_eq!(decimal(&row, "missing"), Decimal::ZERO);
    }

    #[test]
    fn test_integer_coercions() {
        let row = json!({"i": 7, "f": 7.9, "s": "12", "sf": "3.5", "b": true, "huge": 1e300});
        assert_eq!(integer(&row, "i"), 7);
        assert_eq!(integer(&row, "f"), 7);
        assert_eq!(integer(&row, "s"), 12);
        assert_eq!(integer(&row, "sf"), 3);
        assert_eq!(integer(&row, "b"), 0);
        assert_eq!(integer(&row, "huge"), 0);
    }

    #[test]
    fn test_integer_i32_saturates() {
        let row = json!({"big": 9_000_000_000_i64, "small": -9_000_000_000_i64});
        assert_eq!(integer_i32(&row, "big"), i32::MAX);
        assert_eq!(integer_i32(&row, "small"), i32::MIN);
    }

    #[test]
    fn test_boolean_coercions() {
        let row = json!({"t": "TRUE", "one": 1, "zero": 0, "junk": "perhaps"});
        assert!(boolean(&row, "t", false));
        assert!(boolean(&row, "one", false));
        assert!(!boolean(&row, "zero", true));
        assert!(boolean(&row, "junk", true));
        assert!(!boolean(&row, "missing", false));
    }

    #[test]
    fn test_dates() {
        let row = json!({"d": "2026-03-02", "ts": "2026-03-02T10:15:00+02:00", "bad": "soon"});
        assert_eq!(date(&row, "d"), NaiveDate::from_ymd_opt(2026, 3, 2));
        assert_eq!(date(&row, "ts"), NaiveDate::from_ymd_opt(2026, 3, 2));
        assert_eq!(
            timestamp(&row, "ts").unwrap().to_rfc3339(),
            "2026-03-02T08:15:00+00:00"
        );
        assert_eq!(date(&row, "bad"), None);
    }

    #[test]
    fn test_enumeration_falls_back() {
        let row = json!({"ok": "SHIPPED", "bad": "lost-at-sea", "num": 3});
        assert_eq!(enumeration::<OrderStatus>(&row, "ok"), OrderStatus::Shipped);
        assert_eq!(enumeration::<OrderStatus>(&row, "bad"), OrderStatus::Pending);
        assert_eq!(enumeration::<OrderStatus>(&row, "num"), OrderStatus::Pending);
    }

    #[test]
    fn test_non_object_rows() {
        for row in [json!(null), json!([1, 2]), json!("row"), json!(5)] {
            assert_eq!(id(&row), UNKNOWN_ID);
            assert_eq!(decimal(&row, "price"), Decimal::ZERO);
        }
    }
}
