//! Lenient decoding helpers for upstream JSON
//!
//! Gamma and CLOB payloads are loosely typed: numbers arrive as strings,
//! lists arrive as JSON-encoded strings, ids flip between strings and
//! integers. These helpers turn such values into typed data without failing
//! the surrounding record.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Parse a decimal from a string, accepting scientific notation
///
/// Placeholder values (`"["`, `"]"`, empty) and garbage yield `None`.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim().trim_matches('"');
    if trimmed.is_empty() || trimmed == "[" || trimmed == "]" {
        return None;
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(Decimal::from_f64))
}

/// Decimal from a JSON number, numeric string or placeholder
///
/// Irrecoverable values become zero.
pub fn decimal_or_zero(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string())
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => parse_decimal(s).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// String list from a JSON array or a JSON-encoded array string
///
/// Elements that are numbers are stringified; anything unreadable yields an
/// empty list.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_string).collect(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(inner @ Value::Array(_)) => string_list(&inner),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Raw element list from a JSON array or a JSON-encoded array string
///
/// Unlike [`string_list`] the elements are kept as JSON values so each can be
/// decoded leniently on its own.
pub fn value_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// String form of a scalar JSON value (string or number)
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Lossy conversion for storage columns typed REAL
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Inverse of [`decimal_to_f64`]
pub fn f64_to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// serde adapter: decimal from number, string or placeholder (default 0)
pub fn de_lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(decimal_or_zero).unwrap_or(Decimal::ZERO))
}

/// serde adapter: required id given as string or number
pub fn de_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_string(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected string or number, got {value}")))
}

/// serde adapter: optional string that may arrive as a number
pub fn de_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_string))
}

/// serde adapter: bool that tolerates `null` and `"true"`/`"false"` strings
pub fn de_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_decimal_from_number_and_string() {
        assert_eq!(decimal_or_zero(&json!(0.55)), dec!(0.55));
        assert_eq!(decimal_or_zero(&json!("0.45")), dec!(0.45));
        assert_eq!(decimal_or_zero(&json!(1200)), dec!(1200));
    }

    #[test]
    fn test_decimal_placeholders_become_zero() {
        assert_eq!(decimal_or_zero(&json!("[")), Decimal::ZERO);
        assert_eq!(decimal_or_zero(&json!("]")), Decimal::ZERO);
        assert_eq!(decimal_or_zero(&json!("")), Decimal::ZERO);
        assert_eq!(decimal_or_zero(&json!("n/a")), Decimal::ZERO);
        assert_eq!(decimal_or_zero(&json!(null)), Decimal::ZERO);
        assert_eq!(decimal_or_zero(&json!({"x": 1})), Decimal::ZERO);
    }

    #[test]
    fn test_decimal_scientific_notation() {
        assert_eq!(parse_decimal("1e-3"), Some(dec!(0.001)));
        assert_eq!(parse_decimal("2.5E2"), Some(dec!(250)));
    }

    #[test]
    fn test_string_list_from_array_and_encoded_string() {
        assert_eq!(string_list(&json!(["Yes", "No"])), vec!["Yes", "No"]);
        assert_eq!(
            string_list(&json!("[\"123\", \"456\"]")),
            vec!["123", "456"]
        );
        assert_eq!(string_list(&json!([1, 2])), vec!["1", "2"]);
    }

    #[test]
    fn test_string_list_garbage_is_empty() {
        assert!(string_list(&json!("not json")).is_empty());
        assert!(string_list(&json!(42)).is_empty());
        assert!(string_list(&json!("{\"a\": 1}")).is_empty());
    }

    #[test]
    fn test_value_list_keeps_raw_elements() {
        let values = value_list(&json!("[\"0.6\", 0.4]"));
        assert_eq!(values.len(), 2);
        assert_eq!(decimal_or_zero(&values[0]), dec!(0.6));
        assert_eq!(decimal_or_zero(&values[1]), dec!(0.4));
    }

    #[test]
    fn test_f64_conversions() {
        assert_eq!(decimal_to_f64(dec!(0.25)), 0.25);
        assert_eq!(f64_to_decimal(0.5), dec!(0.5));
        assert_eq!(f64_to_decimal(f64::NAN), Decimal::ZERO);
    }

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "de_string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "de_lenient_decimal")]
        volume: Decimal,
        #[serde(default, deserialize_with = "de_lenient_bool")]
        active: bool,
    }

    #[test]
    fn test_serde_adapters() {
        let probe: Probe =
            serde_json::from_value(json!({"id": 17, "volume": "12.5", "active": "true"})).unwrap();
        assert_eq!(probe.id, "17");
        assert_eq!(probe.volume, dec!(12.5));
        assert!(probe.active);

        let probe: Probe = serde_json::from_value(json!({"id": "abc", "volume": null})).unwrap();
        assert_eq!(probe.volume, Decimal::ZERO);
        assert!(!probe.active);

        assert!(serde_json::from_value::<Probe>(json!({"id": null})).is_err());
    }
}
