//! Lenient numeric handling for payloads coming from the ERP backend
//!
//! The backend is loose about numbers: quantities and costs arrive as JSON
//! numbers, numeric strings, `null`, or occasionally garbage. Everything is
//! coerced the way the web client always did it: a value that does not read
//! as a number counts as zero.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an arbitrary JSON value to a decimal, falling back to zero
pub fn coerce_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        Value::Bool(true) => Decimal::ONE,
        _ => Decimal::ZERO,
    }
}

/// Parse decimal text, accepting plain and scientific notation
pub fn parse_decimal(text: &str) -> Decimal {
    let text = text.trim();
    if text.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

/// Division that resolves to zero instead of failing on a zero divisor
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Product that resolves to zero when it does not fit in a decimal
///
/// Quantities and costs are whatever the backend sent, so a product can
/// leave the representable range. Such a value is unusable and counts as
/// zero like any other unreadable number.
pub fn safe_mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::ZERO)
}

/// Sum of two decimals, zero when it does not fit
pub fn safe_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::ZERO)
}

/// Difference of two decimals, zero when it does not fit
pub fn safe_sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b).unwrap_or(Decimal::ZERO)
}

/// Total of a sequence; an overflowing total is zero as a whole
pub fn safe_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .unwrap_or(Decimal::ZERO)
}

/// serde helper: required numeric field, coerced to zero when unreadable
pub fn lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_decimal(&value))
}

/// serde helper: optional numeric field
///
/// `null` and a missing field stay `None` so that `a ?? b` style fallbacks
/// behave as before; any other value is coerced.
pub fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(coerce_decimal(&v)),
    })
}

/// serde helper: optional date given either as `YYYY-MM-DD` or an ISO timestamp
pub fn lenient_date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s
            .get(..10)
            .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_numbers_and_strings() {
        assert_eq!(coerce_decimal(&json!(12.5)), Decimal::new(125, 1));
        assert_eq!(coerce_decimal(&json!("7")), Decimal::from(7));
        assert_eq!(coerce_decimal(&json!(" 3.25 ")), Decimal::new(325, 2));
        assert_eq!(coerce_decimal(&json!("1e3")), Decimal::from(1000));
    }

    #[test]
    fn test_coerce_garbage_is_zero() {
        assert_eq!(coerce_decimal(&json!(null)), Decimal::ZERO);
        assert_eq!(coerce_decimal(&json!("abc")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&json!("")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&json!({"x": 1})), Decimal::ZERO);
        assert_eq!(coerce_decimal(&json!(false)), Decimal::ZERO);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(Decimal::from(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(Decimal::from(10), Decimal::from(4)), Decimal::new(25, 1));
    }

    #[test]
    fn test_overflowing_arithmetic_is_zero() {
        let huge = Decimal::MAX;
        assert_eq!(safe_mul(huge, Decimal::from(2)), Decimal::ZERO);
        assert_eq!(safe_add(huge, huge), Decimal::ZERO);
        assert_eq!(safe_sub(Decimal::MIN, huge), Decimal::ZERO);
        assert_eq!(safe_sum([huge, Decimal::ONE]), Decimal::ZERO);
        assert_eq!(safe_sum([Decimal::ONE, Decimal::from(2)]), Decimal::from(3));
        assert_eq!(safe_mul(Decimal::from(6), Decimal::new(5, 1)), Decimal::from(3));
    }

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient")]
        qty: Decimal,
        #[serde(default, deserialize_with = "lenient_opt")]
        cost: Option<Decimal>,
        #[serde(default, deserialize_with = "lenient_date_opt")]
        date: Option<NaiveDate>,
    }

    #[test]
    fn test_lenient_fields() {
        let p: Probe = serde_json::from_value(json!({"qty": "x", "cost": null})).unwrap();
        assert_eq!(p.qty, Decimal::ZERO);
        assert_eq!(p.cost, None);
        assert_eq!(p.date, None);

        let p: Probe = serde_json::from_value(json!({"cost": "oops", "date": "2024-03-01T10:00:00Z"}))
            .unwrap();
        assert_eq!(p.qty, Decimal::ZERO);
        assert_eq!(p.cost, Some(Decimal::ZERO));
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
