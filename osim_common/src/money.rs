//! Monetary amounts.
//!
//! Amounts are carried as `f64` and rounded to two decimal places whenever they are derived from other amounts.
//! Comparisons must go through [`money_eq`], which tolerates the rounding error introduced by that scheme.
//!
//! On the wire, platforms express money either as JSON numbers or as strings. Strings always use a fixed dot-decimal
//! representation with no thousands separators, e.g. `"89900.00"`. [`format_money`] and [`parse_money`] produce and
//! consume that representation, and the [`flexible`] module lets serde accept either form.
use thiserror::Error;

/// Two amounts closer than this are considered equal.
pub const MONEY_EPSILON: f64 = 0.005;

/// Tax rate applied when a source does not declare one.
pub const DEFAULT_TAX_RATE: f64 = 0.19;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("An empty string is not a valid amount")]
    Empty,
    #[error("Invalid amount: {0}")]
    Invalid(String),
    #[error("Amounts must be expressed without thousands separators: {0}")]
    ThousandsSeparator(String),
    #[error("Amounts may not be negative: {0}")]
    Negative(String),
}

/// Rounds to two decimal places.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn money_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= MONEY_EPSILON
}

/// Renders an amount as a fixed dot-decimal string with two decimals.
pub fn format_money(value: f64) -> String {
    format!("{:.2}", round_money(value))
}

/// Parses a dot-decimal amount string, e.g. `"1250"`, `"1250.5"` or `"1250.50"`.
pub fn parse_money(value: &str) -> Result<f64, MoneyError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MoneyError::Empty);
    }
    if value.contains(',') {
        return Err(MoneyError::ThousandsSeparator(value.to_string()));
    }
    let mut parts = value.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();
    let digits_only = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if whole.starts_with('-') {
        return Err(MoneyError::Negative(value.to_string()));
    }
    if !digits_only(whole) || fraction.is_some_and(|f| !digits_only(f)) {
        return Err(MoneyError::Invalid(value.to_string()));
    }
    value.parse::<f64>().map_err(|e| MoneyError::Invalid(format!("{value}. {e}")))
}

/// Serde helpers that accept amounts and quantities either as JSON numbers or as numeric strings.
pub mod flexible {
    use serde::{de, Deserialize, Deserializer};

    use super::parse_money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    fn to_amount<E: de::Error>(value: NumberOrString) -> Result<f64, E> {
        match value {
            NumberOrString::Number(n) if n.is_finite() && n >= 0.0 => Ok(n),
            NumberOrString::Number(n) => Err(E::custom(format!("{n} is not a valid amount"))),
            NumberOrString::Text(s) => parse_money(&s).map_err(E::custom),
        }
    }

    /// An amount given as a number or a dot-decimal string.
    pub fn money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        to_amount(NumberOrString::deserialize(deserializer)?)
    }

    /// As [`money`], but `null`, a missing field (with `#[serde(default)]`) or an empty string yield `None`.
    pub fn optional_money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(v) => to_amount(v).map(Some),
        }
    }

    /// A quantity given as an integer, a float or a numeric string. Fractions are rounded. The value is not
    /// range-checked here; consumers decide how to treat zero or negative quantities.
    pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let value = match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => n,
            NumberOrString::Text(s) => {
                s.trim().parse::<f64>().map_err(|e| de::Error::custom(format!("Invalid quantity '{s}'. {e}")))?
            },
        };
        if !value.is_finite() {
            return Err(de::Error::custom("Quantity must be a finite number"));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(value.round() as i64)
    }
}

#[cfg(test)]
mod test {
    use serde::Deserialize;

    use super::*;

    #[test]
    fn parse_amounts() {
        assert_eq!(parse_money("1250"), Ok(1250.0));
        assert_eq!(parse_money(" 1250.5 "), Ok(1250.5));
        assert_eq!(parse_money("0.99"), Ok(0.99));
        assert_eq!(parse_money(""), Err(MoneyError::Empty));
        assert_eq!(parse_money("1,250.00"), Err(MoneyError::ThousandsSeparator("1,250.00".into())));
        assert_eq!(parse_money("-5"), Err(MoneyError::Negative("-5".into())));
        assert!(matches!(parse_money("12.a"), Err(MoneyError::Invalid(_))));
        assert!(matches!(parse_money("1e5"), Err(MoneyError::Invalid(_))));
        assert!(matches!(parse_money("NaN"), Err(MoneyError::Invalid(_))));
    }

    #[test]
    fn format_amounts() {
        assert_eq!(format_money(89900.0), "89900.00");
        assert_eq!(format_money(0.1 + 0.2), "0.30");
        assert_eq!(format_money(17081.0 * 0.19), "3245.39");
    }

    #[test]
    fn rounding_and_tolerance() {
        assert_eq!(round_money(10.004), 10.0);
        assert_eq!(round_money(10.006), 10.01);
        assert!(money_eq(100.0, 100.004));
        assert!(!money_eq(100.0, 100.01));
    }

    #[derive(Debug, Deserialize)]
    struct Line {
        #[serde(deserialize_with = "flexible::money")]
        price: f64,
        #[serde(default, deserialize_with = "flexible::optional_money")]
        discount: Option<f64>,
        #[serde(deserialize_with = "flexible::quantity")]
        quantity: i64,
    }

    #[test]
    fn flexible_fields() {
        let line: Line = serde_json::from_str(r#"{"price": 5000, "quantity": "2"}"#).unwrap();
        assert_eq!(line.price, 5000.0);
        assert_eq!(line.discount, None);
        assert_eq!(line.quantity, 2);
        let line: Line = serde_json::from_str(r#"{"price": "12.50", "discount": "", "quantity": 1.6}"#).unwrap();
        assert_eq!(line.price, 12.5);
        assert_eq!(line.discount, None);
        assert_eq!(line.quantity, 2);
        let line: Line = serde_json::from_str(r#"{"price": "1", "discount": 0.5, "quantity": 0}"#).unwrap();
        assert_eq!(line.discount, Some(0.5));
        assert_eq!(line.quantity, 0);
        assert!(serde_json::from_str::<Line>(r#"{"price": "1,000", "quantity": 1}"#).is_err());
        assert!(serde_json::from_str::<Line>(r#"{"price": -1, "quantity": 1}"#).is_err());
    }
}
