//! Lifting channel payloads into [`CanonicalOrder`]s.
//!
//! Each channel has a `canonicalize_*` function taking the raw payload bytes, the integration id and the owning
//! business, and an `*_at` variant that takes an explicit [`OrderSource`] (and hence an explicit ingestion time).
//! The raw bytes are kept, untouched, in `channel_metadata.raw_data`.
//!
//! Rules shared by every channel:
//! * `imported_at` is the ingestion time. `occurred_at` is the channel's creation date, or the ingestion time if the
//!   date cannot be parsed, and never later than `imported_at`.
//! * `tax` is the payload's tax total when it has one, and `subtotal × 0.19` otherwise.
//! * Item quantities are coerced to at least one. An item's tax rate is the rate the channel declares, else the
//!   rate implied by the item's tax total, else 0.19.
//! * `total_amount` is the total the channel reports, even when it disagrees with the sum of the parts.
mod hosted;
mod marketplace;
pub mod status;
mod storefront;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::*;
use osim_common::{parse_money, round_money, MoneyError, DEFAULT_TAX_RATE};
use thiserror::Error;

pub use hosted::{canonicalize_hosted, canonicalize_hosted_at};
pub use marketplace::{canonicalize_marketplace, canonicalize_marketplace_at};
pub use storefront::{canonicalize_storefront, canonicalize_storefront_at};

use crate::order_types::{CanonicalOrder, OrderItem, Platform};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalizationError {
    #[error("Malformed {platform} payload: {reason}")]
    MalformedPayload { platform: &'static str, reason: String },
    #[error("Invalid amount in '{field}': {reason}")]
    InvalidAmount { field: String, reason: String },
    #[error("The {0} payload does not carry an order id")]
    MissingOrderId(&'static str),
    #[error("There is no channel payload for {0} orders")]
    UnsupportedPlatform(&'static str),
}

impl CanonicalizationError {
    fn malformed(platform: Platform, e: serde_json::Error) -> Self {
        Self::MalformedPayload { platform: platform.tag(), reason: e.to_string() }
    }
}

/// Where an order comes from and when it was ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSource {
    pub integration_id: u32,
    pub business_id: Option<u32>,
    pub imported_at: DateTime<Utc>,
}

impl OrderSource {
    pub fn new(integration_id: u32, business_id: Option<u32>, imported_at: DateTime<Utc>) -> Self {
        Self { integration_id, business_id, imported_at }
    }

    /// A source ingested right now.
    pub fn now(integration_id: u32, business_id: Option<u32>) -> Self {
        Self::new(integration_id, business_id, Utc::now())
    }
}

/// Canonicalizes a payload of the given channel.
pub fn canonicalize(
    platform: Platform,
    payload: &[u8],
    source: &OrderSource,
) -> Result<CanonicalOrder, CanonicalizationError> {
    match platform {
        Platform::Marketplace => canonicalize_marketplace_at(payload, source),
        Platform::Hosted => canonicalize_hosted_at(payload, source),
        Platform::Storefront => canonicalize_storefront_at(payload, source),
        Platform::Generic => Err(CanonicalizationError::UnsupportedPlatform(platform.tag())),
    }
}

//--------------------------------------   Shared rules   -----------------------------------------------------------

/// Parses channel timestamps: RFC 3339, or a zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` taken to be UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|t| t.and_utc())
}

pub(crate) fn occurred_at(value: Option<&str>, imported_at: DateTime<Utc>) -> DateTime<Utc> {
    let parsed = value.and_then(parse_timestamp);
    if parsed.is_none() {
        debug!("🏭️ Unparseable order date {value:?}. Using the ingestion time instead");
    }
    parsed.map(|t| t.min(imported_at)).unwrap_or(imported_at)
}

/// Parses a string amount. Empty strings are absent amounts.
pub(crate) fn optional_amount(field: &str, value: &str) -> Result<Option<f64>, CanonicalizationError> {
    match parse_money(value) {
        Ok(v) => Ok(Some(v)),
        Err(MoneyError::Empty) => Ok(None),
        Err(e) => Err(CanonicalizationError::InvalidAmount { field: field.to_string(), reason: e.to_string() }),
    }
}

pub(crate) fn amount(field: &str, value: &str) -> Result<f64, CanonicalizationError> {
    optional_amount(field, value).map(|v| v.unwrap_or_default())
}

pub(crate) fn positive_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.max(1)).unwrap_or(u32::MAX)
}

pub(crate) fn customer_name(first_name: &str, last_name: &str) -> String {
    let first_name = first_name.trim();
    let last_name = last_name.trim();
    if last_name.is_empty() {
        first_name.to_string()
    } else {
        format!("{first_name} {last_name}")
    }
}

/// Splits `"Laura Gómez Pérez"` into `("Laura", "Gómez Pérez")`.
pub(crate) fn split_name(full_name: &str) -> (String, String) {
    let full_name = full_name.trim();
    match full_name.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (full_name.to_string(), String::new()),
    }
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub(crate) fn tax_or_default(explicit: Option<f64>, subtotal: f64) -> f64 {
    round_money(explicit.unwrap_or(subtotal * DEFAULT_TAX_RATE))
}

/// The source-side description of one order line.
pub(crate) struct LineSpec {
    pub sku: String,
    pub name: String,
    pub title: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount_per_unit: f64,
    pub tax: Option<f64>,
    pub tax_rate: Option<f64>,
    pub currency: String,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub weight: Option<f64>,
    pub product_id: Option<String>,
}

impl LineSpec {
    pub fn into_item(self) -> OrderItem {
        let quantity = positive_quantity(self.quantity);
        let unit_price = round_money(self.unit_price.max(0.0));
        let discount = round_money(self.discount_per_unit.clamp(0.0, unit_price));
        let total_price = round_money((unit_price - discount) * f64::from(quantity));
        let tax_rate = self.tax_rate.or_else(|| match self.tax {
            Some(tax) if total_price > 0.0 => Some(tax / total_price),
            _ => None,
        });
        let tax_rate = tax_rate.unwrap_or(DEFAULT_TAX_RATE);
        let tax = round_money(total_price * tax_rate);
        OrderItem {
            product_sku: self.sku,
            product_name: self.name,
            product_title: self.title,
            quantity,
            unit_price,
            total_price,
            currency: self.currency,
            discount,
            tax,
            tax_rate: Some(tax_rate),
            image_url: self.image_url,
            product_url: self.product_url,
            weight: self.weight,
            product_id: self.product_id,
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T00:00:00-05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00:00.000-05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T05:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 05:00:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn occurred_at_never_follows_import() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(occurred_at(Some("2030-01-01T00:00:00Z"), now), now);
        assert_eq!(occurred_at(Some("garbage"), now), now);
        assert_eq!(occurred_at(None, now), now);
        let earlier = Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(occurred_at(Some("2023-12-31T23:00:00Z"), now), earlier);
    }

    #[test]
    fn names() {
        assert_eq!(customer_name("A", ""), "A");
        assert_eq!(customer_name("Laura", "Gómez"), "Laura Gómez");
        assert_eq!(split_name("Laura Gómez Pérez"), ("Laura".to_string(), "Gómez Pérez".to_string()));
        assert_eq!(split_name("Cher"), ("Cher".to_string(), String::new()));
    }

    fn line(quantity: i64, unit_price: f64, discount: f64, tax: Option<f64>, tax_rate: Option<f64>) -> OrderItem {
        LineSpec {
            sku: "X".into(),
            name: "X".into(),
            title: "X".into(),
            quantity,
            unit_price,
            discount_per_unit: discount,
            tax,
            tax_rate,
            currency: "COP".into(),
            image_url: None,
            product_url: None,
            weight: None,
            product_id: None,
        }
        .into_item()
    }

    #[test]
    fn line_items() {
        let item = line(0, 5000.0, 0.0, None, None);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.total_price, 5000.0);
        assert_eq!(item.tax, 950.0);
        assert_eq!(item.tax_rate, Some(0.19));

        let item = line(3, 1000.0, 100.0, None, Some(0.05));
        assert_eq!(item.total_price, 2700.0);
        assert_eq!(item.tax, 135.0);

        let item = line(2, 1000.0, 0.0, Some(100.0), None);
        assert_eq!(item.tax_rate, Some(0.05));
        assert_eq!(item.tax, 100.0);

        let item = line(-4, 1000.0, 2000.0, None, None);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.discount, 1000.0);
        assert_eq!(item.total_price, 0.0);
    }

    #[test]
    fn amounts() {
        assert_eq!(amount("total", "10000"), Ok(10000.0));
        assert_eq!(amount("total", ""), Ok(0.0));
        assert_eq!(optional_amount("total", ""), Ok(None));
        assert!(matches!(amount("total", "1,000"), Err(CanonicalizationError::InvalidAmount { .. })));
    }
}
