//! The canonical order model.
//!
//! Every channel, and the generic path, produces exactly this shape. Field names are part of the broker contract:
//! consumers deserialize the published JSON with these names.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

//--------------------------------------   Platform   ---------------------------------------------------------------

/// The source channel of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Marketplace,
    Hosted,
    Storefront,
    /// Orders built directly from fixtures, without a channel payload.
    Generic,
}

impl Platform {
    /// The channels that have a native payload shape, in scheduler tick order.
    pub const CHANNELS: [Platform; 3] = [Platform::Marketplace, Platform::Hosted, Platform::Storefront];

    /// Resolves a requested platform name. Matching ignores case and treats `-` and spaces as `_`. Unknown names
    /// resolve to [`Platform::Generic`].
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "marketplace" | "market_place" => Self::Marketplace,
            "hosted" | "hosted_checkout" => Self::Hosted,
            "storefront" | "store_front" => Self::Storefront,
            _ => Self::Generic,
        }
    }

    /// The tag written to `platform`/`integration_type` and used as the routing key.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Marketplace => "marketplace",
            Self::Hosted => "hosted",
            Self::Storefront => "storefront",
            Self::Generic => "test",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

//--------------------------------------   Statuses   ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown status: {0}")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Confirmed,
    Authorized,
    PartiallyPaid,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Confirmed => "confirmed",
            Self::Authorized => "authorized",
            Self::PartiallyPaid => "partially_paid",
            Self::Processing => "processing",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "confirmed" => Ok(Self::Confirmed),
            "authorized" => Ok(Self::Authorized),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "processing" => Ok(Self::Processing),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            "failed" => Ok(Self::Failed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    Shipping,
    Billing,
}

//--------------------------------------   Raw payload   ------------------------------------------------------------

/// The source payload, embedded verbatim in the serialized order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(Box<RawValue>);

impl RawPayload {
    /// Wraps a JSON document. Fails if `bytes` is not valid JSON.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<Box<RawValue>>(bytes).map(Self)
    }

    pub fn from_json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::value::to_raw_value(value).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.get()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.get().as_bytes()
    }
}

impl PartialEq for RawPayload {
    fn eq(&self, other: &Self) -> bool {
        self.0.get() == other.0.get()
    }
}

//--------------------------------------   Canonical order   --------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_sku: String,
    pub product_name: String,
    pub product_title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    pub currency: String,
    /// Discount per unit.
    pub discount: f64,
    pub tax: f64,
    pub tax_rate: Option<f64>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub weight: Option<f64>,
    pub product_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub street2: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Address {
    /// A copy of this address with a different tag.
    pub fn retagged(&self, address_type: AddressType) -> Self {
        Self { address_type, ..self.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_method_id: u32,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub gateway: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub carrier: String,
    pub carrier_code: String,
    pub status: String,
    pub shipped_at: Option<DateTime<Utc>>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub shipping_cost: f64,
    pub weight: f64,
    pub warehouse_name: String,
}

pub const CHANNEL_METADATA_VERSION: u32 = 1;
pub const SYNC_STATUS_SYNCED: &str = "synced";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub channel_source: String,
    pub raw_data: RawPayload,
    pub version: u32,
    pub received_at: DateTime<Utc>,
    pub is_latest: bool,
    pub sync_status: String,
}

impl ChannelMetadata {
    pub fn new(platform: Platform, raw_data: RawPayload, received_at: DateTime<Utc>) -> Self {
        Self {
            channel_source: platform.tag().to_string(),
            raw_data,
            version: CHANNEL_METADATA_VERSION,
            received_at,
            is_latest: true,
            sync_status: SYNC_STATUS_SYNCED.to_string(),
        }
    }
}

pub const ORDER_TYPE_DELIVERY: &str = "delivery";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalOrder {
    pub business_id: Option<u32>,
    pub integration_id: u32,
    pub integration_type: String,
    pub platform: String,
    pub external_id: String,
    pub order_number: String,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub shipping_cost: f64,
    pub total_amount: f64,
    pub currency: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_dni: Option<String>,
    pub order_type_name: String,
    pub status: OrderStatus,
    pub original_status: String,
    pub occurred_at: DateTime<Utc>,
    pub imported_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub addresses: Vec<Address>,
    pub payments: Vec<Payment>,
    pub shipments: Vec<Shipment>,
    pub channel_metadata: ChannelMetadata,
}

impl CanonicalOrder {
    pub fn address(&self, address_type: AddressType) -> Option<&Address> {
        self.addresses.iter().find(|a| a.address_type == address_type)
    }

    /// Adds an address, replacing any existing address with the same tag.
    pub fn set_address(&mut self, address: Address) {
        match self.addresses.iter_mut().find(|a| a.address_type == address.address_type) {
            Some(existing) => *existing = address,
            None => self.addresses.push(address),
        }
    }

    /// `subtotal + tax + shipping_cost - discount`. May differ from `total_amount`, which is the figure the source
    /// reported.
    pub fn computed_total(&self) -> f64 {
        osim_common::round_money(self.subtotal + self.tax + self.shipping_cost - self.discount)
    }

    /// The compact JSON form published to the broker.
    pub fn to_message(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

//--------------------------------------   Requests   ---------------------------------------------------------------

/// A request to generate a batch of orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOrderRequest {
    /// Negative counts are accepted on the wire and read as zero, which [`Self::batch_size`] turns into one.
    #[serde(deserialize_with = "non_negative_count")]
    pub count: u32,
    pub platform: String,
    pub integration_id: u32,
    pub business_id: Option<u32>,
    pub status: String,
    pub include_payment: bool,
    pub include_shipment: bool,
}

fn non_negative_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let count = i64::deserialize(deserializer)?;
    Ok(u32::try_from(count.max(0)).unwrap_or(u32::MAX))
}

impl Default for GenerateOrderRequest {
    fn default() -> Self {
        Self {
            count: 1,
            platform: String::new(),
            integration_id: 0,
            business_id: None,
            status: String::new(),
            include_payment: false,
            include_shipment: false,
        }
    }
}

impl GenerateOrderRequest {
    pub fn new<S: Into<String>>(platform: S) -> Self {
        Self { platform: platform.into(), ..Default::default() }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_integration_id(mut self, integration_id: u32) -> Self {
        self.integration_id = integration_id;
        self
    }

    pub fn with_business_id(mut self, business_id: Option<u32>) -> Self {
        self.business_id = business_id;
        self
    }

    pub fn with_status<S: Into<String>>(mut self, status: S) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_payment(mut self, include_payment: bool) -> Self {
        self.include_payment = include_payment;
        self
    }

    pub fn with_shipment(mut self, include_shipment: bool) -> Self {
        self.include_shipment = include_shipment;
        self
    }

    /// The number of orders to generate. Never less than one.
    pub fn batch_size(&self) -> u32 {
        self.count.max(1)
    }

    pub fn platform(&self) -> Platform {
        Platform::from_name(&self.platform)
    }
}

/// Outcome tallies of a generate-and-publish batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationCounters {
    pub generated: u32,
    pub published: u32,
    pub failed: u32,
}

impl Display for GenerationCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} generated, {} published, {} failed", self.generated, self.published, self.failed)
    }
}
