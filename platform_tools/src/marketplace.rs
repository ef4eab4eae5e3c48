//! The marketplace-seller channel.
//!
//! Orders arrive as a seller/buyer/shipping/payments tree. Money is carried as JSON numbers, timestamps are ISO-8601
//! with an offset. The order only carries the net item amount (`total_amount`) and the amount including shipping
//! (`total_amount_with_shipping`); no tax breakdown is provided.
use chrono::{DateTime, Duration, Utc};
use osim_common::{money::flexible, round_money};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    fixtures::{ADDRESSES, CARRIERS, CURRENCY, CUSTOMERS},
    helpers::{local_timestamp_millis, pick, pick_lines, random_digits, random_past, random_shipping_cost},
    SynthesisError,
};

pub const ORDER_STATUSES: [&str; 4] = ["paid", "pending", "confirmed", "cancelled"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceOrder {
    pub id: u64,
    pub status: String,
    pub status_detail: Option<String>,
    pub date_created: String,
    pub date_closed: Option<String>,
    pub last_updated: Option<String>,
    #[serde(deserialize_with = "flexible::money")]
    pub total_amount: f64,
    #[serde(deserialize_with = "flexible::money")]
    pub total_amount_with_shipping: f64,
    #[serde(deserialize_with = "flexible::money")]
    pub paid_amount: f64,
    pub currency_id: String,
    pub order_items: Vec<MarketplaceOrderItem>,
    pub buyer: MarketplaceBuyer,
    pub seller: MarketplaceSeller,
    pub shipping: MarketplaceShipping,
    pub payments: Vec<MarketplacePayment>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceOrderItem {
    pub item: MarketplaceItem,
    #[serde(deserialize_with = "flexible::quantity")]
    pub quantity: i64,
    #[serde(deserialize_with = "flexible::money")]
    pub unit_price: f64,
    #[serde(deserialize_with = "flexible::money")]
    pub full_unit_price: f64,
    pub currency_id: String,
    #[serde(deserialize_with = "flexible::money")]
    pub sale_fee: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceItem {
    pub id: String,
    pub title: String,
    pub seller_sku: Option<String>,
    pub category_id: String,
    pub condition: String,
    pub thumbnail: Option<String>,
    pub permalink: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceBuyer {
    pub id: u64,
    pub nickname: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: MarketplacePhone,
    pub billing_info: MarketplaceBillingInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplacePhone {
    pub area_code: String,
    pub number: String,
}

impl MarketplacePhone {
    /// The full number, `+<area_code><number>`, or an empty string when no number is known.
    pub fn full_number(&self) -> String {
        match (self.area_code.is_empty(), self.number.is_empty()) {
            (_, true) => String::new(),
            (true, false) => self.number.clone(),
            (false, false) => format!("+{}{}", self.area_code.trim_start_matches('+'), self.number),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceBillingInfo {
    pub doc_type: String,
    pub doc_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceSeller {
    pub id: u64,
    pub nickname: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceShipping {
    pub id: u64,
    pub status: String,
    pub shipment_type: String,
    pub tracking_number: Option<String>,
    pub tracking_method: Option<String>,
    pub date_created: Option<String>,
    pub estimated_delivery: Option<String>,
    pub receiver_address: MarketplaceAddress,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceAddress {
    pub id: u64,
    pub address_line: String,
    pub comment: Option<String>,
    pub zip_code: String,
    pub city: MarketplaceNamed,
    pub state: MarketplaceNamed,
    pub country: MarketplaceNamed,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub receiver_name: String,
    pub receiver_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceNamed {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplacePayment {
    pub id: u64,
    pub order_id: u64,
    pub payer_id: u64,
    pub status: String,
    pub status_detail: Option<String>,
    pub payment_method_id: String,
    pub payment_type: String,
    pub installments: u32,
    #[serde(deserialize_with = "flexible::money")]
    pub transaction_amount: f64,
    #[serde(deserialize_with = "flexible::money")]
    pub shipping_cost: f64,
    #[serde(deserialize_with = "flexible::money")]
    pub total_paid_amount: f64,
    pub currency_id: String,
    pub date_created: String,
    pub date_approved: Option<String>,
    pub authorization_code: Option<String>,
}

/// Generates a marketplace order payload.
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Result<Vec<u8>, SynthesisError> {
    let order = build_order(rng, now)?;
    Ok(serde_json::to_vec(&order)?)
}

pub fn build_order<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Result<MarketplaceOrder, SynthesisError> {
    let customer = pick(rng, CUSTOMERS, "customers")?;
    let address = pick(rng, ADDRESSES, "addresses")?;
    let status = *pick(rng, &ORDER_STATUSES, "marketplace statuses")?;
    let created = random_past(rng, now);
    let order_id = rng.gen_range(2_000_000_000_000_u64..3_000_000_000_000);

    let order_items = pick_lines(rng, 3, 3)?
        .into_iter()
        .map(|(product, quantity)| MarketplaceOrderItem {
            item: MarketplaceItem {
                id: format!("MCO{}", product.id + 1_000_000_000),
                title: product.title.to_string(),
                seller_sku: Some(product.sku.to_string()),
                category_id: "MCO1384".to_string(),
                condition: "new".to_string(),
                thumbnail: Some(product.image_url.to_string()),
                permalink: Some(product.product_url.to_string()),
            },
            quantity,
            unit_price: product.price,
            full_unit_price: product.price,
            currency_id: CURRENCY.to_string(),
            sale_fee: round_money(product.price * 0.13),
        })
        .collect::<Vec<_>>();
    #[allow(clippy::cast_precision_loss)]
    let total_amount = round_money(order_items.iter().map(|i| i.unit_price * i.quantity as f64).sum());
    let shipping_cost = if rng.gen_bool(0.2) { 0.0 } else { random_shipping_cost(rng) };
    let total_amount_with_shipping = round_money(total_amount + shipping_cost);

    let (payment_status, status_detail) = match status {
        "paid" | "confirmed" => ("approved", "accredited"),
        "cancelled" => {
            if rng.gen_bool(0.5) {
                ("rejected", "cc_rejected_insufficient_amount")
            } else {
                ("cancelled", "by_collector")
            }
        },
        _ => ("in_process", "pending_review_manual"),
    };
    let approved = payment_status == "approved";
    let paid_amount = if approved { total_amount_with_shipping } else { 0.0 };
    let (payment_method_id, payment_type) = match rng.gen_range(0..3) {
        0 => ("visa", "credit_card"),
        1 => ("pse", "bank_transfer"),
        _ => ("account_money", "account_money"),
    };
    let payment = MarketplacePayment {
        id: rng.gen_range(70_000_000_000_u64..80_000_000_000),
        order_id,
        payer_id: customer.id,
        status: payment_status.to_string(),
        status_detail: Some(status_detail.to_string()),
        payment_method_id: payment_method_id.to_string(),
        payment_type: payment_type.to_string(),
        installments: if payment_type == "credit_card" { rng.gen_range(1..=12) } else { 1 },
        transaction_amount: total_amount,
        shipping_cost,
        total_paid_amount: paid_amount,
        currency_id: CURRENCY.to_string(),
        date_created: local_timestamp_millis(created),
        date_approved: approved.then(|| local_timestamp_millis(created + Duration::seconds(rng.gen_range(5..=90)))),
        authorization_code: approved.then(|| random_digits(rng, 6)),
    };

    let shipped = approved && rng.gen_bool(0.6);
    let carrier = pick(rng, CARRIERS, "carriers")?;
    let shipping = MarketplaceShipping {
        id: rng.gen_range(40_000_000_000_u64..50_000_000_000),
        status: if shipped { "shipped" } else { "ready_to_ship" }.to_string(),
        shipment_type: "shipping".to_string(),
        tracking_number: shipped.then(|| format!("MEL{}", random_digits(rng, 11))),
        tracking_method: shipped.then(|| carrier.name.to_string()),
        date_created: Some(local_timestamp_millis(created)),
        estimated_delivery: shipped.then(|| local_timestamp_millis(created + Duration::days(3))),
        receiver_address: MarketplaceAddress {
            id: rng.gen_range(1_100_000_000_u64..1_200_000_000),
            address_line: address.street.to_string(),
            comment: (!address.street2.is_empty()).then(|| address.street2.to_string()),
            zip_code: address.postal_code.to_string(),
            city: MarketplaceNamed { id: None, name: address.city.to_string() },
            state: MarketplaceNamed { id: Some(format!("CO-{}", address.state_code)), name: address.state.to_string() },
            country: MarketplaceNamed { id: Some(address.country_code.to_string()), name: address.country.to_string() },
            latitude: Some(address.latitude),
            longitude: Some(address.longitude),
            receiver_name: customer.full_name(),
            receiver_phone: Some(customer.local_phone().to_string()),
        },
    };

    Ok(MarketplaceOrder {
        id: order_id,
        status: status.to_string(),
        status_detail: None,
        date_created: local_timestamp_millis(created),
        date_closed: approved.then(|| local_timestamp_millis(created)),
        last_updated: Some(local_timestamp_millis(created)),
        total_amount,
        total_amount_with_shipping,
        paid_amount,
        currency_id: CURRENCY.to_string(),
        order_items,
        buyer: MarketplaceBuyer {
            id: customer.id,
            nickname: customer.nickname(),
            first_name: customer.first_name.to_string(),
            last_name: customer.last_name.to_string(),
            email: customer.email.to_string(),
            phone: MarketplacePhone { area_code: "57".to_string(), number: customer.local_phone().to_string() },
            billing_info: MarketplaceBillingInfo { doc_type: "CC".to_string(), doc_number: customer.dni.to_string() },
        },
        seller: MarketplaceSeller { id: 412_558_903, nickname: "TIENDAARTESANAL".to_string() },
        shipping,
        payments: vec![payment],
        tags: if approved { vec!["paid".to_string(), "not_delivered".to_string()] } else { vec![] },
    })
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::Value;

    use super::*;

    #[test]
    fn deserialize_sample_order() {
        let order: MarketplaceOrder =
            serde_json::from_str(include_str!("test_assets/marketplace_order.json")).expect("Failed to parse order");
        assert_eq!(order.id, 2_000_008_123_456);
        assert_eq!(order.status, "paid");
        assert_eq!(order.total_amount, 77_800.0);
        assert_eq!(order.total_amount_with_shipping, 82_800.0);
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.order_items[0].quantity, 2);
        assert_eq!(order.buyer.phone.full_number(), "+573001234567");
        assert_eq!(order.shipping.tracking_number.as_deref(), Some("MEL40012345678"));
        assert_eq!(order.shipping.receiver_address.city.name, "Bogotá");
        assert_eq!(order.payments[0].status, "approved");
    }

    #[test]
    fn synthesized_orders_hold_together() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        for _ in 0..50 {
            let order = build_order(&mut rng, now).unwrap();
            assert!(ORDER_STATUSES.contains(&order.status.as_str()));
            assert!((1..=3).contains(&order.order_items.len()));
            assert!(order.total_amount_with_shipping >= order.total_amount);
            assert_eq!(order.currency_id, "COP");
            assert_eq!(order.payments.len(), 1);
            assert_eq!(order.payments[0].payer_id, order.buyer.id);
            assert_eq!(order.shipping.receiver_address.receiver_name, format!("{} {}", order.buyer.first_name, order.buyer.last_name));
            assert!(DateTime::parse_from_rfc3339(&order.date_created).is_ok());
        }
    }

    #[test]
    fn synthesize_emits_required_fields() {
        let mut rng = StdRng::seed_from_u64(11);
        let bytes = synthesize(&mut rng, Utc::now()).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        for field in [
            "id",
            "status",
            "total_amount",
            "total_amount_with_shipping",
            "paid_amount",
            "currency_id",
            "date_created",
            "buyer",
            "payments",
        ] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert!(value["id"].is_u64());
        assert!(value["shipping"]["receiver_address"].is_object());
        assert!(value["buyer"]["billing_info"]["doc_number"].is_string());
        assert!(value["order_items"][0]["sale_fee"].is_f64());
    }

    #[test]
    fn same_seed_same_payload() {
        let now = Utc::now();
        let a = synthesize(&mut StdRng::seed_from_u64(99), now).unwrap();
        let b = synthesize(&mut StdRng::seed_from_u64(99), now).unwrap();
        assert_eq!(a, b);
    }
}
