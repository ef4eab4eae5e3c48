//! The self-hosted storefront channel.
//!
//! Order-level amounts are strings, item prices are numbers. `date_created`, `date_paid` and `date_completed` are
//! zone-less local timestamps; newer storefront versions also send a `_gmt` twin of each.
use chrono::{DateTime, Duration, Utc};
use osim_common::{format_money, money::flexible, round_money, DEFAULT_TAX_RATE};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    fixtures::{ADDRESSES, CARRIERS, CURRENCY, CUSTOMERS},
    helpers::{
        naive_local_timestamp,
        naive_utc_timestamp,
        pick,
        pick_lines,
        random_digits,
        random_past,
        random_shipping_cost,
        tax_on,
    },
    SynthesisError,
};

pub const ORDER_STATUSES: [&str; 7] = ["processing", "pending", "on-hold", "completed", "cancelled", "refunded", "failed"];

/// Meta key under which the storefront checkout stores the buyer's national id.
pub const BILLING_DNI_META_KEY: &str = "_billing_dni";

const PAYMENT_OPTIONS: [(&str, &str); 4] = [
    ("bacs", "Transferencia bancaria directa"),
    ("cod", "Pago contra entrega"),
    ("stripe", "Tarjeta de crédito"),
    ("pse", "PSE - Débito bancario"),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontOrder {
    pub id: u64,
    pub parent_id: u64,
    pub number: Option<String>,
    pub order_key: String,
    pub created_via: String,
    pub status: String,
    pub currency: String,
    pub date_created: String,
    pub date_created_gmt: Option<String>,
    pub date_modified: Option<String>,
    pub discount_total: String,
    pub shipping_total: String,
    pub cart_tax: String,
    pub total: String,
    pub total_tax: String,
    pub prices_include_tax: bool,
    pub customer_id: u64,
    pub customer_note: String,
    pub billing: StorefrontBilling,
    pub shipping: StorefrontShipping,
    pub payment_method: String,
    pub payment_method_title: String,
    pub transaction_id: String,
    pub date_paid: Option<String>,
    pub date_paid_gmt: Option<String>,
    pub date_completed: Option<String>,
    pub date_completed_gmt: Option<String>,
    pub meta_data: Vec<StorefrontMeta>,
    pub line_items: Vec<StorefrontLineItem>,
    pub shipping_lines: Vec<StorefrontShippingLine>,
}

impl StorefrontOrder {
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.meta_data.iter().find(|m| m.key == key).map(|m| &m.value)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontBilling {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontShipping {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontMeta {
    pub id: u64,
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontLineItem {
    pub id: u64,
    pub name: String,
    pub product_id: u64,
    pub variation_id: u64,
    #[serde(deserialize_with = "flexible::quantity")]
    pub quantity: i64,
    pub tax_class: String,
    pub subtotal: String,
    pub subtotal_tax: String,
    pub total: String,
    pub total_tax: String,
    pub sku: String,
    #[serde(deserialize_with = "flexible::money")]
    pub price: f64,
    pub image: Option<StorefrontImage>,
    pub parent_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontImage {
    pub id: u64,
    pub src: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontShippingLine {
    pub id: u64,
    pub method_title: String,
    pub method_id: String,
    pub total: String,
    pub total_tax: String,
}

/// Generates a storefront order payload.
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Result<Vec<u8>, SynthesisError> {
    let order = build_order(rng, now)?;
    Ok(serde_json::to_vec(&order)?)
}

pub fn build_order<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Result<StorefrontOrder, SynthesisError> {
    let customer = pick(rng, CUSTOMERS, "customers")?;
    let address = pick(rng, ADDRESSES, "addresses")?;
    let status = *pick(rng, &ORDER_STATUSES, "storefront statuses")?;
    let (payment_method, payment_method_title) = *pick(rng, &PAYMENT_OPTIONS, "storefront payment methods")?;
    let carrier = pick(rng, CARRIERS, "carriers")?;
    let created = random_past(rng, now);
    let id = rng.gen_range(10_000_u64..99_999);

    let mut discount_total = 0.0;
    let mut cart_tax = 0.0;
    let mut items_total = 0.0;
    let line_items = pick_lines(rng, 3, 3)?
        .into_iter()
        .map(|(product, quantity)| {
            #[allow(clippy::cast_precision_loss)]
            let subtotal = product.price * quantity as f64;
            let discount = if rng.gen_bool(0.2) { round_money(subtotal * 0.15) } else { 0.0 };
            let total = round_money(subtotal - discount);
            let total_tax = tax_on(total, DEFAULT_TAX_RATE);
            discount_total += discount;
            cart_tax += total_tax;
            items_total += total;
            StorefrontLineItem {
                id: rng.gen_range(100_u64..99_999),
                name: product.title.to_string(),
                product_id: product.id,
                variation_id: 0,
                quantity,
                tax_class: String::new(),
                subtotal: format_money(subtotal),
                subtotal_tax: format_money(tax_on(subtotal, DEFAULT_TAX_RATE)),
                total: format_money(total),
                total_tax: format_money(total_tax),
                sku: product.sku.to_string(),
                price: product.price,
                image: Some(StorefrontImage { id: product.id + 500, src: product.image_url.to_string() }),
                parent_name: None,
            }
        })
        .collect::<Vec<_>>();
    let cart_tax = round_money(cart_tax);
    let shipping_total = random_shipping_cost(rng);
    let total = round_money(items_total + cart_tax + shipping_total);

    let paid = matches!(status, "processing" | "completed" | "refunded");
    let paid_at = created + Duration::seconds(rng.gen_range(10..=300));
    let completed_at = (status == "completed").then(|| paid_at + Duration::days(2));
    let transaction_id = if paid && matches!(payment_method, "stripe" | "pse") {
        format!("ch_{}", random_digits(rng, 16))
    } else {
        String::new()
    };
    let meta_data = vec![
        StorefrontMeta { id: rng.gen_range(1000_u64..9999), key: BILLING_DNI_META_KEY.to_string(), value: Value::from(customer.dni) },
        StorefrontMeta { id: rng.gen_range(1000_u64..9999), key: "_order_source".to_string(), value: Value::from("web") },
    ];

    Ok(StorefrontOrder {
        id,
        parent_id: 0,
        number: Some(id.to_string()),
        order_key: format!("wc_order_{}", random_digits(rng, 13)),
        created_via: "checkout".to_string(),
        status: status.to_string(),
        currency: CURRENCY.to_string(),
        date_created: naive_local_timestamp(created),
        date_created_gmt: Some(naive_utc_timestamp(created)),
        date_modified: Some(naive_local_timestamp(created)),
        discount_total: format_money(discount_total),
        shipping_total: format_money(shipping_total),
        cart_tax: format_money(cart_tax),
        total: format_money(total),
        total_tax: format_money(cart_tax),
        prices_include_tax: false,
        customer_id: customer.id,
        customer_note: String::new(),
        billing: StorefrontBilling {
            first_name: customer.first_name.to_string(),
            last_name: customer.last_name.to_string(),
            company: String::new(),
            address_1: address.street.to_string(),
            address_2: address.street2.to_string(),
            city: address.city.to_string(),
            state: address.state_code.to_string(),
            postcode: address.postal_code.to_string(),
            country: address.country_code.to_string(),
            email: customer.email.to_string(),
            phone: customer.phone.to_string(),
        },
        shipping: StorefrontShipping {
            first_name: customer.first_name.to_string(),
            last_name: customer.last_name.to_string(),
            company: String::new(),
            address_1: address.street.to_string(),
            address_2: address.street2.to_string(),
            city: address.city.to_string(),
            state: address.state_code.to_string(),
            postcode: address.postal_code.to_string(),
            country: address.country_code.to_string(),
            phone: customer.phone.to_string(),
        },
        payment_method: payment_method.to_string(),
        payment_method_title: payment_method_title.to_string(),
        transaction_id,
        date_paid: paid.then(|| naive_local_timestamp(paid_at)),
        date_paid_gmt: paid.then(|| naive_utc_timestamp(paid_at)),
        date_completed: completed_at.map(naive_local_timestamp),
        date_completed_gmt: completed_at.map(naive_utc_timestamp),
        meta_data,
        line_items,
        shipping_lines: vec![StorefrontShippingLine {
            id: rng.gen_range(100_u64..99_999),
            method_title: carrier.name.to_string(),
            method_id: "flat_rate".to_string(),
            total: format_money(shipping_total),
            total_tax: "0.00".to_string(),
        }],
    })
}

#[cfg(test)]
mod test {
    use osim_common::{money_eq, parse_money};
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn deserialize_sample_order() {
        let order: StorefrontOrder =
            serde_json::from_str(include_str!("test_assets/storefront_order.json")).expect("Failed to parse order");
        assert_eq!(order.id, 48_213);
        assert_eq!(order.status, "on-hold");
        assert_eq!(order.total, "153545.00");
        assert_eq!(order.line_items[0].price, 125_500.0);
        assert_eq!(order.line_items[0].quantity, 1);
        assert_eq!(order.payment_method, "bacs");
        assert_eq!(order.date_paid, None);
        assert_eq!(order.meta(BILLING_DNI_META_KEY), Some(&Value::from("1144098765")));
        assert_eq!(order.billing.email, "valentina.lopez@example.com");
    }

    #[test]
    fn minimal_payload_deserializes() {
        let json = r#"{"id":727,"status":"processing","total":"10000","shipping_total":"5000","cart_tax":"1900",
            "currency":"COP","date_created":"2024-01-01T00:00:00","billing":{"first_name":"A"},
            "shipping":{"first_name":"A"},"line_items":[{"price":5000,"quantity":1,"total":"5000","total_tax":"950",
            "sku":"X"}],"payment_method":"bacs","date_paid":"2024-01-01T00:00:00"}"#;
        let order: StorefrontOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, 727);
        assert_eq!(order.number, None);
        assert_eq!(order.discount_total, "");
        assert!(order.shipping_lines.is_empty());
        assert_eq!(order.line_items[0].price, 5000.0);
        assert_eq!(order.billing.last_name, "");
    }

    #[test]
    fn synthesized_totals_add_up() {
        let mut rng = StdRng::seed_from_u64(17);
        let now = Utc::now();
        for _ in 0..50 {
            let order = build_order(&mut rng, now).unwrap();
            assert!(ORDER_STATUSES.contains(&order.status.as_str()));
            let items: f64 = order.line_items.iter().map(|i| parse_money(&i.total).unwrap()).sum();
            let total = parse_money(&order.total).unwrap();
            let shipping = parse_money(&order.shipping_total).unwrap();
            let tax = parse_money(&order.cart_tax).unwrap();
            assert!(money_eq(items + shipping + tax, total));
            assert_eq!(order.date_created.len(), 19);
            assert!(!order.date_created.contains('+'));
            assert_eq!(order.date_paid.is_some(), matches!(order.status.as_str(), "processing" | "completed" | "refunded"));
            assert_eq!(order.date_paid.is_some(), order.date_paid_gmt.is_some());
            assert_eq!(order.date_completed.is_some(), order.date_completed_gmt.is_some());
            assert_eq!(order.billing.email, CUSTOMERS.iter().find(|c| c.id == order.customer_id).unwrap().email);
            assert!(order.meta(BILLING_DNI_META_KEY).is_some());
        }
    }
}
