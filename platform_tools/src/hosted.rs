//! The hosted-checkout channel.
//!
//! Hosted orders express every amount as a dot-decimal string. The payment state is carried by `financial_status`,
//! and each captured or authorised amount appears as an entry in `transactions`.
use chrono::{DateTime, Duration, Utc};
use osim_common::{format_money, money::flexible, round_money, DEFAULT_TAX_RATE};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    fixtures::{Address, Customer, ADDRESSES, CARRIERS, CURRENCY, CUSTOMERS},
    helpers::{local_timestamp, pick, pick_lines, random_digits, random_past, random_shipping_cost, tax_on},
    SynthesisError,
};

pub const FINANCIAL_STATUSES: [&str; 5] = ["paid", "pending", "authorized", "partially_paid", "refunded"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedOrder {
    pub id: u64,
    pub name: String,
    pub order_number: Option<u64>,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub processed_at: Option<String>,
    pub currency: String,
    pub financial_status: String,
    pub fulfillment_status: Option<String>,
    pub subtotal_price: String,
    pub total_line_items_price: String,
    pub total_discounts: String,
    pub total_tax: String,
    pub total_price: String,
    pub total_weight: i64,
    pub taxes_included: bool,
    pub gateway: Option<String>,
    pub line_items: Vec<HostedLineItem>,
    pub shipping_lines: Vec<HostedShippingLine>,
    pub billing_address: Option<HostedAddress>,
    pub shipping_address: Option<HostedAddress>,
    pub customer: Option<HostedCustomer>,
    pub transactions: Vec<HostedTransaction>,
    pub fulfillments: Vec<HostedFulfillment>,
    pub tags: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedLineItem {
    pub id: u64,
    pub product_id: Option<u64>,
    pub variant_id: Option<u64>,
    pub sku: String,
    pub name: String,
    pub title: String,
    pub variant_title: Option<String>,
    #[serde(deserialize_with = "flexible::quantity")]
    pub quantity: i64,
    pub price: String,
    pub grams: i64,
    pub total_discount: String,
    pub taxable: bool,
    pub requires_shipping: bool,
    pub vendor: Option<String>,
    pub tax_lines: Vec<HostedTaxLine>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedTaxLine {
    pub title: String,
    pub price: String,
    #[serde(deserialize_with = "flexible::money")]
    pub rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedShippingLine {
    pub id: u64,
    pub title: String,
    pub code: String,
    pub source: String,
    pub price: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedAddress {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub province: String,
    pub province_code: Option<String>,
    pub country: String,
    pub country_code: String,
    pub zip: String,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl HostedAddress {
    fn from_fixtures(customer: &Customer, address: &Address) -> Self {
        Self {
            first_name: customer.first_name.to_string(),
            last_name: customer.last_name.to_string(),
            address1: address.street.to_string(),
            address2: (!address.street2.is_empty()).then(|| address.street2.to_string()),
            city: address.city.to_string(),
            province: address.state.to_string(),
            province_code: Some(address.state_code.to_string()),
            country: address.country.to_string(),
            country_code: address.country_code.to_string(),
            zip: address.postal_code.to_string(),
            phone: Some(customer.phone.to_string()),
            latitude: Some(address.latitude),
            longitude: Some(address.longitude),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedCustomer {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub orders_count: u32,
    pub state: String,
    pub verified_email: bool,
    pub created_at: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedTransaction {
    pub id: u64,
    pub kind: String,
    pub status: String,
    pub gateway: String,
    pub amount: String,
    pub currency: String,
    pub authorization: Option<String>,
    pub processed_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedFulfillment {
    pub id: u64,
    pub status: String,
    pub shipment_status: Option<String>,
    pub tracking_company: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub created_at: Option<String>,
}

/// Generates a hosted-checkout order payload.
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Result<Vec<u8>, SynthesisError> {
    let order = build_order(rng, now)?;
    Ok(serde_json::to_vec(&order)?)
}

pub fn build_order<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Result<HostedOrder, SynthesisError> {
    let customer = pick(rng, CUSTOMERS, "customers")?;
    let shipping_to = pick(rng, ADDRESSES, "addresses")?;
    let bill_to = if rng.gen_bool(0.8) { shipping_to } else { pick(rng, ADDRESSES, "addresses")? };
    let financial_status = *pick(rng, &FINANCIAL_STATUSES, "hosted financial statuses")?;
    let created = random_past(rng, now);
    let order_number = rng.gen_range(1001_u64..99_999);

    let mut gross = 0.0;
    let mut discounts = 0.0;
    let mut weight = 0;
    let line_items = pick_lines(rng, 3, 3)?
        .into_iter()
        .map(|(product, quantity)| {
            #[allow(clippy::cast_precision_loss)]
            let line_gross = product.price * quantity as f64;
            let line_discount = if rng.gen_bool(0.25) { round_money(line_gross * 0.1) } else { 0.0 };
            gross += line_gross;
            discounts += line_discount;
            weight += product.grams() * quantity;
            HostedLineItem {
                id: rng.gen_range(13_000_000_000_000_u64..14_000_000_000_000),
                product_id: Some(product.id),
                variant_id: Some(product.id * 10 + 1),
                sku: product.sku.to_string(),
                name: product.title.to_string(),
                title: product.name.to_string(),
                variant_title: Some(if rng.gen_bool(0.5) { "Estándar" } else { "Edición especial" }.to_string()),
                quantity,
                price: format_money(product.price),
                grams: product.grams(),
                total_discount: format_money(line_discount),
                taxable: true,
                requires_shipping: true,
                vendor: Some("Artesanías de Colombia".to_string()),
                tax_lines: vec![HostedTaxLine {
                    title: "IVA".to_string(),
                    price: format_money(tax_on(line_gross - line_discount, DEFAULT_TAX_RATE)),
                    rate: DEFAULT_TAX_RATE,
                }],
            }
        })
        .collect::<Vec<_>>();
    let subtotal = round_money(gross - discounts);
    let tax = tax_on(subtotal, DEFAULT_TAX_RATE);
    let carrier = pick(rng, CARRIERS, "carriers")?;
    let shipping_cost = random_shipping_cost(rng);
    let total = round_money(subtotal + tax + shipping_cost);

    let gateway = if rng.gen_bool(0.5) { "wompi" } else { "payu" };
    let processed_at = local_timestamp(created + Duration::seconds(rng.gen_range(5..=60)));
    let transaction = |id: u64, kind: &str, status: &str, amount: f64| HostedTransaction {
        id,
        kind: kind.to_string(),
        status: status.to_string(),
        gateway: gateway.to_string(),
        amount: format_money(amount),
        currency: CURRENCY.to_string(),
        authorization: (status == "success").then(|| format!("AUTH-{id}")),
        processed_at: Some(processed_at.clone()),
    };
    let transaction_id = rng.gen_range(5_000_000_000_000_u64..6_000_000_000_000);
    let transactions = match financial_status {
        "paid" => vec![transaction(transaction_id, "sale", "success", total)],
        "authorized" => vec![transaction(transaction_id, "authorization", "success", total)],
        "partially_paid" => vec![transaction(transaction_id, "sale", "success", round_money(total / 2.0))],
        "refunded" => vec![
            transaction(transaction_id, "sale", "success", total),
            transaction(transaction_id + 1, "refund", "success", total),
        ],
        _ => vec![transaction(transaction_id, "sale", "pending", total)],
    };

    let fulfilled = financial_status == "paid" && rng.gen_bool(0.5);
    let fulfillments = if fulfilled {
        let tracking_number = random_digits(rng, 12);
        vec![HostedFulfillment {
            id: rng.gen_range(4_000_000_000_000_u64..5_000_000_000_000),
            status: "success".to_string(),
            shipment_status: Some("in_transit".to_string()),
            tracking_company: Some(carrier.name.to_string()),
            tracking_url: Some(carrier.tracking_url_for(&tracking_number)),
            tracking_number: Some(tracking_number),
            created_at: Some(local_timestamp(created + Duration::hours(2))),
        }]
    } else {
        vec![]
    };

    Ok(HostedOrder {
        id: rng.gen_range(5_500_000_000_000_u64..5_600_000_000_000),
        name: format!("#{order_number}"),
        order_number: Some(order_number),
        email: customer.email.to_string(),
        phone: Some(customer.phone.to_string()),
        created_at: local_timestamp(created),
        updated_at: Some(local_timestamp(created)),
        processed_at: Some(local_timestamp(created)),
        currency: CURRENCY.to_string(),
        financial_status: financial_status.to_string(),
        fulfillment_status: fulfilled.then(|| "fulfilled".to_string()),
        subtotal_price: format_money(subtotal),
        total_line_items_price: format_money(gross),
        total_discounts: format_money(discounts),
        total_tax: format_money(tax),
        total_price: format_money(total),
        total_weight: weight,
        taxes_included: false,
        gateway: Some(gateway.to_string()),
        line_items,
        shipping_lines: vec![HostedShippingLine {
            id: rng.gen_range(4_400_000_000_000_u64..4_500_000_000_000),
            title: format!("Envío estándar {}", carrier.name),
            code: carrier.code.to_string(),
            source: "hosted".to_string(),
            price: format_money(shipping_cost),
        }],
        billing_address: Some(HostedAddress::from_fixtures(customer, bill_to)),
        shipping_address: Some(HostedAddress::from_fixtures(customer, shipping_to)),
        customer: Some(HostedCustomer {
            id: customer.id,
            email: customer.email.to_string(),
            first_name: customer.first_name.to_string(),
            last_name: customer.last_name.to_string(),
            phone: Some(customer.phone.to_string()),
            orders_count: rng.gen_range(1..=25),
            state: "enabled".to_string(),
            verified_email: true,
            created_at: Some(local_timestamp(created - Duration::days(rng.gen_range(30..=720)))),
            note: None,
        }),
        transactions,
        fulfillments,
        tags: String::new(),
    })
}
