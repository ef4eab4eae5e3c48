//! Orders built straight from the fixture catalog, with no channel payload in between.
use chrono::{DateTime, Duration, Utc};
use osim_common::{round_money, DEFAULT_TAX_RATE};
use platform_tools::{
    fixtures::{ADDRESSES, CARRIERS, CUSTOMERS, PAYMENT_METHODS, PRODUCTS, WAREHOUSE_NAME},
    helpers::{pick, random_digits, random_shipping_cost},
    SynthesisError,
};
use rand::{seq::SliceRandom, Rng};

use super::GeneratorError;
use crate::{
    canonical::LineSpec,
    order_types::{
        Address,
        AddressType,
        CanonicalOrder,
        ChannelMetadata,
        GenerateOrderRequest,
        OrderStatus,
        Payment,
        PaymentStatus,
        Platform,
        RawPayload,
        Shipment,
        ORDER_TYPE_DELIVERY,
    },
};

pub const GENERIC_CURRENCY: &str = "CLP";

pub fn generate_generic<R: Rng + ?Sized>(
    request: &GenerateOrderRequest,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<CanonicalOrder, GeneratorError> {
    let platform = Platform::Generic;
    let customer = pick(rng, CUSTOMERS, "customers")?;
    let fixture_address = pick(rng, ADDRESSES, "addresses")?;
    if PRODUCTS.is_empty() {
        return Err(SynthesisError::EmptyFixtureTable("products").into());
    }

    let item_count = rng.gen_range(1..=5_usize.min(PRODUCTS.len()));
    let items = PRODUCTS
        .choose_multiple(rng, item_count)
        .collect::<Vec<_>>()
        .into_iter()
        .map(|product| {
            let quantity = rng.gen_range(1..=3_i64);
            let discount_per_unit = if rng.gen_bool(0.3) {
                let pct = f64::from(*[10_u8, 20, 30].choose(rng).unwrap_or(&10)) / 100.0;
                round_money(product.price * pct)
            } else {
                0.0
            };
            LineSpec {
                sku: product.sku.to_string(),
                name: product.name.to_string(),
                title: product.title.to_string(),
                quantity,
                unit_price: product.price,
                discount_per_unit,
                tax: None,
                tax_rate: Some(DEFAULT_TAX_RATE),
                currency: GENERIC_CURRENCY.to_string(),
                image_url: Some(product.image_url.to_string()),
                product_url: Some(product.product_url.to_string()),
                weight: Some(product.weight),
                product_id: Some(product.id.to_string()),
            }
            .into_item()
        })
        .collect::<Vec<_>>();

    let subtotal = round_money(items.iter().map(|i| i.unit_price * f64::from(i.quantity)).sum());
    let discount = round_money(items.iter().map(|i| i.discount * f64::from(i.quantity)).sum());
    let tax = round_money(items.iter().map(|i| i.tax).sum());
    let shipping_cost = if rng.gen_bool(0.7) { random_shipping_cost(rng) } else { 0.0 };
    let total_amount = round_money(subtotal + tax + shipping_cost - discount);

    let external_id = format!("TEST-{}-{}", now.timestamp(), rng.gen_range(1000..10_000));
    let order_number = format!("ORD-{}", rng.gen_range(100_000..=999_999));

    let payments = if request.include_payment {
        let method = pick(rng, PAYMENT_METHODS, "payment methods")?;
        let completed = rng.gen_bool(0.7);
        vec![Payment {
            payment_method_id: method.id,
            amount: total_amount,
            currency: GENERIC_CURRENCY.to_string(),
            status: if completed { PaymentStatus::Completed } else { PaymentStatus::Pending },
            paid_at: completed.then_some(now),
            gateway: Some(method.gateway.to_string()),
            transaction_id: completed.then(|| format!("TXN-{}", random_digits(rng, 12))),
            payment_reference: Some(format!("REF-{order_number}")),
        }]
    } else {
        vec![]
    };

    let shipments = if request.include_shipment {
        let carrier = pick(rng, CARRIERS, "carriers")?;
        let tracking_number = format!("TRK{}", random_digits(rng, 10));
        vec![Shipment {
            tracking_url: Some(carrier.tracking_url_for(&tracking_number)),
            tracking_number: Some(tracking_number),
            carrier: carrier.name.to_string(),
            carrier_code: carrier.code.to_string(),
            status: "in_transit".to_string(),
            shipped_at: Some(now - Duration::hours(24)),
            estimated_delivery: Some(now + Duration::days(3)),
            shipping_cost,
            weight: items.iter().filter_map(|i| i.weight.map(|w| w * f64::from(i.quantity))).sum(),
            warehouse_name: WAREHOUSE_NAME.to_string(),
        }]
    } else {
        vec![]
    };

    let shipping_address = Address {
        address_type: AddressType::Shipping,
        first_name: customer.first_name.to_string(),
        last_name: customer.last_name.to_string(),
        street: fixture_address.street.to_string(),
        street2: fixture_address.street2.to_string(),
        city: fixture_address.city.to_string(),
        state: fixture_address.state.to_string(),
        country: fixture_address.country.to_string(),
        postal_code: fixture_address.postal_code.to_string(),
        phone: Some(customer.phone.to_string()),
        latitude: Some(fixture_address.latitude),
        longitude: Some(fixture_address.longitude),
    };
    let billing_address = shipping_address.retagged(AddressType::Billing);

    let raw_data = RawPayload::from_json(request).map_err(|e| GeneratorError::Serialization(e.to_string()))?;
    Ok(CanonicalOrder {
        business_id: request.business_id,
        integration_id: request.integration_id,
        integration_type: platform.tag().to_string(),
        platform: platform.tag().to_string(),
        external_id,
        order_number,
        subtotal,
        tax,
        discount,
        shipping_cost,
        total_amount,
        currency: GENERIC_CURRENCY.to_string(),
        customer_name: customer.full_name(),
        customer_email: customer.email.to_string(),
        customer_phone: customer.phone.to_string(),
        customer_dni: Some(customer.dni.to_string()),
        order_type_name: ORDER_TYPE_DELIVERY.to_string(),
        status: request.status.parse().unwrap_or(OrderStatus::Pending),
        original_status: request.status.clone(),
        occurred_at: now,
        imported_at: now,
        items,
        addresses: vec![shipping_address, billing_address],
        payments,
        shipments,
        channel_metadata: ChannelMetadata::new(platform, raw_data, now),
    })
}
