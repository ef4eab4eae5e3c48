use osim_common::round_money;
use platform_tools::{
    fixtures::{payment_method_id, CARRIERS, WAREHOUSE_NAME},
    marketplace::{MarketplaceOrder, MarketplacePayment},
};

use super::{
    customer_name,
    non_empty,
    occurred_at,
    parse_timestamp,
    split_name,
    status::{marketplace_order_status, marketplace_payment_status},
    tax_or_default,
    CanonicalizationError,
    LineSpec,
    OrderSource,
};
use crate::order_types::{
    Address,
    AddressType,
    CanonicalOrder,
    ChannelMetadata,
    Payment,
    Platform,
    RawPayload,
    Shipment,
    ORDER_TYPE_DELIVERY,
};

pub fn canonicalize_marketplace(
    payload: &[u8],
    integration_id: u32,
    business_id: Option<u32>,
) -> Result<CanonicalOrder, CanonicalizationError> {
    canonicalize_marketplace_at(payload, &OrderSource::now(integration_id, business_id))
}

/// The marketplace reports the net item amount and the amount including shipping, but no tax. Shipping is the
/// difference of the two, tax is estimated at the default rate and the total is the amount including shipping.
pub fn canonicalize_marketplace_at(
    payload: &[u8],
    source: &OrderSource,
) -> Result<CanonicalOrder, CanonicalizationError> {
    let platform = Platform::Marketplace;
    let order = serde_json::from_slice::<MarketplaceOrder>(payload)
        .map_err(|e| CanonicalizationError::malformed(platform, e))?;
    if order.id == 0 {
        return Err(CanonicalizationError::MissingOrderId(platform.tag()));
    }
    let raw_data = RawPayload::from_bytes(payload).map_err(|e| CanonicalizationError::malformed(platform, e))?;
    let currency = order.currency_id.clone();

    let items = order
        .order_items
        .iter()
        .map(|line| {
            let full_price = line.full_unit_price.max(line.unit_price);
            LineSpec {
                sku: line.item.seller_sku.clone().and_then(|s| non_empty(&s)).unwrap_or_else(|| line.item.id.clone()),
                name: line.item.title.clone(),
                title: line.item.title.clone(),
                quantity: line.quantity,
                unit_price: full_price,
                discount_per_unit: full_price - line.unit_price,
                tax: None,
                tax_rate: None,
                currency: non_empty(&line.currency_id).unwrap_or_else(|| currency.clone()),
                image_url: line.item.thumbnail.clone(),
                product_url: line.item.permalink.clone(),
                weight: None,
                product_id: non_empty(&line.item.id),
            }
            .into_item()
        })
        .collect::<Vec<_>>();
    let discount = round_money(items.iter().map(|i| i.discount * f64::from(i.quantity)).sum());
    let subtotal = round_money(order.total_amount + discount);
    let shipping_cost = round_money((order.total_amount_with_shipping - order.total_amount).max(0.0));
    let tax = tax_or_default(None, subtotal);
    let total_amount = if order.total_amount_with_shipping > 0.0 {
        round_money(order.total_amount_with_shipping)
    } else {
        round_money(subtotal + tax + shipping_cost - discount)
    };

    let buyer = &order.buyer;
    let customer_phone = buyer.phone.full_number();
    let receiver = &order.shipping.receiver_address;
    let (first_name, last_name) = match non_empty(&receiver.receiver_name) {
        Some(name) => split_name(&name),
        None => (buyer.first_name.clone(), buyer.last_name.clone()),
    };
    let shipping_address = Address {
        address_type: AddressType::Shipping,
        first_name,
        last_name,
        street: receiver.address_line.clone(),
        street2: receiver.comment.clone().unwrap_or_default(),
        city: receiver.city.name.clone(),
        state: receiver.state.name.clone(),
        country: receiver.country.name.clone(),
        postal_code: receiver.zip_code.clone(),
        phone: receiver.receiver_phone.clone().or_else(|| non_empty(&customer_phone)),
        latitude: receiver.latitude,
        longitude: receiver.longitude,
    };
    let addresses = if receiver.address_line.is_empty() && receiver.city.name.is_empty() {
        vec![]
    } else {
        let billing = shipping_address.retagged(AddressType::Billing);
        vec![shipping_address, billing]
    };

    let payments = order.payments.iter().map(|p| payment(p, &currency)).collect();

    let shipments = match order.shipping.tracking_number.as_deref().and_then(non_empty) {
        Some(tracking_number) => {
            let carrier = order.shipping.tracking_method.clone().unwrap_or_else(|| "marketplace".to_string());
            let carrier_code = CARRIERS
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(&carrier))
                .map(|c| c.code.to_string())
                .unwrap_or_else(|| carrier.to_lowercase().replace(' ', "_"));
            let weight = items.iter().filter_map(|i| i.weight.map(|w| w * f64::from(i.quantity))).sum();
            vec![Shipment {
                tracking_url: CARRIERS.iter().find(|c| c.code == carrier_code).map(|c| c.tracking_url_for(&tracking_number)),
                tracking_number: Some(tracking_number),
                carrier,
                carrier_code,
                status: order.shipping.status.clone(),
                shipped_at: order.shipping.date_created.as_deref().and_then(parse_timestamp),
                estimated_delivery: order.shipping.estimated_delivery.as_deref().and_then(parse_timestamp),
                shipping_cost,
                weight,
                warehouse_name: WAREHOUSE_NAME.to_string(),
            }]
        },
        None => vec![],
    };

    let external_id = order.id.to_string();
    Ok(CanonicalOrder {
        business_id: source.business_id,
        integration_id: source.integration_id,
        integration_type: platform.tag().to_string(),
        platform: platform.tag().to_string(),
        order_number: external_id.clone(),
        external_id,
        subtotal,
        tax,
        discount,
        shipping_cost,
        total_amount,
        currency,
        customer_name: customer_name(&buyer.first_name, &buyer.last_name),
        customer_email: buyer.email.clone(),
        customer_phone,
        customer_dni: non_empty(&buyer.billing_info.doc_number),
        order_type_name: ORDER_TYPE_DELIVERY.to_string(),
        status: marketplace_order_status(&order.status),
        original_status: order.status.clone(),
        occurred_at: occurred_at(Some(&order.date_created), source.imported_at),
        imported_at: source.imported_at,
        items,
        addresses,
        payments,
        shipments,
        channel_metadata: ChannelMetadata::new(platform, raw_data, source.imported_at),
    })
}

fn payment(p: &MarketplacePayment, order_currency: &str) -> Payment {
    let amount = if p.total_paid_amount > 0.0 { p.total_paid_amount } else { p.transaction_amount + p.shipping_cost };
    Payment {
        payment_method_id: payment_method_id(&p.payment_method_id),
        amount: round_money(amount),
        currency: non_empty(&p.currency_id).unwrap_or_else(|| order_currency.to_string()),
        status: marketplace_payment_status(&p.status),
        paid_at: p.date_approved.as_deref().and_then(parse_timestamp),
        gateway: non_empty(&p.payment_type),
        transaction_id: (p.id > 0).then(|| p.id.to_string()),
        payment_reference: p.authorization_code.clone(),
    }
}
