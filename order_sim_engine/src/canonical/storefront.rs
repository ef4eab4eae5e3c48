use osim_common::round_money;
use platform_tools::{
    fixtures::payment_method_id,
    storefront::{StorefrontLineItem, StorefrontOrder, BILLING_DNI_META_KEY},
};

use super::{
    amount,
    customer_name,
    non_empty,
    occurred_at,
    optional_amount,
    parse_timestamp,
    status::{storefront_order_status, storefront_payment_status},
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
    OrderItem,
    Payment,
    Platform,
    RawPayload,
    ORDER_TYPE_DELIVERY,
};

pub fn canonicalize_storefront(
    payload: &[u8],
    integration_id: u32,
    business_id: Option<u32>,
) -> Result<CanonicalOrder, CanonicalizationError> {
    canonicalize_storefront_at(payload, &OrderSource::now(integration_id, business_id))
}

/// Storefront orders carry no subtotal. It is recovered from the total as `total - shipping - cart_tax + discount`.
/// Zone-less dates are read as UTC; the `_gmt` twins of `date_created` and `date_paid` are preferred when present.
pub fn canonicalize_storefront_at(
    payload: &[u8],
    source: &OrderSource,
) -> Result<CanonicalOrder, CanonicalizationError> {
    let platform = Platform::Storefront;
    let order = serde_json::from_slice::<StorefrontOrder>(payload)
        .map_err(|e| CanonicalizationError::malformed(platform, e))?;
    if order.id == 0 {
        return Err(CanonicalizationError::MissingOrderId(platform.tag()));
    }
    let raw_data = RawPayload::from_bytes(payload).map_err(|e| CanonicalizationError::malformed(platform, e))?;
    let currency = order.currency.clone();

    let items = order.line_items.iter().map(|line| line_item(line, &currency)).collect::<Result<Vec<_>, _>>()?;
    let shipping_cost = match order.shipping_lines.first() {
        Some(line) => round_money(amount("shipping_lines.total", &line.total)?),
        None => round_money(amount("shipping_total", &order.shipping_total)?),
    };
    let cart_tax = optional_amount("cart_tax", &order.cart_tax)?;
    let discount = round_money(amount("discount_total", &order.discount_total)?);
    let reported_total = optional_amount("total", &order.total)?;
    let subtotal = match reported_total {
        Some(total) => round_money((total - shipping_cost - cart_tax.unwrap_or_default() + discount).max(0.0)),
        None => round_money(items.iter().map(|i| i.unit_price * f64::from(i.quantity)).sum()),
    };
    let tax = tax_or_default(cart_tax, subtotal);
    let total_amount =
        reported_total.map(round_money).unwrap_or_else(|| round_money(subtotal + tax + shipping_cost - discount));

    let billing = &order.billing;
    let mut addresses = Vec::with_capacity(2);
    if !order.shipping.first_name.is_empty() || !order.shipping.address_1.is_empty() {
        let s = &order.shipping;
        addresses.push(Address {
            address_type: AddressType::Shipping,
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            street: s.address_1.clone(),
            street2: s.address_2.clone(),
            city: s.city.clone(),
            state: s.state.clone(),
            country: s.country.clone(),
            postal_code: s.postcode.clone(),
            phone: non_empty(&s.phone),
            latitude: None,
            longitude: None,
        });
    }
    if !billing.first_name.is_empty() || !billing.address_1.is_empty() {
        addresses.push(Address {
            address_type: AddressType::Billing,
            first_name: billing.first_name.clone(),
            last_name: billing.last_name.clone(),
            street: billing.address_1.clone(),
            street2: billing.address_2.clone(),
            city: billing.city.clone(),
            state: billing.state.clone(),
            country: billing.country.clone(),
            postal_code: billing.postcode.clone(),
            phone: non_empty(&billing.phone),
            latitude: None,
            longitude: None,
        });
    }

    let payment = Payment {
        payment_method_id: payment_method_id(&order.payment_method),
        amount: total_amount,
        currency: currency.clone(),
        status: storefront_payment_status(&order.status),
        paid_at: order.date_paid_gmt.as_deref().or(order.date_paid.as_deref()).and_then(parse_timestamp),
        gateway: non_empty(&order.payment_method),
        transaction_id: non_empty(&order.transaction_id),
        payment_reference: non_empty(&order.payment_method_title),
    };

    let customer_dni = order.meta(BILLING_DNI_META_KEY).and_then(|v| match v {
        serde_json::Value::String(s) => non_empty(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let external_id = order.id.to_string();
    let order_number = order.number.as_deref().and_then(non_empty).unwrap_or_else(|| external_id.clone());
    let created = order.date_created_gmt.as_deref().or(Some(order.date_created.as_str()));
    Ok(CanonicalOrder {
        business_id: source.business_id,
        integration_id: source.integration_id,
        integration_type: platform.tag().to_string(),
        platform: platform.tag().to_string(),
        external_id,
        order_number,
        subtotal,
        tax,
        discount,
        shipping_cost,
        total_amount,
        currency,
        customer_name: customer_name(&billing.first_name, &billing.last_name),
        customer_email: billing.email.clone(),
        customer_phone: billing.phone.clone(),
        customer_dni,
        order_type_name: ORDER_TYPE_DELIVERY.to_string(),
        status: storefront_order_status(&order.status),
        original_status: order.status.clone(),
        occurred_at: occurred_at(created, source.imported_at),
        imported_at: source.imported_at,
        items,
        addresses,
        payments: vec![payment],
        shipments: vec![],
        channel_metadata: ChannelMetadata::new(platform, raw_data, source.imported_at),
    })
}

/// Line `subtotal` is the pre-discount amount and `total` the post-discount amount. The difference, spread over the
/// quantity, is the per-unit discount.
fn line_item(line: &StorefrontLineItem, currency: &str) -> Result<OrderItem, CanonicalizationError> {
    #[allow(clippy::cast_precision_loss)]
    let quantity = line.quantity.max(1) as f64;
    let total = optional_amount("line_items.total", &line.total)?;
    let subtotal = optional_amount("line_items.subtotal", &line.subtotal)?.or(total);
    let unit_price = match (line.price, subtotal) {
        (p, _) if p > 0.0 => p,
        (_, Some(subtotal)) => subtotal / quantity,
        _ => 0.0,
    };
    let discount_per_unit = match (subtotal, total) {
        (Some(subtotal), Some(total)) => (subtotal - total).max(0.0) / quantity,
        _ => 0.0,
    };
    let product_id = (line.product_id > 0).then(|| line.product_id.to_string());
    Ok(LineSpec {
        sku: line.sku.clone(),
        name: line.name.clone(),
        title: line.parent_name.clone().unwrap_or_else(|| line.name.clone()),
        quantity: line.quantity,
        unit_price,
        discount_per_unit,
        tax: optional_amount("line_items.total_tax", &line.total_tax)?,
        tax_rate: None,
        currency: currency.to_string(),
        image_url: line.image.as_ref().and_then(|i| non_empty(&i.src)),
        product_url: None,
        weight: None,
        product_id,
    }
    .into_item())
}
