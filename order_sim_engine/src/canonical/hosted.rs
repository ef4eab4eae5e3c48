use osim_common::round_money;
use platform_tools::{
    fixtures::{payment_method_id, CARRIERS, WAREHOUSE_NAME},
    hosted::{HostedAddress, HostedOrder, HostedTransaction},
};

use super::{
    amount,
    customer_name,
    non_empty,
    occurred_at,
    optional_amount,
    parse_timestamp,
    status::{hosted_order_status, hosted_payment_status},
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
    PaymentStatus,
    Platform,
    RawPayload,
    Shipment,
    ORDER_TYPE_DELIVERY,
};

pub fn canonicalize_hosted(
    payload: &[u8],
    integration_id: u32,
    business_id: Option<u32>,
) -> Result<CanonicalOrder, CanonicalizationError> {
    canonicalize_hosted_at(payload, &OrderSource::now(integration_id, business_id))
}

/// Hosted orders report `subtotal_price` net of discounts. The canonical subtotal is the gross line amount, so that
/// `subtotal + tax + shipping - discount` reproduces `total_price`.
pub fn canonicalize_hosted_at(payload: &[u8], source: &OrderSource) -> Result<CanonicalOrder, CanonicalizationError> {
    let platform = Platform::Hosted;
    let order =
        serde_json::from_slice::<HostedOrder>(payload).map_err(|e| CanonicalizationError::malformed(platform, e))?;
    if order.id == 0 {
        return Err(CanonicalizationError::MissingOrderId(platform.tag()));
    }
    let raw_data = RawPayload::from_bytes(payload).map_err(|e| CanonicalizationError::malformed(platform, e))?;
    let currency = order.currency.clone();

    let items = order.line_items.iter().map(|line| line_item(line, &currency)).collect::<Result<Vec<_>, _>>()?;
    let discount = round_money(amount("total_discounts", &order.total_discounts)?);
    let subtotal = match optional_amount("total_line_items_price", &order.total_line_items_price)? {
        Some(gross) => round_money(gross),
        None => round_money(amount("subtotal_price", &order.subtotal_price)? + discount),
    };
    let tax = tax_or_default(optional_amount("total_tax", &order.total_tax)?, subtotal);
    let shipping_cost = match order.shipping_lines.first() {
        Some(line) => round_money(amount("shipping_lines.price", &line.price)?),
        None => 0.0,
    };
    let total_amount = match optional_amount("total_price", &order.total_price)? {
        Some(total) => round_money(total),
        None => round_money(subtotal + tax + shipping_cost - discount),
    };

    let customer = order.customer.clone().unwrap_or_default();
    let billing = order.billing_address.as_ref();
    let (first_name, last_name) = match (non_empty(&customer.first_name), billing) {
        (Some(_), _) | (None, None) => (customer.first_name.clone(), customer.last_name.clone()),
        (None, Some(b)) => (b.first_name.clone(), b.last_name.clone()),
    };
    let customer_email = non_empty(&order.email).unwrap_or_else(|| customer.email.clone());
    let customer_phone = order
        .phone
        .clone()
        .or_else(|| customer.phone.clone())
        .or_else(|| billing.and_then(|b| b.phone.clone()))
        .unwrap_or_default();

    let mut addresses = Vec::with_capacity(2);
    if let Some(a) = &order.shipping_address {
        addresses.push(address(a, AddressType::Shipping));
    }
    if let Some(a) = billing {
        addresses.push(address(a, AddressType::Billing));
    }

    let payments = order
        .transactions
        .iter()
        .map(|t| payment(t, &order.financial_status, &currency))
        .collect::<Result<Vec<_>, _>>()?;

    let weight = f64::from(u32::try_from(order.total_weight.max(0)).unwrap_or(u32::MAX)) / 1000.0;
    let shipments = order
        .fulfillments
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let carrier = f.tracking_company.clone().unwrap_or_else(|| "unknown".to_string());
            let carrier_code = CARRIERS
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(&carrier))
                .map(|c| c.code.to_string())
                .unwrap_or_else(|| carrier.to_lowercase().replace(' ', "_"));
            Shipment {
                tracking_number: f.tracking_number.clone(),
                tracking_url: f.tracking_url.clone(),
                carrier,
                carrier_code,
                status: f.shipment_status.clone().unwrap_or_else(|| f.status.clone()),
                shipped_at: f.created_at.as_deref().and_then(parse_timestamp),
                estimated_delivery: None,
                shipping_cost: if i == 0 { shipping_cost } else { 0.0 },
                weight,
                warehouse_name: WAREHOUSE_NAME.to_string(),
            }
        })
        .collect();

    let external_id = order.id.to_string();
    let order_number = order
        .order_number
        .map(|n| n.to_string())
        .or_else(|| non_empty(order.name.trim_start_matches('#')))
        .unwrap_or_else(|| external_id.clone());
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
        customer_name: customer_name(&first_name, &last_name),
        customer_email,
        customer_phone,
        customer_dni: None,
        order_type_name: ORDER_TYPE_DELIVERY.to_string(),
        status: hosted_order_status(&order.financial_status),
        original_status: order.financial_status.clone(),
        occurred_at: occurred_at(Some(&order.created_at), source.imported_at),
        imported_at: source.imported_at,
        items,
        addresses,
        payments,
        shipments,
        channel_metadata: ChannelMetadata::new(platform, raw_data, source.imported_at),
    })
}

fn line_item(
    line: &platform_tools::hosted::HostedLineItem,
    currency: &str,
) -> Result<OrderItem, CanonicalizationError> {
    let quantity = line.quantity.max(1);
    #[allow(clippy::cast_precision_loss)]
    let discount_per_unit = amount("line_items.total_discount", &line.total_discount)? / quantity as f64;
    let tax = line
        .tax_lines
        .iter()
        .map(|t| amount("line_items.tax_lines.price", &t.price))
        .collect::<Result<Vec<_>, _>>()?;
    let tax: Option<f64> = (!tax.is_empty()).then(|| tax.iter().sum());
    #[allow(clippy::cast_precision_loss)]
    let weight = (line.grams > 0).then(|| line.grams as f64 / 1000.0);
    Ok(LineSpec {
        sku: line.sku.clone(),
        name: line.title.clone(),
        title: line.name.clone(),
        quantity: line.quantity,
        unit_price: amount("line_items.price", &line.price)?,
        discount_per_unit,
        tax,
        tax_rate: line.tax_lines.first().map(|t| t.rate).filter(|r| *r > 0.0),
        currency: currency.to_string(),
        image_url: None,
        product_url: None,
        weight,
        product_id: line.product_id.map(|id| id.to_string()),
    }
    .into_item())
}

fn address(a: &HostedAddress, address_type: AddressType) -> Address {
    Address {
        address_type,
        first_name: a.first_name.clone(),
        last_name: a.last_name.clone(),
        street: a.address1.clone(),
        street2: a.address2.clone().unwrap_or_default(),
        city: a.city.clone(),
        state: a.province.clone(),
        country: a.country.clone(),
        postal_code: a.zip.clone(),
        phone: a.phone.clone(),
        latitude: a.latitude,
        longitude: a.longitude,
    }
}

/// The payment status follows the order's financial status, except that failed transactions are failed payments and
/// refund transactions are refunds.
fn payment(t: &HostedTransaction, financial_status: &str, currency: &str) -> Result<Payment, CanonicalizationError> {
    let status = match (t.kind.as_str(), t.status.as_str()) {
        (_, "failure" | "error") => PaymentStatus::Failed,
        ("refund", _) => PaymentStatus::Refunded,
        _ => hosted_payment_status(financial_status),
    };
    let paid_at = match status {
        PaymentStatus::Completed | PaymentStatus::Refunded => t.processed_at.as_deref().and_then(parse_timestamp),
        _ => None,
    };
    Ok(Payment {
        payment_method_id: payment_method_id(&t.gateway),
        amount: round_money(amount("transactions.amount", &t.amount)?),
        currency: non_empty(&t.currency).unwrap_or_else(|| currency.to_string()),
        status,
        paid_at,
        gateway: non_empty(&t.gateway),
        transaction_id: (t.id > 0).then(|| t.id.to_string()),
        payment_reference: t.authorization.clone(),
    })
}
