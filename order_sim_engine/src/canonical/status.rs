//! Per-channel status normalization tables.
use crate::order_types::{OrderStatus, PaymentStatus};

fn normalize(status: &str) -> String {
    status.trim().to_lowercase()
}

pub fn marketplace_order_status(status: &str) -> OrderStatus {
    match normalize(status).as_str() {
        "paid" => OrderStatus::Paid,
        "confirmed" => OrderStatus::Confirmed,
        "cancelled" => OrderStatus::Cancelled,
        _ => OrderStatus::Pending,
    }
}

pub fn marketplace_payment_status(status: &str) -> PaymentStatus {
    match normalize(status).as_str() {
        "approved" => PaymentStatus::Completed,
        "rejected" | "cancelled" => PaymentStatus::Failed,
        "refunded" | "charged_back" => PaymentStatus::Refunded,
        _ => PaymentStatus::Pending,
    }
}

pub fn hosted_order_status(financial_status: &str) -> OrderStatus {
    match normalize(financial_status).as_str() {
        "paid" => OrderStatus::Paid,
        "authorized" => OrderStatus::Authorized,
        "partially_paid" => OrderStatus::PartiallyPaid,
        "refunded" => OrderStatus::Refunded,
        _ => OrderStatus::Pending,
    }
}

pub fn hosted_payment_status(financial_status: &str) -> PaymentStatus {
    match normalize(financial_status).as_str() {
        "paid" => PaymentStatus::Completed,
        "refunded" => PaymentStatus::Refunded,
        _ => PaymentStatus::Pending,
    }
}

pub fn storefront_order_status(status: &str) -> OrderStatus {
    match normalize(status).as_str() {
        "processing" => OrderStatus::Processing,
        "on-hold" => OrderStatus::OnHold,
        "completed" => OrderStatus::Completed,
        "cancelled" => OrderStatus::Cancelled,
        "refunded" => OrderStatus::Refunded,
        "failed" => OrderStatus::Failed,
        _ => OrderStatus::Pending,
    }
}

pub fn storefront_payment_status(status: &str) -> PaymentStatus {
    match normalize(status).as_str() {
        "processing" | "completed" => PaymentStatus::Completed,
        "failed" => PaymentStatus::Failed,
        "refunded" => PaymentStatus::Refunded,
        _ => PaymentStatus::Pending,
    }
}
