//! Helpers for tests in this crate and in crates that depend on it with the `test_utils` feature.
pub mod prepare_env;
mod publishers;

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};

pub use publishers::{FailingGenerator, OddIndexFailingPublisher, PendingPublisher, RecordingPublisher};

use crate::{
    generator::OrderGenerator,
    order_types::{CanonicalOrder, GenerateOrderRequest},
};

/// A deterministic order for `platform`, with payment and shipment included.
///
/// # Panics
/// If the generic path fails, which only happens when the fixture catalog is empty.
pub fn sample_order(platform: &str) -> CanonicalOrder {
    let request = GenerateOrderRequest::new(platform).with_integration_id(1).with_payment(true).with_shipment(true);
    OrderGenerator::new().generate_at(&request, &mut StdRng::seed_from_u64(7), Utc::now()).expect("sample order")
}
