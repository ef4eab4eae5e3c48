use std::sync::Arc;

use chrono::{DateTime, Utc};
use cucumber::{given, then, when};
use order_sim_engine::{
    canonicalize,
    generator::RawSynthesizer,
    test_utils::OddIndexFailingPublisher,
    GenerateOrderRequest,
    OrderGenerator,
    OrderPipelineApi,
    OrderPublisher,
    PipelineError,
    Platform,
};
use osim_common::money_eq;
use platform_tools::SynthesisError;
use rand::rngs::StdRng;
use serde_json::Value;

use crate::cucumber::OrderSimWorld;

const MARKETPLACE_SAMPLE: &str = include_str!("../../../platform_tools/src/test_assets/marketplace_order.json");
const HOSTED_SAMPLE: &str = include_str!("../../../platform_tools/src/test_assets/hosted_order.json");
const STOREFRONT_SAMPLE: &str = include_str!("../../../platform_tools/src/test_assets/storefront_order.json");

const MINIMAL_STOREFRONT: &str = r#"{"id":727,"status":"processing","total":"10000","shipping_total":"5000","cart_tax":"1900","currency":"COP","date_created":"2024-01-01T00:00:00","billing":{"first_name":"A"},"shipping":{"first_name":"A"},"line_items":[{"price":5000,"quantity":1,"total":"5000","total_tax":"950","sku":"X"}],"payment_method":"bacs","date_paid":"2024-01-01T00:00:00"}"#;

fn broken_synthesizer(_rng: &mut StdRng, _now: DateTime<Utc>) -> Result<Vec<u8>, SynthesisError> {
    Err(SynthesisError::Failed("synthesizer switched off".into()))
}

//--------------------------------------   Canonicalization   -------------------------------------------------------

#[given(expr = "the sample {word} order")]
async fn sample_order(world: &mut OrderSimWorld, platform: String) {
    let platform = Platform::from_name(&platform);
    let sample = match platform {
        Platform::Marketplace => MARKETPLACE_SAMPLE,
        Platform::Hosted => HOSTED_SAMPLE,
        Platform::Storefront => STOREFRONT_SAMPLE,
        Platform::Generic => panic!("There is no sample generic order"),
    };
    world.platform = Some(platform);
    world.payload = Some(serde_json::from_str(sample).expect("Invalid sample"));
}

#[given("the minimal storefront payload")]
async fn minimal_storefront(world: &mut OrderSimWorld) {
    world.platform = Some(Platform::Storefront);
    world.raw = Some(MINIMAL_STOREFRONT.to_string());
}

#[when(expr = "its order status is set to {string}")]
async fn set_order_status(world: &mut OrderSimWorld, status: String) {
    let field = match world.platform() {
        Platform::Hosted => "financial_status",
        _ => "status",
    };
    world.payload_mut()[field] = Value::from(status);
}

#[when(expr = "its payment status is set to {string}")]
async fn set_payment_status(world: &mut OrderSimWorld, status: String) {
    assert_eq!(world.platform(), Platform::Marketplace, "Only marketplace payments carry their own status");
    world.payload_mut()["payments"][0]["status"] = Value::from(status);
}

#[when("the order is canonicalized")]
async fn canonicalize_order(world: &mut OrderSimWorld) {
    if let Some(payload) = &world.payload {
        world.raw = Some(payload.to_string());
    }
    let raw = world.raw.clone().expect("No payload to canonicalize");
    world.order = Some(canonicalize(world.platform(), raw.as_bytes(), &OrderSimWorld::source()));
}

#[then(expr = "the canonical status is {string}")]
async fn canonical_status(world: &mut OrderSimWorld, expected: String) {
    assert_eq!(world.order().status.to_string(), expected);
}

#[then(expr = "the original status is {string}")]
async fn original_status(world: &mut OrderSimWorld, expected: String) {
    assert_eq!(world.order().original_status, expected);
}

#[then(expr = "the payment status is {string}")]
async fn payment_status(world: &mut OrderSimWorld, expected: String) {
    let order = world.order();
    assert!(!order.payments.is_empty(), "The order has no payments");
    assert_eq!(order.payments[0].status.to_string(), expected);
}

#[then(expr = "the order totals are subtotal {float}, tax {float}, shipping {float} and total {float}")]
async fn order_totals(world: &mut OrderSimWorld, subtotal: f64, tax: f64, shipping: f64, total: f64) {
    let order = world.order();
    assert!(money_eq(order.subtotal, subtotal), "subtotal {} != {subtotal}", order.subtotal);
    assert!(money_eq(order.tax, tax), "tax {} != {tax}", order.tax);
    assert!(money_eq(order.shipping_cost, shipping), "shipping {} != {shipping}", order.shipping_cost);
    assert!(money_eq(order.total_amount, total), "total {} != {total}", order.total_amount);
}

#[then("the raw data matches the payload")]
async fn raw_data_matches(world: &mut OrderSimWorld) {
    let raw = world.raw.clone().expect("No payload");
    assert_eq!(world.order().channel_metadata.raw_data.as_str(), raw);
}

//--------------------------------------   Generate and publish   ---------------------------------------------------

#[given("an order pipeline with a recording publisher")]
async fn recording_pipeline(world: &mut OrderSimWorld) {
    world.generator = OrderGenerator::new();
    world.failing_publisher = None;
    world.recorder.clear();
}

#[given("an order pipeline whose publisher fails every second attempt")]
async fn failing_pipeline(world: &mut OrderSimWorld) {
    world.generator = OrderGenerator::new();
    world.failing_publisher = Some(Arc::new(OddIndexFailingPublisher::default()));
}

#[given(expr = "the {word} synthesizer is broken")]
async fn broken_channel(world: &mut OrderSimWorld, platform: String) {
    let platform = Platform::from_name(&platform);
    world.generator = world.generator.clone().with_synthesizer(platform, broken_synthesizer as RawSynthesizer);
}

#[when(expr = "I generate {int} {word} orders for integration {int}")]
async fn generate_orders(world: &mut OrderSimWorld, count: u32, platform: String, integration_id: u32) {
    let request = GenerateOrderRequest::new(platform)
        .with_count(count)
        .with_integration_id(integration_id)
        .with_payment(true)
        .with_shipment(true);
    let publisher: Arc<dyn OrderPublisher> = match &world.failing_publisher {
        Some(p) => p.clone(),
        None => Arc::new(world.recorder.clone()),
    };
    let api = OrderPipelineApi::new(world.generator.clone(), publisher);
    world.batch = Some(api.generate_and_publish(&request).await);
}

#[then(expr = "the batch reports {int} generated, {int} published and {int} failed")]
async fn batch_counters(world: &mut OrderSimWorld, generated: u32, published: u32, failed: u32) {
    let counters = match world.batch.as_ref().expect("No batch has run") {
        Ok(counters) => *counters,
        Err(failure) => failure.counters,
    };
    assert_eq!((counters.generated, counters.published, counters.failed), (generated, published, failed));
}

#[then(expr = "the batch error is the failure of attempt {int}")]
async fn batch_error(world: &mut OrderSimWorld, attempt: usize) {
    let failure = world.batch.as_ref().expect("No batch has run").as_ref().expect_err("The batch succeeded");
    assert_eq!(failure.error, PipelineError::Publish(OddIndexFailingPublisher::error_for(attempt)));
}

#[then(expr = "{int} orders were published with routing key {string}")]
async fn published_orders(world: &mut OrderSimWorld, count: usize, routing_key: String) {
    let keys = world.recorder.routing_keys();
    assert_eq!(keys.len(), count);
    assert!(keys.iter().all(|k| *k == routing_key), "Routing keys: {keys:?}");
}

#[then(expr = "every published order has platform {string} and currency {string}")]
async fn published_platform(world: &mut OrderSimWorld, platform: String, currency: String) {
    let orders = world.recorder.published();
    assert!(!orders.is_empty());
    for order in orders {
        assert_eq!(order.platform, platform);
        assert_eq!(order.currency, currency);
    }
}
