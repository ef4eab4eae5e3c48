use std::sync::Arc;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use order_sim_engine::{
    test_utils::{sample_order, OddIndexFailingPublisher, RecordingPublisher},
    OrderGenerator,
    OrderPipelineApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{get_request, post_request},
    mocks::MockGenerator,
};
use crate::{
    config::GenerationSettings,
    data_objects::GenerationResponse,
    routes::{health, GenerateOrdersRoute},
};

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/health", |cfg| {
        cfg.service(health);
    })
    .await
    .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn requests_are_pinned_to_the_test_business() -> anyhow::Result<()> {
    let _ = env_logger::try_init().ok();
    let body = json!({"count": 2, "platform": "marketplace", "integration_id": 99, "business_id": 3}).to_string();
    let (status, body) = post_request("/test/generate-orders", &body, configure_pinned).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body)?;
    assert_eq!(response, json!({"generated": 2, "published": 2, "failed": 0}));
    Ok(())
}

#[actix_web::test]
async fn unknown_platforms_keep_their_integration() {
    let _ = env_logger::try_init().ok();
    let body = json!({"platform": "acme", "integration_id": 42}).to_string();
    let (status, body) =
        post_request("/test/generate-orders", &body, configure_unknown_platform).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let response: GenerationResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(response.counters.generated, 1);
    assert!(response.error.is_none());
}

#[actix_web::test]
async fn invalid_json() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/test/generate-orders", "{\"count\": ", configure_recording).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert!(response["error"].as_str().unwrap().starts_with("Could not read request body"));

    let (status, _) = post_request("/test/generate-orders", "{\"count\": \"many\"}", configure_recording)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn negative_counts_generate_one_order() {
    let _ = env_logger::try_init().ok();
    let body = json!({"count": -2, "platform": "hosted"}).to_string();
    let (status, body) =
        post_request("/test/generate-orders", &body, configure_recording).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"generated":1,"published":1,"failed":0}"#);
}

#[actix_web::test]
async fn partial_failure_reports_counters() {
    let _ = env_logger::try_init().ok();
    let body = json!({"count": 4, "platform": "storefront"}).to_string();
    let (status, body) =
        post_request("/test/generate-orders", &body, configure_failing_publisher).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let response: GenerationResponse = serde_json::from_str(&body).unwrap();
    assert_eq!((response.counters.generated, response.counters.published, response.counters.failed), (4, 2, 2));
    assert_eq!(response.error, Some(OddIndexFailingPublisher::error_for(1).to_string()));
}

#[actix_web::test]
async fn real_generator_publishes_channel_orders() {
    let _ = env_logger::try_init().ok();
    let body = json!({"count": 3, "platform": "Hosted-Checkout", "include_payment": true}).to_string();
    let (status, body) =
        post_request("/test/generate-orders", &body, configure_recording).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"generated":3,"published":3,"failed":0}"#);
}

fn configure_pinned(cfg: &mut ServiceConfig) {
    let mut generator = MockGenerator::new();
    generator
        .expect_generate()
        .withf(|r| r.platform == "marketplace" && r.business_id == Some(7) && r.integration_id == 5 && r.count == 2)
        .times(2)
        .returning(|r| {
            let mut order = sample_order(&r.platform);
            order.business_id = r.business_id;
            order.integration_id = r.integration_id;
            Ok(order)
        });
    register(cfg, generator);
}

fn configure_unknown_platform(cfg: &mut ServiceConfig) {
    let mut generator = MockGenerator::new();
    generator
        .expect_generate()
        .withf(|r| r.integration_id == 42 && r.business_id == Some(7))
        .times(1)
        .returning(|r| Ok(sample_order(&r.platform)));
    register(cfg, generator);
}

fn register(cfg: &mut ServiceConfig, generator: MockGenerator) {
    let api = OrderPipelineApi::new(generator, RecordingPublisher::default());
    cfg.service(GenerateOrdersRoute::<MockGenerator, RecordingPublisher>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(GenerationSettings::default()));
}

fn configure_failing_publisher(cfg: &mut ServiceConfig) {
    let api = OrderPipelineApi::new(OrderGenerator::new(), Arc::new(OddIndexFailingPublisher::default()));
    cfg.service(GenerateOrdersRoute::<OrderGenerator, Arc<OddIndexFailingPublisher>>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(GenerationSettings::default()));
}

fn configure_recording(cfg: &mut ServiceConfig) {
    let api = OrderPipelineApi::new(OrderGenerator::new(), RecordingPublisher::default());
    cfg.service(GenerateOrdersRoute::<OrderGenerator, RecordingPublisher>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(GenerationSettings::default()));
}
