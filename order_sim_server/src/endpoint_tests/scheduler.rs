use std::{sync::Arc, time::Duration};

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use order_sim_engine::{test_utils::RecordingPublisher, OrderGenerator, OrderPipelineApi};

use super::helpers::{get_request, post_request};
use crate::{
    data_objects::SchedulerStatus,
    order_scheduler::{OrderScheduler, SchedulerConfig},
    routes::SchedulerStatusRoute,
};

#[actix_web::test]
async fn scheduler_status() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/test/scheduler", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let status: SchedulerStatus = serde_json::from_str(&body).unwrap();
    assert!(!status.running);
    assert_eq!(status.interval_secs, 30);
    assert_eq!(status.orders_per_batch, 2);
    let platforms = status.platforms.iter().map(|p| (p.platform.as_str(), p.integration_id)).collect::<Vec<_>>();
    assert_eq!(platforms, vec![("marketplace", 5), ("hosted", 1), ("storefront", 6)]);
}

#[actix_web::test]
async fn generation_routes_are_absent_when_disabled() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request("/test/scheduler", |_| {}).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = post_request("/test/generate-orders", "{}", |_| {}).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure(cfg: &mut ServiceConfig) {
    let api = Arc::new(OrderPipelineApi::new(OrderGenerator::new(), RecordingPublisher::default()));
    let config = SchedulerConfig { interval: Duration::from_secs(30), orders_per_batch: 2, ..Default::default() };
    let scheduler = OrderScheduler::new(api, config);
    cfg.service(SchedulerStatusRoute::<OrderGenerator, RecordingPublisher>::new())
        .app_data(web::Data::new(scheduler));
}
