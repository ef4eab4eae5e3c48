//! The periodic order scheduler.
//!
//! Once started, the scheduler ticks immediately and then every `interval`. Each tick runs one generate-and-publish
//! batch per channel, in the order marketplace, hosted, storefront. A failing channel is logged and the tick moves on
//! to the next one.
//!
//! An explicit [`OrderScheduler::stop`] and cancellation of the context passed to [`OrderScheduler::start`] both end
//! up on the same cancellation token. A tick in flight when the token fires abandons its current publish and skips the
//! remaining channels.
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
        Mutex,
        MutexGuard,
    },
    time::Duration,
};

use log::*;
use order_sim_engine::{GenerateOrderRequest, GenerateOrders, OrderPipelineApi, OrderPublisher, Platform};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    config::IntegrationIds,
    data_objects::{PlatformIntegration, SchedulerStatus},
};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_STATUS: &str = "pending";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub orders_per_batch: u32,
    pub business_id: Option<u32>,
    pub status: String,
    pub include_payment: bool,
    pub include_shipment: bool,
    pub integrations: IntegrationIds,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            orders_per_batch: 1,
            business_id: None,
            status: DEFAULT_STATUS.to_string(),
            include_payment: true,
            include_shipment: true,
            integrations: IntegrationIds::default(),
        }
    }
}

impl SchedulerConfig {
    /// Replaces a zero interval, a zero batch size and a blank status with their defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.interval.is_zero() {
            self.interval = DEFAULT_INTERVAL;
        }
        if self.orders_per_batch == 0 {
            self.orders_per_batch = 1;
        }
        if self.status.trim().is_empty() {
            self.status = DEFAULT_STATUS.to_string();
        }
        self
    }

    pub fn request_for(&self, platform: Platform, integration_id: u32) -> GenerateOrderRequest {
        GenerateOrderRequest::new(platform.tag())
            .with_count(self.orders_per_batch)
            .with_integration_id(integration_id)
            .with_business_id(self.business_id)
            .with_status(self.status.clone())
            .with_payment(self.include_payment)
            .with_shipment(self.include_shipment)
    }
}

struct Worker {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct OrderScheduler<G, P> {
    api: Arc<OrderPipelineApi<G, P>>,
    config: SchedulerConfig,
    worker: Mutex<Option<Worker>>,
    ticks: Arc<AtomicU64>,
}

impl<G, P> OrderScheduler<G, P>
where
    G: GenerateOrders + 'static,
    P: OrderPublisher + 'static,
{
    pub fn new(api: Arc<OrderPipelineApi<G, P>>, config: SchedulerConfig) -> Self {
        Self { api, config: config.with_defaults(), worker: Mutex::new(None), ticks: Arc::new(AtomicU64::new(0)) }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_running(&self) -> bool {
        self.worker().as_ref().is_some_and(|w| !w.handle.is_finished())
    }

    /// Starts the background worker. Returns `false`, and changes nothing, if the scheduler is already running.
    ///
    /// The worker also stops when `ctx` is cancelled.
    pub fn start(&self, ctx: &CancellationToken) -> bool {
        let mut worker = self.worker();
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            warn!("🕰️ The order scheduler is already running");
            return false;
        }
        let stop = ctx.child_token();
        let handle = tokio::spawn(run_scheduler(self.api.clone(), self.config.clone(), stop.clone(), self.ticks.clone()));
        *worker = Some(Worker { stop, handle });
        true
    }

    /// Signals the worker to stop and waits for it to finish. Nothing is published once this returns.
    pub async fn stop(&self) {
        let worker = self.worker().take();
        let Some(worker) = worker else {
            debug!("🕰️ The order scheduler is not running");
            return;
        };
        worker.stop.cancel();
        if let Err(e) = worker.handle.await {
            error!("🕰️ The order scheduler did not shut down cleanly. {e}");
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.is_running(),
            interval_secs: self.config.interval.as_secs(),
            orders_per_batch: self.config.orders_per_batch,
            platforms: self
                .config
                .integrations
                .channels()
                .into_iter()
                .map(|(p, integration_id)| PlatformIntegration { platform: p.tag().to_string(), integration_id })
                .collect(),
            ticks: self.ticks.load(Ordering::SeqCst),
        }
    }
}

async fn run_scheduler<G, P>(
    api: Arc<OrderPipelineApi<G, P>>,
    config: SchedulerConfig,
    stop: CancellationToken,
    ticks: Arc<AtomicU64>,
) where
    G: GenerateOrders,
    P: OrderPublisher,
{
    let mut timer = tokio::time::interval(config.interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(
        "🕰️ Order scheduler started. {} order(s) per channel every {}s",
        config.orders_per_batch,
        config.interval.as_secs_f64()
    );
    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            _ = timer.tick() => {
                let tick = ticks.fetch_add(1, Ordering::SeqCst) + 1;
                run_tick(tick, &api, &config, &stop).await;
            },
        }
    }
    info!("🕰️ Order scheduler stopped");
}

async fn run_tick<G, P>(tick: u64, api: &OrderPipelineApi<G, P>, config: &SchedulerConfig, stop: &CancellationToken)
where
    G: GenerateOrders,
    P: OrderPublisher,
{
    debug!("🕰️ Running tick {tick}");
    for (platform, integration_id) in config.integrations.channels() {
        if stop.is_cancelled() {
            debug!("🕰️ Tick {tick} interrupted. Skipping {platform} and any remaining channels");
            break;
        }
        let request = config.request_for(platform, integration_id);
        match api.generate_and_publish_until(&request, stop).await {
            Ok(counters) => debug!("🕰️ {platform}: {counters}"),
            Err(failure) => error!("🕰️ {platform} batch failed on tick {tick}. {failure}"),
        }
    }
}
