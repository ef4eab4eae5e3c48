use order_sim_engine::{BatchFailure, GenerationCounters};
use serde::{Deserialize, Serialize};

/// The body returned by `POST /test/generate-orders`. `error` is only present when at least one order failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(flatten)]
    pub counters: GenerationCounters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResponse {
    pub fn success(counters: GenerationCounters) -> Self {
        Self { counters, error: None }
    }

    pub fn failure(failure: &BatchFailure) -> Self {
        Self { counters: failure.counters, error: Some(failure.error.to_string()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformIntegration {
    pub platform: String,
    pub integration_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub interval_secs: u64,
    pub orders_per_batch: u32,
    pub platforms: Vec<PlatformIntegration>,
    pub ticks: u64,
}
