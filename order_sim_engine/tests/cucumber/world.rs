use std::{fmt::Debug, sync::Arc};

use chrono::{TimeZone, Utc};
use cucumber::World;
use order_sim_engine::{
    canonical::OrderSource,
    test_utils::{OddIndexFailingPublisher, RecordingPublisher},
    BatchFailure,
    CanonicalOrder,
    CanonicalizationError,
    GenerationCounters,
    OrderGenerator,
    Platform,
};
use serde_json::Value;

#[derive(Default, World)]
pub struct OrderSimWorld {
    pub platform: Option<Platform>,
    pub payload: Option<Value>,
    /// Payload bytes exactly as they were handed to the canonicalizer.
    pub raw: Option<String>,
    pub order: Option<Result<CanonicalOrder, CanonicalizationError>>,
    pub generator: OrderGenerator,
    pub recorder: RecordingPublisher,
    pub failing_publisher: Option<Arc<OddIndexFailingPublisher>>,
    pub batch: Option<Result<GenerationCounters, BatchFailure>>,
}

impl Debug for OrderSimWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSimWorld")
            .field("platform", &self.platform)
            .field("payload", &self.payload)
            .field("generator", &self.generator)
            .field("batch", &self.batch)
            .finish()
    }
}

impl OrderSimWorld {
    pub fn platform(&self) -> Platform {
        self.platform.expect("No platform has been chosen")
    }

    pub fn payload_mut(&mut self) -> &mut Value {
        self.payload.as_mut().expect("No payload has been loaded")
    }

    pub fn order(&self) -> &CanonicalOrder {
        match &self.order {
            Some(Ok(order)) => order,
            Some(Err(e)) => panic!("Canonicalization failed: {e}"),
            None => panic!("Nothing has been canonicalized"),
        }
    }

    pub fn source() -> OrderSource {
        OrderSource::new(1, Some(7), Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }
}
