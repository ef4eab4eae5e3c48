//! The generate-and-publish use case.
//!
//! [`OrderPipelineApi`] ties a generator to a publisher. A batch never stops on the first failure: every order is
//! attempted, and the tallies say how many made it. If anything failed, the first error is returned along with the
//! partial tallies.
use log::*;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    generator::{GenerateOrders, GeneratorError},
    order_types::{GenerateOrderRequest, GenerationCounters},
    publisher::{OrderPublisher, PublishError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Generation(#[from] GeneratorError),
    #[error("{0}")]
    Publish(#[from] PublishError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{counters}. First failure: {error}")]
pub struct BatchFailure {
    pub counters: GenerationCounters,
    pub error: PipelineError,
}

pub struct OrderPipelineApi<G, P> {
    generator: G,
    publisher: P,
}

impl<G, P> OrderPipelineApi<G, P> {
    pub fn new(generator: G, publisher: P) -> Self {
        Self { generator, publisher }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}

impl<G, P> OrderPipelineApi<G, P>
where
    G: GenerateOrders,
    P: OrderPublisher,
{
    /// Generates `max(1, count)` orders and publishes each one as it is made.
    pub async fn generate_and_publish(
        &self,
        request: &GenerateOrderRequest,
    ) -> Result<GenerationCounters, BatchFailure> {
        self.run_batch(request, None).await
    }

    /// As [`Self::generate_and_publish`], but stops when `cancel` fires. A publish that is interrupted counts as a
    /// failure; orders not yet started are skipped and not counted.
    pub async fn generate_and_publish_until(
        &self,
        request: &GenerateOrderRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationCounters, BatchFailure> {
        self.run_batch(request, Some(cancel)).await
    }

    async fn run_batch(
        &self,
        request: &GenerateOrderRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<GenerationCounters, BatchFailure> {
        let mut counters = GenerationCounters::default();
        let mut first_error: Option<PipelineError> = None;
        let size = request.batch_size();
        for i in 0..size {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                info!("🏭️ Batch cancelled after {i} of {size} orders");
                break;
            }
            let order = match self.generator.generate(request) {
                Ok(order) => order,
                Err(e) => {
                    warn!("🏭️ Could not generate order {} of {size}. {e}", i + 1);
                    counters.failed += 1;
                    first_error.get_or_insert(e.into());
                    continue;
                },
            };
            counters.generated += 1;
            let result = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(PublishError::Cancelled),
                    res = self.publisher.publish(&order) => res,
                },
                None => self.publisher.publish(&order).await,
            };
            match result {
                Ok(()) => counters.published += 1,
                Err(PublishError::Cancelled) => {
                    info!("📮️ Publishing of {} was interrupted. Abandoning the batch", order.external_id);
                    counters.failed += 1;
                    first_error.get_or_insert(PublishError::Cancelled.into());
                    break;
                },
                Err(e) => {
                    warn!("📮️ Could not publish {} order {}. {e}", order.platform, order.external_id);
                    counters.failed += 1;
                    first_error.get_or_insert(e.into());
                },
            }
        }
        match first_error {
            None => {
                debug!("🏭️ Batch complete. {counters}");
                Ok(counters)
            },
            Some(error) => Err(BatchFailure { counters, error }),
        }
    }
}
