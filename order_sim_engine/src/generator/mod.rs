//! The generator facade.
//!
//! [`OrderGenerator`] turns a [`GenerateOrderRequest`] into a [`CanonicalOrder`]. Channel platforms go through their
//! synthesizer and canonicalizer; anything else, and any channel whose synthesizer or canonicalizer fails, goes
//! through the generic path.
//!
//! Synthesizers are plain functions held in a dispatch table, so tests can swap one out with
//! [`OrderGenerator::with_synthesizer`].
mod generic;

use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use chrono::{DateTime, Utc};
use log::*;
use platform_tools::{hosted, marketplace, storefront, SynthesisError};
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;

pub use generic::{generate_generic, GENERIC_CURRENCY};

use crate::{
    canonical::{canonicalize, CanonicalizationError, OrderSource},
    order_types::{CanonicalOrder, GenerateOrderRequest, Platform},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("Synthesis failed. {0}")]
    SynthesisFailed(#[from] SynthesisError),
    #[error("Canonicalization failed. {0}")]
    CanonicalizationFailed(#[from] CanonicalizationError),
    #[error("Could not serialize the request: {0}")]
    Serialization(String),
}

/// A channel payload synthesizer.
pub type RawSynthesizer = fn(&mut StdRng, DateTime<Utc>) -> Result<Vec<u8>, SynthesisError>;

pub trait GenerateOrders: Send + Sync {
    fn generate(&self, request: &GenerateOrderRequest) -> Result<CanonicalOrder, GeneratorError>;
}

#[derive(Clone)]
pub struct OrderGenerator {
    synthesizers: HashMap<Platform, RawSynthesizer>,
    seed: Option<u64>,
    calls: Arc<AtomicU64>,
}

impl Debug for OrderGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderGenerator(seed: {:?}, channels: {})", self.seed, self.synthesizers.len())
    }
}

impl Default for OrderGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderGenerator {
    pub fn new() -> Self {
        let mut synthesizers = HashMap::new();
        synthesizers.insert(Platform::Marketplace, marketplace::synthesize::<StdRng> as RawSynthesizer);
        synthesizers.insert(Platform::Hosted, hosted::synthesize::<StdRng> as RawSynthesizer);
        synthesizers.insert(Platform::Storefront, storefront::synthesize::<StdRng> as RawSynthesizer);
        Self { synthesizers, seed: None, calls: Arc::new(AtomicU64::new(0)) }
    }

    /// The n-th call to [`GenerateOrders::generate`] seeds its random source with `seed + n`. Two generators built
    /// with the same seed therefore produce the same sequence of orders, while the orders within that sequence stay
    /// distinct. Clones share the call counter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the synthesizer of a channel. The generic path has no synthesizer; replacing it is ignored.
    pub fn with_synthesizer(mut self, platform: Platform, synthesizer: RawSynthesizer) -> Self {
        if platform == Platform::Generic {
            warn!("🏭️ The generic path has no synthesizer. Ignoring the replacement");
        } else {
            self.synthesizers.insert(platform, synthesizer);
        }
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn new_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.calls.fetch_add(1, Ordering::Relaxed))),
            None => StdRng::from_entropy(),
        }
    }

    /// Generates one order using the given random source and clock.
    ///
    /// Channel payloads are synthesized and canonicalized with `now` as the ingestion time. Failures are logged and
    /// answered with a generic order, so an error is only returned if the generic path itself fails.
    pub fn generate_at(
        &self,
        request: &GenerateOrderRequest,
        rng: &mut StdRng,
        now: DateTime<Utc>,
    ) -> Result<CanonicalOrder, GeneratorError> {
        let platform = request.platform();
        if let Some(synthesize) = self.synthesizers.get(&platform) {
            match self.channel_order(*synthesize, platform, request, rng, now) {
                Ok(order) => return Ok(order),
                Err(e) => warn!("🏭️ Could not generate a {platform} order. Falling back to a generic order. {e}"),
            }
        } else if platform != Platform::Generic {
            debug!("🏭️ No synthesizer for {platform}. Generating a generic order");
        }
        generate_generic(request, rng, now)
    }

    fn channel_order(
        &self,
        synthesize: RawSynthesizer,
        platform: Platform,
        request: &GenerateOrderRequest,
        rng: &mut StdRng,
        now: DateTime<Utc>,
    ) -> Result<CanonicalOrder, GeneratorError> {
        let payload = synthesize(rng, now)?;
        trace!("🏭️ Synthesized {} byte {platform} payload", payload.len());
        let source = OrderSource::new(request.integration_id, request.business_id, now);
        Ok(canonicalize(platform, &payload, &source)?)
    }
}

impl GenerateOrders for OrderGenerator {
    fn generate(&self, request: &GenerateOrderRequest) -> Result<CanonicalOrder, GeneratorError> {
        let mut rng = self.new_rng();
        let order = self.generate_at(request, &mut rng, Utc::now())?;
        debug!("🏭️ Generated {} order {} for integration {}", order.platform, order.external_id, order.integration_id);
        Ok(order)
    }
}
