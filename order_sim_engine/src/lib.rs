//! Order Simulator Engine
//!
//! The engine produces realistic test orders and pushes them downstream in a single, channel-independent shape.
//!
//! The library is divided into these sections:
//! 1. The canonical order model ([`mod@order_types`]). Every order, whichever sales channel it came from, ends up as
//!    a [`CanonicalOrder`], carrying the untouched channel payload alongside the normalized fields.
//! 2. Canonicalizers ([`mod@canonical`]). One per channel. They map a raw channel payload onto the canonical model,
//!    including the channel's status vocabulary.
//! 3. The generator ([`mod@generator`]). It synthesizes a channel payload with the fixtures in `platform_tools`, runs
//!    it through the matching canonicalizer and falls back to a generic order if either step fails.
//! 4. Publishing ([`mod@broker`] and [`mod@publisher`]). Canonical orders are serialized to compact JSON and handed to
//!    a message broker, routed by platform tag.
//! 5. The generate-and-publish use case ([`OrderPipelineApi`]), which is what the server and scheduler call.
pub mod broker;
pub mod canonical;
pub mod generator;
pub mod order_types;
pub mod pipeline_api;
pub mod publisher;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use broker::{BrokerError, HttpRelayBroker, MemoryBroker, MemoryQueue, MessageBroker};
pub use canonical::{canonicalize, CanonicalizationError, OrderSource};
pub use generator::{GenerateOrders, GeneratorError, OrderGenerator};
pub use order_types::{CanonicalOrder, GenerateOrderRequest, GenerationCounters, OrderStatus, PaymentStatus, Platform};
pub use pipeline_api::{BatchFailure, OrderPipelineApi, PipelineError};
pub use publisher::{BrokerPublisher, OrderPublisher, PublishError};
