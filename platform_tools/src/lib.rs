//! Source data and payload synthesizers for the three external order channels.
//!
//! Each channel module carries the channel's native payload model (serializable for synthesis and deserializable for
//! ingestion) and a `synthesize` function that produces a realistic payload from a random source and a clock.
mod error;
pub mod fixtures;
pub mod helpers;
pub mod hosted;
pub mod marketplace;
pub mod storefront;

pub use error::SynthesisError;
