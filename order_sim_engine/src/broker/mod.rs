//! Message broker adapters.
//!
//! The engine only needs one thing from a broker: accept a message body under a routing key. [`MemoryBroker`] keeps
//! messages in-process and hands them to a consumer task; [`HttpRelayBroker`] forwards them to an HTTP endpoint.
mod channel;
mod http;

use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use thiserror::Error;

pub use channel::{logging_handler, BrokerMessage, MemoryBroker, MemoryQueue, MessageHandler};
pub use http::HttpRelayBroker;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("The broker is unavailable: {0}")]
    Unavailable(String),
    #[error("The broker queue has been closed")]
    Closed,
    #[error("Could not deliver the message: {0}")]
    SendFailed(String),
    #[error("The broker rejected the message. Status {status}. {message}")]
    Rejected { status: u16, message: String },
}

/// A thread-safe sink for messages. Delivery is at-least-once; implementations do not retry.
pub trait MessageBroker: Send + Sync {
    fn send<'a>(&'a self, routing_key: &'a str, body: Bytes) -> BoxFuture<'a, Result<(), BrokerError>>;
}

impl<B: MessageBroker + ?Sized> MessageBroker for Arc<B> {
    fn send<'a>(&'a self, routing_key: &'a str, body: Bytes) -> BoxFuture<'a, Result<(), BrokerError>> {
        (**self).send(routing_key, body)
    }
}
