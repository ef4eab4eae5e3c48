//! Hands canonical orders to a message broker.
use std::sync::Arc;

use bytes::Bytes;
use futures_util::{future::BoxFuture, FutureExt};
use log::*;
use thiserror::Error;

use crate::{
    broker::{BrokerError, MessageBroker},
    order_types::CanonicalOrder,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("Could not serialize the order: {0}")]
    Serialization(String),
    #[error("Publishing failed. {0}")]
    Broker(#[from] BrokerError),
    #[error("Publishing was cancelled")]
    Cancelled,
}

pub trait OrderPublisher: Send + Sync {
    fn publish<'a>(&'a self, order: &'a CanonicalOrder) -> BoxFuture<'a, Result<(), PublishError>>;
}

impl<P: OrderPublisher + ?Sized> OrderPublisher for Arc<P> {
    fn publish<'a>(&'a self, order: &'a CanonicalOrder) -> BoxFuture<'a, Result<(), PublishError>> {
        (**self).publish(order)
    }
}

/// Publishes each order as compact JSON, routed by its platform tag. Failures are returned as-is; there is no retry.
#[derive(Clone)]
pub struct BrokerPublisher<B> {
    broker: B,
}

impl<B: MessageBroker> BrokerPublisher<B> {
    pub fn new(broker: B) -> Self {
        Self { broker }
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    async fn send(&self, order: &CanonicalOrder) -> Result<(), PublishError> {
        let body = order.to_message().map_err(|e| PublishError::Serialization(e.to_string()))?;
        self.broker.send(&order.platform, Bytes::from(body)).await?;
        debug!("📮️ Published {} order {}", order.platform, order.external_id);
        Ok(())
    }
}

impl<B: MessageBroker> OrderPublisher for BrokerPublisher<B> {
    fn publish<'a>(&'a self, order: &'a CanonicalOrder) -> BoxFuture<'a, Result<(), PublishError>> {
        self.send(order).boxed()
    }
}

#[cfg(test)]
mod test {
    use std::{future::Future, pin::Pin, sync::Mutex};

    use super::*;
    use crate::{
        broker::{BrokerMessage, MemoryQueue, MessageHandler},
        test_utils::sample_order,
    };

    #[tokio::test]
    async fn orders_are_routed_by_platform() {
        let _ = env_logger::try_init();
        let received = Arc::new(Mutex::new(Vec::new()));
        let r2 = received.clone();
        let handler: MessageHandler = Arc::new(move |msg: BrokerMessage| {
            let received = r2.clone();
            Box::pin(async move {
                received.lock().unwrap().push(msg);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let queue = MemoryQueue::new(8, handler);
        let publisher = BrokerPublisher::new(queue.broker());
        let consumer = tokio::spawn(queue.start_consumer());
        let orders = ["hosted", "marketplace"].map(sample_order);
        for order in &orders {
            publisher.publish(order).await.unwrap();
        }
        drop(publisher);
        consumer.await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        for (msg, order) in received.iter().zip(orders.iter()) {
            assert_eq!(msg.routing_key, order.platform);
            assert_eq!(msg.body, Bytes::from(order.to_message().unwrap()));
            let decoded: CanonicalOrder = serde_json::from_slice(&msg.body).unwrap();
            assert_eq!(decoded.external_id, order.external_id);
            assert_eq!(decoded.channel_metadata.raw_data, order.channel_metadata.raw_data);
        }
    }

    #[tokio::test]
    async fn broker_errors_propagate() {
        let queue = MemoryQueue::new(1, crate::broker::logging_handler());
        let publisher = BrokerPublisher::new(queue.broker());
        drop(queue);
        let err = publisher.publish(&sample_order("storefront")).await.unwrap_err();
        assert_eq!(err, PublishError::Broker(BrokerError::Closed));
    }
}
