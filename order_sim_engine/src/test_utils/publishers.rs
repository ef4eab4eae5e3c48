use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
    Mutex,
};

use futures_util::{future::BoxFuture, FutureExt};

use crate::{
    broker::BrokerError,
    generator::{GenerateOrders, GeneratorError},
    order_types::{CanonicalOrder, GenerateOrderRequest},
    publisher::{OrderPublisher, PublishError},
};

/// Keeps a copy of everything it publishes. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    orders: Arc<Mutex<Vec<CanonicalOrder>>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<CanonicalOrder> {
        self.orders.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn routing_keys(&self) -> Vec<String> {
        self.published().into_iter().map(|o| o.platform).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut orders) = self.orders.lock() {
            orders.clear();
        }
    }
}

impl OrderPublisher for RecordingPublisher {
    fn publish<'a>(&'a self, order: &'a CanonicalOrder) -> BoxFuture<'a, Result<(), PublishError>> {
        let result = match self.orders.lock() {
            Ok(mut orders) => {
                orders.push(order.clone());
                Ok(())
            },
            Err(e) => Err(PublishError::Broker(BrokerError::SendFailed(e.to_string()))),
        };
        futures_util::future::ready(result).boxed()
    }
}

/// Fails every publish attempt with an odd (zero-based) index.
#[derive(Debug, Default)]
pub struct OddIndexFailingPublisher {
    attempts: AtomicUsize,
    inner: RecordingPublisher,
}

impl OddIndexFailingPublisher {
    pub fn error_for(index: usize) -> PublishError {
        PublishError::Broker(BrokerError::SendFailed(format!("attempt {index} rejected")))
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> Vec<CanonicalOrder> {
        self.inner.published()
    }
}

impl OrderPublisher for OddIndexFailingPublisher {
    fn publish<'a>(&'a self, order: &'a CanonicalOrder) -> BoxFuture<'a, Result<(), PublishError>> {
        let index = self.attempts.fetch_add(1, Ordering::SeqCst);
        if index % 2 == 1 {
            let err = Self::error_for(index);
            return async move { Err(err) }.boxed();
        }
        self.inner.publish(order)
    }
}

/// Never completes a publish.
pub struct PendingPublisher;

impl OrderPublisher for PendingPublisher {
    fn publish<'a>(&'a self, _order: &'a CanonicalOrder) -> BoxFuture<'a, Result<(), PublishError>> {
        futures_util::future::pending().boxed()
    }
}

/// A generator that always fails.
pub struct FailingGenerator;

impl GenerateOrders for FailingGenerator {
    fn generate(&self, _request: &GenerateOrderRequest) -> Result<CanonicalOrder, GeneratorError> {
        Err(GeneratorError::Serialization("generator is switched off".into()))
    }
}
