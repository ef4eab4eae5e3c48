//! In-process broker.
//!
//! A bounded queue with a single consumer. [`MemoryQueue`] owns the receiving end and a handler; every
//! [`MemoryBroker`] handed out by [`MemoryQueue::broker`] feeds the same queue. Messages are handled one at a time, in
//! the order they were queued. The consumer stops once every broker has been dropped and the queue is drained.
use std::{future::Future, pin::Pin, sync::Arc};

use bytes::Bytes;
use futures_util::{future::BoxFuture, FutureExt};
use log::*;
use tokio::sync::mpsc;

use super::{BrokerError, MessageBroker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMessage {
    pub routing_key: String,
    pub body: Bytes,
}

pub type MessageHandler = Arc<dyn Fn(BrokerMessage) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// A handler that logs each message and drops it.
pub fn logging_handler() -> MessageHandler {
    Arc::new(|msg: BrokerMessage| {
        Box::pin(async move {
            info!("📮️ Delivered {} byte message on '{}'", msg.body.len(), msg.routing_key);
            trace!("📮️ {}", String::from_utf8_lossy(&msg.body));
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    })
}

pub struct MemoryQueue {
    listener: mpsc::Receiver<BrokerMessage>,
    sender: mpsc::Sender<BrokerMessage>,
    handler: MessageHandler,
}

impl MemoryQueue {
    pub fn new(buffer_size: usize, handler: MessageHandler) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size.max(1));
        Self { listener, sender, handler }
    }

    pub fn broker(&self) -> MemoryBroker {
        MemoryBroker { sender: self.sender.clone() }
    }

    pub async fn start_consumer(mut self) {
        debug!("📮️ Starting in-memory queue consumer");
        // drop the internal sender so that the consumer ends when the last broker is dropped
        drop(self.sender);
        let mut handled = 0u64;
        while let Some(msg) = self.listener.recv().await {
            trace!("📮️ Handling message on '{}'", msg.routing_key);
            (self.handler)(msg).await;
            handled += 1;
        }
        debug!("📮️ In-memory queue consumer has shut down after {handled} messages");
    }
}

#[derive(Clone)]
pub struct MemoryBroker {
    sender: mpsc::Sender<BrokerMessage>,
}

impl MemoryBroker {
    /// Waits for queue capacity, then enqueues the message.
    pub async fn enqueue(&self, routing_key: &str, body: Bytes) -> Result<(), BrokerError> {
        let msg = BrokerMessage { routing_key: routing_key.to_string(), body };
        self.sender.send(msg).await.map_err(|_| BrokerError::Closed)
    }
}

impl MessageBroker for MemoryBroker {
    fn send<'a>(&'a self, routing_key: &'a str, body: Bytes) -> BoxFuture<'a, Result<(), BrokerError>> {
        self.enqueue(routing_key, body).boxed()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;

    #[tokio::test]
    async fn messages_are_handled_in_order() {
        let _ = env_logger::try_init();
        let received = Arc::new(Mutex::new(Vec::new()));
        let r2 = received.clone();
        let handler: MessageHandler = Arc::new(move |msg: BrokerMessage| {
            let received = r2.clone();
            Box::pin(async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
                received.lock().unwrap().push(msg.routing_key);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let queue = MemoryQueue::new(1, handler);
        let broker_1 = queue.broker();
        let broker_2 = queue.broker();
        let producer = tokio::spawn(async move {
            for key in ["marketplace", "hosted", "storefront"] {
                broker_1.send(key, Bytes::from_static(b"{}")).await.unwrap();
            }
            drop(broker_2);
        });
        queue.start_consumer().await;
        producer.await.unwrap();
        assert_eq!(*received.lock().unwrap(), vec!["marketplace", "hosted", "storefront"]);
    }

    #[tokio::test]
    async fn closed_queue() {
        let queue = MemoryQueue::new(4, logging_handler());
        let broker = queue.broker();
        drop(queue);
        let err = broker.send("hosted", Bytes::from_static(b"{}")).await.unwrap_err();
        assert_eq!(err, BrokerError::Closed);
    }
}
