use std::time::Duration;

use bytes::Bytes;
use futures_util::{future::BoxFuture, FutureExt};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
};

use super::{BrokerError, MessageBroker};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Forwards every message as a `POST` to `<base_url>/<routing_key>`.
#[derive(Clone)]
pub struct HttpRelayBroker {
    client: Client,
    base_url: String,
}

impl HttpRelayBroker {
    pub fn new(base_url: &str) -> Result<Self, BrokerError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, BrokerError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(BrokerError::Unavailable(format!("'{base_url}' is not an http(s) URL")));
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("Order Simulator Relay")
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BrokerError::Unavailable(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Creates the relay and checks that its endpoint answers. Any HTTP response counts as reachable.
    pub async fn connect(base_url: &str) -> Result<Self, BrokerError> {
        let broker = Self::new(base_url)?;
        broker.probe().await?;
        Ok(broker)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, routing_key: &str) -> String {
        format!("{}/{routing_key}", self.base_url)
    }

    pub async fn probe(&self) -> Result<(), BrokerError> {
        match self.client.get(&self.base_url).send().await {
            Ok(res) => {
                debug!("📮️ Relay at {} answered with {}", self.base_url, res.status());
                Ok(())
            },
            Err(e) => {
                warn!("📮️ Relay at {} is unreachable. {e}", self.base_url);
                Err(BrokerError::Unavailable(e.to_string()))
            },
        }
    }

    async fn post(&self, routing_key: &str, body: Bytes) -> Result<(), BrokerError> {
        let url = self.url_for(routing_key);
        trace!("📮️ POST {} bytes to {url}", body.len());
        let res = self.client.post(&url).body(body).send().await.map_err(|e| BrokerError::SendFailed(e.to_string()))?;
        let status = res.status();
        if status.is_success() {
            return Ok(());
        }
        let message = res.text().await.unwrap_or_default();
        Err(BrokerError::Rejected { status: status.as_u16(), message })
    }
}

impl MessageBroker for HttpRelayBroker {
    fn send<'a>(&'a self, routing_key: &'a str, body: Bytes) -> BoxFuture<'a, Result<(), BrokerError>> {
        self.post(routing_key, body).boxed()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn relay_urls() {
        let broker = HttpRelayBroker::new("http://localhost:9999/orders/").unwrap();
        assert_eq!(broker.base_url(), "http://localhost:9999/orders");
        assert_eq!(broker.url_for("hosted"), "http://localhost:9999/orders/hosted");
    }

    #[test]
    fn only_http_urls() {
        let err = HttpRelayBroker::new("amqp://localhost:5672").err().unwrap();
        assert!(matches!(err, BrokerError::Unavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_relay() {
        let _ = env_logger::try_init();
        // nothing listens on port 1
        let err = HttpRelayBroker::connect("http://127.0.0.1:1").await.err().unwrap();
        assert!(matches!(err, BrokerError::Unavailable(_)));
    }
}
