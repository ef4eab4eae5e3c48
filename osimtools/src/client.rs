use std::fmt::Display;

use anyhow::{anyhow, Result};
use log::*;
use order_sim_engine::GenerateOrderRequest;
use order_sim_server::data_objects::{GenerationResponse, SchedulerStatus};
use osim_common::Secret;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    StatusCode,
};
use url::Url;

pub const ACCESS_TOKEN_ENV: &str = "OSIM_ACCESS_TOKEN";

pub struct SimServerClient {
    client: Client,
    server: Url,
    access_token: Option<Secret<String>>,
}

impl SimServerClient {
    pub fn new(server: &str, access_token: Option<Secret<String>>) -> Result<Self> {
        let server = Url::parse(server).map_err(|e| anyhow!("'{server}' is not a valid server URL. {e}"))?;
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder().user_agent("Order Simulator Tools").default_headers(headers).build()?;
        Ok(Self { client, server, access_token })
    }

    /// A client that authenticates with the bearer token in `OSIM_ACCESS_TOKEN`, if there is one.
    pub fn from_env(server: &str) -> Result<Self> {
        let token = Secret::from_env(ACCESS_TOKEN_ENV);
        if token.is_none() {
            warn!("{ACCESS_TOKEN_ENV} is not set. Requests will not be authenticated.");
        }
        Self::new(server, token)
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.server.join(path).map_err(|e| anyhow!("Failed to join URL: {}", e))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token.reveal()),
            None => request,
        }
    }

    pub async fn health(&self) -> Result<String> {
        let url = self.url("/health")?;
        let res = self.client.get(url).send().await?;
        let response = res.text().await?;
        Ok(response)
    }

    /// Requests a batch of orders. A batch with failures still returns its counters; other errors (a rejected request
    /// body, a missing route when the server has no broker) are returned as errors.
    pub async fn generate_orders(&self, request: &GenerateOrderRequest) -> Result<GenerationResponse> {
        let url = self.url("/test/generate-orders")?;
        let res = self.authorize(self.client.post(url)).json(request).send().await?;
        let code = res.status();
        match code {
            c if c.is_success() || c == StatusCode::INTERNAL_SERVER_ERROR => {
                let body = res.text().await?;
                serde_json::from_str::<GenerationResponse>(&body)
                    .map_err(|e| anyhow!("Error {code}. Unexpected response from the server: {e}. {body}"))
            },
            StatusCode::NOT_FOUND => Err(anyhow!("Order generation is not available on {}", self.server)),
            _ => {
                let msg = res.text().await?;
                Err(anyhow!("Error {code}. Could not generate orders. {msg}"))
            },
        }
    }

    pub async fn scheduler_status(&self) -> Result<SchedulerStatus> {
        let url = self.url("/test/scheduler")?;
        let res = self.authorize(self.client.get(url)).send().await?;
        if !res.status().is_success() {
            let code = res.status();
            let msg = res.text().await?;
            return Err(anyhow!("Error {code}. Could not fetch the scheduler status. {msg}"));
        }
        Ok(res.json().await?)
    }
}

impl Display for SimServerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.server)?;
        if self.access_token.is_some() {
            write!(f, " (authenticated)")?;
        }
        Ok(())
    }
}
