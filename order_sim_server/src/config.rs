//! Server configuration.
//!
//! Everything is read from `OSIM_*` environment variables (a `.env` file is loaded first, if present). Invalid values
//! are reported and replaced by their defaults; the server always starts.
use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;
use order_sim_engine::{GenerateOrderRequest, Platform};
use osim_common::helpers::{env_flag, env_value};
use serde::Serialize;

use crate::order_scheduler::SchedulerConfig;

const DEFAULT_OSIM_HOST: &str = "127.0.0.1";
const DEFAULT_OSIM_PORT: u16 = 8370;
const DEFAULT_QUEUE_SIZE: usize = 64;
const DEFAULT_SCHEDULER_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_SCHEDULER_BUSINESS_ID: u32 = 7;
pub const DEFAULT_TEST_BUSINESS_ID: u32 = 7;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub broker: BrokerConfig,
    /// The business that every order requested over HTTP is assigned to, whatever the request says.
    pub test_business_id: u32,
    pub integrations: IntegrationIds,
    pub scheduler_enabled: bool,
    pub scheduler: SchedulerConfig,
    /// When set, the n-th generated order is seeded with this value plus n, so every run repeats the same sequence.
    pub generator_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let integrations = IntegrationIds::default();
        Self {
            host: DEFAULT_OSIM_HOST.to_string(),
            port: DEFAULT_OSIM_PORT,
            broker: BrokerConfig::default(),
            test_business_id: DEFAULT_TEST_BUSINESS_ID,
            integrations,
            scheduler_enabled: true,
            scheduler: SchedulerConfig {
                interval: DEFAULT_SCHEDULER_INTERVAL,
                business_id: Some(DEFAULT_SCHEDULER_BUSINESS_ID),
                integrations,
                ..SchedulerConfig::default()
            },
            generator_seed: None,
        }
    }
}

/// Where generated orders go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrokerConfig {
    /// An in-process queue whose consumer logs every message.
    Memory { queue_size: usize },
    /// `POST`s every message to `<url>/<routing key>`.
    HttpRelay { url: String },
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::Memory { queue_size: DEFAULT_QUEUE_SIZE }
    }
}

impl BrokerConfig {
    pub fn from_env_or_default() -> Self {
        let queue_size = env_or_default("OSIM_BROKER_QUEUE_SIZE", DEFAULT_QUEUE_SIZE);
        match env::var("OSIM_BROKER").map(|s| s.trim().to_string()) {
            Ok(s) if s.starts_with("http://") || s.starts_with("https://") => Self::HttpRelay { url: s },
            Ok(s) if s.is_empty() || s.eq_ignore_ascii_case("memory") => Self::Memory { queue_size },
            Ok(s) => {
                warn!("🪛️ '{s}' is not a supported broker for OSIM_BROKER. Using the in-memory queue instead.");
                Self::Memory { queue_size }
            },
            Err(_) => Self::Memory { queue_size },
        }
    }
}

/// The integration each sales channel is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct IntegrationIds {
    pub marketplace: u32,
    pub hosted: u32,
    pub storefront: u32,
}

impl Default for IntegrationIds {
    fn default() -> Self {
        Self { marketplace: 5, hosted: 1, storefront: 6 }
    }
}

impl IntegrationIds {
    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        Self {
            marketplace: env_or_default("OSIM_MARKETPLACE_INTEGRATION_ID", defaults.marketplace),
            hosted: env_or_default("OSIM_HOSTED_INTEGRATION_ID", defaults.hosted),
            storefront: env_or_default("OSIM_STOREFRONT_INTEGRATION_ID", defaults.storefront),
        }
    }

    pub fn for_platform(&self, platform: Platform) -> Option<u32> {
        match platform {
            Platform::Marketplace => Some(self.marketplace),
            Platform::Hosted => Some(self.hosted),
            Platform::Storefront => Some(self.storefront),
            Platform::Generic => None,
        }
    }

    /// The channels in tick order, with their integration ids.
    pub fn channels(&self) -> Vec<(Platform, u32)> {
        Platform::CHANNELS.iter().filter_map(|&p| self.for_platform(p).map(|id| (p, id))).collect()
    }
}

/// How requests arriving over HTTP are rewritten before they reach the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSettings {
    pub test_business_id: u32,
    pub integrations: IntegrationIds,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { test_business_id: DEFAULT_TEST_BUSINESS_ID, integrations: IntegrationIds::default() }
    }
}

impl GenerationSettings {
    /// Pins the request to the test business and to the channel's integration. Requests for anything other than a
    /// known channel keep the integration id they came with.
    pub fn apply(&self, request: &mut GenerateOrderRequest) {
        request.business_id = Some(self.test_business_id);
        if let Some(id) = self.integrations.for_platform(request.platform()) {
            request.integration_id = id;
        }
    }
}

impl From<&ServerConfig> for GenerationSettings {
    fn from(config: &ServerConfig) -> Self {
        Self { test_business_id: config.test_business_id, integrations: config.integrations }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OSIM_HOST").ok().unwrap_or_else(|| DEFAULT_OSIM_HOST.into());
        let port = env_or_default("OSIM_PORT", DEFAULT_OSIM_PORT);
        let broker = BrokerConfig::from_env_or_default();
        let integrations = IntegrationIds::from_env_or_default();
        let test_business_id = env_or_default("OSIM_TEST_BUSINESS_ID", DEFAULT_TEST_BUSINESS_ID);
        let scheduler_enabled = env_flag("OSIM_SCHEDULER_ENABLED", true);
        let interval_secs = env_or_default("OSIM_SCHEDULER_INTERVAL_SECS", DEFAULT_SCHEDULER_INTERVAL.as_secs());
        let status = env::var("OSIM_SCHEDULER_STATUS").unwrap_or_default();
        let scheduler = SchedulerConfig {
            interval: Duration::from_secs(interval_secs),
            orders_per_batch: env_or_default("OSIM_ORDERS_PER_BATCH", 1),
            business_id: Some(env_or_default("OSIM_SCHEDULER_BUSINESS_ID", DEFAULT_SCHEDULER_BUSINESS_ID)),
            status,
            include_payment: env_flag("OSIM_INCLUDE_PAYMENT", true),
            include_shipment: env_flag("OSIM_INCLUDE_SHIPMENT", true),
            integrations,
        }
        .with_defaults();
        let generator_seed = match env_value::<u64>("OSIM_GENERATOR_SEED") {
            Some(Ok(seed)) => {
                info!("🪛️ Generated orders are seeded with {seed}. Every run repeats the same sequence.");
                Some(seed)
            },
            Some(Err(e)) => {
                warn!("🪛️ OSIM_GENERATOR_SEED is not a valid seed. {e}. Orders will be random.");
                None
            },
            None => None,
        };
        Self { host, port, broker, test_business_id, integrations, scheduler_enabled, scheduler, generator_seed }
    }
}

fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env_value::<T>(name) {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            error!("🪛️ The value of {name} is invalid. {e} Using the default, {default}, instead.");
            default
        },
        None => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn http_requests_are_pinned() {
        let settings = GenerationSettings::default();
        let mut request = GenerateOrderRequest::new("marketplace").with_integration_id(99).with_business_id(Some(3));
        settings.apply(&mut request);
        assert_eq!(request.business_id, Some(7));
        assert_eq!(request.integration_id, 5);

        let mut request = GenerateOrderRequest::new("hosted-checkout");
        settings.apply(&mut request);
        assert_eq!(request.integration_id, 1);

        let mut request = GenerateOrderRequest::new("acme").with_integration_id(42);
        settings.apply(&mut request);
        assert_eq!((request.integration_id, request.business_id), (42, Some(7)));
    }

    #[test]
    fn channel_order() {
        let channels = IntegrationIds::default().channels();
        assert_eq!(channels, vec![(Platform::Marketplace, 5), (Platform::Hosted, 1), (Platform::Storefront, 6)]);
    }

    #[test]
    fn configuration_from_env() {
        env::set_var("OSIM_PORT", "not-a-port");
        env::set_var("OSIM_BROKER", "https://relay.example.com/orders");
        env::set_var("OSIM_SCHEDULER_INTERVAL_SECS", "0");
        env::set_var("OSIM_HOSTED_INTEGRATION_ID", "11");
        env::set_var("OSIM_SCHEDULER_STATUS", "");
        let config = ServerConfig::from_env_or_default();
        assert_eq!(config.port, DEFAULT_OSIM_PORT);
        assert_eq!(config.broker, BrokerConfig::HttpRelay { url: "https://relay.example.com/orders".into() });
        assert_eq!(config.scheduler.interval, Duration::from_secs(300));
        assert_eq!(config.scheduler.status, "pending");
        assert_eq!(config.integrations.hosted, 11);
        assert_eq!(config.scheduler.integrations.hosted, 11);
        for name in [
            "OSIM_PORT",
            "OSIM_BROKER",
            "OSIM_SCHEDULER_INTERVAL_SECS",
            "OSIM_HOSTED_INTEGRATION_ID",
            "OSIM_SCHEDULER_STATUS",
        ] {
            env::remove_var(name);
        }
    }
}
