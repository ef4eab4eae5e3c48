use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use order_sim_engine::{canonicalize, CanonicalOrder, GenerateOrderRequest, OrderGenerator, OrderSource, Platform};
use order_sim_server::config::IntegrationIds;
use platform_tools::{hosted, marketplace, storefront};
use rand::{rngs::StdRng, SeedableRng};

use crate::formatting::format_orders;

fn new_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn not_a_channel(name: &str) -> anyhow::Error {
    anyhow!("'{name}' is not a sales channel. Use marketplace, hosted or storefront.")
}

pub fn sample_payload(platform: &str, seed: Option<u64>) -> Result<String> {
    sample_payload_at(platform, seed, Utc::now())
}

fn sample_payload_at(platform: &str, seed: Option<u64>, now: DateTime<Utc>) -> Result<String> {
    let mut rng = new_rng(seed);
    let payload = match Platform::from_name(platform) {
        Platform::Marketplace => marketplace::synthesize(&mut rng, now)?,
        Platform::Hosted => hosted::synthesize(&mut rng, now)?,
        Platform::Storefront => storefront::synthesize(&mut rng, now)?,
        Platform::Generic => return Err(not_a_channel(platform)),
    };
    let value: serde_json::Value = serde_json::from_slice(&payload)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn canonicalize_file(
    platform: &str,
    file: &Path,
    integration_id: u32,
    business_id: Option<u32>,
) -> Result<String> {
    let platform = match Platform::from_name(platform) {
        Platform::Generic => return Err(not_a_channel(platform)),
        channel => channel,
    };
    let payload = std::fs::read(file).with_context(|| format!("Could not read {}", file.display()))?;
    let order = canonicalize(platform, &payload, &OrderSource::now(integration_id, business_id))?;
    Ok(serde_json::to_string_pretty(&order)?)
}

/// Generates `count` orders with a single random source. Without a platform, the channels take turns.
pub fn generate_preview(platform: Option<&str>, count: u32, seed: Option<u64>) -> Result<Vec<CanonicalOrder>> {
    let integrations = IntegrationIds::default();
    let generator = OrderGenerator::new();
    let mut rng = new_rng(seed);
    let now = Utc::now();
    (0..count.max(1) as usize)
        .map(|i| {
            let name = match platform {
                Some(p) => p.to_string(),
                None => Platform::CHANNELS[i % Platform::CHANNELS.len()].tag().to_string(),
            };
            let integration_id = integrations.for_platform(Platform::from_name(&name)).unwrap_or_default();
            let request = GenerateOrderRequest::new(name)
                .with_integration_id(integration_id)
                .with_payment(true)
                .with_shipment(true);
            Ok(generator.generate_at(&request, &mut rng, now)?)
        })
        .collect()
}

pub fn preview_orders(platform: Option<&str>, count: u32, seed: Option<u64>) -> Result<String> {
    let orders = generate_preview(platform, count, seed)?;
    Ok(format_orders(&orders))
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn seeded_samples_repeat() {
        let a = sample_payload_at("marketplace", Some(42), now()).unwrap();
        let b = sample_payload_at("Market-Place", Some(42), now()).unwrap();
        assert_eq!(a, b);
        let c = sample_payload_at("marketplace", Some(43), now()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn samples_need_a_channel() {
        let err = sample_payload("acme", None).unwrap_err();
        assert!(err.to_string().contains("not a sales channel"));
    }

    #[test]
    fn sampled_payloads_canonicalize() {
        for platform in ["marketplace", "hosted", "storefront"] {
            let payload = sample_payload_at(platform, Some(7), now()).unwrap();
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(payload.as_bytes()).unwrap();
            let json = canonicalize_file(platform, file.path(), 3, Some(9)).unwrap();
            let order: CanonicalOrder = serde_json::from_str(&json).unwrap();
            assert_eq!(order.platform, platform);
            assert_eq!(order.integration_id, 3);
            assert_eq!(order.business_id, Some(9));
        }
    }

    #[test]
    fn missing_files_are_reported() {
        let err = canonicalize_file("hosted", Path::new("/no/such/payload.json"), 1, None).unwrap_err();
        assert!(err.to_string().starts_with("Could not read /no/such/payload.json"));
    }

    #[test]
    fn previews_rotate_through_the_channels() {
        let orders = generate_preview(None, 4, Some(1)).unwrap();
        let platforms = orders.iter().map(|o| o.platform.as_str()).collect::<Vec<_>>();
        assert_eq!(platforms, ["marketplace", "hosted", "storefront", "marketplace"]);
        assert_eq!(orders[1].integration_id, 1);

        let orders = generate_preview(Some("acme"), 0, Some(1)).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].platform, "test");

        let table = preview_orders(Some("storefront"), 2, Some(5)).unwrap();
        assert!(table.contains("External id"));
        assert_eq!(table.matches("| storefront ").count(), 2);
    }
}
