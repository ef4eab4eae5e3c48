use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::*;

mod client;
mod commands;
mod formatting;

use crate::{
    client::SimServerClient,
    commands::{canonicalize_file, preview_orders, sample_payload},
    formatting::{format_generation_response, format_scheduler_status},
};

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Operator tools for the order simulator")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a freshly synthesized payload in the native shape of a sales channel
    #[clap(name = "sample")]
    Sample {
        /// marketplace, hosted or storefront
        #[arg(required = true, index = 1)]
        platform: String,
        /// Seed the random source to get a repeatable payload
        #[arg(short = 's', long = "seed")]
        seed: Option<u64>,
    },
    /// Canonicalize a channel payload read from a file and print the canonical order
    #[clap(name = "canonicalize")]
    Canonicalize(CanonicalizeParams),
    /// Generate orders locally, without publishing them, and tabulate them
    #[clap(name = "preview")]
    Preview {
        /// The platform to generate for. When omitted, the three channels take turns.
        #[arg(short = 'p', long = "platform")]
        platform: Option<String>,
        #[arg(short = 'c', long = "count", default_value = "5")]
        count: u32,
        #[arg(short = 's', long = "seed")]
        seed: Option<u64>,
    },
    /// Ask a running server to generate and publish a batch of orders
    #[clap(name = "generate")]
    Generate(GenerateParams),
    /// Check a running server's health and its order scheduler
    #[clap(name = "status")]
    Status {
        #[arg(short = 'u', long = "server", default_value = "http://127.0.0.1:8370")]
        server: String,
    },
}

#[derive(Debug, Args)]
pub struct CanonicalizeParams {
    /// The channel the payload comes from
    #[arg(required = true, index = 1)]
    platform: String,
    /// A file holding the JSON payload
    #[arg(required = true, index = 2)]
    file: PathBuf,
    #[arg(short = 'i', long = "integration-id", default_value = "1")]
    integration_id: u32,
    #[arg(short = 'b', long = "business-id")]
    business_id: Option<u32>,
}

#[derive(Debug, Args)]
pub struct GenerateParams {
    /// The server's base URL
    #[arg(short = 'u', long = "server", default_value = "http://127.0.0.1:8370")]
    server: String,
    #[arg(short = 'c', long = "count", default_value = "1")]
    count: u32,
    #[arg(short = 'p', long = "platform", default_value = "marketplace")]
    platform: String,
    /// The order status to request. Only orders built without a channel payload honour it.
    #[arg(short = 's', long = "status", default_value = "pending")]
    status: String,
    /// Attach a payment to generic orders
    #[arg(long = "payment")]
    payment: bool,
    /// Attach a shipment to generic orders
    #[arg(long = "shipment")]
    shipment: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    if let Err(e) = run(cli.command).await {
        error!("{e:#}");
        eprintln!("🚨️ {e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Sample { platform, seed } => println!("{}", sample_payload(&platform, seed)?),
        Command::Canonicalize(params) => println!(
            "{}",
            canonicalize_file(&params.platform, &params.file, params.integration_id, params.business_id)?
        ),
        Command::Preview { platform, count, seed } => println!("{}", preview_orders(platform.as_deref(), count, seed)?),
        Command::Generate(params) => generate(params).await?,
        Command::Status { server } => status(&server).await?,
    }
    Ok(())
}

async fn generate(params: GenerateParams) -> Result<()> {
    let client = SimServerClient::from_env(&params.server)?;
    let request = order_sim_engine::GenerateOrderRequest::new(params.platform)
        .with_count(params.count)
        .with_status(params.status)
        .with_payment(params.payment)
        .with_shipment(params.shipment);
    info!("Requesting {} order(s) from {client}", request.batch_size());
    let response = client.generate_orders(&request).await?;
    println!("{}", format_generation_response(&response));
    Ok(())
}

async fn status(server: &str) -> Result<()> {
    let client = SimServerClient::from_env(server)?;
    let health = client.health().await?;
    println!("{client}: {}", health.trim());
    let status = client.scheduler_status().await?;
    println!("{}", format_scheduler_status(&status));
    Ok(())
}
