//! # Order simulator server
//! This crate hosts the server for the order simulator. It is responsible for:
//! * Generating and publishing batches of test orders on request.
//! * Running the order scheduler, which does the same for every sales channel on a fixed interval.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/test/generate-orders`: Generates and publishes a batch of orders.
//! * `/test/scheduler`: Reports the state of the order scheduler.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod order_scheduler;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
