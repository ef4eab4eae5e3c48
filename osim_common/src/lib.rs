//! Shared building blocks for the order simulator crates.
//!
//! * [`money`] holds the rounding, formatting and parsing rules for monetary amounts. Every crate that touches an
//!   amount goes through these helpers so that the "fixed dot-decimal, no thousands separators" convention is applied
//!   in exactly one place.
//! * [`helpers`] contains small parsing utilities for configuration values.
//! * [`Secret`] wraps values that must never end up in a log line.
pub mod helpers;
pub mod money;
mod secret;

pub use money::{format_money, money_eq, parse_money, round_money, MoneyError, DEFAULT_TAX_RATE, MONEY_EPSILON};
pub use secret::Secret;
