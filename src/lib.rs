//! # Funding Rate Alerter
//!
//! Scans Delta Exchange perpetual futures for extreme funding rates and
//! sends a Telegram alert when a contract crosses the configured threshold,
//! at most once per funding interval per contract.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `exchange`: Delta Exchange public REST client
//! - `strategy`: Ranking, interval resolution and the scan pipeline
//! - `notify`: Alert message rendering and Telegram delivery
//! - `persistence`: JSON cooldown record
//! - `utils`: Formatting and clock helpers

pub mod config;
pub mod error;
pub mod exchange;
pub mod notify;
pub mod persistence;
pub mod strategy;
pub mod utils;

pub use config::Config;
pub use error::AlertError;
