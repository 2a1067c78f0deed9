//! Exchange integration for funding rate scanning.
//!
//! ## Delta Exchange
//! Public, unauthenticated REST endpoints only:
//! - `/v2/tickers` filtered to perpetual futures
//! - `/v2/products/{symbol}` for the funding settlement interval

mod client;
mod types;

pub use client::DeltaClient;
pub use types::*;
