//! Shared formatting and clock utilities.

pub mod decimal;
pub mod time;

pub use decimal::{format_optional, format_signed_pct};
pub use time::{format_epoch_secs, format_micros, now_epoch_secs};
