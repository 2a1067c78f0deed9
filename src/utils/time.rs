//! Clock and timestamp helpers.

use chrono::{DateTime, Utc};

/// Current time as fractional epoch seconds.
pub fn now_epoch_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Format an exchange timestamp given in microseconds.
pub fn format_micros(ts: Option<i64>) -> String {
    ts.and_then(DateTime::<Utc>::from_timestamp_micros)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Format fractional epoch seconds, as stored in the cooldown record.
pub fn format_epoch_secs(secs: f64) -> String {
    if !secs.is_finite() {
        return "N/A".to_string();
    }
    DateTime::<Utc>::from_timestamp_micros((secs * 1_000_000.0) as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
