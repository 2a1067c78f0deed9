//! Type definitions for Delta Exchange API responses.

use crate::error::AlertError;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// Envelope returned by every public Delta endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Absent is treated the same as `false`
    #[serde(default)]
    pub success: bool,
    pub result: Option<T>,
}

/// Raw ticker entry from `/v2/tickers`.
///
/// Numeric fields arrive as strings or numbers depending on the product,
/// so they are kept as raw JSON values and converted once.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTicker {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub funding_rate: Option<Value>,
    #[serde(default)]
    pub mark_price: Option<Value>,
    #[serde(default)]
    pub volume: Option<Value>,
    /// Exchange time in microseconds since epoch
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Product details from `/v2/products/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub product_specs: Option<ProductSpecs>,
}

/// Product specification block; only the funding interval is used.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSpecs {
    /// Funding settlement interval in seconds
    #[serde(default)]
    pub rate_exchange_interval: Option<u64>,
}

impl Product {
    /// Funding interval in whole hours, if present and non-zero.
    pub fn funding_interval_hours(&self) -> Option<u32> {
        let secs = self.product_specs.as_ref()?.rate_exchange_interval?;
        let hours = u32::try_from(secs / 3600).ok()?;
        (hours > 0).then_some(hours)
    }
}

/// One perpetual contract as seen in a single scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSnapshot {
    pub symbol: String,
    /// Signed funding rate in percent (0.05 = 0.05%)
    pub funding_rate: Decimal,
    pub mark_price: Option<Decimal>,
    pub volume: Option<Decimal>,
    /// Exchange time in microseconds since epoch
    pub timestamp: Option<i64>,
}

impl ContractSnapshot {
    /// Create a snapshot with only the required fields.
    pub fn new(symbol: impl Into<String>, funding_rate: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            funding_rate,
            mark_price: None,
            volume: None,
            timestamp: None,
        }
    }

    /// Set the mark price.
    pub fn with_mark_price(mut self, mark_price: Decimal) -> Self {
        self.mark_price = Some(mark_price);
        self
    }

    /// Set the traded volume.
    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = Some(volume);
        self
    }
}

impl TryFrom<RawTicker> for ContractSnapshot {
    type Error = AlertError;

    fn try_from(raw: RawTicker) -> Result<Self, Self::Error> {
        let symbol = raw
            .symbol
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AlertError::Parse("missing symbol".to_string()))?;

        let funding_rate = raw
            .funding_rate
            .as_ref()
            .and_then(decimal_from_value)
            .ok_or_else(|| AlertError::Parse(format!("{}: funding_rate not numeric", symbol)))?;

        Ok(Self {
            symbol,
            funding_rate,
            mark_price: raw.mark_price.as_ref().and_then(decimal_from_value),
            volume: raw.volume.as_ref().and_then(decimal_from_value),
            timestamp: raw.timestamp.as_ref().and_then(i64_from_value),
        })
    }
}

/// Convert a JSON string or number into a `Decimal`.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if text.is_empty() {
        return None;
    }

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn i64_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
