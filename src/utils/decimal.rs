//! Decimal display helpers for rates, prices and volumes.

use rust_decimal::Decimal;

/// Signed percentage with four decimals, e.g. `+0.0900%` / `-0.1200%`.
pub fn format_signed_pct(rate: Decimal) -> String {
    let rounded = rate.round_dp(4);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{:.4}%", rounded)
    } else {
        format!("+{:.4}%", rounded.abs())
    }
}

/// Normalized decimal, or `N/A` when absent.
pub fn format_optional(value: Option<Decimal>) -> String {
    value
        .map(|v| v.normalize().to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
