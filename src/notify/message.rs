//! Plain-text rendering of the display table and alert message.

use crate::exchange::ContractSnapshot;
use crate::strategy::AlertCandidate;
use crate::utils::{format_micros, format_optional, format_signed_pct};
use std::fmt::Write;

pub const ALERT_HEADER: &str = "🚨 DELTA FUNDING ALERT 🚨";

fn interval_suffix(interval_hours: Option<u32>) -> String {
    interval_hours
        .map(|h| format!("/{}h", h))
        .unwrap_or_default()
}

/// One row of the top-N table printed on every run.
pub fn format_display_line(contract: &ContractSnapshot, interval_hours: Option<u32>) -> String {
    format!(
        "Symbol: {:<10} | Funding: {} {} | Mark: {} | Updated: {}",
        contract.symbol,
        format_signed_pct(contract.funding_rate),
        interval_suffix(interval_hours),
        format_optional(contract.mark_price),
        format_micros(contract.timestamp),
    )
}

/// Combined message with one block per candidate.
pub fn format_alert_message(candidates: &[AlertCandidate], web_url: &str) -> String {
    let web_url = web_url.trim_end_matches('/');
    let mut msg = format!("{}\n\n", ALERT_HEADER);

    for candidate in candidates {
        let c = &candidate.contract;
        // Writing into a String cannot fail.
        let _ = write!(
            msg,
            "{symbol}\n\
             Funding: {rate} {interval}\n\
             Direction: {direction}\n\
             Mark: {mark}\n\
             Volume: {volume}\n\
             {web_url}/app/perpetual_futures/{symbol}\n\n",
            symbol = c.symbol,
            rate = format_signed_pct(c.funding_rate),
            interval = interval_suffix(candidate.interval_hours),
            direction = candidate.direction,
            mark = format_optional(c.mark_price),
            volume = format_optional(c.volume),
            web_url = web_url,
        );
    }

    msg.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_line() {
        let contract = ContractSnapshot::new("ETHUSD", dec!(-0.12)).with_mark_price(dec!(3100.5));
        let line = format_display_line(&contract, Some(8));
        assert!(line.starts_with("Symbol: ETHUSD     | Funding: -0.1200% /8h | Mark: 3100.5"));
        assert!(line.ends_with("Updated: N/A"));

        let unknown = format_display_line(&contract, None);
        assert!(unknown.contains("-0.1200%  | Mark"));
    }

    #[test]
    fn test_alert_message_contains_every_block() {
        let candidates = vec![
            AlertCandidate::new(
                ContractSnapshot::new("ETHUSD", dec!(-0.12))
                    .with_mark_price(dec!(3100))
                    .with_volume(dec!(12345)),
                Some(8),
            ),
            AlertCandidate::new(ContractSnapshot::new("SOLUSD", dec!(0.09)), Some(4)),
        ];

        let msg = format_alert_message(&candidates, "https://www.delta.exchange/");

        assert!(msg.starts_with(ALERT_HEADER));
        assert!(msg.contains("ETHUSD\nFunding: -0.1200% /8h\nDirection: shorts pay longs"));
        assert!(msg.contains("Volume: 12345"));
        assert!(msg.contains("https://www.delta.exchange/app/perpetual_futures/ETHUSD"));
        assert!(msg.contains("SOLUSD\nFunding: +0.0900% /4h\nDirection: longs pay shorts"));
        assert!(msg.contains("Mark: N/A"));
        assert!(msg.ends_with("https://www.delta.exchange/app/perpetual_futures/SOLUSD"));
    }
}
