//! Ranking contracts by funding magnitude and picking alert candidates.

use crate::exchange::ContractSnapshot;
use rust_decimal::Decimal;
use std::fmt;

/// Which side of the market pays funding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Rate ≥ 0: long holders pay short holders
    LongsPayShorts,
    /// Rate < 0: short holders pay long holders
    ShortsPayLongs,
}

impl Direction {
    pub fn from_rate(rate: Decimal) -> Self {
        if rate < Decimal::ZERO {
            Direction::ShortsPayLongs
        } else {
            Direction::LongsPayShorts
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::LongsPayShorts => "longs pay shorts",
            Direction::ShortsPayLongs => "shorts pay longs",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A threshold-crossing contract with its resolved funding interval.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCandidate {
    pub contract: ContractSnapshot,
    /// `None` when the interval could not be resolved
    pub interval_hours: Option<u32>,
    pub direction: Direction,
}

impl AlertCandidate {
    pub fn new(contract: ContractSnapshot, interval_hours: Option<u32>) -> Self {
        let direction = Direction::from_rate(contract.funding_rate);
        Self {
            contract,
            interval_hours,
            direction,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.contract.symbol
    }
}

/// Sort by absolute funding rate (highest first) and keep the first `top_n`.
///
/// The sort is stable, so equal magnitudes keep their listing order.
pub fn rank(mut contracts: Vec<ContractSnapshot>, top_n: usize) -> Vec<ContractSnapshot> {
    contracts.sort_by(|a, b| b.funding_rate.abs().cmp(&a.funding_rate.abs()));
    contracts.truncate(top_n);
    contracts
}

/// Members of the display set whose absolute rate reaches `threshold`.
pub fn alert_candidates(display: &[ContractSnapshot], threshold: Decimal) -> Vec<ContractSnapshot> {
    display
        .iter()
        .filter(|c| c.funding_rate.abs() >= threshold)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn contracts(rates: &[(&str, Decimal)]) -> Vec<ContractSnapshot> {
        rates
            .iter()
            .map(|(s, r)| ContractSnapshot::new(*s, *r))
            .collect()
    }

    fn symbols(list: &[ContractSnapshot]) -> Vec<&str> {
        list.iter().map(|c| c.symbol.as_str()).collect()
    }

    #[test]
    fn test_rank_top_three_by_magnitude() {
        let all = contracts(&[
            ("BTC", dec!(0.05)),
            ("ETH", dec!(-0.12)),
            ("SOL", dec!(0.09)),
            ("DOGE", dec!(0.01)),
        ]);

        let display = rank(all, 3);
        assert_eq!(symbols(&display), vec!["ETH", "SOL", "BTC"]);
    }

    #[test]
    fn test_rank_fewer_than_top_n() {
        let all = contracts(&[("BTC", dec!(0.01)), ("ETH", dec!(-0.02))]);
        let display = rank(all, 3);
        assert_eq!(symbols(&display), vec!["ETH", "BTC"]);

        assert!(rank(Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_rank_ties_keep_listing_order() {
        let all = contracts(&[
            ("A", dec!(0.1)),
            ("B", dec!(-0.1)),
            ("C", dec!(0.1)),
            ("D", dec!(0.2)),
        ]);
        let display = rank(all, 3);
        assert_eq!(symbols(&display), vec!["D", "A", "B"]);
    }

    #[test]
    fn test_rank_is_descending_for_mixed_signs() {
        let all = contracts(&[
            ("A", dec!(-0.3)),
            ("B", dec!(0.001)),
            ("C", dec!(0.25)),
            ("D", dec!(-0.0001)),
            ("E", dec!(0.3)),
        ]);
        let display = rank(all, 3);
        let mags: Vec<Decimal> = display.iter().map(|c| c.funding_rate.abs()).collect();
        assert!(mags.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(symbols(&display), vec!["A", "E", "C"]);
    }

    #[test]
    fn test_alert_candidates_threshold_is_inclusive() {
        let display = contracts(&[
            ("ETH", dec!(-0.12)),
            ("SOL", dec!(0.08)),
            ("BTC", dec!(0.0799)),
        ]);
        let candidates = alert_candidates(&display, dec!(0.08));
        assert_eq!(symbols(&candidates), vec!["ETH", "SOL"]);
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(Direction::from_rate(dec!(-0.10)).label(), "shorts pay longs");
        assert_eq!(Direction::from_rate(dec!(0.10)).label(), "longs pay shorts");
        assert_eq!(Direction::from_rate(Decimal::ZERO).label(), "longs pay shorts");
        assert_eq!(Direction::ShortsPayLongs.to_string(), "shorts pay longs");
    }

    #[test]
    fn test_alert_candidate_derives_direction() {
        let candidate = AlertCandidate::new(ContractSnapshot::new("ETH", dec!(-0.12)), Some(8));
        assert_eq!(candidate.direction, Direction::ShortsPayLongs);
        assert_eq!(candidate.symbol(), "ETH");
    }
}
