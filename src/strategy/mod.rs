//! Funding rate alerting strategy.
//!
//! Contains the core logic for:
//! - Ranking contracts by absolute funding rate
//! - Resolving per-contract funding intervals
//! - Running a full scan with cooldown-gated notification

mod interval;
mod ranking;
mod scanner;

pub use interval::IntervalResolver;
pub use ranking::{alert_candidates, rank, AlertCandidate, Direction};
pub use scanner::{FundingScanner, ScanOutcome, ScanReport, ScanSettings, SkipReason, SkippedAlert};
