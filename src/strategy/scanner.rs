//! One scan pass: fetch → rank → resolve → filter → notify → persist.

use crate::error::AlertError;
use crate::exchange::DeltaClient;
use crate::notify::{format_alert_message, format_display_line, Notifier};
use crate::persistence::CooldownStore;
use crate::strategy::interval::IntervalResolver;
use crate::strategy::ranking::{alert_candidates, rank, AlertCandidate};
use crate::utils::format_signed_pct;
use rust_decimal::Decimal;
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};

/// Knobs for a single scan.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Minimum absolute funding rate, in percent
    pub threshold: Decimal,
    pub top_n: usize,
    /// Base URL for trade links in the alert text
    pub web_url: String,
    pub cooldown_file: PathBuf,
    /// Compose the message but neither send it nor touch the cooldown file
    pub dry_run: bool,
}

/// Why a threshold-crossing contract was left out of the message.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    UnknownInterval,
    Cooldown { remaining_secs: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAlert {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Terminal state of a scan.
#[derive(Debug)]
pub enum ScanOutcome {
    /// No display-set contract reached the threshold
    NoThresholdCrossed,
    /// Candidates existed, but none had a known interval and no cooldown
    NothingEligible,
    /// Message composed but not sent
    DryRun { symbols: Vec<String>, message: String },
    /// Message delivered; `cooldown_saved` is false if the write failed
    Sent {
        symbols: Vec<String>,
        cooldown_saved: bool,
    },
    /// Delivery failed; cooldown left as it was before the run
    DeliveryFailed { symbols: Vec<String>, error: AlertError },
}

/// Everything a run found and did, for the operator summary.
#[derive(Debug)]
pub struct ScanReport {
    pub total_contracts: usize,
    pub threshold: Decimal,
    /// Top-N contracts with their resolved intervals
    pub display: Vec<AlertCandidate>,
    /// Symbols at or above the threshold
    pub candidates: Vec<String>,
    pub skipped: Vec<SkippedAlert>,
    pub outcome: ScanOutcome,
}

/// Runs scans against one exchange client and one notifier.
pub struct FundingScanner<N: Notifier> {
    client: DeltaClient,
    notifier: N,
    settings: ScanSettings,
}

impl<N: Notifier> FundingScanner<N> {
    pub fn new(client: DeltaClient, notifier: N, settings: ScanSettings) -> Self {
        Self {
            client,
            notifier,
            settings,
        }
    }

    /// Run one pass at time `now` (epoch seconds).
    ///
    /// Only a failed ticker fetch is returned as `Err`; every later failure
    /// is folded into the report's outcome.
    #[instrument(skip(self), fields(threshold = %self.settings.threshold, top_n = self.settings.top_n))]
    pub async fn run(&self, now: f64) -> Result<ScanReport, AlertError> {
        info!("📡 [FETCH] Fetching perpetual futures tickers");
        let contracts = self.client.get_perpetual_tickers().await.map_err(|e| {
            error!("❌ [FETCH] Failed to fetch funding data: {}", e);
            e
        })?;
        let total_contracts = contracts.len();

        let top = rank(contracts, self.settings.top_n);
        info!(total_contracts, shown = top.len(), "📊 [RANK] Ranked by |funding rate|");

        let mut resolver = IntervalResolver::new();
        let mut display = Vec::with_capacity(top.len());
        for contract in &top {
            let interval = resolver.resolve(&self.client, &contract.symbol).await;
            display.push(AlertCandidate::new(contract.clone(), interval));
        }

        let crossing = alert_candidates(&top, self.settings.threshold);
        let mut report = ScanReport {
            total_contracts,
            threshold: self.settings.threshold,
            display,
            candidates: crossing.iter().map(|c| c.symbol.clone()).collect(),
            skipped: Vec::new(),
            outcome: ScanOutcome::NoThresholdCrossed,
        };

        if crossing.is_empty() {
            info!(
                "ℹ️ [FILTER] No funding rate crossed ±{:.4}%",
                self.settings.threshold
            );
            return Ok(report);
        }

        // Commit-after-effect: mutate a copy, write it only once delivery succeeds.
        let snapshot = CooldownStore::load(&self.settings.cooldown_file);
        let mut next = snapshot.clone();
        let mut eligible = Vec::new();

        for contract in crossing {
            let symbol = contract.symbol.clone();
            let Some(hours) = resolver.resolve(&self.client, &symbol).await else {
                warn!(symbol = %symbol, "⏭️ [FILTER] Skipping: funding interval unknown");
                report.skipped.push(SkippedAlert {
                    symbol,
                    reason: SkipReason::UnknownInterval,
                });
                continue;
            };

            if next.can_send(&symbol, hours, now) {
                next.record(&symbol, now);
                eligible.push(AlertCandidate::new(contract, Some(hours)));
            } else {
                let remaining_secs = next.remaining_secs(&symbol, hours, now);
                info!(symbol = %symbol, remaining_secs, "⏳ [FILTER] In cooldown");
                report.skipped.push(SkippedAlert {
                    symbol,
                    reason: SkipReason::Cooldown { remaining_secs },
                });
            }
        }

        if eligible.is_empty() {
            info!("ℹ️ [FILTER] Alert-worthy contracts are in cooldown or unresolved");
            report.outcome = ScanOutcome::NothingEligible;
            return Ok(report);
        }

        let symbols: Vec<String> = eligible.iter().map(|c| c.symbol().to_string()).collect();
        let message = format_alert_message(&eligible, &self.settings.web_url);

        if self.settings.dry_run {
            info!(?symbols, "🧪 [NOTIFY] Dry run, message not sent");
            report.outcome = ScanOutcome::DryRun { symbols, message };
            return Ok(report);
        }

        report.outcome = match self.notifier.send(&message).await {
            Ok(()) => {
                let cooldown_saved = match next.persist() {
                    Ok(()) => true,
                    Err(e) => {
                        error!("❌ [COOLDOWN] Alert sent but record not saved: {:#}", e);
                        false
                    }
                };
                ScanOutcome::Sent {
                    symbols,
                    cooldown_saved,
                }
            }
            Err(error) => {
                warn!(
                    notifier = self.notifier.name(),
                    "⚠️ [NOTIFY] Delivery failed, cooldown unchanged: {}", error
                );
                ScanOutcome::DeliveryFailed { symbols, error }
            }
        };

        Ok(report)
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TOP {} HIGHEST FUNDING CONTRACTS", self.display.len())?;
        writeln!(f, "{}", "=".repeat(70))?;
        for row in &self.display {
            writeln!(f, "{}", format_display_line(&row.contract, row.interval_hours))?;
        }
        writeln!(f)?;

        for skipped in &self.skipped {
            match &skipped.reason {
                SkipReason::UnknownInterval => {
                    writeln!(f, "⏭️ {}: funding interval unknown, not alerted", skipped.symbol)?
                }
                SkipReason::Cooldown { remaining_secs } => writeln!(
                    f,
                    "⏳ {}: in cooldown for another {:.0} min",
                    skipped.symbol,
                    remaining_secs / 60.0
                )?,
            }
        }

        let threshold = format_signed_pct(self.threshold);
        let threshold = threshold.trim_start_matches('+');
        match &self.outcome {
            ScanOutcome::NoThresholdCrossed => write!(
                f,
                "ℹ️ No funding rate crossed ±{} (alert skipped)",
                threshold
            ),
            ScanOutcome::NothingEligible => {
                write!(f, "ℹ️ Alert-worthy contracts are in cooldown period")
            }
            ScanOutcome::DryRun { message, .. } => {
                write!(f, "🧪 Dry run, message not sent:\n\n{}", message)
            }
            ScanOutcome::Sent {
                symbols,
                cooldown_saved,
            } => {
                write!(f, "📨 Alert sent for {}", symbols.join(", "))?;
                if !cooldown_saved {
                    write!(f, " (cooldown record NOT saved)")?;
                }
                Ok(())
            }
            ScanOutcome::DeliveryFailed { symbols, error } => write!(
                f,
                "⚠️ Alert for {} not delivered [{}]: {}",
                symbols.join(", "),
                error.kind(),
                error
            ),
        }
    }
}
