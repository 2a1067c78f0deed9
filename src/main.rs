//! Funding Rate Alerter - Main Entry Point
//!
//! Runs a single scan per invocation; schedule it externally (cron, systemd
//! timer). Overlapping invocations must be prevented by the scheduler.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use funding_rate_alerter::config::Config;
use funding_rate_alerter::exchange::DeltaClient;
use funding_rate_alerter::notify::TelegramNotifier;
use funding_rate_alerter::persistence::CooldownStore;
use funding_rate_alerter::strategy::{FundingScanner, ScanSettings};
use funding_rate_alerter::utils::{format_epoch_secs, now_epoch_secs};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Funding Rate Alerter CLI
#[derive(Parser)]
#[command(name = "funding-rate-alerter")]
#[command(version, about = "Delta Exchange funding rate scanner with Telegram alerts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory for rolling log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan (default)
    Scan(ScanArgs),

    /// Show or reset the per-symbol alert cooldown record
    #[command(alias = "status")]
    Cooldown {
        /// Cooldown file (default: from configuration)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Remove all entries
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Args, Default)]
struct ScanArgs {
    /// Print the alert instead of sending it; cooldown is not updated
    #[arg(long)]
    dry_run: bool,

    /// Override the alert threshold, in percent (e.g. 0.08)
    #[arg(short, long)]
    threshold: Option<Decimal>,

    /// Override how many top contracts are shown and considered
    #[arg(long)]
    top: Option<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(&cli.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("⚠️ File logging disabled: {:#}", e);
            None
        }
    };

    let result = match cli.command {
        Some(Commands::Cooldown { file, reset }) => show_cooldown(file, reset),
        Some(Commands::Scan(args)) => run_scan(args).await,
        None => run_scan(ScanArgs::default()).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("❌ {:#}", e);
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run one scan and print the summary.
///
/// Exits non-zero only when the ticker fetch fails; skipped or failed
/// deliveries still count as a completed run.
async fn run_scan(args: ScanArgs) -> Result<ExitCode> {
    let mut config = Config::load()?;
    if let Some(threshold) = args.threshold {
        config.alerts.threshold = threshold;
    }
    if let Some(top) = args.top {
        config.alerts.top_n = top;
    }
    config.validate()?;
    log_config(&config, args.dry_run);

    let client = DeltaClient::new(&config.exchange)?;
    let notifier = TelegramNotifier::new(&config.telegram)?;
    if !notifier.has_credentials() && !args.dry_run {
        warn!("⚠️ Telegram credentials missing; alerts will not be delivered");
    }

    let scanner = FundingScanner::new(
        client,
        notifier,
        ScanSettings {
            threshold: config.alerts.threshold,
            top_n: config.alerts.top_n,
            web_url: config.exchange.web_url.clone(),
            cooldown_file: config.alerts.cooldown_file.clone(),
            dry_run: args.dry_run,
        },
    );

    println!("Delta Exchange – Funding Rate Scanner");
    println!("{}", "=".repeat(70));

    match scanner.run(now_epoch_secs()).await {
        Ok(report) => {
            println!("{}", report);
            println!("\n✓ Bot execution completed");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("❌ Failed to fetch funding data [{}]: {}", e.kind(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Print (and optionally clear) the cooldown record.
fn show_cooldown(file: Option<PathBuf>, reset: bool) -> Result<ExitCode> {
    let path = match file {
        Some(path) => path,
        None => Config::load()?.alerts.cooldown_file,
    };

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║              ALERT COOLDOWN RECORD                         ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let mut store = CooldownStore::load(&path);

    if reset {
        store.clear();
        store
            .persist()
            .with_context(|| format!("Failed to reset cooldown file {:?}", path))?;
        println!("\n🧹 Cooldown record cleared: {}", store.path().display());
        return Ok(ExitCode::SUCCESS);
    }

    if store.entries().is_empty() {
        println!("\nℹ️ No alerts recorded in {}", store.path().display());
        return Ok(ExitCode::SUCCESS);
    }

    let now = now_epoch_secs();
    println!("\n📂 {}", store.path().display());
    let count = store.entries().len();
    for (i, (symbol, last)) in store.entries().iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        let age_hours = (now - last) / 3600.0;
        println!(
            "   {} {:<12} {}  ({:.1}h ago)",
            branch,
            symbol,
            format_epoch_secs(*last),
            age_hours
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Initialize logging to stdout and a daily rolling file.
fn init_logging(log_dir: &str) -> Result<WorkerGuard> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "funding-alerter.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("funding_rate_alerter=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .init();

    Ok(guard)
}

/// Log configuration on startup.
fn log_config(config: &Config, dry_run: bool) {
    info!("📋 Configuration:");
    info!("   Exchange: {}", config.exchange.base_url);
    info!("   Alert Threshold: ±{:.4}%", config.alerts.threshold);
    info!("   Top N: {}", config.alerts.top_n);
    info!("   Cooldown File: {}", config.alerts.cooldown_file.display());
    info!("   Timeout: {}s", config.exchange.timeout_secs);
    if dry_run {
        info!("   🧪 Dry run: alerts are printed, not sent");
    }
}
