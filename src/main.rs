//! PAIRWATCH: CADJPY/NZDJPY pairs-trading monitor
//!
//! Entry point. Loads configuration, initialises structured logging,
//! runs one analysis and, depending on the run mode, keeps monitoring on
//! a fixed interval until Ctrl-C.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{info, warn};

use pairwatch::config::{interval_from_minutes, AppConfig, RunMode};
use pairwatch::data::yahoo::YahooFinanceClient;
use pairwatch::engine::monitor::Monitor;
use pairwatch::engine::scheduler::{self, RunSummary};
use pairwatch::types::{AnalysisReport, MonitorError};

const BANNER: &str = r#"
 ____   _    ___ ______        ___  _____ ____ _   _
|  _ \ / \  |_ _|  _ \ \      / / \|_   _/ ___| | | |
| |_) / _ \  | || |_) \ \ /\ / / _ \ | || |   | |_| |
|  __/ ___ \ | ||  _ < \ V  V / ___ \| || |___|  _  |
|_| /_/   \_\___|_| \_\ \_/\_/_/   \_\_| \____|_| |_|

  Pairs-Trading Monitor
  v0.1.0
"#;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("PAIRWATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    init_logging();

    println!("{BANNER}");
    println!("📊 Pair: {} / {}", cfg.monitor.pair_a, cfg.monitor.pair_b);
    println!("📅 Lookback: {} days", cfg.monitor.lookback_days);
    println!("🔔 Alert threshold: |z| ≥ {:.2}", cfg.monitor.alert_threshold);
    info!(
        config = %config_path,
        pair_a = %cfg.monitor.pair_a,
        pair_b = %cfg.monitor.pair_b,
        mode = ?cfg.monitor.mode,
        "PAIRWATCH starting up"
    );

    let source = YahooFinanceClient::new(&cfg.data_source)?;
    let monitor = Monitor::new(Box::new(source), cfg.monitor.clone())
        .context("Invalid monitor configuration")?;

    match cfg.monitor.mode {
        RunMode::Once => {
            run_single(&monitor).await;
        }
        RunMode::Continuous => {
            run_monitoring(&monitor, cfg.monitor.interval()).await;
        }
        RunMode::Prompt => {
            run_single(&monitor).await;

            if !confirm("\nStart continuous monitoring? (y/n): ").await? {
                println!("👋 Goodbye!");
                return Ok(());
            }

            let input = read_line(&format!(
                "Enter check interval in minutes (default {}): ",
                cfg.monitor.interval_minutes
            ))
            .await?;
            let interval = match parse_interval(&input, cfg.monitor.interval_minutes) {
                Some(interval) => interval,
                None => {
                    println!(
                        "⚠️ Invalid interval, using default {} minutes",
                        cfg.monitor.interval_minutes
                    );
                    cfg.monitor.interval()
                }
            };
            run_monitoring(&monitor, interval).await;
        }
    }

    Ok(())
}

/// One analysis; failures are reported, never propagated.
async fn run_single(monitor: &Monitor) {
    let outcome = monitor.run_analysis().await;
    print_outcome(&outcome);
}

/// Continuous loop until Ctrl-C.
async fn run_monitoring(monitor: &Monitor, interval: Duration) {
    let (trigger, token) = scheduler::shutdown_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => trigger.trigger(),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let minutes = interval.as_secs() / 60;
    println!("\n🔄 Starting continuous monitoring (every {minutes} minutes). Press Ctrl-C to stop.");

    let summary = scheduler::run_continuous(monitor, interval, token, |cycle, outcome| {
        println!("\n── Cycle {cycle} ──");
        print_outcome(outcome);
        match outcome {
            Ok(_) => println!("\n⏰ Next check in {minutes} minutes..."),
            Err(_) => println!("\n🔁 Analysis failed, retrying in {minutes} minutes..."),
        }
    })
    .await;

    print_summary(&summary);
}

fn print_outcome(outcome: &Result<AnalysisReport, MonitorError>) {
    match outcome {
        Ok(report) => println!("{report}"),
        Err(e) => println!("\n❌ Analysis failed: {e}"),
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n🛑 Monitoring stopped by user");
    println!(
        "   Cycles run: {} ({} failed)",
        summary.cycles, summary.failures
    );
}

// ---------------------------------------------------------------------------
// Console input
// ---------------------------------------------------------------------------

async fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("Failed to flush stdout")?;

    tokio::task::spawn_blocking(|| -> Result<String> {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        Ok(line)
    })
    .await
    .context("Console reader task panicked")?
}

async fn confirm(prompt: &str) -> Result<bool> {
    let answer = read_line(prompt).await?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Empty input keeps the default; anything that is not a whole number of
/// minutes within the accepted interval range is rejected.
fn parse_interval(input: &str, default_minutes: u64) -> Option<Duration> {
    let input = input.trim();
    let minutes = if input.is_empty() {
        default_minutes
    } else {
        input.parse::<u64>().ok()?
    };
    interval_from_minutes(minutes)
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pairwatch=info"));

    let json_logging = std::env::var("PAIRWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
