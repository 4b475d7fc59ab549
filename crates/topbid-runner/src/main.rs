//! # topbid-runner
//!
//! Polls the best bid and ask of the configured exchange pairs and logs a
//! top-of-book report periodically.
//!
//! # Usage
//!
//! ```bash
//! topbid-runner config.json --log-level info --report-interval-secs 10
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use topbid_md::OrderBook;
use tracing::{info, warn};

/// Exchange top-of-book poller.
#[derive(Parser)]
#[command(name = "topbid-runner", about = "Exchange top-of-book poller")]
struct Cli {
    /// Configuration file path (JSON).
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output. Overrides `module.log_path`.
    #[arg(long)]
    log_dir: Option<String>,

    /// Seconds between top-of-book reports.
    #[arg(long, default_value_t = 10)]
    report_interval_secs: u64,
}

fn log_report(book: &OrderBook) {
    let rows = book.snapshot();
    let quoted = rows.iter().filter(|(_, bid, ask)| !bid.is_empty() || !ask.is_empty()).count();
    info!("[runner] {} pair(s) tracked, {quoted} with data", rows.len());
    for (key, bid, ask) in rows {
        info!("[runner] {key} bid={bid} ask={ask}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = topbid_core::config::load_config(&cli.config)?;

    // 2. Initialize logging
    let log_dir = cli.log_dir.clone().or_else(|| config.log_path());
    let _log_guard = topbid_core::logging::init_logging(&cli.log_level, log_dir.as_deref(), &config.module_name());

    info!(
        "[runner] starting, config={} interval={:?} pairs={}",
        cli.config.display(),
        config.refresh.interval(),
        config.pairs.len()
    );

    // 3. Build the orderbook and add the configured pairs
    let book = OrderBook::with_defaults(&config)?;
    for p in &config.pairs {
        if !book.add(&p.exchange, &p.pair).await {
            warn!("[runner] duplicate pair in config: {}-{}", p.exchange, p.pair);
        }
    }

    // 4. Refresh until Ctrl+C
    book.start(config.refresh.interval())?;
    info!("[runner] refreshing, press Ctrl+C to stop");

    let mut report = tokio::time::interval(Duration::from_secs(cli.report_interval_secs.max(1)));
    report.tick().await; // skip the immediate first tick
    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                info!("[runner] shutdown signal received");
                break;
            }
            _ = report.tick() => log_report(&book),
        }
    }

    // 5. Stop
    book.stop();
    info!("[runner] stopped");
    Ok(())
}
