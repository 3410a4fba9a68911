//! # Rate Scout
//!
//! A competitor rate tracker that scrapes hotel booking pages, extracts a
//! normalized price list per room category, and appends the results to a
//! bounded JSON history for comparison across properties and across days.
//!
//! ## Usage
//!
//! ```sh
//! rate_scout -c competitors.yaml
//! ```
//!
//! ## Architecture
//!
//! Each run is one pass of a sequential pipeline:
//! 1. **Configure**: load the target list, retention bound, and delay range
//! 2. **Fetch**: download each property's booking page for a one-night stay
//!    starting tomorrow, with rotating identity headers, retry backoff, and a
//!    randomized politeness pause between properties
//! 3. **Extract**: run the tiered selector engine over each page's markup
//! 4. **Record**: assemble a timestamped snapshot, append it to the loaded
//!    history, enforce retention, and rewrite the history file in full
//!
//! A property whose page cannot be fetched or parsed is recorded with an
//! explicit empty inventory rather than dropped, so the history always shows
//! which properties were checked.

use clap::Parser;
use rand::{Rng, rng};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod extract;
mod fetch;
mod history;
mod models;
mod utils;

use cli::Cli;
use fetch::{FetchPage, HttpFetcher, RetryFetch};
use models::RoomInventory;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("rate_scout starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, ?args.data_file, ?args.retention, "Parsed CLI arguments");

    // --- Configuration ---
    let mut config = config::load(&args.config).await?;
    if let Some(data_file) = args.data_file {
        config.data_file = data_file;
    }
    if let Some(retention) = args.retention {
        config.retention = retention;
    }

    // Early check: ensure the history file's directory is writable
    let data_dir = Path::new(&config.data_file)
        .parent()
        .and_then(|p| p.to_str())
        .filter(|p| !p.is_empty())
        .unwrap_or(".");
    if let Err(e) = utils::ensure_writable_dir(data_dir).await {
        error!(
            path = %data_dir,
            error = %e,
            "History directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // --- Stay window & history ---
    let (checkin, checkout) = utils::stay_dates();
    info!(%checkin, %checkout, "Stay window for this run");

    let prior = history::load(&config.data_file).await;

    let fetcher = RetryFetch::new(HttpFetcher::new()?, 3, StdDuration::from_secs(2));

    // --- Scan all targets sequentially ---
    let timestamp = utils::run_timestamp();
    info!(
        %timestamp,
        properties = config.targets.len(),
        "Scanning full inventory"
    );

    let mut run_results: BTreeMap<String, RoomInventory> = BTreeMap::new();
    for target in &config.targets {
        // Politeness pause before every fetch, first one included.
        let [low, high] = config.delay_secs;
        let pause = rng().random_range(low..=high);
        debug!(property = %target.name, pause_secs = pause, "Pausing before fetch");
        tokio::time::sleep(StdDuration::from_secs_f64(pause)).await;

        info!(property = %target.name, "Scanning");
        let markup = match fetch::stay_url(&target.url, &checkin, &checkout) {
            Ok(url) => match fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(property = %target.name, error = %e, "Fetch failed; treating as no markup");
                    String::new()
                }
            },
            Err(e) => {
                warn!(property = %target.name, url = %target.url, error = %e, "Invalid target URL; treating as no markup");
                String::new()
            }
        };

        let inventory = extract::extract(&markup);
        if inventory.is_empty() {
            info!(property = %target.name, "No inventory found (sold out or blocked)");
        } else {
            info!(
                property = %target.name,
                rooms = inventory.len(),
                "Found room categories"
            );
        }
        run_results.insert(target.name.clone(), inventory);
    }

    // --- Record & persist ---
    let scanned = run_results.len();
    let with_rates = run_results.values().filter(|inv| !inv.is_empty()).count();
    let updated = history::record(prior, run_results, timestamp, config.retention);
    history::save(&config.data_file, &updated).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        properties_scanned = scanned,
        properties_with_rates = with_rates,
        snapshots_kept = updated.len(),
        "Scan complete"
    );

    Ok(())
}
