//! Utility functions for timestamps, stay-date computation, and file system checks.

use chrono::{Duration, Local};
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Current local time formatted for snapshot labels: `YYYY-MM-DD HH:MM`.
///
/// This string is stored verbatim in the persisted history and is treated as
/// an opaque label; ordering of snapshots is positional, not parsed from it.
pub fn run_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M").to_string()
}

/// Check-in and check-out dates for rate lookups.
///
/// Rates are always queried for a one-night stay starting tomorrow, so every
/// run compares the same booking window across properties.
///
/// # Returns
///
/// `(checkin, checkout)` as `YYYY-MM-DD` strings, check-in tomorrow and
/// check-out the day after.
pub fn stay_dates() -> (String, String) {
    let checkin = Local::now().date_naive() + Duration::days(1);
    let checkout = checkin + Duration::days(1);
    (
        checkin.format("%Y-%m-%d").to_string(),
        checkout.format("%Y-%m-%d").to_string(),
    )
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file. Used on the history file's
/// parent directory before any scraping starts, so a permissions problem
/// fails the run up front instead of after all fetches complete.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Small sync probe write; simpler error surface than async here.
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("History directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
