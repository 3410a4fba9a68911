//! Persisted price history: load with corrupt-recovery, snapshot append with
//! retention, full-file save.
//!
//! The history is a single JSON array, read once at run start and rewritten
//! in full at run end. Concurrent runs against the same file are not safe and
//! are expected to be serialized externally (cron, one process at a time).

use crate::models::{History, RoomInventory, Snapshot};
use std::collections::BTreeMap;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Load the history file, recovering from absence or corruption.
///
/// A missing file is the normal first-run case. A file that fails to parse is
/// logged and discarded; the next save overwrites it. Neither is fatal.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn load(path: &str) -> History {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            info!(error = %e, "No readable history file; starting empty");
            return History::new();
        }
    };

    match serde_json::from_str::<History>(&raw) {
        Ok(history) => {
            info!(snapshots = history.len(), "Loaded price history");
            history
        }
        Err(e) => {
            warn!(error = %e, "History file is corrupt; resetting to empty");
            History::new()
        }
    }
}

/// Append one run's results as a snapshot and enforce the retention bound.
///
/// Pure function: deterministic for identical arguments, no I/O. Properties
/// present in `run_results` with an empty inventory are recorded explicitly,
/// distinguishing "checked, nothing found" from "not checked". When the
/// append pushes the history past `retention`, the oldest snapshots are
/// dropped from the front so exactly the most recent `retention` remain.
pub fn record(
    mut history: History,
    run_results: BTreeMap<String, RoomInventory>,
    timestamp: String,
    retention: usize,
) -> History {
    history.push(Snapshot {
        date: timestamp,
        data: run_results,
    });
    if history.len() > retention {
        let excess = history.len() - retention;
        history.drain(..excess);
    }
    history
}

/// Rewrite the history file in full.
///
/// No incremental append: the entire array is serialized pretty-printed and
/// written over whatever was there, which is also how a corrupt file heals.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn save(path: &str, history: &History) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(history)?;
    fs::write(path, json).await?;
    info!(snapshots = history.len(), "Wrote price history");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(date: &str) -> Snapshot {
        Snapshot {
            date: date.to_string(),
            data: BTreeMap::new(),
        }
    }

    fn one_result(property: &str, room: &str, price: f64) -> BTreeMap<String, RoomInventory> {
        let mut inventory = RoomInventory::new();
        inventory.insert(room.to_string(), price);
        let mut results = BTreeMap::new();
        results.insert(property.to_string(), inventory);
        results
    }

    #[test]
    fn test_record_appends_at_end() {
        let history = vec![snapshot("2025-06-01 09:00")];
        let history = record(
            history,
            one_result("Hotel A", "Suite", 8000.0),
            "2025-06-02 09:00".to_string(),
            50,
        );
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].date, "2025-06-02 09:00");
        assert_eq!(history[1].data["Hotel A"]["Suite"], 8000.0);
    }

    #[test]
    fn test_record_truncates_oldest_first() {
        let history: History = (0..31)
            .map(|i| snapshot(&format!("2025-06-01 09:{i:02}")))
            .collect();
        let previously_second = history[1].date.clone();

        let history = record(history, BTreeMap::new(), "new".to_string(), 30);
        assert_eq!(history.len(), 30);
        assert_eq!(history[0].date, previously_second);
        assert_eq!(history[29].date, "new");
    }

    #[test]
    fn test_record_keeps_explicit_empty_inventory() {
        let mut results = one_result("Hotel A", "Suite", 8000.0);
        results.insert("Hotel B".to_string(), RoomInventory::new());

        let history = record(History::new(), results, "2025-06-01 09:00".to_string(), 50);
        let data = &history[0].data;
        assert!(data.contains_key("Hotel B"));
        assert!(data["Hotel B"].is_empty());
        // Absent is different from empty: Hotel C was never checked.
        assert!(!data.contains_key("Hotel C"));
    }

    #[test]
    fn test_record_is_deterministic() {
        let a = record(
            History::new(),
            one_result("Hotel A", "Suite", 8000.0),
            "2025-06-01 09:00".to_string(),
            50,
        );
        let b = record(
            History::new(),
            one_result("Hotel A", "Suite", 8000.0),
            "2025-06-01 09:00".to_string(),
            50,
        );
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        let history = load(path.to_str().unwrap()).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_history_resets_then_saves_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        std::fs::write(&path, "{ not json ][").unwrap();

        let history = load(path.to_str().unwrap()).await;
        assert!(history.is_empty());

        let history = record(
            history,
            one_result("Hotel A", "Deluxe Room", 4500.0),
            "2025-06-01 09:00".to_string(),
            50,
        );
        save(path.to_str().unwrap(), &history).await.unwrap();

        let reloaded = load(path.to_str().unwrap()).await;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].data["Hotel A"]["Deluxe Room"], 4500.0);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");

        let long: History = (0..5).map(|i| snapshot(&format!("day {i}"))).collect();
        save(path.to_str().unwrap(), &long).await.unwrap();

        let short = vec![snapshot("only")];
        save(path.to_str().unwrap(), &short).await.unwrap();

        let reloaded = load(path.to_str().unwrap()).await;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].date, "only");
    }
}
