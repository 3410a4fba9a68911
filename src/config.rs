//! Run configuration loaded from a YAML file.
//!
//! Everything that varies between deployments (target list, retention bound,
//! data file, politeness delay) is an explicit value here, threaded through
//! the run instead of living in module-level constants.

use serde::Deserialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// A property whose booking page is scanned each run.
#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    /// Display name used as the property key in snapshots.
    pub name: String,
    /// Booking page URL; stay dates are appended as query parameters.
    pub url: String,
}

/// Full configuration for one run.
///
/// # Example
///
/// ```yaml
/// targets:
///   - name: Hotel A
///     url: https://www.booking.com/hotel/in/hotel-a.html
///   - name: Hotel B
///     url: https://www.booking.com/hotel/in/hotel-b.html
/// retention: 50
/// data_file: prices.json
/// delay_secs: [2.0, 5.0]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Properties to scan, in order.
    pub targets: Vec<Target>,
    /// Maximum number of snapshots kept in the history; oldest evicted first.
    #[serde(default = "default_retention")]
    pub retention: usize,
    /// Path of the persisted JSON history.
    #[serde(default = "default_data_file")]
    pub data_file: String,
    /// `[min, max]` bounds in seconds for the randomized pause before each fetch.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: [f64; 2],
}

fn default_retention() -> usize {
    50
}

fn default_data_file() -> String {
    "prices.json".to_string()
}

fn default_delay_secs() -> [f64; 2] {
    [2.0, 5.0]
}

/// Load and validate configuration from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid YAML, lists no
/// targets, or has inverted delay bounds. Unlike history corruption, a broken
/// configuration is fatal: there is nothing sensible to scan without it.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn load(path: &str) -> Result<Config, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&raw)?;
    if config.targets.is_empty() {
        return Err("configuration lists no targets".into());
    }
    if config.delay_secs[0] > config.delay_secs[1] {
        return Err("delay_secs must be [min, max] with min <= max".into());
    }
    info!(
        targets = config.targets.len(),
        retention = config.retention,
        data_file = %config.data_file,
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let yaml = r#"
targets:
  - name: Hotel A
    url: https://example.com/hotel-a.html
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.retention, 50);
        assert_eq!(config.data_file, "prices.json");
        assert_eq!(config.delay_secs, [2.0, 5.0]);
    }

    #[test]
    fn test_full_config_overrides_defaults() {
        let yaml = r#"
targets:
  - name: Hotel A
    url: https://example.com/a.html
  - name: Hotel B
    url: https://example.com/b.html
retention: 30
data_file: out/history.json
delay_secs: [0.5, 1.5]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[1].name, "Hotel B");
        assert_eq!(config.retention, 30);
        assert_eq!(config.data_file, "out/history.json");
        assert_eq!(config.delay_secs, [0.5, 1.5]);
    }

    #[tokio::test]
    async fn test_load_rejects_empty_targets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rate_scout.yaml");
        std::fs::write(&path, "targets: []\n").unwrap();

        let err = load(path.to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("no targets"));
    }

    #[tokio::test]
    async fn test_load_rejects_inverted_delay_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rate_scout.yaml");
        std::fs::write(
            &path,
            "targets:\n  - name: A\n    url: https://example.com\ndelay_secs: [5.0, 2.0]\n",
        )
        .unwrap();

        let err = load(path.to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("delay_secs"));
    }
}
