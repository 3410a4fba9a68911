//! Command-line interface definitions for Rate Scout.
//!
//! The CLI stays thin on purpose: the target list, retention, and delay
//! bounds live in the configuration file, and only the config path plus a
//! couple of per-invocation overrides are exposed as flags.

use clap::Parser;

/// Command-line arguments for the Rate Scout application.
///
/// # Examples
///
/// ```sh
/// # Use the default rate_scout.yaml next to the binary
/// rate_scout
///
/// # Explicit config, alternate history file
/// rate_scout -c competitors.yaml --data-file /var/lib/rate_scout/prices.json
///
/// # Keep a shorter history
/// rate_scout --retention 30
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "rate_scout.yaml")]
    pub config: String,

    /// Override the history file path from the configuration
    #[arg(long)]
    pub data_file: Option<String>,

    /// Override the snapshot retention bound from the configuration
    #[arg(long)]
    pub retention: Option<usize>,
}
