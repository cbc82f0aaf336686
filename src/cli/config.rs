use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::replay::pacing::Pacing;
use crate::replay::strategy::FillMode;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-replay",
    version,
    about = "Capture form state from pages and replay it later"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the JSON store file
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Append per-field replay outcomes to this JSONL file
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Path to config file (default: form-replay.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture the form fields of a page and save them
    Capture {
        /// Page fixture (JSON)
        #[arg(long)]
        page: String,
    },

    /// List saved forms, newest first
    List,

    /// Replay a saved form into a page
    Fill {
        /// Saved form id
        #[arg(long)]
        id: String,

        /// Page fixture (JSON) to fill
        #[arg(long)]
        page: String,

        /// Fill mode (default: stored preference)
        #[arg(long, value_enum)]
        mode: Option<FillMode>,

        /// Where to write the filled page (default: overwrite --page)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Delete a saved form
    Delete {
        #[arg(long)]
        id: String,
    },

    /// Export every saved form as a JSON array
    Export {
        /// Output file (default: form-replay_export_<timestamp>.json)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import forms from a JSON array file
    Import {
        #[arg(long)]
        file: String,
    },

    /// Show or set the default fill mode
    Mode {
        #[arg(value_enum)]
        mode: Option<FillMode>,
    },

    /// Delete every saved form
    Reset,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-replay.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub replay: Pacing,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. "warn" or "form_replay=debug"
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

// Serde default helpers
fn default_store_path() -> String { "form-replay.json".to_string() }
fn default_filter() -> String { "warn".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-replay.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Resolution (CLI > config file > defaults)
// ============================================================================

/// Store path from the CLI flag, else the config file.
pub fn resolve_store_path(cli: &Cli, config: &AppConfig) -> String {
    cli.store.clone().unwrap_or_else(|| config.store.path.clone())
}

/// Log filter: each `-v` raises the level past the configured one.
pub fn resolve_log_filter(verbose: u8, config: &AppConfig) -> String {
    match verbose {
        0 => config.logging.filter.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}
