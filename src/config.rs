//! Runtime configuration
//!
//! Loaded from a TOML file with sensible defaults matching the demat
//! account workbook layout brokers export. Every field can be omitted.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "demat.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Demat account workbook holding the tradebook and ledger sheets
    pub workbook: PathBuf,
    pub tradebook_sheet: String,
    pub ledger_sheet: String,
    /// Workbook mapping NSE symbols to Yahoo codes
    pub mapping: PathBuf,
    /// Benchmark index symbol
    pub benchmark: String,
    /// Deadline for a single quote lookup
    pub lookup_timeout_secs: u64,
    /// Persistent quote cache location; None uses the platform cache dir
    pub quote_db: Option<PathBuf>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Report workbook the output tables are written to
    pub workbook: PathBuf,
    pub portfolio_table: String,
    pub performance_table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from("Demat Account.xlsx"),
            tradebook_sheet: "Tradebook".to_string(),
            ledger_sheet: "Ledger".to_string(),
            mapping: PathBuf::from("NSE_Tickers.xlsx"),
            benchmark: "^NSEI".to_string(),
            lookup_timeout_secs: 30,
            quote_db: None,
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from("Demat Report.xlsx"),
            portfolio_table: "Portfolio".to_string(),
            performance_table: "Performance".to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist; without one, `demat.toml` is used when
    /// present and the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    debug!("No config file found, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config =
            toml::from_str(&text).with_context(|| format!("Invalid config file {:?}", path))?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }
}
