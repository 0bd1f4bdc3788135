use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "demat")]
#[command(version, about = "NSE demat account portfolio tracker")]
#[command(
    long_about = "Rebuild the daily history of your NSE equity portfolio from a demat account workbook: holdings with average cost, mark-to-market value, realized/unrealized returns, and performance against the NIFTY benchmark."
)]
pub struct Cli {
    /// Path to the config file (defaults to ./demat.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Disable the persistent quote cache
    #[arg(long = "no-cache", global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full run: current portfolio plus the daily performance series,
    /// printed and written to the report workbook
    Report {
        /// Override the report workbook path
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write CSV files into this directory instead of a workbook
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },

    /// Show the portfolio valued as of a date (defaults to the ledger end)
    Portfolio {
        /// Valuation date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the daily performance series without writing any output files
    Performance,
}
