//! Error handling for the demat tracker
//!
//! Defines the typed error taxonomy for portfolio operations and establishes
//! a unified Result type using anyhow for context chaining and propagation.
//! Callers that need to branch on a failure kind downcast through the chain.

use chrono::NaiveDate;
use thiserror::Error;

/// Typed failure kinds for portfolio operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The instrument mapping table has no market code for a traded symbol.
    #[error("no market code mapped for symbol {0}")]
    UnknownInstrument(String),

    /// The quote provider returned nothing on or after the requested date.
    #[error("no price data for {code} on or after {date}")]
    NoDataAvailable { code: String, date: NaiveDate },

    /// An external lookup exceeded the configured deadline.
    #[error("quote lookup for {code} timed out after {seconds}s")]
    LookupTimeout { code: String, seconds: u64 },

    /// A percentage with a zero denominator; never reported as inf/NaN.
    #[error("{what} is undefined: denominator is zero")]
    UndefinedRatio { what: &'static str },

    /// No cash ledger rows fall inside the requested window.
    #[error("cash ledger has no entries between {start} and {end}")]
    EmptyLedgerWindow { start: NaiveDate, end: NaiveDate },

    /// First timeline day has no posted balance and nothing to carry forward.
    #[error("no cash balance posted on {0} and no earlier margin to carry forward")]
    NoPriorMargin(NaiveDate),

    /// A required field is missing or unparseable on ingest.
    #[error("malformed row {row} in sheet '{sheet}': {reason}")]
    MalformedRow {
        sheet: String,
        row: usize,
        reason: String,
    },
}

/// Result type alias for portfolio operations
pub type Result<T> = anyhow::Result<T>;
