//! Instrument symbol metadata
//!
//! Maps local NSE symbols to the Yahoo Finance codes the quote client
//! understands. A miss is a typed error, never a retry loop.

use std::collections::HashMap;

use crate::error::{Result, TrackerError};

/// Lookup table from NSE symbol to Yahoo market code
#[derive(Debug, Clone, Default)]
pub struct InstrumentMap {
    codes: HashMap<String, String>,
}

impl InstrumentMap {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            codes: pairs.into_iter().collect(),
        }
    }

    /// Resolve a traded symbol to its market code.
    pub fn market_code(&self, symbol: &str) -> Result<&str> {
        self.codes
            .get(symbol)
            .map(String::as_str)
            .ok_or_else(|| TrackerError::UnknownInstrument(symbol.to_string()).into())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
