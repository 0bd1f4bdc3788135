//! Demat - NSE demat account portfolio tracker
//!
//! This library reconstructs the daily history of an equity portfolio from a
//! demat account workbook: holdings with average cost, mark-to-market value,
//! realized/unrealized return, and performance against the NIFTY benchmark.

pub mod config;
pub mod error;
pub mod export;
pub mod importers;
pub mod instruments;
pub mod ledger;
pub mod portfolio;
pub mod pricing;
pub mod reports;
pub mod utils;
