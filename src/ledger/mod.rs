//! Normalized, time-ordered trade and cash ledgers
//!
//! Both ledgers are loaded once and never mutated. Sorting is stable so
//! same-day rows keep their original file order, which is the tie-break
//! rule the replay fold depends on.

pub mod models;

pub use models::{CashEntry, Trade, TradeSide, VoucherType};

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Time-ordered record of buy/sell events
#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    trades: Vec<Trade>,
}

impl TradeLedger {
    pub fn new(mut trades: Vec<Trade>) -> Self {
        trades.sort_by_key(|t| t.trade_date);
        Self { trades }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Time-ordered record of cash receipts/payments with running net balance
#[derive(Debug, Clone, Default)]
pub struct CashLedger {
    entries: Vec<CashEntry>,
}

impl CashLedger {
    pub fn new(mut entries: Vec<CashEntry>) -> Self {
        entries.sort_by_key(|e| e.posting_date);
        Self { entries }
    }

    pub fn entries(&self) -> &[CashEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First and last posting dates; the timeline spans exactly this range.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => Some((first.posting_date, last.posting_date)),
            _ => None,
        }
    }

    /// Entries posted in `[start, end]`, as a slice of the sorted ledger.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> &[CashEntry] {
        let lo = self.entries.partition_point(|e| e.posting_date < start);
        let hi = self.entries.partition_point(|e| e.posting_date <= end);
        &self.entries[lo..hi]
    }

    /// Net balance after the last entry posted on `date`, if any was.
    pub fn balance_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.window(date, date).last().map(|e| e.net_balance)
    }
}
