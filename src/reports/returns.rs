use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{Result, TrackerError};
use crate::ledger::{CashLedger, VoucherType};
use crate::portfolio::ValuedPortfolio;

/// Net return and cumulative invested capital as of a cutoff date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciliation {
    pub net_return: Decimal,
    pub invested_capital: Decimal,
}

/// Reconcile the cash ledger against a valued snapshot over `[start, cutoff]`.
///
/// Invested capital counts bank receipts in and bank payments out; every
/// other voucher is internal churn. Total value is the priced holdings plus
/// the net cash balance after the last entry in the window. Both outputs are
/// rounded to 2 decimal places.
pub fn reconcile(
    cash: &CashLedger,
    valued: &ValuedPortfolio,
    start: NaiveDate,
    cutoff: NaiveDate,
) -> Result<Reconciliation> {
    let window = cash.window(start, cutoff);
    let Some(last) = window.last() else {
        return Err(TrackerError::EmptyLedgerWindow { start, end: cutoff }.into());
    };

    let mut invested_capital = Decimal::ZERO;
    for entry in window {
        match entry.voucher {
            VoucherType::BankReceipts => invested_capital += entry.credit,
            VoucherType::BankPayments => invested_capital -= entry.debit,
            VoucherType::Other(_) => {}
        }
    }

    let total_value = valued.total_value() + last.net_balance;
    let net_return = total_value - invested_capital;

    Ok(Reconciliation {
        net_return: net_return.round_dp(2),
        invested_capital: invested_capital.round_dp(2),
    })
}
