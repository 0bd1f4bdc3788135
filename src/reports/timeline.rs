use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::instruments::InstrumentMap;
use crate::ledger::{CashLedger, TradeLedger};
use crate::portfolio::{replay, value_portfolio};
use crate::pricing::QuoteSource;
use crate::reports::reconcile;

/// One day of the portfolio performance series
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    pub date: NaiveDate,
    pub capital: Decimal,
    pub margin: Decimal,
    pub investment_value: Decimal,
    pub current_value: Decimal,
    pub realized_return: Decimal,
    pub unrealized_return: Decimal,
    pub net_return: Decimal,
    pub portfolio_pct_change: Decimal,
    pub market_pct_change: Decimal,
}

/// Build the daily performance series over `[start, end]`, one row per
/// calendar day inclusive.
///
/// Every day replays the tradebook from scratch, prices the snapshot, and
/// reconciles it against the cash ledger; the only state threaded between
/// days is the margin carry-forward. The benchmark's open at `start` anchors
/// the market percentage change; its close is fetched per day. The first
/// failure aborts the whole build, so callers never observe partial output.
///
/// `progress` is invoked after each completed day with (done, total).
pub async fn build_timeline<Q: QuoteSource + ?Sized>(
    trades: &TradeLedger,
    cash: &CashLedger,
    instruments: &InstrumentMap,
    quotes: &Q,
    benchmark: &str,
    start: NaiveDate,
    end: NaiveDate,
    mut progress: impl FnMut(usize, usize),
) -> Result<Vec<PerformanceRow>> {
    anyhow::ensure!(start <= end, "timeline start {} is after end {}", start, end);

    let benchmark_open = quotes
        .quote_on_or_after(benchmark, start)
        .await
        .with_context(|| format!("fetching benchmark {} open at timeline start", benchmark))?
        .open
        .ok_or(TrackerError::NoDataAvailable {
            code: benchmark.to_string(),
            date: start,
        })?;
    if benchmark_open.is_zero() {
        return Err(TrackerError::UndefinedRatio {
            what: "market % change",
        }
        .into());
    }

    let total_days = (end - start).num_days() as usize + 1;
    let mut rows: Vec<PerformanceRow> = Vec::with_capacity(total_days);
    let mut prev_margin: Option<Decimal> = None;

    for (idx, day) in start.iter_days().take_while(|d| *d <= end).enumerate() {
        debug!("Building performance row for {}", day);

        // Resolved before any pricing: a first day without a posted balance
        // is a configuration problem, not worth a network round-trip.
        let margin = match cash.balance_on(day) {
            Some(balance) => balance,
            None => prev_margin.ok_or(TrackerError::NoPriorMargin(day))?,
        };

        let holdings = replay(trades.trades(), start, day);
        let portfolio = value_portfolio(&holdings, instruments, quotes, day)
            .await
            .with_context(|| format!("valuing portfolio on {}", day))?;
        let recon = reconcile(cash, &portfolio, start, day)
            .with_context(|| format!("reconciling returns on {}", day))?;

        let benchmark_close = quotes
            .quote_on_or_after(benchmark, day)
            .await
            .with_context(|| format!("fetching benchmark {} close on {}", benchmark, day))?
            .close;
        let market_pct_change = (benchmark_close - benchmark_open) / benchmark_open;

        let unrealized_return = portfolio.total_pnl();
        let realized_return = recon.net_return - unrealized_return;

        if recon.invested_capital.is_zero() {
            return Err(TrackerError::UndefinedRatio {
                what: "portfolio % change",
            })
            .with_context(|| format!("invested capital is zero on {}", day));
        }
        let portfolio_pct_change = recon.net_return / recon.invested_capital;

        rows.push(PerformanceRow {
            date: day,
            capital: recon.invested_capital,
            margin,
            investment_value: portfolio.total_invested(),
            current_value: portfolio.total_value(),
            realized_return,
            unrealized_return,
            net_return: recon.net_return,
            portfolio_pct_change,
            market_pct_change,
        });

        prev_margin = Some(margin);
        progress(idx + 1, total_days);
    }

    Ok(rows)
}
