//! Fixed-schema output tables
//!
//! Columns are declared up front and every appended row must match the
//! schema arity, so sinks never have to infer a layout from insertion order.

use anyhow::{ensure, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::portfolio::ValuedPortfolio;
use crate::reports::PerformanceRow;

/// A single typed table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Date(NaiveDate),
    Number(Decimal),
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

/// An immutable, finalized output table
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

/// Row-at-a-time builder over a declared schema
#[derive(Debug)]
pub struct TableBuilder {
    name: String,
    columns: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
}

impl TableBuilder {
    pub fn new(name: &str, columns: Vec<&'static str>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        ensure!(
            row.len() == self.columns.len(),
            "table '{}' expects {} columns per row, got {}",
            self.name,
            self.columns.len(),
            row.len()
        );
        self.rows.push(row);
        Ok(())
    }

    pub fn finish(self) -> Table {
        Table {
            name: self.name,
            columns: self.columns,
            rows: self.rows,
        }
    }
}

pub const PORTFOLIO_COLUMNS: [&str; 8] = [
    "Ticker",
    "Quantity",
    "Price",
    "Investment Value",
    "Last Traded Price",
    "Current Value",
    "P&L",
    "% Change",
];

pub const PERFORMANCE_COLUMNS: [&str; 10] = [
    "Date",
    "Capital",
    "Margin",
    "Investment Value",
    "Current Value",
    "Realized Return",
    "Unrealized Return",
    "Net Return",
    "Portfolio % Change",
    "Market % Change",
];

/// Lay a valued snapshot out as the "current portfolio" table.
pub fn portfolio_table(portfolio: &ValuedPortfolio, name: &str) -> Table {
    let mut builder = TableBuilder::new(name, PORTFOLIO_COLUMNS.to_vec());
    for p in &portfolio.positions {
        // Arity is fixed by construction here, so push cannot fail.
        let _ = builder.push_row(vec![
            Cell::Text(p.symbol.clone()),
            Cell::Number(p.quantity),
            Cell::Number(p.average_cost),
            Cell::Number(p.invested_value),
            Cell::Number(p.last_price),
            Cell::Number(p.current_value),
            Cell::Number(p.pnl),
            Cell::Number(p.pct_change),
        ]);
    }
    builder.finish()
}

/// Lay the daily series out as the "performance" table.
pub fn performance_table(rows: &[PerformanceRow], name: &str) -> Table {
    let mut builder = TableBuilder::new(name, PERFORMANCE_COLUMNS.to_vec());
    for r in rows {
        let _ = builder.push_row(vec![
            Cell::Date(r.date),
            Cell::Number(r.capital),
            Cell::Number(r.margin),
            Cell::Number(r.investment_value),
            Cell::Number(r.current_value),
            Cell::Number(r.realized_return),
            Cell::Number(r.unrealized_return),
            Cell::Number(r.net_return),
            Cell::Number(r.portfolio_pct_change),
            Cell::Number(r.market_pct_change),
        ]);
    }
    builder.finish()
}
