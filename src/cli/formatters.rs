//! Terminal rendering of portfolio and performance reports

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{settings::Style, Table, Tabled};

use demat::portfolio::ValuedPortfolio;
use demat::reports::PerformanceRow;
use demat::utils::{format_amount, format_pct};

#[derive(Tabled)]
struct PortfolioLine {
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Avg Cost")]
    average_cost: String,
    #[tabled(rename = "Invested")]
    invested: String,
    #[tabled(rename = "LTP")]
    last_price: String,
    #[tabled(rename = "Value")]
    current_value: String,
    #[tabled(rename = "P&L")]
    pnl: String,
    #[tabled(rename = "% Change")]
    pct_change: String,
}

fn signed(value: Decimal, text: String) -> String {
    if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

pub fn render_portfolio(portfolio: &ValuedPortfolio) -> String {
    let lines: Vec<PortfolioLine> = portfolio
        .positions
        .iter()
        .map(|p| PortfolioLine {
            ticker: p.symbol.clone(),
            quantity: p.quantity.to_string(),
            average_cost: format_amount(p.average_cost.round_dp(2)),
            invested: format_amount(p.invested_value),
            last_price: format_amount(p.last_price),
            current_value: format_amount(p.current_value),
            pnl: signed(p.pnl, format_amount(p.pnl)),
            pct_change: signed(p.pct_change, format_pct(p.pct_change)),
        })
        .collect();

    Table::new(lines).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct PerformanceLine {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Capital")]
    capital: String,
    #[tabled(rename = "Margin")]
    margin: String,
    #[tabled(rename = "Invested")]
    investment_value: String,
    #[tabled(rename = "Value")]
    current_value: String,
    #[tabled(rename = "Realized")]
    realized: String,
    #[tabled(rename = "Unrealized")]
    unrealized: String,
    #[tabled(rename = "Net Return")]
    net_return: String,
    #[tabled(rename = "Portfolio %")]
    portfolio_pct: String,
    #[tabled(rename = "Market %")]
    market_pct: String,
}

pub fn render_performance(rows: &[PerformanceRow]) -> String {
    let lines: Vec<PerformanceLine> = rows
        .iter()
        .map(|r| PerformanceLine {
            date: r.date.format("%Y-%m-%d").to_string(),
            capital: format_amount(r.capital),
            margin: format_amount(r.margin),
            investment_value: format_amount(r.investment_value),
            current_value: format_amount(r.current_value),
            realized: signed(r.realized_return, format_amount(r.realized_return)),
            unrealized: signed(r.unrealized_return, format_amount(r.unrealized_return)),
            net_return: signed(r.net_return, format_amount(r.net_return)),
            portfolio_pct: signed(r.portfolio_pct_change, format_pct(r.portfolio_pct_change)),
            market_pct: signed(r.market_pct_change, format_pct(r.market_pct_change)),
        })
        .collect();

    Table::new(lines).with(Style::rounded()).to_string()
}
