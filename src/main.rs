mod cli;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use indicatif::ProgressBar;
use tracing::info;

use cli::{Cli, Commands};
use demat::config::Config;
use demat::export::{CsvDirSink, TableSink, WorkbookSink};
use demat::importers::{parse_instrument_mapping, parse_ledger_sheet, parse_tradebook_sheet};
use demat::instruments::InstrumentMap;
use demat::ledger::{CashLedger, TradeLedger};
use demat::portfolio::{replay, value_portfolio};
use demat::pricing::{store, QuoteService, QuoteStore, YahooClient};
use demat::reports::{build_timeline, performance_table, portfolio_table};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Report { out, csv_dir } => {
            handle_report(&config, cli.no_cache, out, csv_dir).await
        }
        Commands::Portfolio { date } => handle_portfolio(&config, cli.no_cache, date).await,
        Commands::Performance => handle_performance(&config, cli.no_cache).await,
    }
}

/// Load and normalize all tabular inputs.
fn load_inputs(config: &Config) -> Result<(InstrumentMap, TradeLedger, CashLedger)> {
    let instruments = parse_instrument_mapping(&config.mapping)?;
    let trades = TradeLedger::new(parse_tradebook_sheet(
        &config.workbook,
        &config.tradebook_sheet,
    )?);
    let cash = CashLedger::new(parse_ledger_sheet(&config.workbook, &config.ledger_sheet)?);

    info!(
        "Loaded {} mappings, {} trades, {} ledger entries",
        instruments.len(),
        trades.len(),
        cash.len()
    );
    Ok((instruments, trades, cash))
}

fn build_quotes(config: &Config, no_cache: bool) -> Result<QuoteService> {
    let client = YahooClient::new(config.lookup_timeout_secs)?;
    let store = if no_cache {
        None
    } else {
        let path = match &config.quote_db {
            Some(path) => path.clone(),
            None => store::default_store_path()?,
        };
        Some(QuoteStore::open(path)?)
    };
    Ok(QuoteService::new(client, store))
}

fn ledger_span(cash: &CashLedger) -> Result<(NaiveDate, NaiveDate)> {
    cash.date_span()
        .ok_or_else(|| anyhow!("cash ledger has no usable entries"))
}

async fn handle_report(
    config: &Config,
    no_cache: bool,
    out: Option<std::path::PathBuf>,
    csv_dir: Option<std::path::PathBuf>,
) -> Result<()> {
    let (instruments, trades, cash) = load_inputs(config)?;
    let (start, end) = ledger_span(&cash)?;
    let quotes = build_quotes(config, no_cache)?;

    // Current holdings, valued once at the end of the range.
    let holdings = replay(trades.trades(), start, end);
    let portfolio = value_portfolio(&holdings, &instruments, &quotes, end)
        .await
        .context("valuing current holdings")?;

    let total_days = (end - start).num_days() as u64 + 1;
    let progress = ProgressBar::new(total_days);
    let rows = build_timeline(
        &trades,
        &cash,
        &instruments,
        &quotes,
        &config.benchmark,
        start,
        end,
        |done, _| progress.set_position(done as u64),
    )
    .await?;
    progress.finish_and_clear();

    println!("{}", cli::formatters::render_portfolio(&portfolio));
    println!("Number of stocks in portfolio = {}", portfolio.positions.len());
    println!("Number of days since start = {}", rows.len());

    let portfolio_out = portfolio_table(&portfolio, &config.output.portfolio_table);
    let performance_out = performance_table(&rows, &config.output.performance_table);

    match csv_dir {
        Some(dir) => {
            let mut sink = CsvDirSink::new(&dir);
            sink.write_table(&portfolio_out)?;
            sink.write_table(&performance_out)?;
            sink.finish()?;
            println!("Report written to {:?}", dir);
        }
        None => {
            let path = out.unwrap_or_else(|| config.output.workbook.clone());
            let mut sink = WorkbookSink::new(&path);
            sink.write_table(&portfolio_out)?;
            sink.write_table(&performance_out)?;
            sink.finish()?;
            println!("Report written to {:?}", path);
        }
    }

    Ok(())
}

async fn handle_portfolio(config: &Config, no_cache: bool, date: Option<NaiveDate>) -> Result<()> {
    let (instruments, trades, cash) = load_inputs(config)?;
    let (start, end) = ledger_span(&cash)?;
    let as_of = date.unwrap_or(end);
    let quotes = build_quotes(config, no_cache)?;

    let holdings = replay(trades.trades(), start, as_of);
    let portfolio = value_portfolio(&holdings, &instruments, &quotes, as_of)
        .await
        .with_context(|| format!("valuing holdings as of {}", as_of))?;

    println!("{}", cli::formatters::render_portfolio(&portfolio));
    println!("Number of stocks in portfolio = {}", portfolio.positions.len());
    Ok(())
}

async fn handle_performance(config: &Config, no_cache: bool) -> Result<()> {
    let (instruments, trades, cash) = load_inputs(config)?;
    let (start, end) = ledger_span(&cash)?;
    let quotes = build_quotes(config, no_cache)?;

    let total_days = (end - start).num_days() as u64 + 1;
    let progress = ProgressBar::new(total_days);
    let rows = build_timeline(
        &trades,
        &cash,
        &instruments,
        &quotes,
        &config.benchmark,
        start,
        end,
        |done, _| progress.set_position(done as u64),
    )
    .await?;
    progress.finish_and_clear();

    println!("{}", cli::formatters::render_performance(&rows));
    println!("Number of days since start = {}", rows.len());
    Ok(())
}
