use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::TrackerError;
use crate::ledger::{Trade, TradeSide};

/// Column positions for the tradebook sheet
#[derive(Debug, Clone)]
struct TradebookColumns {
    date: Option<usize>,
    symbol: Option<usize>,
    side: Option<usize>,
    quantity: Option<usize>,
    price: Option<usize>,
}

impl TradebookColumns {
    fn from_header(header: &[Data]) -> Self {
        let mut columns = TradebookColumns {
            date: None,
            symbol: None,
            side: None,
            quantity: None,
            price: None,
        };

        for (idx, cell) in header.iter().enumerate() {
            let text = cell.to_string().to_lowercase();

            if text.contains("trade") && text.contains("date") {
                columns.date = Some(idx);
            } else if columns.date.is_none() && text.contains("date") {
                columns.date = Some(idx);
            }

            if text.contains("symbol") || text.contains("ticker") {
                columns.symbol = Some(idx);
            }

            if text.contains("trade") && text.contains("type") {
                columns.side = Some(idx);
            } else if columns.side.is_none() && text.contains("type") {
                columns.side = Some(idx);
            }

            if text.contains("qty") || text.contains("quantity") {
                columns.quantity = Some(idx);
            }

            if text.contains("price") {
                columns.price = Some(idx);
            }
        }

        columns
    }

    fn is_valid(&self) -> bool {
        self.date.is_some()
            && self.symbol.is_some()
            && self.side.is_some()
            && self.quantity.is_some()
            && self.price.is_some()
    }
}

/// Parse the Tradebook sheet of a demat account workbook
///
/// Trades feed cost-basis accounting, so a row that cannot be parsed aborts
/// the import with a typed `MalformedRow` instead of being dropped; a silent
/// gap here would corrupt every downstream figure.
pub fn parse_tradebook_sheet<P: AsRef<Path>>(path: P, sheet: &str) -> Result<Vec<Trade>> {
    let path = path.as_ref();
    info!("Parsing tradebook sheet '{}' from {:?}", sheet, path);

    let mut workbook: Xlsx<_> = open_workbook(path).context("Failed to open demat workbook")?;

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read worksheet '{}'", sheet))?;

    let mut rows = range.rows().enumerate();
    let columns = rows
        .next()
        .map(|(_, header)| TradebookColumns::from_header(header))
        .filter(TradebookColumns::is_valid)
        .ok_or_else(|| anyhow!("Tradebook sheet '{}' is missing required columns", sheet))?;

    debug!("Tradebook column mapping: {:?}", columns);

    let mut trades = Vec::new();
    for (idx, row) in rows {
        if super::row_is_blank(row) {
            continue;
        }
        trades.push(parse_row(row, &columns, sheet, idx + 1)?);
    }

    info!("Parsed {} trades", trades.len());
    Ok(trades)
}

fn parse_row(row: &[Data], columns: &TradebookColumns, sheet: &str, row_no: usize) -> Result<Trade> {
    let malformed = |reason: String| TrackerError::MalformedRow {
        sheet: sheet.to_string(),
        row: row_no,
        reason,
    };

    let cell = |idx: Option<usize>, name: &str| {
        idx.and_then(|i| row.get(i))
            .filter(|c| !c.is_empty())
            .ok_or_else(|| malformed(format!("missing {}", name)))
    };

    let trade_date = super::parse_date(cell(columns.date, "trade date")?)
        .map_err(|e| malformed(format!("bad trade date: {}", e)))?;

    let symbol = cell(columns.symbol, "symbol")?.to_string().trim().to_uppercase();

    let side_text = cell(columns.side, "trade type")?.to_string();
    let side = TradeSide::from_str(&side_text)
        .map_err(|_| malformed(format!("unknown trade type '{}'", side_text.trim())))?;

    let quantity = super::parse_decimal(cell(columns.quantity, "quantity")?)
        .map_err(|e| malformed(format!("bad quantity: {}", e)))?;
    let price = super::parse_decimal(cell(columns.price, "price")?)
        .map_err(|e| malformed(format!("bad price: {}", e)))?;

    if quantity <= Decimal::ZERO {
        return Err(malformed("quantity must be positive".to_string()).into());
    }
    if price <= Decimal::ZERO {
        return Err(malformed("price must be positive".to_string()).into());
    }

    Ok(Trade {
        trade_date,
        symbol,
        side,
        quantity,
        price,
    })
}
