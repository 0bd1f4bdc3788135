use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::ledger::{CashEntry, VoucherType};

/// Column positions for the cash ledger sheet
#[derive(Debug, Clone)]
struct LedgerColumns {
    date: Option<usize>,
    voucher: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    balance: Option<usize>,
}

impl LedgerColumns {
    fn from_header(header: &[Data]) -> Self {
        let mut columns = LedgerColumns {
            date: None,
            voucher: None,
            debit: None,
            credit: None,
            balance: None,
        };

        for (idx, cell) in header.iter().enumerate() {
            let text = cell.to_string().to_lowercase();

            if text.contains("posting") && text.contains("date") {
                columns.date = Some(idx);
            } else if columns.date.is_none() && text.contains("date") {
                columns.date = Some(idx);
            }

            if text.contains("voucher") {
                columns.voucher = Some(idx);
            }

            if text.contains("debit") {
                columns.debit = Some(idx);
            }

            if text.contains("credit") {
                columns.credit = Some(idx);
            }

            if text.contains("balance") {
                columns.balance = Some(idx);
            }
        }

        columns
    }

    fn is_valid(&self) -> bool {
        self.date.is_some()
            && self.voucher.is_some()
            && self.debit.is_some()
            && self.credit.is_some()
            && self.balance.is_some()
    }
}

/// Parse the Ledger sheet of a demat account workbook
///
/// Rows with any missing or unparseable field are dropped before they reach
/// the core, each with a warning. Broker exports pad the ledger with blank
/// carry-over rows, so incompleteness here is routine rather than fatal.
pub fn parse_ledger_sheet<P: AsRef<Path>>(path: P, sheet: &str) -> Result<Vec<CashEntry>> {
    let path = path.as_ref();
    info!("Parsing ledger sheet '{}' from {:?}", sheet, path);

    let mut workbook: Xlsx<_> = open_workbook(path).context("Failed to open demat workbook")?;

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read worksheet '{}'", sheet))?;

    let mut rows = range.rows().enumerate();
    let columns = rows
        .next()
        .map(|(_, header)| LedgerColumns::from_header(header))
        .filter(LedgerColumns::is_valid)
        .ok_or_else(|| anyhow!("Ledger sheet '{}' is missing required columns", sheet))?;

    debug!("Ledger column mapping: {:?}", columns);

    let mut entries = Vec::new();
    let mut dropped = 0usize;

    for (idx, row) in rows {
        if super::row_is_blank(row) {
            continue;
        }

        match parse_row(row, &columns) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!("Dropping ledger row {}: {}", idx + 1, e);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        info!("Parsed {} ledger entries ({} dropped)", entries.len(), dropped);
    } else {
        info!("Parsed {} ledger entries", entries.len());
    }
    Ok(entries)
}

fn parse_row(row: &[Data], columns: &LedgerColumns) -> Result<CashEntry> {
    let cell = |idx: Option<usize>, name: &str| {
        idx.and_then(|i| row.get(i))
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("missing {}", name))
    };

    let posting_date = super::parse_date(cell(columns.date, "posting date")?)
        .context("bad posting date")?;
    let voucher = VoucherType::parse(&cell(columns.voucher, "voucher type")?.to_string());
    let debit = super::parse_decimal(cell(columns.debit, "debit")?).context("bad debit")?;
    let credit = super::parse_decimal(cell(columns.credit, "credit")?).context("bad credit")?;
    let net_balance =
        super::parse_decimal(cell(columns.balance, "net balance")?).context("bad net balance")?;

    Ok(CashEntry {
        posting_date,
        voucher,
        debit,
        credit,
        net_balance,
    })
}
