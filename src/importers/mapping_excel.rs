use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;
use tracing::{info, warn};

use crate::instruments::InstrumentMap;

/// Column positions for the ticker mapping sheet
#[derive(Debug, Clone)]
struct MappingColumns {
    symbol: Option<usize>,
    code: Option<usize>,
}

impl MappingColumns {
    fn from_header(header: &[Data]) -> Self {
        let mut columns = MappingColumns {
            symbol: None,
            code: None,
        };

        for (idx, cell) in header.iter().enumerate() {
            let text = cell.to_string().to_lowercase();

            if text.contains("nse") && text.contains("symbol") {
                columns.symbol = Some(idx);
            } else if columns.symbol.is_none() && text.contains("symbol") {
                columns.symbol = Some(idx);
            }

            if text.contains("yahoo") && text.contains("code") {
                columns.code = Some(idx);
            } else if columns.code.is_none() && text.contains("code") {
                columns.code = Some(idx);
            }
        }

        columns
    }

    fn is_valid(&self) -> bool {
        self.symbol.is_some() && self.code.is_some()
    }
}

/// Parse the instrument mapping workbook (local symbol -> Yahoo code)
///
/// Reads the first sheet. Rows with a blank symbol or code are skipped with
/// a warning; duplicates keep the last occurrence.
pub fn parse_instrument_mapping<P: AsRef<Path>>(path: P) -> Result<InstrumentMap> {
    let path = path.as_ref();
    info!("Parsing instrument mapping: {:?}", path);

    let mut workbook: Xlsx<_> = open_workbook(path).context("Failed to open mapping workbook")?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("No sheets found in mapping workbook"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .context("Failed to read mapping worksheet")?;

    let mut rows = range.rows().enumerate();
    let columns = rows
        .next()
        .map(|(_, header)| MappingColumns::from_header(header))
        .filter(MappingColumns::is_valid)
        .ok_or_else(|| {
            anyhow!(
                "Mapping sheet '{}' is missing the symbol/code header columns",
                sheet_name
            )
        })?;

    let (symbol_idx, code_idx) = (columns.symbol.unwrap_or(0), columns.code.unwrap_or(1));

    let mut pairs = Vec::new();
    for (idx, row) in rows {
        if super::row_is_blank(row) {
            continue;
        }

        let symbol = row
            .get(symbol_idx)
            .map(|c| c.to_string().trim().to_uppercase())
            .unwrap_or_default();
        let code = row
            .get(code_idx)
            .map(|c| c.to_string().trim().to_string())
            .unwrap_or_default();

        if symbol.is_empty() || code.is_empty() {
            warn!("Skipping mapping row {}: incomplete symbol/code pair", idx + 1);
            continue;
        }

        pairs.push((symbol, code));
    }

    info!("Loaded {} instrument mappings", pairs.len());
    Ok(InstrumentMap::from_pairs(pairs))
}
