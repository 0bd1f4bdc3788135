// Import module - demat workbook and ticker mapping parsers

pub mod ledger_excel;
pub mod mapping_excel;
pub mod tradebook_excel;

pub use ledger_excel::parse_ledger_sheet;
pub use mapping_excel::parse_instrument_mapping;
pub use tradebook_excel::parse_tradebook_sheet;

use anyhow::{anyhow, Context, Result};
use calamine::{Data, DataType};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a date cell (Excel serial datetime or a date string)
pub(crate) fn parse_date(cell: &Data) -> Result<NaiveDate> {
    match cell {
        Data::DateTime(dt) => {
            // Excel serials count days from the 1900 epoch
            let days_since_epoch = dt.as_f64().floor() as i64;
            let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
                .ok_or_else(|| anyhow!("Invalid Excel epoch"))?;
            excel_epoch
                .checked_add_signed(chrono::Duration::days(days_since_epoch))
                .ok_or_else(|| anyhow!("Date overflow"))
        }
        _ => {
            let date_str = cell.to_string();

            if let Ok(date) = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d") {
                return Ok(date);
            }
            if let Ok(date) = NaiveDate::parse_from_str(&date_str, "%d/%m/%Y") {
                return Ok(date);
            }
            if let Ok(date) = NaiveDate::parse_from_str(&date_str, "%d-%m-%Y") {
                return Ok(date);
            }

            Err(anyhow!("Could not parse date: {}", date_str))
        }
    }
}

/// Parse a decimal cell (handles numbers and formatted strings)
pub(crate) fn parse_decimal(cell: &Data) -> Result<Decimal> {
    match cell {
        Data::Int(i) => Ok(Decimal::from(*i)),
        Data::Float(f) => {
            Decimal::from_f64_retain(*f).ok_or_else(|| anyhow!("Invalid decimal: {}", f))
        }
        _ => {
            let text = cell.to_string().replace('₹', "").replace([',', ' '], "");
            Decimal::from_str(&text).context("Failed to parse decimal")
        }
    }
}

/// True when every cell in the row is blank
pub(crate) fn row_is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_date_iso_string() {
        let cell = Data::String("2020-05-10".to_string());
        assert_eq!(
            parse_date(&cell).unwrap(),
            NaiveDate::from_ymd_opt(2020, 5, 10).unwrap()
        );
    }

    #[test]
    fn test_parse_date_indian_format() {
        let cell = Data::String("10/05/2020".to_string());
        assert_eq!(
            parse_date(&cell).unwrap(),
            NaiveDate::from_ymd_opt(2020, 5, 10).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date(&Data::String("not a date".to_string())).is_err());
    }

    #[test]
    fn test_parse_decimal_variants() {
        assert_eq!(parse_decimal(&Data::Int(42)).unwrap(), dec!(42));
        assert_eq!(parse_decimal(&Data::Float(12.5)).unwrap(), dec!(12.5));
        assert_eq!(
            parse_decimal(&Data::String("1,23,456.78".to_string())).unwrap(),
            dec!(123456.78)
        );
        assert!(parse_decimal(&Data::String("n/a".to_string())).is_err());
    }
}
