//! Round-trip tests for the workbook sink
//!
//! The performance table written through the xlsx sink must read back with
//! one data row per calendar day between the timeline start and end.

use calamine::{open_workbook, Reader, Xlsx};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use demat::export::{TableSink, WorkbookSink};
use demat::reports::{performance_table, portfolio_table, PerformanceRow};

fn row_for(date: NaiveDate) -> PerformanceRow {
    PerformanceRow {
        date,
        capital: dec!(100000),
        margin: dec!(86200),
        investment_value: dec!(13800),
        current_value: dec!(14000),
        realized_return: dec!(0),
        unrealized_return: dec!(200),
        net_return: dec!(200),
        portfolio_pct_change: dec!(0.002),
        market_pct_change: dec!(0.0011),
    }
}

#[test]
fn test_performance_round_trip_row_count() {
    let start = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2020, 6, 14).unwrap();

    let rows: Vec<PerformanceRow> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(row_for)
        .collect();
    let expected_days = (end - start).num_days() as usize + 1;
    assert_eq!(rows.len(), expected_days);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let mut sink = WorkbookSink::new(&path);
    sink.write_table(&performance_table(&rows, "Performance"))
        .unwrap();
    sink.finish().unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range("Performance").unwrap();

    // Header plus one row per calendar day, inclusive of both ends.
    assert_eq!(range.rows().count(), expected_days + 1);

    let header: Vec<String> = range
        .rows()
        .next()
        .unwrap()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(header[0], "Date");
    assert_eq!(header[9], "Market % Change");
}

#[test]
fn test_sink_holds_portfolio_and_performance_side_by_side() {
    let date = NaiveDate::from_ymd_opt(2020, 5, 10).unwrap();
    let rows = vec![row_for(date)];

    let portfolio = demat::portfolio::ValuedPortfolio {
        as_of: Some(date),
        positions: vec![demat::portfolio::ValuedHolding {
            symbol: "INFY".to_string(),
            quantity: dec!(10),
            average_cost: dec!(650),
            invested_value: dec!(6500),
            last_price: dec!(700),
            current_value: dec!(7000),
            pnl: dec!(500),
            pct_change: dec!(500) / dec!(6500),
        }],
    };

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let mut sink = WorkbookSink::new(&path);
    sink.write_table(&portfolio_table(&portfolio, "Portfolio"))
        .unwrap();
    sink.write_table(&performance_table(&rows, "Performance"))
        .unwrap();
    sink.finish().unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let sheet_names = workbook.sheet_names();
    assert!(sheet_names.contains(&"Portfolio".to_string()));
    assert!(sheet_names.contains(&"Performance".to_string()));

    let range = workbook.worksheet_range("Portfolio").unwrap();
    assert_eq!(range.rows().count(), 2);
    let first_cell = range.rows().nth(1).unwrap()[0].to_string();
    assert_eq!(first_cell, "INFY");
}
