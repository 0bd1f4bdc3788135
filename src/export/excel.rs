use anyhow::Context;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::export::TableSink;
use crate::reports::{Cell, Table};

/// Table sink producing a single xlsx workbook, one worksheet per table
///
/// Tables are collected in memory and rendered on `finish`, so writing one
/// table never disturbs the others; re-writing a name replaces just that
/// worksheet.
pub struct WorkbookSink {
    path: PathBuf,
    tables: Vec<Table>,
}

impl WorkbookSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            tables: Vec::new(),
        }
    }
}

impl TableSink for WorkbookSink {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table.clone(),
            None => self.tables.push(table.clone()),
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let mut workbook = Workbook::new();

        for table in &self.tables {
            let worksheet = workbook.add_worksheet();
            worksheet
                .set_name(&table.name)
                .with_context(|| format!("invalid worksheet name '{}'", table.name))?;

            for (col, header) in table.columns.iter().enumerate() {
                worksheet.write_string(0, col as u16, *header)?;
            }

            for (row_idx, row) in table.rows.iter().enumerate() {
                let excel_row = (row_idx + 1) as u32;
                for (col, cell) in row.iter().enumerate() {
                    let col = col as u16;
                    match cell {
                        Cell::Text(s) => {
                            worksheet.write_string(excel_row, col, s)?;
                        }
                        Cell::Date(d) => {
                            worksheet.write_string(excel_row, col, d.format("%Y-%m-%d").to_string())?;
                        }
                        Cell::Number(n) => {
                            let value = n
                                .to_f64()
                                .with_context(|| format!("number {} exceeds xlsx range", n))?;
                            worksheet.write_number(excel_row, col, value)?;
                        }
                    }
                }
            }
        }

        workbook
            .save(&self.path)
            .with_context(|| format!("Failed to save workbook to {:?}", self.path))?;

        info!("Wrote {} tables to {:?}", self.tables.len(), self.path);
        Ok(())
    }
}
