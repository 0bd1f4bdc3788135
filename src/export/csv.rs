use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::export::TableSink;
use crate::reports::Table;

/// Table sink writing one CSV file per table into a directory
///
/// Each table owns its own file, so writing one can never touch another.
pub struct CsvDirSink {
    dir: PathBuf,
}

impl CsvDirSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn file_path(&self, table_name: &str) -> PathBuf {
        let stem: String = table_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.csv", stem.to_lowercase()))
    }
}

impl TableSink for CsvDirSink {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory {:?}", self.dir))?;

        let path = self.file_path(&table.name);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to open {:?}", path))?;

        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer.flush().context("Failed to flush CSV output")?;

        info!("Wrote table '{}' to {:?}", table.name, path);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
