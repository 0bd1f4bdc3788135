// Export module - table sinks (xlsx workbook, csv directory)

pub mod csv;
pub mod excel;

pub use self::csv::CsvDirSink;
pub use excel::WorkbookSink;

use crate::error::Result;
use crate::reports::Table;

/// A destination for finalized tables, keyed by table name.
///
/// Writing a table must never destroy an unrelated table already in the
/// sink; re-writing the same name replaces only that table.
pub trait TableSink {
    fn write_table(&mut self, table: &Table) -> Result<()>;

    /// Flush everything written so far to storage.
    fn finish(&mut self) -> Result<()>;
}
