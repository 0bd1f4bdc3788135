// Reports module - return reconciliation, daily timeline, output tables

pub mod returns;
pub mod table;
pub mod timeline;

pub use returns::{reconcile, Reconciliation};
pub use table::{performance_table, portfolio_table, Cell, Table, TableBuilder};
pub use timeline::{build_timeline, PerformanceRow};
