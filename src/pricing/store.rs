//! Persistent quote cache
//!
//! SQLite-backed store keyed by (market code, lookup date). The reference
//! behavior refetches identical quotes for every unchanged instrument on
//! every run; the store collapses those repeats across runs. It is a cache,
//! not a system of record, and can be deleted at any time.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::info;

use crate::pricing::Quote;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS quotes (
    code            TEXT NOT NULL,
    lookup_date     TEXT NOT NULL,
    effective_date  TEXT NOT NULL,
    open            TEXT,
    close           TEXT NOT NULL,
    fetched_at      TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (code, lookup_date)
);
";

/// SQLite store for resolved (code, lookup date) -> quote entries
pub struct QuoteStore {
    conn: Mutex<Connection>,
}

impl QuoteStore {
    /// Open (creating if needed) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create quote store directory")?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open quote store at {:?}", path))?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize quote store schema")?;

        info!("Quote store open at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, code: &str, lookup_date: NaiveDate) -> Result<Option<Quote>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT effective_date, open, close FROM quotes
                 WHERE code = ?1 AND lookup_date = ?2",
                params![code, lookup_date],
                |row| {
                    Ok((
                        row.get::<_, NaiveDate>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .context("Failed to query quote store")?;

        match row {
            None => Ok(None),
            Some((effective_date, open, close)) => Ok(Some(Quote {
                effective_date,
                open: open.as_deref().map(parse_stored_decimal).transpose()?,
                close: parse_stored_decimal(&close)?,
            })),
        }
    }

    pub fn put(&self, code: &str, lookup_date: NaiveDate, quote: &Quote) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO quotes (code, lookup_date, effective_date, open, close)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                code,
                lookup_date,
                quote.effective_date,
                quote.open.map(|d| d.to_string()),
                quote.close.to_string(),
            ],
        )
        .context("Failed to write to quote store")?;
        Ok(())
    }
}

fn parse_stored_decimal(text: &str) -> Result<Decimal> {
    Decimal::from_str(text).map_err(|e| anyhow!("Corrupt decimal '{}' in quote store: {}", text, e))
}

/// Default on-disk location for the quote store.
pub fn default_store_path() -> Result<PathBuf> {
    let cache_dir = dir_spec::cache_home()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    Ok(cache_dir.join("demat").join("quotes.db"))
}
