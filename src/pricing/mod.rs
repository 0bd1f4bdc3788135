// Pricing module - Yahoo Finance quote client with layered caching

pub mod store;
pub mod yahoo;

pub use store::QuoteStore;
pub use yahoo::YahooClient;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{Result, TrackerError};

/// A daily quote, possibly effective later than the requested date when the
/// market was closed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub effective_date: NaiveDate,
    pub open: Option<Decimal>,
    pub close: Decimal,
}

/// Capability to fetch the first available daily quote on or after a date
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote_on_or_after(&self, code: &str, date: NaiveDate) -> Result<Quote>;
}

/// Quote fetcher layering an in-process memo and an optional persistent
/// store over the Yahoo client.
///
/// The daily timeline asks for the same (code, date) pair once per
/// instrument per day; the memo collapses repeats within a run and the
/// store collapses them across runs.
pub struct QuoteService {
    client: YahooClient,
    memo: Mutex<HashMap<(String, NaiveDate), Quote>>,
    store: Option<QuoteStore>,
}

impl QuoteService {
    pub fn new(client: YahooClient, store: Option<QuoteStore>) -> Self {
        Self {
            client,
            memo: Mutex::new(HashMap::new()),
            store,
        }
    }

    pub fn memo_size(&self) -> usize {
        self.memo.lock().unwrap().len()
    }
}

#[async_trait]
impl QuoteSource for QuoteService {
    async fn quote_on_or_after(&self, code: &str, date: NaiveDate) -> Result<Quote> {
        let key = (code.to_string(), date);

        if let Some(quote) = self.memo.lock().unwrap().get(&key) {
            debug!("Memo hit for {} @ {}", code, date);
            return Ok(quote.clone());
        }

        if let Some(store) = &self.store {
            if let Some(quote) = store.get(code, date)? {
                debug!("Store hit for {} @ {}", code, date);
                self.memo.lock().unwrap().insert(key, quote.clone());
                return Ok(quote);
            }
        }

        let quote = self.client.quote_on_or_after(code, date).await?;

        if let Some(store) = &self.store {
            store.put(code, date, &quote)?;
        }
        self.memo.lock().unwrap().insert(key, quote.clone());

        Ok(quote)
    }
}

/// Map-backed quote source for tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct StaticQuotes {
    quotes: HashMap<String, Vec<(NaiveDate, Quote)>>,
}

impl StaticQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a quote for `code` effective on `date`.
    pub fn add(&mut self, code: &str, date: NaiveDate, open: Option<Decimal>, close: Decimal) {
        let series = self.quotes.entry(code.to_string()).or_default();
        series.push((
            date,
            Quote {
                effective_date: date,
                open,
                close,
            },
        ));
        series.sort_by_key(|(d, _)| *d);
    }
}

#[async_trait]
impl QuoteSource for StaticQuotes {
    async fn quote_on_or_after(&self, code: &str, date: NaiveDate) -> Result<Quote> {
        self.quotes
            .get(code)
            .and_then(|series| {
                series
                    .iter()
                    .find(|(d, _)| *d >= date)
                    .map(|(_, quote)| quote.clone())
            })
            .ok_or_else(|| {
                TrackerError::NoDataAvailable {
                    code: code.to_string(),
                    date,
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 5, d).unwrap()
    }

    #[tokio::test]
    async fn test_static_quotes_rolls_forward_to_next_session() {
        let mut quotes = StaticQuotes::new();
        quotes.add("RELIANCE.NS", date(8), Some(dec!(1400)), dec!(1420));
        quotes.add("RELIANCE.NS", date(11), Some(dec!(1425)), dec!(1440));

        // Friday the 8th answers directly
        let q = quotes.quote_on_or_after("RELIANCE.NS", date(8)).await.unwrap();
        assert_eq!(q.effective_date, date(8));
        assert_eq!(q.close, dec!(1420));

        // Saturday the 9th rolls to Monday the 11th
        let q = quotes.quote_on_or_after("RELIANCE.NS", date(9)).await.unwrap();
        assert_eq!(q.effective_date, date(11));
        assert_eq!(q.close, dec!(1440));
    }

    #[tokio::test]
    async fn test_static_quotes_miss_is_typed() {
        let quotes = StaticQuotes::new();
        let err = quotes
            .quote_on_or_after("TCS.NS", date(1))
            .await
            .unwrap_err();
        match err.downcast_ref::<TrackerError>() {
            Some(TrackerError::NoDataAvailable { code, .. }) => assert_eq!(code, "TCS.NS"),
            other => panic!("unexpected kind: {:?}", other),
        }
    }
}
