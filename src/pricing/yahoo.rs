use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::TrackerError;
use crate::pricing::Quote;

/// How far past the requested date to scan for the next trading session.
/// Long enough to bridge any exchange holiday cluster.
const LOOKAHEAD_DAYS: u64 = 30;

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
pub(crate) struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteArrays>,
}

#[derive(Debug, Deserialize)]
struct QuoteArrays {
    open: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Thin client over the Yahoo Finance v8 chart API
pub struct YahooClient {
    client: Client,
    timeout: Duration,
}

impl YahooClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; DematBot/1.0)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Fetch the first daily quote on or after `date`.
    ///
    /// The whole request is bounded by the configured deadline; on expiry the
    /// caller sees a typed `LookupTimeout` rather than an indefinite hang.
    pub async fn quote_on_or_after(&self, code: &str, date: NaiveDate) -> Result<Quote> {
        match tokio::time::timeout(self.timeout, self.fetch_window(code, date)).await {
            Ok(result) => result,
            Err(_) => Err(TrackerError::LookupTimeout {
                code: code.to_string(),
                seconds: self.timeout.as_secs(),
            }
            .into()),
        }
    }

    async fn fetch_window(&self, code: &str, date: NaiveDate) -> Result<Quote> {
        let period1 = epoch_seconds(date)?;
        let period2 = epoch_seconds(
            date.checked_add_days(Days::new(LOOKAHEAD_DAYS))
                .ok_or_else(|| anyhow!("Date overflow computing lookahead window"))?,
        )?;

        // Yahoo rejects a raw caret in the path, so index symbols like ^NSEI
        // need it escaped.
        let symbol = code.replace('^', "%5E");
        let url = format!("https://query1.finance.yahoo.com/v8/finance/chart/{}", symbol);

        debug!("Fetching {} candles from {} ({}..{})", code, url, period1, period2);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to Yahoo Finance")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Yahoo Finance returned error status: {}",
                response.status()
            ));
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo Finance response")?;

        extract_quote(data, code, date)
    }
}

fn epoch_seconds(date: NaiveDate) -> Result<i64> {
    Ok(date.and_time(NaiveTime::MIN).and_utc().timestamp())
}

/// Pick the first candle on or after `date` with a close price.
pub(crate) fn extract_quote(data: YahooChartResponse, code: &str, date: NaiveDate) -> Result<Quote> {
    if let Some(error) = data.chart.error {
        return Err(anyhow!(
            "Yahoo Finance API error: {} - {}",
            error.code,
            error.description
        ));
    }

    let no_data = || TrackerError::NoDataAvailable {
        code: code.to_string(),
        date,
    };

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(no_data)?;

    let timestamps = result.timestamp.unwrap_or_default();
    let arrays = result.indicators.quote.into_iter().next().ok_or_else(no_data)?;
    let closes = arrays.close.unwrap_or_default();
    let opens = arrays.open.unwrap_or_default();

    for (idx, ts) in timestamps.iter().enumerate() {
        let candle_date = DateTime::from_timestamp(*ts, 0)
            .ok_or_else(|| anyhow!("Invalid timestamp in Yahoo response: {}", ts))?
            .date_naive();
        if candle_date < date {
            continue;
        }

        let Some(Some(close)) = closes.get(idx) else {
            continue;
        };
        let close = Decimal::from_f64_retain(*close)
            .ok_or_else(|| anyhow!("Invalid close price: {}", close))?;
        let open = match opens.get(idx) {
            Some(Some(open)) => Some(
                Decimal::from_f64_retain(*open)
                    .ok_or_else(|| anyhow!("Invalid open price: {}", open))?,
            ),
            _ => None,
        };

        return Ok(Quote {
            effective_date: candle_date,
            open,
            close,
        });
    }

    Err(no_data().into())
}
