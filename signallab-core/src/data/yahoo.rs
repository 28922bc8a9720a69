//! Yahoo Finance loader.
//!
//! Fetches daily closes from Yahoo's v8 chart API over blocking `reqwest`,
//! retrying transient failures with exponential backoff. The adjusted close
//! is used when the response carries one.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; the CSV loader is the offline alternative.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{finish_series, DataError, PriceLoader};
use crate::domain::{Bar, PriceSeries};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Outcome of one HTTP attempt.
enum Attempt {
    Done(Result<Vec<Bar>, DataError>),
    Retry(String),
}

/// Yahoo Finance chart API loader.
pub struct YahooLoader {
    client: reqwest::blocking::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooLoader {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::unavailable("*", format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    fn chart_url(ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true"
        )
    }

    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) => DataError::unavailable(ticker, format!("{}: {}", err.code, err.description)),
            None => DataError::unavailable(ticker, "empty chart result"),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::unavailable(ticker, "chart result array is empty"))?;

        // A valid ticker with no trading days in range comes back without timestamps.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .ok_or_else(|| DataError::InvalidSeries("chart response has no quote data".into()))?;
        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| DataError::InvalidSeries(format!("invalid timestamp: {ts}")))?;

            let adj = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());
            let close = adj.or_else(|| closes.get(i).copied().flatten());

            // Holidays and halted sessions come through as nulls.
            if let Some(close) = close {
                bars.push(Bar::new(date, close));
            }
        }
        Ok(bars)
    }

    fn attempt(&self, ticker: &str, url: &str) -> Attempt {
        let resp = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(e) if e.is_connect() || e.is_timeout() => return Attempt::Retry(e.to_string()),
            Err(e) => return Attempt::Done(Err(DataError::unavailable(ticker, e.to_string()))),
        };

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Attempt::Done(Err(DataError::unavailable(ticker, "ticker not found")));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Attempt::Retry(format!("HTTP {status}"));
        }
        if !status.is_success() {
            return Attempt::Done(Err(DataError::unavailable(
                ticker,
                format!("HTTP {status}"),
            )));
        }

        let parsed = resp
            .json::<ChartResponse>()
            .map_err(|e| DataError::InvalidSeries(format!("failed to parse chart for {ticker}: {e}")))
            .and_then(|chart| Self::parse_response(ticker, chart));
        Attempt::Done(parsed)
    }

    fn fetch_with_retry(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, DataError> {
        let url = Self::chart_url(ticker, start, end);
        let mut last_error = String::from("no attempts made");

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                warn!(ticker, attempt, ?delay, reason = %last_error, "retrying yahoo request");
                std::thread::sleep(delay);
            }
            debug!(ticker, attempt, "yahoo request");
            match self.attempt(ticker, &url) {
                Attempt::Done(result) => return result,
                Attempt::Retry(reason) => last_error = reason,
            }
        }

        Err(DataError::unavailable(
            ticker,
            format!("gave up after {} retries: {last_error}", self.max_retries),
        ))
    }
}

impl PriceLoader for YahooLoader {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn load(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        if start > end {
            return Err(DataError::unavailable(
                ticker,
                format!("start {start} is after end {end}"),
            ));
        }
        let bars = self.fetch_with_retry(ticker, start, end)?;
        finish_series(ticker, bars, start, end)
    }
}
