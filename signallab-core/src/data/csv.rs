//! CSV directory loader.
//!
//! Reads `<dir>/<TICKER>.csv` with a header row. The date column is `Date`
//! and the price column is `Adj Close` when present, otherwise `Close`.
//! Header matching ignores case and surrounding whitespace. Rows whose
//! close is empty, `null` or unparseable are skipped.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use super::{finish_series, DataError, PriceLoader};
use crate::domain::{Bar, PriceSeries};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Loads daily closes from a directory of per-ticker CSV files.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    dir: PathBuf,
}

impl CsvLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `ticker`.
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.to_uppercase()))
    }

    fn read_bars(&self, ticker: &str, path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataError::unavailable(ticker, format!("{}: {e}", path.display())))?;

        let headers = reader
            .headers()
            .map_err(|e| DataError::InvalidSeries(format!("{}: {e}", path.display())))?
            .clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date_col = find("date").ok_or_else(|| {
            DataError::InvalidSeries(format!("{}: missing 'Date' column", path.display()))
        })?;
        let close_col = find("adj close")
            .or_else(|| find("adj_close"))
            .or_else(|| find("close"))
            .ok_or_else(|| {
                DataError::InvalidSeries(format!("{}: missing 'Close' column", path.display()))
            })?;

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for (line, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| DataError::InvalidSeries(format!("{}: {e}", path.display())))?;
            let raw_date = record.get(date_col).unwrap_or_default();
            let date = parse_date(raw_date).ok_or_else(|| {
                DataError::InvalidSeries(format!(
                    "{}: row {}: unrecognised date '{raw_date}'",
                    path.display(),
                    line + 2
                ))
            })?;
            match record.get(close_col).and_then(|v| v.parse::<f64>().ok()) {
                Some(close) if close.is_finite() => bars.push(Bar::new(date, close)),
                _ => skipped += 1,
            }
        }

        debug!(
            ticker,
            path = %path.display(),
            rows = bars.len(),
            skipped,
            "read csv"
        );
        Ok(bars)
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Timestamps like "2024-01-02 00:00:00-05:00" keep only the date part.
    let head = raw.split_whitespace().next().unwrap_or(raw);
    let head = head.split('T').next().unwrap_or(head);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(head, fmt).ok())
}

impl PriceLoader for CsvLoader {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let path = self.path_for(ticker);
        if !path.is_file() {
            return Err(DataError::unavailable(
                ticker,
                format!("no file at {}", path.display()),
            ));
        }
        let bars = self.read_bars(ticker, &path)?;
        finish_series(ticker, bars, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn write(dir: &Path, ticker: &str, body: &str) {
        fs::write(dir.join(format!("{ticker}.csv")), body).unwrap();
    }

    #[test]
    fn loads_close_column_in_range() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "SPY",
            "Date,Close\n2024-01-02,100\n2024-01-03,101.5\n2024-01-04,99\n",
        );
        let s = CsvLoader::new(tmp.path())
            .load("SPY", d(1, 3), d(1, 31))
            .unwrap();
        assert_eq!(s.closes(), vec![101.5, 99.0]);
        assert_eq!(s.first().date, d(1, 3));
    }

    #[test]
    fn prefers_adjusted_close_and_ignores_header_case() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "AAPL",
            "date,Open,close, ADJ CLOSE ,Volume\n2024-01-02,1,10,9.5,100\n2024-01-03,1,11,10.5,100\n",
        );
        let s = CsvLoader::new(tmp.path())
            .load("aapl", d(1, 1), d(1, 31))
            .unwrap();
        assert_eq!(s.closes(), vec![9.5, 10.5]);
    }

    #[test]
    fn unsorted_rows_are_ordered_and_nulls_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "QQQ",
            "Date,Close\n2024-01-04,3\n2024-01-02,1\n2024-01-03,null\n",
        );
        let s = CsvLoader::new(tmp.path())
            .load("QQQ", d(1, 1), d(1, 31))
            .unwrap();
        assert_eq!(s.closes(), vec![1.0, 3.0]);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let err = CsvLoader::new(tmp.path())
            .load("NOPE", d(1, 1), d(1, 31))
            .unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn missing_close_column_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "BAD", "Date,Open\n2024-01-02,1\n");
        let err = CsvLoader::new(tmp.path())
            .load("BAD", d(1, 1), d(1, 31))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidSeries(_)));
    }

    #[test]
    fn non_positive_close_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "NEG", "Date,Close\n2024-01-02,1\n2024-01-03,-2\n");
        let err = CsvLoader::new(tmp.path())
            .load("NEG", d(1, 1), d(1, 31))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidSeries(_)));
    }

    #[test]
    fn parses_timestamped_and_us_dates() {
        assert_eq!(parse_date("2024-01-02 00:00:00-05:00"), Some(d(1, 2)));
        assert_eq!(parse_date("2024-01-02T00:00:00Z"), Some(d(1, 2)));
        assert_eq!(parse_date("01/02/2024"), Some(d(1, 2)));
        assert_eq!(parse_date("garbage"), None);
    }
}
