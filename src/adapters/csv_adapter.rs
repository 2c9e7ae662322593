//! CSV file market-data adapter.
//!
//! Directory layout under the base path:
//!   bars/{ticker}.csv          date,open,high,low,close,volume[,value]
//!   ranking_{date}.csv         ticker,market_cap,close
//!   names.csv                  ticker,name

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::snapshot::TickerSnapshot;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug)]
pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn bars_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join("bars").join(format!("{ticker}.csv"))
    }

    fn ranking_path(&self, date: NaiveDate) -> PathBuf {
        self.base_path.join(format!("ranking_{date}.csv"))
    }

    fn names_path(&self) -> PathBuf {
        self.base_path.join("names.csv")
    }

    fn parse_field<T: std::str::FromStr>(
        record: &csv::StringRecord,
        index: usize,
        column: &str,
    ) -> Result<T, ScreenerError> {
        record
            .get(index)
            .ok_or_else(|| ScreenerError::DataSource {
                reason: format!("missing {column} column"),
            })?
            .trim()
            .parse()
            .map_err(|_| ScreenerError::DataSource {
                reason: format!("invalid {column} value"),
            })
    }
}

impl MarketDataPort for CsvDataAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ScreenerError> {
        let path = self.bars_path(ticker);
        let mut rdr =
            csv::Reader::from_path(&path).map_err(|e| ScreenerError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ScreenerError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str: String = Self::parse_field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                ScreenerError::DataSource {
                    reason: format!("invalid date format: {e}"),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let value = match record.get(6) {
                Some(s) if !s.trim().is_empty() => Self::parse_field(&record, 6, "value")?,
                _ => 0.0,
            };

            bars.push(OhlcvBar {
                ticker: ticker.to_string(),
                date,
                open: Self::parse_field(&record, 1, "open")?,
                high: Self::parse_field(&record, 2, "high")?,
                low: Self::parse_field(&record, 3, "low")?,
                close: Self::parse_field(&record, 4, "close")?,
                volume: Self::parse_field(&record, 5, "volume")?,
                value,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn market_cap_ranking(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<TickerSnapshot>, ScreenerError> {
        let path = self.ranking_path(date);
        let mut rdr =
            csv::Reader::from_path(&path).map_err(|e| ScreenerError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut snapshots = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| ScreenerError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            snapshots.push(TickerSnapshot {
                ticker: Self::parse_field(&record, 0, "ticker")?,
                market_cap: Self::parse_field(&record, 1, "market_cap")?,
                close: Self::parse_field(&record, 2, "close")?,
            });
        }
        Ok(snapshots)
    }

    fn ticker_name(&self, ticker: &str) -> Result<String, ScreenerError> {
        let path = self.names_path();
        let Ok(mut rdr) = csv::Reader::from_path(&path) else {
            return Ok(ticker.to_string());
        };

        for result in rdr.records() {
            let record = result.map_err(|e| ScreenerError::DataSource {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            if record.get(0).map(str::trim) == Some(ticker) {
                if let Some(name) = record.get(1) {
                    return Ok(name.trim().to_string());
                }
            }
        }
        Ok(ticker.to_string())
    }
}
