#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use pivotscreen::domain::error::ScreenerError;
pub use pivotscreen::domain::ohlcv::OhlcvBar;
use pivotscreen::domain::snapshot::TickerSnapshot;
use pivotscreen::ports::data_port::MarketDataPort;
use pivotscreen::ports::notify_port::NotifyPort;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug)]
pub struct MockMarketData {
    pub bars: HashMap<String, Vec<OhlcvBar>>,
    pub ranking: Vec<TickerSnapshot>,
    pub names: HashMap<String, String>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            ranking: Vec::new(),
            names: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.bars.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_snapshot(mut self, ticker: &str, market_cap: f64, close: f64) -> Self {
        self.ranking.push(TickerSnapshot {
            ticker: ticker.to_string(),
            market_cap,
            close,
        });
        self
    }

    pub fn with_name(mut self, ticker: &str, name: &str) -> Self {
        self.names.insert(ticker.to_string(), name.to_string());
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ScreenerError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(ScreenerError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .bars
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn market_cap_ranking(
        &self,
        _date: NaiveDate,
    ) -> Result<Vec<TickerSnapshot>, ScreenerError> {
        Ok(self.ranking.clone())
    }

    fn ticker_name(&self, ticker: &str) -> Result<String, ScreenerError> {
        Ok(self
            .names
            .get(ticker)
            .cloned()
            .unwrap_or_else(|| ticker.to_string()))
    }
}

/// Captures every message instead of delivering it.
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            messages: RefCell::new(Vec::new()),
        }
    }
}

impl NotifyPort for RecordingNotifier {
    fn send(&self, text: &str) -> Result<(), ScreenerError> {
        self.messages.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Rejects every message.
pub struct FailingNotifier;

impl NotifyPort for FailingNotifier {
    fn send(&self, _text: &str) -> Result<(), ScreenerError> {
        Err(ScreenerError::Notify {
            reason: "channel down".into(),
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` consecutive daily bars ending at `end`, flat at `close` with a
/// fixed high-low `range` so EMA = close and ATR = range exactly.
pub fn flat_bars(
    ticker: &str,
    end: NaiveDate,
    count: usize,
    close: f64,
    range: f64,
    value: f64,
) -> Vec<OhlcvBar> {
    (0..count)
        .map(|i| OhlcvBar {
            ticker: ticker.to_string(),
            date: end - Duration::days((count - 1 - i) as i64),
            open: close,
            high: close + range / 2.0,
            low: close - range / 2.0,
            close,
            volume: 100_000,
            value,
        })
        .collect()
}
