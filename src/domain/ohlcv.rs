//! Daily OHLCV bar representation.

use chrono::NaiveDate;

/// One trading day for one ticker. Ordered ascending by date once fetched.
#[derive(Debug, Clone)]
pub struct OhlcvBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// Traded value (turnover) for the day; 0 when the source cannot supply it.
    pub value: f64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Traded value, falling back to volume x close when the source had none.
    pub fn trading_value(&self) -> f64 {
        if self.value > 0.0 {
            self.value
        } else {
            self.volume as f64 * self.close
        }
    }
}

/// Mean trading value over the trailing `window` bars.
///
/// Returns `None` when `bars` is empty; a shorter series averages what is there.
pub fn mean_trading_value(bars: &[OhlcvBar], window: usize) -> Option<f64> {
    if bars.is_empty() || window == 0 {
        return None;
    }
    let tail = &bars[bars.len().saturating_sub(window)..];
    let sum: f64 = tail.iter().map(|b| b.trading_value()).sum();
    Some(sum / tail.len() as f64)
}
