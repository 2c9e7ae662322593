//! Reference-date resolution.
//!
//! The run anchors to the latest date the market actually traded, found by
//! probing a liquid benchmark ticker backwards from today.

use crate::ports::data_port::MarketDataPort;
use chrono::{Duration, NaiveDate};

/// Days probed backwards before giving up.
pub const MAX_PROBE_DAYS: i64 = 7;

/// First date in `today - 1 ..= today - 7` with a bar for the benchmark;
/// `today - 1` when every probe fails or errors.
pub fn latest_trading_date(
    data: &dyn MarketDataPort,
    today: NaiveDate,
    benchmark_ticker: &str,
) -> NaiveDate {
    for offset in 1..=MAX_PROBE_DAYS {
        let probe = today - Duration::days(offset);
        match data.fetch_ohlcv(benchmark_ticker, probe, probe) {
            Ok(bars) if !bars.is_empty() => return probe,
            Ok(_) | Err(_) => continue,
        }
    }
    today - Duration::days(1)
}
