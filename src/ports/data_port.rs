//! Market data access port trait.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::snapshot::TickerSnapshot;
use chrono::NaiveDate;

/// Daily bars, market-cap rankings and display names for one market.
///
/// An empty bar vector means "no data" (unknown ticker or non-trading range);
/// callers treat empty and error alike as a per-ticker skip.
pub trait MarketDataPort: std::fmt::Debug {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ScreenerError>;

    /// Snapshots ordered by market cap descending as of `date`.
    fn market_cap_ranking(&self, date: NaiveDate)
        -> Result<Vec<TickerSnapshot>, ScreenerError>;

    /// Display name for a ticker; the ticker itself when no name is known.
    fn ticker_name(&self, ticker: &str) -> Result<String, ScreenerError>;
}
