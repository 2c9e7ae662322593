//! Market-cap snapshot of a ticker on the reference date.

/// Input row for the universe builder, as of one reference date.
#[derive(Debug, Clone)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub market_cap: f64,
    pub close: f64,
}
