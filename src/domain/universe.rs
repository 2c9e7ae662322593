//! Universe construction: market-cap ranking, price cap, liquidity screen.

use crate::domain::config::ScreenerConfig;
use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::mean_trading_value;
use crate::domain::snapshot::TickerSnapshot;
use crate::ports::data_port::MarketDataPort;
use chrono::{Duration, NaiveDate};

/// Minimum bar count over the liquidity lookback for a ticker to qualify.
pub const MIN_LIQUIDITY_BARS: usize = 25;
/// Trailing bars averaged for the trading-value screen.
pub const LIQUIDITY_WINDOW: usize = 20;
/// Calendar days of history fetched for the liquidity screen.
pub const LIQUIDITY_LOOKBACK_DAYS: i64 = 90;
/// Floor on the ranking over-fetch, whatever `top_n` is.
pub const MIN_RANKING_DEPTH: usize = 300;

#[derive(Debug, Clone)]
pub struct UniverseResult {
    pub snapshots: Vec<TickerSnapshot>,
    pub skipped: Vec<SkippedTicker>,
}

#[derive(Debug, Clone)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize },
    BelowLiquidity { mean_value: f64 },
}

/// Build the candidate set for `reference_date`.
///
/// Per-ticker failures land in the skip list, never abort the run. An
/// empty survivor set is the one escalated condition.
pub fn build_universe(
    data: &dyn MarketDataPort,
    config: &ScreenerConfig,
    reference_date: NaiveDate,
) -> Result<UniverseResult, ScreenerError> {
    let mut ranking = data.market_cap_ranking(reference_date)?;
    ranking.sort_by(|a, b| {
        b.market_cap
            .partial_cmp(&a.market_cap)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // over-fetch buffer so the price filter cannot starve the universe
    let depth = (config.top_n * 2).max(MIN_RANKING_DEPTH);
    ranking.truncate(depth);
    ranking.retain(|snap| snap.close <= config.max_price);

    let start_date = reference_date - Duration::days(LIQUIDITY_LOOKBACK_DAYS);
    let mut survivors = Vec::new();
    let mut skipped = Vec::new();

    for snap in ranking {
        let bars = match data.fetch_ohlcv(&snap.ticker, start_date, reference_date) {
            Ok(bars) => bars,
            Err(e) => {
                eprintln!("warning: skipping {} ({})", snap.ticker, e);
                skipped.push(SkippedTicker {
                    ticker: snap.ticker,
                    reason: SkipReason::NoData,
                });
                continue;
            }
        };

        if bars.is_empty() {
            skipped.push(SkippedTicker {
                ticker: snap.ticker,
                reason: SkipReason::NoData,
            });
            continue;
        }

        if bars.len() < MIN_LIQUIDITY_BARS {
            skipped.push(SkippedTicker {
                ticker: snap.ticker,
                reason: SkipReason::InsufficientBars { bars: bars.len() },
            });
            continue;
        }

        let mean_value = mean_trading_value(&bars, LIQUIDITY_WINDOW).unwrap_or(0.0);
        if mean_value < config.min_trading_value {
            skipped.push(SkippedTicker {
                ticker: snap.ticker,
                reason: SkipReason::BelowLiquidity { mean_value },
            });
            continue;
        }

        survivors.push(snap);
    }

    if survivors.is_empty() {
        return Err(ScreenerError::EmptyUniverse {
            date: reference_date,
        });
    }

    survivors.sort_by(|a, b| {
        b.market_cap
            .partial_cmp(&a.market_cap)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    survivors.truncate(config.top_n);

    if !skipped.is_empty() {
        eprintln!(
            "Universe: {} of {} candidates kept for {}",
            survivors.len(),
            survivors.len() + skipped.len(),
            reference_date
        );
    }

    Ok(UniverseResult {
        snapshots: survivors,
        skipped,
    })
}
