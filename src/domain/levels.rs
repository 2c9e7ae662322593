//! Per-ticker level calculation: pivot bands, ATR bands, EMA, score.

use crate::domain::band::PriceBand;
use crate::domain::config::{ScoringMode, ScreenerConfig};
use crate::domain::indicator::{atr::atr, ema::ema, pivot::PivotLevels};
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

/// Calendar days of history fetched per ticker for the level calculation.
pub const LEVEL_LOOKBACK_DAYS: i64 = 150;

/// Computed levels for one ticker on one reference date. Immutable; the unit
/// persisted and ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub name: String,
    pub close: i64,
    pub buy_pivot: PriceBand,
    pub sell_pivot: PriceBand,
    pub buy_atr: PriceBand,
    pub sell_atr: PriceBand,
    pub stop: i64,
    pub atr: f64,
    pub ema: f64,
    pub score: f64,
    pub in_atr_buy: bool,
    pub in_pivot_buy: bool,
}

/// Compute a [`LevelRecord`] from the trailing bar series ending at `date`.
///
/// Returns `None` when the series is too short to form the EMA and ATR;
/// a skip signal, not an error. `bars` must be ordered ascending by date.
pub fn compute_levels(
    ticker: &str,
    name: &str,
    bars: &[OhlcvBar],
    date: NaiveDate,
    config: &ScreenerConfig,
) -> Option<LevelRecord> {
    if bars.len() < config.ema_n + 1 {
        return None;
    }

    let last = bars.last()?;
    let pivots = PivotLevels::from_bar(last);
    let atr_value = atr(bars, config.atr_n)?;
    let ema_value = ema(bars, config.ema_n)?;

    Some(assemble(
        ticker, name, date, last.close, &pivots, atr_value, ema_value, config,
    ))
}

/// Pure band/score assembly once the indicator values are known.
#[allow(clippy::too_many_arguments)]
fn assemble(
    ticker: &str,
    name: &str,
    date: NaiveDate,
    close: f64,
    pivots: &PivotLevels,
    atr_value: f64,
    ema_value: f64,
    config: &ScreenerConfig,
) -> LevelRecord {
    let buy_atr_lo = ema_value - atr_value;
    let buy_atr_hi = ema_value - 0.5 * atr_value;
    let sell_atr_lo = ema_value + 0.5 * atr_value;
    let sell_atr_hi = ema_value + atr_value;
    let stop = pivots.s2.min(ema_value - 1.5 * atr_value);

    // membership is judged on the raw float bands, closed on both ends
    let in_atr_buy = close >= buy_atr_lo && close <= buy_atr_hi;
    let in_pivot_buy = close >= pivots.s2 && close <= pivots.s1;

    let score = score(
        in_atr_buy,
        in_pivot_buy,
        close,
        ema_value,
        atr_value,
        config,
    );

    LevelRecord {
        date,
        ticker: ticker.to_string(),
        name: name.to_string(),
        close: close.floor() as i64,
        buy_pivot: PriceBand::from_f64(pivots.s2, pivots.s1),
        sell_pivot: PriceBand::from_f64(pivots.r1, pivots.r2),
        buy_atr: PriceBand::from_f64(buy_atr_lo, buy_atr_hi),
        sell_atr: PriceBand::from_f64(sell_atr_lo, sell_atr_hi),
        stop: stop.floor() as i64,
        atr: atr_value,
        ema: ema_value,
        score,
        in_atr_buy,
        in_pivot_buy,
    }
}

fn score(
    in_atr_buy: bool,
    in_pivot_buy: bool,
    close: f64,
    ema_value: f64,
    atr_value: f64,
    config: &ScreenerConfig,
) -> f64 {
    let mut score = match (in_atr_buy, in_pivot_buy) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.5,
        (false, false) => 0.0,
    };
    if close <= config.price_bonus {
        score += 0.3;
    }
    if config.scoring_mode == ScoringMode::DepthBonus && atr_value > 0.0 {
        score += 0.2 * ((ema_value - close) / atr_value).max(0.0);
    }
    round4(score)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
