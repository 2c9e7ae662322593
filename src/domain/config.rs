//! Immutable screener configuration.
//!
//! Built once from a [`ConfigPort`] and passed by reference into each
//! component. Every key has a default so an empty `[screener]` section is a
//! valid configuration.

use crate::domain::error::ScreenerError;
use crate::ports::config_port::ConfigPort;

pub const SECTION: &str = "screener";

/// How the composite score is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringMode {
    /// 1.0 both membership flags, 0.5 exactly one, 0.0 neither, +0.3 price bonus.
    #[default]
    Threshold,
    /// Threshold plus a continuous 0.2 * max(0, (ema - close)/atr) term.
    DepthBonus,
}

/// What the position evaluator does when no record matches the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalenessPolicy {
    /// Skip alerting entirely; the caller reports the staleness condition.
    #[default]
    SameDateOnly,
    /// Evaluate against whatever records are available.
    FallbackAny,
}

#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    /// Tickers closing above this are dropped before the liquidity screen.
    pub max_price: f64,
    /// Universe size after filtering.
    pub top_n: usize,
    /// Minimum mean trading value over the trailing 20 bars.
    pub min_trading_value: f64,
    pub atr_n: usize,
    pub ema_n: usize,
    /// Closes at or below this earn the +0.3 score bonus.
    pub price_bonus: f64,
    /// Rows in the ranked top table and notification.
    pub top_size: usize,
    pub scoring_mode: ScoringMode,
    pub staleness: StalenessPolicy,
    /// Liquid ticker probed to find the latest trading date.
    pub benchmark_ticker: String,
    pub market: String,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            max_price: 150_000.0,
            top_n: 200,
            min_trading_value: 5_000_000_000.0,
            atr_n: 20,
            ema_n: 20,
            price_bonus: 100_000.0,
            top_size: 10,
            scoring_mode: ScoringMode::default(),
            staleness: StalenessPolicy::default(),
            benchmark_ticker: "005930".into(),
            market: "KOSPI".into(),
        }
    }
}

impl ScreenerConfig {
    /// Read the `[screener]` section, falling back to defaults per key.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScreenerError> {
        let defaults = Self::default();

        let scoring_mode = match config.get_string(SECTION, "scoring_mode") {
            None => defaults.scoring_mode,
            Some(s) => parse_scoring_mode(&s)?,
        };
        let staleness = match config.get_string(SECTION, "staleness") {
            None => defaults.staleness,
            Some(s) => parse_staleness(&s)?,
        };

        let built = Self {
            max_price: config.get_float(SECTION, "max_price", defaults.max_price),
            top_n: config.get_usize(SECTION, "top_n", defaults.top_n),
            min_trading_value: config.get_float(
                SECTION,
                "min_trading_value",
                defaults.min_trading_value,
            ),
            atr_n: config.get_usize(SECTION, "atr_n", defaults.atr_n),
            ema_n: config.get_usize(SECTION, "ema_n", defaults.ema_n),
            price_bonus: config.get_float(SECTION, "price_bonus", defaults.price_bonus),
            top_size: config.get_usize(SECTION, "top_size", defaults.top_size),
            scoring_mode,
            staleness,
            benchmark_ticker: config
                .get_string(SECTION, "benchmark_ticker")
                .unwrap_or(defaults.benchmark_ticker),
            market: config
                .get_string(SECTION, "market")
                .unwrap_or(defaults.market),
        };
        built.validate()?;
        Ok(built)
    }

    fn validate(&self) -> Result<(), ScreenerError> {
        let positive: [(&str, f64); 5] = [
            ("max_price", self.max_price),
            ("min_trading_value", self.min_trading_value),
            ("price_bonus", self.price_bonus),
            ("atr_n", self.atr_n as f64),
            ("ema_n", self.ema_n as f64),
        ];
        for (key, value) in positive {
            if value <= 0.0 {
                return Err(ScreenerError::ConfigInvalid {
                    section: SECTION.into(),
                    key: key.into(),
                    reason: "must be positive".into(),
                });
            }
        }
        if self.top_n == 0 || self.top_size == 0 {
            return Err(ScreenerError::ConfigInvalid {
                section: SECTION.into(),
                key: "top_n".into(),
                reason: "universe and top sizes must be positive".into(),
            });
        }
        Ok(())
    }
}

fn parse_scoring_mode(value: &str) -> Result<ScoringMode, ScreenerError> {
    match value.trim().to_lowercase().as_str() {
        "threshold" => Ok(ScoringMode::Threshold),
        "depth-bonus" | "depth_bonus" => Ok(ScoringMode::DepthBonus),
        other => Err(ScreenerError::ConfigInvalid {
            section: SECTION.into(),
            key: "scoring_mode".into(),
            reason: format!("unknown mode {other:?} (expected threshold or depth-bonus)"),
        }),
    }
}

fn parse_staleness(value: &str) -> Result<StalenessPolicy, ScreenerError> {
    match value.trim().to_lowercase().as_str() {
        "same-date-only" | "same_date_only" => Ok(StalenessPolicy::SameDateOnly),
        "fallback-any" | "fallback_any" => Ok(StalenessPolicy::FallbackAny),
        other => Err(ScreenerError::ConfigInvalid {
            section: SECTION.into(),
            key: "staleness".into(),
            reason: format!("unknown policy {other:?} (expected same-date-only or fallback-any)"),
        }),
    }
}
