//! Structured price interval in whole currency units.
//!
//! Bands live as numeric pairs inside the domain; the `"{lo}~{hi}"` string
//! form exists only at the table-store and notification boundaries.

use std::fmt;
use std::str::FromStr;

/// Inclusive price interval, floor-truncated to whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    pub lo: i64,
    pub hi: i64,
}

impl PriceBand {
    /// Build from raw float endpoints, flooring both. `lo` must not exceed `hi`
    /// after truncation; endpoints are taken in the given order.
    pub fn from_f64(lo: f64, hi: f64) -> Self {
        Self {
            lo: lo.floor() as i64,
            hi: hi.floor() as i64,
        }
    }

    pub fn contains(&self, price: i64) -> bool {
        self.lo <= price && price <= self.hi
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.lo, self.hi)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid price band {input:?}: {reason}")]
pub struct ParseBandError {
    pub input: String,
    pub reason: String,
}

impl FromStr for PriceBand {
    type Err = ParseBandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lo_str, hi_str) = s.split_once('~').ok_or_else(|| ParseBandError {
            input: s.to_string(),
            reason: "missing '~' separator".into(),
        })?;
        let lo: i64 = lo_str.trim().parse().map_err(|_| ParseBandError {
            input: s.to_string(),
            reason: "lower bound is not an integer".into(),
        })?;
        let hi: i64 = hi_str.trim().parse().map_err(|_| ParseBandError {
            input: s.to_string(),
            reason: "upper bound is not an integer".into(),
        })?;
        Ok(Self { lo, hi })
    }
}
