//! Classic floor-trader pivot levels.

use crate::domain::ohlcv::OhlcvBar;

/// Support/resistance levels derived from one completed bar.
#[derive(Debug, Clone, Copy)]
pub struct PivotLevels {
    pub pp: f64,
    pub s1: f64,
    pub s2: f64,
    pub r1: f64,
    pub r2: f64,
}

impl PivotLevels {
    /// pp = (h+l+c)/3, s1 = 2pp-h, r1 = 2pp-l, s2 = pp-(h-l), r2 = pp+(h-l)
    pub fn from_bar(bar: &OhlcvBar) -> Self {
        let (h, l, c) = (bar.high, bar.low, bar.close);
        let pp = (h + l + c) / 3.0;
        Self {
            pp,
            s1: 2.0 * pp - h,
            s2: pp - (h - l),
            r1: 2.0 * pp - l,
            r2: pp + (h - l),
        }
    }
}
