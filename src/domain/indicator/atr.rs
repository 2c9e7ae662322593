//! Average True Range as a simple rolling mean.
//!
//! Wilder-style true range, but the average is a plain mean over the trailing
//! `period` true ranges, not Wilder smoothing. The first bar carries no true
//! range (no previous close), so `period + 1` bars are the minimum input.

use crate::domain::ohlcv::OhlcvBar;

pub fn atr(bars: &[OhlcvBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let mut tr_values = Vec::with_capacity(bars.len() - 1);
    for i in 1..bars.len() {
        tr_values.push(bars[i].true_range(bars[i - 1].close));
    }

    let tail = &tr_values[tr_values.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}
