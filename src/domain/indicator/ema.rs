//! Exponential Moving Average of closes.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). Returns the final value only.

use crate::domain::ohlcv::OhlcvBar;

pub fn ema(bars: &[OhlcvBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut value: f64 = bars[..period].iter().map(|b| b.close).sum::<f64>() / period as f64;

    for bar in &bars[period..] {
        value = bar.close * k + value * (1.0 - k);
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                ticker: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
                value: 0.0,
            })
            .collect()
    }

    #[test]
    fn seed_is_sma() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let value = ema(&bars, 3).unwrap();
        assert_relative_eq!(value, (10.0 + 20.0 + 30.0) / 3.0);
    }

    #[test]
    fn recursive_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let k = 2.0 / 4.0;
        let sma = (10.0 + 20.0 + 30.0) / 3.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);
        assert_relative_eq!(ema(&bars, 3).unwrap(), ema_4);
    }

    #[test]
    fn period_1_tracks_last_close() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        assert_relative_eq!(ema(&bars, 1).unwrap(), 30.0);
    }

    #[test]
    fn equal_prices() {
        let bars = make_bars(&[100.0; 10]);
        assert_relative_eq!(ema(&bars, 5).unwrap(), 100.0);
    }

    #[test]
    fn short_series_is_none() {
        let bars = make_bars(&[10.0, 20.0]);
        assert!(ema(&bars, 3).is_none());
    }

    #[test]
    fn zero_period_is_none() {
        let bars = make_bars(&[10.0, 20.0]);
        assert!(ema(&bars, 0).is_none());
    }

    #[test]
    fn smoothing_factor() {
        let period = 10;
        let k = 2.0 / (period as f64 + 1.0);
        assert_relative_eq!(k, 2.0 / 11.0);
    }
}
