//! Technical indicator library.
//!
//! Every indicator is a function of oldest-first `&[f64]` windows whose last
//! element is the current bar. Results are `Option<f64>` (or a small record);
//! `None` means the DSL's `na`: not enough history, a NaN in the window, or a
//! division by zero. SAR and SuperTrend carry state between bars and expose a
//! step function over an explicit state value instead.

pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod cross;
pub mod cum;
pub mod ema;
pub mod extremes;
pub mod keltner;
pub mod macd;
pub mod obv;
pub mod pivot;
pub mod rma;
pub mod roc;
pub mod rsi;
pub mod sar;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod supertrend;
pub mod vwap;
pub mod vwma;
pub mod wma;
pub mod wpr;

pub use atr::{calculate_atr, calculate_tr, true_range_series};
pub use bollinger::calculate_bollinger;
pub use cci::calculate_cci;
pub use cross::{cross, crossover, crossunder};
pub use cum::calculate_cum;
pub use ema::{calculate_ema, ema_series};
pub use extremes::{highest, lowest};
pub use keltner::calculate_keltner;
pub use macd::calculate_macd;
pub use obv::calculate_obv;
pub use pivot::{pivot_high, pivot_low};
pub use rma::{calculate_rma, rma_series};
pub use roc::{calculate_change, calculate_mom, calculate_roc};
pub use rsi::calculate_rsi;
pub use sar::{SarParams, SarState, sar_next};
pub use sma::{calculate_sma, calculate_sum};
pub use stddev::{calculate_dev, calculate_stdev};
pub use stochastic::calculate_stoch;
pub use supertrend::{SuperTrendState, supertrend_next};
pub use vwap::calculate_vwap;
pub use vwma::calculate_vwma;
pub use wma::calculate_wma;
pub use wpr::calculate_wpr;

/// Upper/middle/lower band output shared by Bollinger and Keltner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

/// The last `n` samples, or `None` when fewer exist or any is NaN.
pub(crate) fn tail(values: &[f64], n: usize) -> Option<&[f64]> {
    if n == 0 || values.len() < n {
        return None;
    }
    let window = &values[values.len() - n..];
    if window.iter().any(|v| v.is_nan()) {
        None
    } else {
        Some(window)
    }
}

/// Align several windows on their most recent samples.
pub(crate) fn align<'a, const N: usize>(windows: [&'a [f64]; N]) -> [&'a [f64]; N] {
    let len = windows.iter().map(|w| w.len()).min().unwrap_or(0);
    windows.map(|w| &w[w.len() - len..])
}

/// `Some(value)` unless the value is NaN or infinite.
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
pub(crate) mod test_support {
    pub fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap_or_else(|| panic!("expected {expected}, got na"));
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_requires_enough_clean_samples() {
        assert_eq!(tail(&[1.0, 2.0, 3.0], 2), Some(&[2.0, 3.0][..]));
        assert_eq!(tail(&[1.0, 2.0], 3), None);
        assert_eq!(tail(&[1.0, f64::NAN, 3.0], 2), None);
        assert_eq!(tail(&[1.0, 2.0], 0), None);
    }

    #[test]
    fn align_trims_to_shortest() {
        let a = [1.0, 2.0, 3.0];
        let b = [5.0, 6.0];
        let [a, b] = align([&a[..], &b[..]]);
        assert_eq!(a, &[2.0, 3.0]);
        assert_eq!(b, &[5.0, 6.0]);
    }

    #[test]
    fn finite_rejects_nan_and_infinity() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
    }
}
