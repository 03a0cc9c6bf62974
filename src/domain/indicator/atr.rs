//! True range and Average True Range.
//!
//! TR[0] = high - low
//! TR[i] = max(high - low, |high - close[i-1]|, |low - close[i-1]|)
//! ATR(n) = RMA(TR, n)

use super::{align, rma::calculate_rma};

/// True range of every bar in the aligned windows.
pub fn true_range_series(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let [high, low, close] = align([high, low, close]);
    (0..high.len())
        .map(|i| {
            let hl = high[i] - low[i];
            if i == 0 {
                hl
            } else {
                let prev = close[i - 1];
                hl.max((high[i] - prev).abs()).max((low[i] - prev).abs())
            }
        })
        .collect()
}

/// True range of the current bar.
pub fn calculate_tr(high: &[f64], low: &[f64], close: &[f64]) -> Option<f64> {
    true_range_series(high, low, close)
        .last()
        .copied()
        .filter(|v| !v.is_nan())
}

pub fn calculate_atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Option<f64> {
    calculate_rma(&true_range_series(high, low, close), period)
}
