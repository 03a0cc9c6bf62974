//! Simple moving average and rolling sum.
//!
//! SMA(n) = (x[0] + x[1] + ... + x[n-1]) / n over the last n samples.
//! Undefined until n samples exist.

use super::tail;

pub fn calculate_sma(values: &[f64], period: usize) -> Option<f64> {
    calculate_sum(values, period).map(|sum| sum / period as f64)
}

/// Sum of the last `period` samples.
pub fn calculate_sum(values: &[f64], period: usize) -> Option<f64> {
    tail(values, period).map(|w| w.iter().sum())
}
