//! Weighted moving average.
//!
//! WMA(n) = sum(x[i-j] * (n-j) for j in 0..n) / (n*(n+1)/2)
//! The most recent sample carries weight n.

use super::tail;

pub fn calculate_wma(values: &[f64], period: usize) -> Option<f64> {
    let window = tail(values, period)?;
    let weighted: f64 = window
        .iter()
        .enumerate()
        .map(|(i, x)| x * (i + 1) as f64)
        .sum();
    let denominator = (period * (period + 1)) as f64 / 2.0;
    Some(weighted / denominator)
}
