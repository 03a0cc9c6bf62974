//! Standard deviation and mean absolute deviation.
//!
//! STDEV(n) = sqrt(sum((x - SMA(n))^2) / n)   (population)
//! DEV(n)   = sum(|x - SMA(n)|) / n

use super::tail;

pub fn calculate_stdev(values: &[f64], period: usize) -> Option<f64> {
    let window = tail(values, period)?;
    let n = period as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

pub fn calculate_dev(values: &[f64], period: usize) -> Option<f64> {
    let window = tail(values, period)?;
    let n = period as f64;
    let mean = window.iter().sum::<f64>() / n;
    Some(window.iter().map(|x| (x - mean).abs()).sum::<f64>() / n)
}
