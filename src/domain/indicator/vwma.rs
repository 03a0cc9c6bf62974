//! Volume-weighted moving average.
//!
//! VWMA(n) = sum(x*v) / sum(v) over the last n bars.

use super::{align, finite, tail};

pub fn calculate_vwma(values: &[f64], volume: &[f64], period: usize) -> Option<f64> {
    let [values, volume] = align([values, volume]);
    let x = tail(values, period)?;
    let v = tail(volume, period)?;
    let total_volume: f64 = v.iter().sum();
    if total_volume == 0.0 {
        return None;
    }
    let weighted: f64 = x.iter().zip(v).map(|(x, v)| x * v).sum();
    finite(weighted / total_volume)
}
