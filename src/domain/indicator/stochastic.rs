//! Stochastic oscillator.
//!
//! raw%K = 100 * (close - LL(k)) / (HH(k) - LL(k))
//! %K = SMA(raw%K, k_smoothing), %D = SMA(%K, d_smoothing)

use super::{align, extremes::highest, extremes::lowest, sma::calculate_sma};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochOutput {
    pub k: f64,
    /// NaN until enough %K values exist.
    pub d: f64,
}

pub fn calculate_stoch(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_length: usize,
    k_smoothing: usize,
    d_smoothing: usize,
) -> Option<StochOutput> {
    if k_length == 0 || k_smoothing == 0 || d_smoothing == 0 {
        return None;
    }
    let [high, low, close] = align([high, low, close]);
    let len = close.len();

    let raw_k_at = |end: usize| -> f64 {
        let hh = highest(&high[..end], k_length);
        let ll = lowest(&low[..end], k_length);
        match (hh, ll) {
            (Some(hh), Some(ll)) if hh != ll => 100.0 * (close[end - 1] - ll) / (hh - ll),
            _ => f64::NAN,
        }
    };
    let smoothed_k_at = |end: usize| -> f64 {
        if end < k_smoothing {
            return f64::NAN;
        }
        let raws: Vec<f64> = (end + 1 - k_smoothing..=end).map(raw_k_at).collect();
        calculate_sma(&raws, k_smoothing).unwrap_or(f64::NAN)
    };

    let k = smoothed_k_at(len);
    if k.is_nan() {
        return None;
    }
    let d = if len >= d_smoothing {
        let ks: Vec<f64> = (len + 1 - d_smoothing..=len).map(smoothed_k_at).collect();
        calculate_sma(&ks, d_smoothing).unwrap_or(f64::NAN)
    } else {
        f64::NAN
    };
    Some(StochOutput { k, d })
}
