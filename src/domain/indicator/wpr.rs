//! Williams %R.
//!
//! %R(n) = -100 * (HH(n) - close) / (HH(n) - LL(n))

use super::extremes::{highest, lowest};

pub fn calculate_wpr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Option<f64> {
    let hh = highest(high, period)?;
    let ll = lowest(low, period)?;
    let range = hh - ll;
    if range == 0.0 {
        return None;
    }
    let c = *close.last()?;
    Some(-100.0 * (hh - c) / range)
}
