//! Session VWAP, anchored at the start of each UTC day.
//!
//! VWAP = sum(x*v) / sum(v) over the bars sharing the current bar's UTC date.

use super::{align, finite};

const MS_PER_DAY: i64 = 86_400_000;

/// `time` holds bar open times in Unix milliseconds.
pub fn calculate_vwap(values: &[f64], volume: &[f64], time: &[f64]) -> Option<f64> {
    let [values, volume, time] = align([values, volume, time]);
    let current_day = day_of(*time.last()?);
    let start = time
        .iter()
        .rposition(|&t| day_of(t) != current_day)
        .map_or(0, |i| i + 1);
    let (mut pv, mut v) = (0.0, 0.0);
    for i in start..values.len() {
        pv += values[i] * volume[i];
        v += volume[i];
    }
    if v == 0.0 {
        return None;
    }
    finite(pv / v)
}

fn day_of(time_ms: f64) -> i64 {
    (time_ms as i64).div_euclid(MS_PER_DAY)
}
