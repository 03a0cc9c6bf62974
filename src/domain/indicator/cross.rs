//! Crossover detection between two series.

use super::align;

/// `a` crossed above `b` on the current bar: a > b now and a <= b one bar back.
pub fn crossover(a: &[f64], b: &[f64]) -> bool {
    last_two(a, b).is_some_and(|(a0, b0, a1, b1)| a0 > b0 && a1 <= b1)
}

/// `a` crossed below `b` on the current bar.
pub fn crossunder(a: &[f64], b: &[f64]) -> bool {
    last_two(a, b).is_some_and(|(a0, b0, a1, b1)| a0 < b0 && a1 >= b1)
}

pub fn cross(a: &[f64], b: &[f64]) -> bool {
    crossover(a, b) || crossunder(a, b)
}

fn last_two(a: &[f64], b: &[f64]) -> Option<(f64, f64, f64, f64)> {
    let [a, b] = align([a, b]);
    let n = a.len();
    if n < 2 {
        return None;
    }
    // Comparisons with NaN are false, so a NaN anywhere means no cross.
    Some((a[n - 1], b[n - 1], a[n - 2], b[n - 2]))
}
