//! Pivot high / pivot low detection.
//!
//! The candidate is the sample `right` bars back from the current one. It is a
//! pivot high only if it is strictly greater than each of the `left` samples
//! before it and the `right` samples after it (strictly less for a pivot low).
//! Returns the candidate's value, or `None` when either side lacks history.

pub fn pivot_high(values: &[f64], left: usize, right: usize) -> Option<f64> {
    pivot(values, left, right, |candidate, other| candidate > other)
}

pub fn pivot_low(values: &[f64], left: usize, right: usize) -> Option<f64> {
    pivot(values, left, right, |candidate, other| candidate < other)
}

fn pivot(
    values: &[f64],
    left: usize,
    right: usize,
    dominates: impl Fn(f64, f64) -> bool,
) -> Option<f64> {
    let span = left.checked_add(right)?.checked_add(1)?;
    if values.len() < span {
        return None;
    }
    let index = values.len() - 1 - right;
    let candidate = values[index];
    let neighbours = values[index - left..index]
        .iter()
        .chain(&values[index + 1..]);
    let mut all_dominated = true;
    for &other in neighbours {
        if !dominates(candidate, other) {
            all_dominated = false;
            break;
        }
    }
    (all_dominated && !candidate.is_nan()).then_some(candidate)
}
