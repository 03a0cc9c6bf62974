//! Cumulative sum over the retained window. NaN samples count as zero.

pub fn calculate_cum(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().filter(|v| !v.is_nan()).sum())
}
