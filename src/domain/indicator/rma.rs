//! Wilder's running moving average.
//!
//! Seed = SMA of the first n samples, then RMA[i] = (RMA[i-1]*(n-1) + x[i]) / n.

pub fn calculate_rma(values: &[f64], period: usize) -> Option<f64> {
    rma_series(values, period)
        .last()
        .copied()
        .filter(|v| !v.is_nan())
}

/// RMA at every position of `values`; NaN during warm-up.
///
/// Leading NaN samples are skipped; a NaN after the seed resets nothing and
/// is ignored.
pub fn rma_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    let n = period as f64;
    let mut seed_sum = 0.0;
    let mut seen = 0usize;
    let mut rma: Option<f64> = None;
    for (i, &x) in values.iter().enumerate() {
        if x.is_nan() {
            if let Some(r) = rma {
                out[i] = r;
            }
            continue;
        }
        match rma {
            Some(prev) => rma = Some((prev * (n - 1.0) + x) / n),
            None => {
                seed_sum += x;
                seen += 1;
                if seen == period {
                    rma = Some(seed_sum / n);
                }
            }
        }
        if let Some(r) = rma {
            out[i] = r;
        }
    }
    out
}
