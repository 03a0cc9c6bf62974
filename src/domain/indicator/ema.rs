//! Exponential moving average.
//!
//! k = 2/(n+1), seeded with the first sample, then EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! Recomputed across the whole retained window on every call; leading NaN
//! samples are skipped and interior NaN samples leave the average unchanged.

pub fn calculate_ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied().filter(|v| !v.is_nan())
}

/// EMA value at every position of `values` (NaN before the first sample).
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema: Option<f64> = None;
    for &x in values {
        if !x.is_nan() {
            ema = Some(match ema {
                None => x,
                Some(prev) => x * k + prev * (1.0 - k),
            });
        }
        out.push(ema.unwrap_or(f64::NAN));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::assert_close;

    #[test]
    fn ema_seed_is_first_sample() {
        assert_close(calculate_ema(&[10.0], 3), 10.0);
    }

    #[test]
    fn ema_recursive_calculation() {
        let k = 2.0 / 4.0;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        assert_close(calculate_ema(&[10.0, 20.0, 30.0], 3), e2);
    }

    #[test]
    fn ema_constant_series_equals_value() {
        let values = vec![100.0; 50];
        assert_close(calculate_ema(&values, 10), 100.0);
    }

    #[test]
    fn ema_skips_leading_nan() {
        let with_gap = [f64::NAN, f64::NAN, 10.0, 20.0];
        let clean = [10.0, 20.0];
        assert_eq!(calculate_ema(&with_gap, 3), calculate_ema(&clean, 3));
        let series = ema_series(&with_gap, 3);
        assert!(series[0].is_nan() && series[1].is_nan());
    }

    #[test]
    fn ema_empty_and_zero_period() {
        assert_eq!(calculate_ema(&[], 3), None);
        assert_eq!(calculate_ema(&[1.0, 2.0], 0), None);
    }

    #[test]
    fn ema_smoothing_factor() {
        let period = 10;
        let k = 2.0 / (period as f64 + 1.0);
        assert!((k - 2.0 / 11.0).abs() < f64::EPSILON);
    }
}
