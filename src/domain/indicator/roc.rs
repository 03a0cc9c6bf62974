//! Rate of change, momentum and change.
//!
//! ROC(n) = 100 * (x - x[n]) / x[n]
//! MOM(n) = x - x[n]

use super::tail;

pub fn calculate_roc(values: &[f64], period: usize) -> Option<f64> {
    let (current, past) = endpoints(values, period)?;
    if past == 0.0 {
        return None;
    }
    Some(100.0 * (current - past) / past)
}

pub fn calculate_mom(values: &[f64], period: usize) -> Option<f64> {
    let (current, past) = endpoints(values, period)?;
    Some(current - past)
}

/// Difference between the current sample and the one `period` bars back.
pub fn calculate_change(values: &[f64], period: usize) -> Option<f64> {
    calculate_mom(values, period)
}

fn endpoints(values: &[f64], period: usize) -> Option<(f64, f64)> {
    let window = tail(values, period.checked_add(1)?)?;
    Some((window[window.len() - 1], window[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::assert_close;

    #[test]
    fn roc_percent() {
        assert_close(calculate_roc(&[100.0, 105.0, 110.0], 2), 10.0);
    }

    #[test]
    fn roc_zero_base_is_na() {
        assert_eq!(calculate_roc(&[0.0, 5.0], 1), None);
    }

    #[test]
    fn momentum_and_change() {
        assert_close(calculate_mom(&[10.0, 12.0, 15.0], 2), 5.0);
        assert_close(calculate_change(&[10.0, 12.0, 15.0], 1), 3.0);
    }

    #[test]
    fn warmup_needs_period_plus_one() {
        assert_eq!(calculate_mom(&[1.0, 2.0], 2), None);
    }

    #[test]
    fn period_zero_is_zero_change() {
        assert_close(calculate_change(&[4.0, 9.0], 0), 0.0);
    }
}
