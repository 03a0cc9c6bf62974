//! Commodity Channel Index.
//!
//! CCI(n) = (x - SMA(n)) / (0.015 * DEV(n))

use super::{sma::calculate_sma, stddev::calculate_dev};

const CCI_CONSTANT: f64 = 0.015;

pub fn calculate_cci(values: &[f64], period: usize) -> Option<f64> {
    let mean = calculate_sma(values, period)?;
    let dev = calculate_dev(values, period)?;
    if dev == 0.0 {
        return None;
    }
    let current = *values.last()?;
    Some((current - mean) / (CCI_CONSTANT * dev))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::assert_close;

    #[test]
    fn cci_formula() {
        // mean 2, dev 2/3, (3 - 2) / (0.015 * 2/3) = 100
        assert_close(calculate_cci(&[1.0, 2.0, 3.0], 3), 100.0);
    }

    #[test]
    fn flat_series_is_na() {
        assert_eq!(calculate_cci(&[5.0; 10], 5), None);
    }
}
