//! Bollinger Bands.
//!
//! Middle = SMA(n), Upper = Middle + k*STDEV(n), Lower = Middle - k*STDEV(n)
//! Population standard deviation.

use super::{Bands, sma::calculate_sma, stddev::calculate_stdev};

pub fn calculate_bollinger(values: &[f64], period: usize, multiplier: f64) -> Option<Bands> {
    let middle = calculate_sma(values, period)?;
    let width = multiplier * calculate_stdev(values, period)?;
    Some(Bands {
        middle,
        upper: middle + width,
        lower: middle - width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_symmetric_around_sma() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let bands = calculate_bollinger(&values, 8, 2.0).unwrap();
        assert!((bands.middle - 5.0).abs() < 1e-9);
        assert!((bands.upper - 9.0).abs() < 1e-9);
        assert!((bands.lower - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_series_collapses_bands() {
        let bands = calculate_bollinger(&[10.0; 20], 20, 2.0).unwrap();
        assert_eq!(bands.upper, bands.lower);
        assert_eq!(bands.middle, 10.0);
    }

    #[test]
    fn warmup_is_na() {
        assert!(calculate_bollinger(&[1.0, 2.0], 20, 2.0).is_none());
    }
}
