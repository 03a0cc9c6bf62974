//! Highest and lowest value over the last n samples.

use super::tail;

pub fn highest(values: &[f64], period: usize) -> Option<f64> {
    tail(values, period).map(|w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn lowest(values: &[f64], period: usize) -> Option<f64> {
    tail(values, period).map(|w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_over_window() {
        let values = [5.0, 1.0, 9.0, 3.0, 4.0];
        assert_eq!(highest(&values, 3), Some(9.0));
        assert_eq!(lowest(&values, 3), Some(3.0));
        assert_eq!(highest(&values, 2), Some(4.0));
    }

    #[test]
    fn extremes_warmup() {
        assert_eq!(highest(&[1.0], 2), None);
        assert_eq!(lowest(&[], 1), None);
    }
}
