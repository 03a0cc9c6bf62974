//! Keltner channel.
//!
//! Middle = EMA(n), width = k * DEV(n) (mean absolute deviation of the source).

use super::{Bands, ema::calculate_ema, stddev::calculate_dev};

pub fn calculate_keltner(values: &[f64], period: usize, multiplier: f64) -> Option<Bands> {
    let width = multiplier * calculate_dev(values, period)?;
    let middle = calculate_ema(values, period)?;
    Some(Bands {
        middle,
        upper: middle + width,
        lower: middle - width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::ema::calculate_ema;

    #[test]
    fn keltner_uses_ema_basis() {
        let values = [1.0, 2.0, 3.0];
        let bands = calculate_keltner(&values, 3, 1.5).unwrap();
        let ema = calculate_ema(&values, 3).unwrap();
        let width = 1.5 * (2.0 / 3.0);
        assert!((bands.middle - ema).abs() < 1e-9);
        assert!((bands.upper - (ema + width)).abs() < 1e-9);
        assert!((bands.lower - (ema - width)).abs() < 1e-9);
    }

    #[test]
    fn keltner_warmup_follows_deviation() {
        assert!(calculate_keltner(&[1.0, 2.0], 3, 1.5).is_none());
    }
}
