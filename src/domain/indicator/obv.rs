//! On-Balance Volume.
//!
//! OBV[0] = volume[0]
//! If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
//! If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
//! Otherwise OBV[i] = OBV[i-1]
//! Accumulated across the retained window.

use super::align;

pub fn calculate_obv(close: &[f64], volume: &[f64]) -> Option<f64> {
    let [close, volume] = align([close, volume]);
    let (&first, _) = volume.split_first()?;
    let mut obv = first;
    for i in 1..close.len() {
        if close[i] > close[i - 1] {
            obv += volume[i];
        } else if close[i] < close[i - 1] {
            obv -= volume[i];
        }
    }
    (!obv.is_nan()).then_some(obv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_accumulates_by_direction() {
        let close = [10.0, 11.0, 10.5, 10.5, 12.0];
        let volume = [100.0, 200.0, 150.0, 300.0, 50.0];
        // 100 + 200 - 150 + 0 + 50
        assert_eq!(calculate_obv(&close, &volume), Some(200.0));
    }

    #[test]
    fn obv_first_bar_is_volume() {
        assert_eq!(calculate_obv(&[10.0], &[500.0]), Some(500.0));
    }

    #[test]
    fn obv_empty_is_na() {
        assert_eq!(calculate_obv(&[], &[]), None);
    }
}
