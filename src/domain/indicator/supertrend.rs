//! SuperTrend.
//!
//! basic bands = hl2 ± factor * ATR(n)
//! The lower band only rises (and the upper only falls) while the previous
//! close stays on the trend side of it. The trend flips up when close breaks
//! above the upper band and down when close breaks below the lower band.
//! `direction` is 1 for an uptrend (line = lower band) and -1 for a downtrend
//! (line = upper band). The first valid bar starts in a downtrend.

use super::{align, atr::calculate_atr};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuperTrendState {
    pub upper: f64,
    pub lower: f64,
    pub direction: i8,
    pub value: f64,
}

/// Advance `prev` over the current bar (the last element of each window).
pub fn supertrend_next(
    prev: Option<SuperTrendState>,
    high: &[f64],
    low: &[f64],
    close: &[f64],
    factor: f64,
    atr_period: usize,
) -> Option<SuperTrendState> {
    let [high, low, close] = align([high, low, close]);
    let atr = calculate_atr(high, low, close, atr_period)?;
    let n = close.len();
    let c = close[n - 1];
    let mid = (high[n - 1] + low[n - 1]) / 2.0;
    let basic_upper = mid + factor * atr;
    let basic_lower = mid - factor * atr;

    let Some(p) = prev else {
        return Some(SuperTrendState {
            upper: basic_upper,
            lower: basic_lower,
            direction: -1,
            value: basic_upper,
        });
    };

    let prev_close = if n >= 2 { close[n - 2] } else { c };
    let lower = if basic_lower > p.lower || prev_close < p.lower {
        basic_lower
    } else {
        p.lower
    };
    let upper = if basic_upper < p.upper || prev_close > p.upper {
        basic_upper
    } else {
        p.upper
    };
    let direction = if p.direction == -1 {
        if c > upper { 1 } else { -1 }
    } else if c < lower {
        -1
    } else {
        1
    };
    Some(SuperTrendState {
        upper,
        lower,
        direction,
        value: if direction == 1 { lower } else { upper },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(high: &[f64], low: &[f64], close: &[f64], factor: f64, period: usize) -> Vec<Option<SuperTrendState>> {
        let mut state = None;
        (1..=close.len())
            .map(|end| {
                let next = supertrend_next(state, &high[..end], &low[..end], &close[..end], factor, period);
                if next.is_some() {
                    state = next;
                }
                next
            })
            .collect()
    }

    #[test]
    fn warmup_follows_atr() {
        let states = run(&[11.0, 11.0], &[9.0, 9.0], &[10.0, 10.0], 3.0, 3);
        assert!(states.iter().all(Option::is_none));
    }

    #[test]
    fn first_value_is_upper_band() {
        let states = run(&[11.0; 3], &[9.0; 3], &[10.0; 3], 3.0, 3);
        let s = states[2].unwrap();
        // hl2 = 10, ATR = 2 → bands 16 / 4
        assert_eq!(s.direction, -1);
        assert!((s.upper - 16.0).abs() < 1e-9);
        assert!((s.lower - 4.0).abs() < 1e-9);
        assert_eq!(s.value, s.upper);
    }

    #[test]
    fn breakout_flips_to_uptrend() {
        let mut high = vec![11.0; 3];
        let mut low = vec![9.0; 3];
        let mut close = vec![10.0; 3];
        high.push(30.0);
        low.push(25.0);
        close.push(29.0);
        let states = run(&high, &low, &close, 1.0, 3);
        let last = states[3].unwrap();
        assert_eq!(last.direction, 1);
        assert_eq!(last.value, last.lower);
    }

    #[test]
    fn upper_band_ratchets_down_in_downtrend() {
        let high = [11.0, 11.0, 11.0, 10.5];
        let low = [9.0, 9.0, 9.0, 9.5];
        let close = [10.0, 10.0, 10.0, 10.0];
        let states = run(&high, &low, &close, 3.0, 3);
        let (a, b) = (states[2].unwrap(), states[3].unwrap());
        assert!(b.upper <= a.upper);
        assert_eq!(b.direction, -1);
    }
}
