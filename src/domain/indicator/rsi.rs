//! Relative Strength Index.
//!
//! Over the last n deltas d[j] = x[j] - x[j-1]:
//! avg_gain = sum(max(d, 0)) / n, avg_loss = sum(max(-d, 0)) / n
//! RSI = 100 - 100 / (1 + avg_gain/avg_loss), and 100 when avg_loss == 0.
//! Needs n+1 samples.

use super::tail;

pub fn calculate_rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 {
        return None;
    }
    let window = tail(values, period + 1)?;
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(g, l), d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });
    let n = period as f64;
    let avg_gain = gains / n;
    let avg_loss = losses / n;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
