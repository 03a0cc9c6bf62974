//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD line, starting once the slow EMA has n samples
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9

use super::ema::{calculate_ema, ema_series};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn calculate_macd(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdOutput> {
    if fast == 0 || slow == 0 || signal_period == 0 {
        return None;
    }
    let first_valid = values.iter().position(|v| !v.is_nan())?;
    let warmup = first_valid + slow - 1;
    if values.len() <= warmup {
        return None;
    }

    let ema_fast = ema_series(values, fast);
    let ema_slow = ema_series(values, slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .skip(warmup)
        .map(|(f, s)| f - s)
        .collect();

    let macd = *macd_line.last()?;
    let signal = calculate_ema(&macd_line, signal_period)?;
    Some(MacdOutput {
        macd,
        signal,
        histogram: macd - signal,
    })
}
