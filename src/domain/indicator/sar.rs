//! Parabolic SAR.
//!
//! Stateful: each bar advances the previous bar's [`SarState`].
//! SAR[i] = SAR[i-1] + AF * (EP - SAR[i-1]), clamped so it never enters the
//! prior two bars' range. When price penetrates the SAR the trend flips: the
//! SAR jumps to the extreme point, EP resets to the current bar's extreme and
//! AF resets to `start`. Otherwise a new extreme raises AF by `increment` up to
//! `maximum`.
//!
//! The first state needs two bars: the trend starts long when the current high
//! exceeds the previous one, with SAR and EP seeded from the previous bar.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarParams {
    pub start: f64,
    pub increment: f64,
    pub maximum: f64,
}

impl Default for SarParams {
    fn default() -> Self {
        Self {
            start: 0.02,
            increment: 0.02,
            maximum: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarState {
    pub is_long: bool,
    pub sar: f64,
    /// Extreme point: highest high of a long run, lowest low of a short one.
    pub ep: f64,
    pub af: f64,
}

/// Advance `prev` over the current bar (the last element of `high`/`low`).
pub fn sar_next(
    prev: Option<SarState>,
    high: &[f64],
    low: &[f64],
    params: SarParams,
) -> Option<SarState> {
    let [high, low] = super::align([high, low]);
    let n = high.len();
    if n < 2 {
        return None;
    }
    if high[n - 2..].iter().chain(&low[n - 2..]).any(|v| v.is_nan()) {
        return prev;
    }
    let (h, l) = (high[n - 1], low[n - 1]);
    match prev {
        None => {
            let (ph, pl) = (high[n - 2], low[n - 2]);
            let is_long = h > ph;
            let seed = SarState {
                is_long,
                sar: if is_long { pl } else { ph },
                ep: if is_long { ph } else { pl },
                af: params.start,
            };
            Some(advance(seed, h, l, &high[n - 2..n - 1], &low[n - 2..n - 1], params))
        }
        Some(state) => {
            let from = n.saturating_sub(3);
            Some(advance(state, h, l, &high[from..n - 1], &low[from..n - 1], params))
        }
    }
}

fn advance(
    state: SarState,
    high: f64,
    low: f64,
    prior_highs: &[f64],
    prior_lows: &[f64],
    params: SarParams,
) -> SarState {
    let SarState {
        mut is_long,
        sar,
        mut ep,
        mut af,
    } = state;
    let mut sar = sar + af * (ep - sar);

    if is_long {
        sar = prior_lows.iter().copied().fold(sar, f64::min);
        if low < sar {
            is_long = false;
            sar = ep;
            ep = low;
            af = params.start;
        } else if high > ep {
            ep = high;
            af = (af + params.increment).min(params.maximum);
        }
    } else {
        sar = prior_highs.iter().copied().fold(sar, f64::max);
        if high > sar {
            is_long = true;
            sar = ep;
            ep = high;
            af = params.start;
        } else if low < ep {
            ep = low;
            af = (af + params.increment).min(params.maximum);
        }
    }

    SarState {
        is_long,
        sar,
        ep,
        af,
    }
}
