//! `ta*` builtins: windows from the environment into the indicator library.

use crate::domain::ast::CallSiteId;
use crate::domain::environment::{Environment, IndicatorState};
use crate::domain::error::EvalError;
use crate::domain::indicator::{
    self, Bands, SarParams, calculate_atr, calculate_bollinger, calculate_cci, calculate_change,
    calculate_cum, calculate_dev, calculate_ema, calculate_keltner, calculate_macd, calculate_mom,
    calculate_obv, calculate_rma, calculate_roc, calculate_rsi, calculate_sma, calculate_stdev,
    calculate_stoch, calculate_tr, calculate_vwap, calculate_vwma, calculate_wma, calculate_wpr,
    highest, lowest, pivot_high, pivot_low, sar_next, supertrend_next,
};
use crate::domain::registry::{PriceField, TaFn};
use crate::domain::value::Value;

use super::args::BoundArgs;

fn bands(name: &'static str, bands: Option<Bands>) -> Value {
    match bands {
        Some(b) => Value::record(
            name,
            vec![
                ("middle", Value::from_f64(b.middle)),
                ("upper", Value::from_f64(b.upper)),
                ("lower", Value::from_f64(b.lower)),
            ],
        ),
        None => Value::Na,
    }
}

/// Apply a single-source, single-length indicator. A missing length is `na`.
fn windowed(
    args: &BoundArgs,
    env: &Environment,
    length_index: usize,
    f: fn(&[f64], usize) -> Option<f64>,
) -> Value {
    let Some(length) = args.period(length_index) else {
        return Value::Na;
    };
    Value::from_option(f(&args.series(0, env), length))
}

pub(super) fn call(
    f: TaFn,
    site: CallSiteId,
    args: &BoundArgs,
    env: &mut Environment,
) -> Result<Value, EvalError> {
    let high = || env.price_window(PriceField::High);
    let low = || env.price_window(PriceField::Low);
    let close = || env.price_window(PriceField::Close);
    let volume = || env.price_window(PriceField::Volume);

    let value = match f {
        TaFn::Sma => windowed(args, env, 1, calculate_sma),
        TaFn::Ema => windowed(args, env, 1, calculate_ema),
        TaFn::Wma => windowed(args, env, 1, calculate_wma),
        TaFn::Rma => windowed(args, env, 1, calculate_rma),
        TaFn::Rsi => windowed(args, env, 1, calculate_rsi),
        TaFn::Stdev => windowed(args, env, 1, calculate_stdev),
        TaFn::Dev => windowed(args, env, 1, calculate_dev),
        TaFn::Cci => windowed(args, env, 1, calculate_cci),
        TaFn::Roc => windowed(args, env, 1, calculate_roc),
        TaFn::Mom => windowed(args, env, 1, calculate_mom),
        TaFn::Change => windowed(args, env, 1, calculate_change),
        TaFn::Highest => windowed(args, env, 1, highest),
        TaFn::Lowest => windowed(args, env, 1, lowest),
        TaFn::Vwma => match args.period(1) {
            Some(length) => {
                Value::from_option(calculate_vwma(&args.series(0, env), volume(), length))
            }
            None => Value::Na,
        },
        TaFn::Macd => {
            let lengths = (args.period(1), args.period(2), args.period(3));
            match lengths {
                (Some(fast), Some(slow), Some(signal)) => {
                    match calculate_macd(&args.series(0, env), fast, slow, signal) {
                        Some(m) => Value::record(
                            "macd",
                            vec![
                                ("macd", Value::from_f64(m.macd)),
                                ("signal", Value::from_f64(m.signal)),
                                ("histogram", Value::from_f64(m.histogram)),
                            ],
                        ),
                        None => Value::Na,
                    }
                }
                _ => Value::Na,
            }
        }
        TaFn::Stoch => match (args.period(0), args.period(1), args.period(2)) {
            (Some(k), Some(ks), Some(ds)) => {
                match calculate_stoch(high(), low(), close(), k, ks, ds) {
                    Some(s) => Value::record(
                        "stoch",
                        vec![("k", Value::from_f64(s.k)), ("d", Value::from_f64(s.d))],
                    ),
                    None => Value::Na,
                }
            }
            _ => Value::Na,
        },
        TaFn::Atr => match args.period(0) {
            Some(length) => Value::from_option(calculate_atr(high(), low(), close(), length)),
            None => Value::Na,
        },
        TaFn::Tr => Value::from_option(calculate_tr(high(), low(), close())),
        TaFn::Wpr => match args.period(0) {
            Some(length) => Value::from_option(calculate_wpr(high(), low(), close(), length)),
            None => Value::Na,
        },
        TaFn::Bb | TaFn::Kc => {
            let (Some(length), Some(mult)) = (args.period(1), args.number(2)) else {
                return Ok(Value::Na);
            };
            let source = args.series(0, env);
            if f == TaFn::Bb {
                bands("bb", calculate_bollinger(&source, length, mult))
            } else {
                bands("kc", calculate_keltner(&source, length, mult))
            }
        }
        TaFn::Crossover => Value::Bool(indicator::crossover(&args.series(0, env), &args.series(1, env))),
        TaFn::Crossunder => {
            Value::Bool(indicator::crossunder(&args.series(0, env), &args.series(1, env)))
        }
        TaFn::Cross => Value::Bool(indicator::cross(&args.series(0, env), &args.series(1, env))),
        TaFn::Obv => Value::from_option(calculate_obv(close(), volume())),
        TaFn::Vwap => Value::from_option(calculate_vwap(
            &args.series(0, env),
            volume(),
            env.price_window(PriceField::Time),
        )),
        TaFn::Cum => Value::from_option(calculate_cum(&args.series(0, env))),
        TaFn::PivotHigh | TaFn::PivotLow => {
            let (Some(left), Some(right)) = (args.count(1), args.count(2)) else {
                return Ok(Value::Na);
            };
            let source = args.series(0, env);
            if f == TaFn::PivotHigh {
                Value::from_option(pivot_high(&source, left, right))
            } else {
                Value::from_option(pivot_low(&source, left, right))
            }
        }
        TaFn::Sar => return Ok(sar(site, args, env)),
        TaFn::Supertrend => return Ok(supertrend(site, args, env)),
    };
    Ok(value)
}

fn sar(site: CallSiteId, args: &BoundArgs, env: &mut Environment) -> Value {
    let (Some(start), Some(increment), Some(maximum)) =
        (args.number(0), args.number(1), args.number(2))
    else {
        return Value::Na;
    };
    let prev = match env.begin_state(site) {
        Some(IndicatorState::Sar(state)) => Some(state),
        _ => None,
    };
    let params = SarParams {
        start,
        increment,
        maximum,
    };
    let next = sar_next(
        prev,
        env.price_window(PriceField::High),
        env.price_window(PriceField::Low),
        params,
    );
    env.commit_state(site, next.map(IndicatorState::Sar));
    Value::from_option(next.map(|s| s.sar))
}

fn supertrend(site: CallSiteId, args: &BoundArgs, env: &mut Environment) -> Value {
    let (Some(factor), Some(atr_period)) = (args.number(0), args.period(1)) else {
        return Value::Na;
    };
    let prev = match env.begin_state(site) {
        Some(IndicatorState::SuperTrend(state)) => Some(state),
        _ => None,
    };
    let next = supertrend_next(
        prev,
        env.price_window(PriceField::High),
        env.price_window(PriceField::Low),
        env.price_window(PriceField::Close),
        factor,
        atr_period,
    );
    env.commit_state(site, next.map(IndicatorState::SuperTrend));
    match next {
        Some(st) => Value::record(
            "supertrend",
            vec![
                ("value", Value::from_f64(st.value)),
                ("direction", Value::Number(f64::from(st.direction))),
            ],
        ),
        None => Value::Na,
    }
}
