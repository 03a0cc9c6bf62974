//! `math*`, `nz` and `isNa`. Results that are not finite become `na`.

use crate::domain::environment::Environment;
use crate::domain::indicator::calculate_sum;
use crate::domain::registry::MathFn;
use crate::domain::value::Value;

use super::args::BoundArgs;

fn finite(value: f64) -> Value {
    if value.is_finite() {
        Value::Number(value)
    } else {
        Value::Na
    }
}

fn unary(args: &BoundArgs, f: fn(f64) -> f64) -> Value {
    args.number(0).map_or(Value::Na, |x| finite(f(x)))
}

/// Every written argument as a number; `None` if any is `na`.
fn numbers(args: &BoundArgs) -> Option<Vec<f64>> {
    args.rest(0).iter().map(Value::as_number).collect()
}

pub(super) fn call(f: MathFn, args: &BoundArgs, env: &Environment) -> Value {
    match f {
        MathFn::Abs => unary(args, f64::abs),
        MathFn::Sqrt => unary(args, f64::sqrt),
        MathFn::Log => unary(args, f64::ln),
        MathFn::Log10 => unary(args, f64::log10),
        MathFn::Exp => unary(args, f64::exp),
        MathFn::Floor => unary(args, f64::floor),
        MathFn::Ceil => unary(args, f64::ceil),
        MathFn::Sign => unary(args, |x| if x == 0.0 { 0.0 } else { x.signum() }),
        MathFn::Pow => match (args.number(0), args.number(1)) {
            (Some(x), Some(y)) => finite(x.powf(y)),
            _ => Value::Na,
        },
        MathFn::Round => {
            let Some(x) = args.number(0) else {
                return Value::Na;
            };
            let precision = args.int(1).unwrap_or(0).clamp(0, 15) as i32;
            let scale = 10f64.powi(precision);
            finite((x * scale).round() / scale)
        }
        MathFn::Max => numbers(args)
            .and_then(|v| v.into_iter().reduce(f64::max))
            .map_or(Value::Na, finite),
        MathFn::Min => numbers(args)
            .and_then(|v| v.into_iter().reduce(f64::min))
            .map_or(Value::Na, finite),
        MathFn::Avg => match numbers(args) {
            Some(v) if !v.is_empty() => finite(v.iter().sum::<f64>() / v.len() as f64),
            _ => Value::Na,
        },
        MathFn::Sum => match args.period(1) {
            Some(length) => Value::from_option(calculate_sum(&args.series(0, env), length)),
            None => Value::Na,
        },
        MathFn::Nz => {
            if args.value(0).is_na() {
                args.value(1).clone()
            } else {
                args.value(0).clone()
            }
        }
        MathFn::IsNa => Value::Bool(args.value(0).is_na()),
    }
}
