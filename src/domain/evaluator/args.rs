//! Binding call arguments to a builtin's parameter schema.

use std::borrow::Cow;

use crate::domain::environment::{Environment, SeriesSource};
use crate::domain::error::EvalError;
use crate::domain::registry::{DefaultValue, ParamSpec, ParamType, RegistryEntry};
use crate::domain::value::{Color, Value};

/// Argument values in schema order, with omitted optionals filled from their defaults.
#[derive(Debug, Clone, Default)]
pub struct BoundArgs {
    values: Vec<Value>,
    sources: Vec<Option<SeriesSource>>,
    provided: usize,
}

impl BoundArgs {
    pub(super) fn new(values: Vec<Value>, sources: Vec<Option<SeriesSource>>, provided: usize) -> Self {
        Self {
            values,
            sources,
            provided,
        }
    }

    /// Number of arguments written at the call site.
    pub fn provided(&self) -> usize {
        self.provided
    }

    pub fn value(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&Value::Na)
    }

    /// Arguments actually written at the call site, starting at `from`.
    pub fn rest(&self, from: usize) -> &[Value] {
        let end = self.provided.min(self.values.len());
        self.values.get(from..end).unwrap_or(&[])
    }

    pub fn number(&self, index: usize) -> Option<f64> {
        self.value(index).as_number().filter(|n| !n.is_nan())
    }

    pub fn int(&self, index: usize) -> Option<i64> {
        self.number(index).map(|n| n as i64)
    }

    /// A lookback length: a positive integer, otherwise `None`.
    pub fn period(&self, index: usize) -> Option<usize> {
        self.int(index).filter(|&n| n > 0).map(|n| n as usize)
    }

    /// A non-negative count such as pivot bar counts.
    pub fn count(&self, index: usize) -> Option<usize> {
        self.int(index).filter(|&n| n >= 0).map(|n| n as usize)
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        match self.value(index) {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn color(&self, index: usize) -> Option<Color> {
        match self.value(index) {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// History window behind argument `index`; a scalar argument is a one-sample window.
    pub fn series<'e>(&self, index: usize, env: &'e Environment) -> Cow<'e, [f64]> {
        match self.sources.get(index).and_then(Option::as_ref) {
            Some(source) => env.series_window(source),
            None => Cow::Owned(vec![self.value(index).to_f64()]),
        }
    }
}

pub(super) fn default_value(spec: &ParamSpec) -> Value {
    match spec.default {
        DefaultValue::Required | DefaultValue::Na => Value::Na,
        DefaultValue::Number(n) => Value::Number(n),
        DefaultValue::Bool(b) => Value::Bool(b),
        DefaultValue::Str(s) => Value::Str(s.to_string()),
    }
}

/// Check one argument against its declared type. `na` is accepted everywhere.
pub(super) fn check_type(entry: &RegistryEntry, spec: &ParamSpec, value: &Value) -> Result<(), EvalError> {
    let ok = match (spec.ty, value) {
        (_, Value::Na) | (ParamType::Any, _) => true,
        (ParamType::Series | ParamType::Number | ParamType::Bool, v) => {
            matches!(v, Value::Number(_) | Value::Bool(_))
        }
        (ParamType::Int, Value::Number(n)) => n.fract() == 0.0,
        (ParamType::Str, Value::Str(_))
        | (ParamType::Color, Value::Color(_))
        | (ParamType::Array, Value::Array(_))
        | (ParamType::Map, Value::Map(_))
        | (ParamType::Matrix, Value::Matrix(_))
        | (ParamType::Drawing, Value::Drawing(_)) => true,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(EvalError::TypeMismatch {
            function: entry.name.to_string(),
            param: spec.name.to_string(),
            expected: spec.ty.to_string(),
            found: describe(value),
        })
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) if n.fract() != 0.0 => format!("number {n}"),
        other => other.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::Registry;

    fn entry(name: &str) -> &'static RegistryEntry {
        Registry::global().lookup(name).unwrap()
    }

    #[test]
    fn int_parameters_reject_fractions() {
        let sma = entry("taSma");
        let length = sma.param_at(1).unwrap();
        assert!(check_type(sma, length, &Value::Number(14.0)).is_ok());
        let err = check_type(sma, length, &Value::Number(2.5)).unwrap_err();
        assert_eq!(
            err,
            EvalError::TypeMismatch {
                function: "taSma".into(),
                param: "length".into(),
                expected: "int".into(),
                found: "number 2.5".into(),
            }
        );
    }

    #[test]
    fn na_is_accepted_for_any_type() {
        let contains = entry("strContains");
        let s = contains.param_at(0).unwrap();
        assert!(check_type(contains, s, &Value::Na).is_ok());
        assert!(check_type(contains, s, &Value::Number(1.0)).is_err());
    }

    #[test]
    fn defaults_follow_schema() {
        let rsi = entry("taRsi");
        assert_eq!(default_value(rsi.param_at(1).unwrap()), Value::Number(14.0));
        let plot = entry("plot");
        assert_eq!(default_value(plot.param_at(1).unwrap()), Value::Str("plot".into()));
        assert_eq!(default_value(plot.param_at(2).unwrap()), Value::Na);
    }

    #[test]
    fn accessors_convert_and_filter() {
        let args = BoundArgs::new(
            vec![Value::Number(3.0), Value::Number(-2.0), Value::Str("x".into())],
            vec![None, None, None],
            2,
        );
        assert_eq!(args.period(0), Some(3));
        assert_eq!(args.period(1), None);
        assert_eq!(args.count(1), None);
        assert_eq!(args.text(2), Some("x"));
        assert_eq!(args.value(9), &Value::Na);
        assert_eq!(args.rest(1), &[Value::Number(-2.0)]);
    }

    #[test]
    fn scalar_arguments_are_single_sample_windows() {
        let env = Environment::default();
        let args = BoundArgs::new(vec![Value::Number(4.0)], vec![None], 1);
        assert_eq!(&args.series(0, &env)[..], &[4.0]);
    }
}
