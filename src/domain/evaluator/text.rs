//! `str*` builtins. Positions and lengths count characters, not bytes.

use crate::domain::error::EvalError;
use crate::domain::registry::StrFn;
use crate::domain::value::{MAX_STRING_LEN, Value};

use super::args::BoundArgs;

/// A string result, or `SizeLimit` once it passes [`MAX_STRING_LEN`] bytes.
pub fn bounded(text: String) -> Result<Value, EvalError> {
    if text.len() > MAX_STRING_LEN {
        return Err(too_long(text.len()));
    }
    Ok(Value::Str(text))
}

fn too_long(requested: usize) -> EvalError {
    EvalError::SizeLimit {
        what: "string".to_string(),
        requested,
        limit: MAX_STRING_LEN,
    }
}

/// Replace `{0}`, `{1}`, ... with the matching argument. Unknown or malformed
/// placeholders are kept verbatim. `None` once the output passes [`MAX_STRING_LEN`].
pub fn format_placeholders(template: &str, values: &[Value]) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let replaced = tail.find('}').and_then(|close| {
            let index: usize = tail[1..close].parse().ok()?;
            Some((values.get(index)?.to_string(), close))
        });
        match replaced {
            Some((text, close)) => {
                if out.len() + text.len() > MAX_STRING_LEN {
                    return None;
                }
                out.push_str(&text);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Some(out)
}

fn substring(s: &str, begin: i64, end: Option<i64>) -> String {
    let len = s.chars().count() as i64;
    let begin = begin.clamp(0, len);
    let end = end.unwrap_or(len).clamp(0, len);
    if end <= begin {
        return String::new();
    }
    s.chars()
        .skip(begin as usize)
        .take((end - begin) as usize)
        .collect()
}

pub(super) fn call(f: StrFn, args: &BoundArgs) -> Result<Value, EvalError> {
    let s = args.text(0);
    let value = match f {
        StrFn::Format => match s {
            Some(template) => {
                let text = format_placeholders(template, args.rest(1))
                    .ok_or_else(|| too_long(MAX_STRING_LEN + 1))?;
                Value::Str(text)
            }
            None => Value::Na,
        },
        StrFn::Length => s.map_or(Value::Na, |s| Value::Number(s.chars().count() as f64)),
        StrFn::Contains => match (s, args.text(1)) {
            (Some(s), Some(sub)) => Value::Bool(s.contains(sub)),
            _ => Value::Na,
        },
        StrFn::Upper => s.map_or(Value::Na, |s| Value::Str(s.to_uppercase())),
        StrFn::Lower => s.map_or(Value::Na, |s| Value::Str(s.to_lowercase())),
        StrFn::ToNumber => s
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map_or(Value::Na, Value::from_f64),
        StrFn::ToString => bounded(args.value(0).to_string())?,
        StrFn::Substring => match (s, args.int(1)) {
            (Some(s), Some(begin)) => Value::Str(substring(s, begin, args.int(2))),
            _ => Value::Na,
        },
        StrFn::Replace => match (s, args.text(1), args.text(2)) {
            (Some(s), Some(target), _) if target.is_empty() => Value::Str(s.to_string()),
            (Some(s), Some(target), Some(replacement)) => {
                let grown = s
                    .matches(target)
                    .count()
                    .saturating_mul(replacement.len().saturating_sub(target.len()));
                let requested = s.len().saturating_add(grown);
                if requested > MAX_STRING_LEN {
                    return Err(too_long(requested));
                }
                Value::Str(s.replace(target, replacement))
            }
            _ => Value::Na,
        },
        StrFn::Split => match (s, args.text(1)) {
            (Some(s), Some("")) => {
                Value::array(s.chars().map(|c| Value::Str(c.to_string())).collect())
            }
            (Some(s), Some(separator)) => {
                Value::array(s.split(separator).map(Value::from).collect())
            }
            _ => Value::Na,
        },
        StrFn::Concat => {
            let mut out = String::new();
            for value in args.rest(0) {
                let part = value.to_string();
                if out.len() + part.len() > MAX_STRING_LEN {
                    return Err(too_long(out.len() + part.len()));
                }
                out.push_str(&part);
            }
            Value::Str(out)
        }
    };
    Ok(value)
}
