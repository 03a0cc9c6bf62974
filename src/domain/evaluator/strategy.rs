//! `strategy*` order builtins. Market orders fill at the current close;
//! orders with a limit or stop price rest until a later bar reaches them.

use crate::domain::account::{OrderKind, PendingOrder};
use crate::domain::environment::Environment;
use crate::domain::error::EvalError;
use crate::domain::position::Direction;
use crate::domain::registry::StrategyFn;
use crate::domain::value::Value;

use super::args::BoundArgs;

fn required_text<'a>(args: &'a BoundArgs, index: usize, function: &str, param: &str) -> Result<&'a str, EvalError> {
    args.text(index).ok_or_else(|| EvalError::TypeMismatch {
        function: function.to_string(),
        param: param.to_string(),
        expected: "string".to_string(),
        found: args.value(index).type_name().to_string(),
    })
}

pub(super) fn call(
    f: StrategyFn,
    args: &BoundArgs,
    env: &mut Environment,
    default_qty: f64,
) -> Result<Value, EvalError> {
    let (Some(bar), Some(bar_index)) = (env.current_bar().copied(), env.bar_index()) else {
        return Ok(Value::Na);
    };
    match f {
        StrategyFn::Entry => {
            let id = required_text(args, 0, "strategyEntry", "id")?;
            let direction = args.text(1).and_then(Direction::parse).ok_or_else(|| {
                EvalError::TypeMismatch {
                    function: "strategyEntry".to_string(),
                    param: "direction".to_string(),
                    expected: "\"long\" or \"short\"".to_string(),
                    found: args.value(1).to_string(),
                }
            })?;
            let quantity = args.number(2).unwrap_or(default_qty);
            let (limit, stop) = (args.number(3), args.number(4));
            let account = env.account_mut();
            if limit.is_some() || stop.is_some() {
                account.place_order(PendingOrder {
                    id: id.to_string(),
                    kind: OrderKind::Entry {
                        direction,
                        quantity,
                    },
                    limit,
                    stop,
                });
                return Ok(Value::Bool(true));
            }
            if account.has_position(id) {
                return Ok(Value::Bool(false));
            }
            account.enter_reversing(id, direction, quantity, bar.close, bar.time, bar_index)?;
            Ok(Value::Bool(true))
        }
        StrategyFn::Close => {
            let id = required_text(args, 0, "strategyClose", "id")?;
            let account = env.account_mut();
            if !account.has_position(id) {
                return Ok(Value::Bool(false));
            }
            account.exit(id, bar.close, bar.time)?;
            Ok(Value::Bool(true))
        }
        StrategyFn::CloseAll => {
            let closed = env.account_mut().close_all(bar.close, bar.time);
            Ok(Value::Number(closed.len() as f64))
        }
        StrategyFn::Exit => {
            let id = required_text(args, 0, "strategyExit", "id")?;
            let from_entry = required_text(args, 1, "strategyExit", "fromEntry")?;
            let (limit, stop) = (args.number(2), args.number(3));
            let account = env.account_mut();
            if limit.is_none() && stop.is_none() {
                if !account.has_position(from_entry) {
                    return Ok(Value::Bool(false));
                }
                account.exit(from_entry, bar.close, bar.time)?;
                return Ok(Value::Bool(true));
            }
            account.place_order(PendingOrder {
                id: id.to_string(),
                kind: OrderKind::Exit {
                    from_entry: from_entry.to_string(),
                },
                limit,
                stop,
            });
            Ok(Value::Bool(true))
        }
        StrategyFn::Cancel => {
            let id = required_text(args, 0, "strategyCancel", "id")?;
            Ok(Value::Bool(env.account_mut().cancel(id)))
        }
        StrategyFn::CancelAll => Ok(Value::Number(env.account_mut().cancel_all() as f64)),
    }
}
