//! Plot, drawing and color builtins.

use crate::domain::drawing::{BoxDrawing, LabelDrawing, LineDrawing, TableDrawing};
use crate::domain::environment::Environment;
use crate::domain::error::EvalError;
use crate::domain::registry::{ColorFn, DrawingFn};
use crate::domain::value::{Color, DrawingKind, DrawingRef, MAX_COLLECTION_LEN, Point, Value};

use super::args::BoundArgs;

fn coordinate(args: &BoundArgs, index: usize) -> f64 {
    args.number(index).unwrap_or(f64::NAN)
}

fn handle(
    function: &str,
    args: &BoundArgs,
    kind: DrawingKind,
) -> Result<Option<DrawingRef>, EvalError> {
    match args.value(0) {
        Value::Drawing(handle) if handle.kind == kind => Ok(Some(*handle)),
        Value::Na => Ok(None),
        Value::Drawing(other) => Err(EvalError::TypeMismatch {
            function: function.to_string(),
            param: kind.as_str().to_string(),
            expected: kind.as_str().to_string(),
            found: other.kind.as_str().to_string(),
        }),
        other => Err(EvalError::TypeMismatch {
            function: function.to_string(),
            param: kind.as_str().to_string(),
            expected: kind.as_str().to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

fn stale(what: &str, handle: DrawingRef, size: usize) -> EvalError {
    EvalError::IndexOutOfRange {
        what: what.to_string(),
        index: handle.index as i64,
        size,
    }
}

pub(super) fn call(f: DrawingFn, args: &BoundArgs, env: &mut Environment) -> Result<Value, EvalError> {
    let bar_index = env.bar_index().unwrap_or(0);
    match f {
        DrawingFn::Plot => {
            let value = args.value(0);
            let title = args.text(1).unwrap_or("plot");
            env.plot_value(title, value.to_f64(), args.color(2));
            Ok(value.clone())
        }
        DrawingFn::BoxNew => {
            let handle = env.drawings_mut().add_box(BoxDrawing {
                left: coordinate(args, 0),
                top: coordinate(args, 1),
                right: coordinate(args, 2),
                bottom: coordinate(args, 3),
                color: args.color(4),
                bar_index,
            });
            Ok(Value::Drawing(handle))
        }
        DrawingFn::LineNew => {
            let handle = env.drawings_mut().add_line(LineDrawing {
                x1: coordinate(args, 0),
                y1: coordinate(args, 1),
                x2: coordinate(args, 2),
                y2: coordinate(args, 3),
                color: args.color(4),
                bar_index,
            });
            Ok(Value::Drawing(handle))
        }
        DrawingFn::LabelNew => {
            let handle = env.drawings_mut().add_label(LabelDrawing {
                x: coordinate(args, 0),
                y: coordinate(args, 1),
                text: args.text(2).unwrap_or_default().to_string(),
                color: args.color(3),
                bar_index,
            });
            Ok(Value::Drawing(handle))
        }
        DrawingFn::LabelSetText => {
            let Some(label) = handle("labelSetText", args, DrawingKind::Label)? else {
                return Ok(Value::Na);
            };
            let text = args.text(1).unwrap_or_default().to_string();
            let drawings = env.drawings_mut();
            let size = drawings.labels.len();
            let target = drawings
                .label_mut(label)
                .ok_or_else(|| stale("labels", label, size))?;
            target.text = text;
            Ok(Value::Na)
        }
        DrawingFn::TableNew => {
            let (Some(rows), Some(columns)) = (args.count(0), args.count(1)) else {
                return Ok(Value::Na);
            };
            let table = TableDrawing::new(rows, columns, bar_index).ok_or_else(|| {
                EvalError::SizeLimit {
                    what: "table".to_string(),
                    requested: rows.saturating_mul(columns),
                    limit: MAX_COLLECTION_LEN,
                }
            })?;
            Ok(Value::Drawing(env.drawings_mut().add_table(table)))
        }
        DrawingFn::TableCell => {
            let Some(table) = handle("tableCell", args, DrawingKind::Table)? else {
                return Ok(Value::Na);
            };
            let (Some(row), Some(column)) = (args.int(1), args.int(2)) else {
                return Ok(Value::Na);
            };
            let text = args.value(3).to_string();
            let drawings = env.drawings_mut();
            let size = drawings.tables.len();
            let grid = drawings
                .table_mut(table)
                .ok_or_else(|| stale("tables", table, size))?;
            if row < 0 || row as usize >= grid.rows {
                return Err(EvalError::IndexOutOfRange {
                    what: "table rows".to_string(),
                    index: row,
                    size: grid.rows,
                });
            }
            if column < 0 || !grid.set_cell(row as usize, column as usize, text) {
                return Err(EvalError::IndexOutOfRange {
                    what: "table columns".to_string(),
                    index: column,
                    size: grid.columns,
                });
            }
            Ok(Value::Na)
        }
        DrawingFn::PointNew => Ok(Value::Point(Point {
            time: coordinate(args, 0),
            price: coordinate(args, 1),
        })),
    }
}

pub(super) fn color(f: ColorFn, args: &BoundArgs) -> Value {
    match f {
        ColorFn::Rgb => match (args.number(0), args.number(1), args.number(2)) {
            (Some(r), Some(g), Some(b)) => {
                Value::Color(Color::from_components(r, g, b, args.number(3).unwrap_or(0.0)))
            }
            _ => Value::Na,
        },
        ColorFn::New => match args.color(0) {
            Some(base) => Value::Color(base.with_transp(args.number(1).unwrap_or(0.0))),
            None => Value::Na,
        },
    }
}
