//! Array, map and matrix builtins. Collections are shared handles, so every
//! mutation is visible through all bindings of the same collection.

use crate::domain::error::EvalError;
use crate::domain::registry::{CollectionFn, RegistryEntry};
use crate::domain::value::{
    ArrayRef, MAX_COLLECTION_LEN, MAX_NESTING, MapKey, MapRef, Matrix, MatrixRef, Value,
};

use super::args::BoundArgs;

fn out_of_range(what: &str, index: i64, size: usize) -> EvalError {
    EvalError::IndexOutOfRange {
        what: what.to_string(),
        index,
        size,
    }
}

fn mismatch(entry: &RegistryEntry, index: usize, expected: &str, found: &Value) -> EvalError {
    EvalError::TypeMismatch {
        function: entry.name.to_string(),
        param: entry
            .param_at(index)
            .map_or("argument", |p| p.name)
            .to_string(),
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

/// Resolve a possibly negative index against `size`; `-1` is the last element.
fn resolve_index(index: i64, size: usize) -> Option<usize> {
    let resolved = if index < 0 { size as i64 + index } else { index };
    (0..size as i64).contains(&resolved).then_some(resolved as usize)
}

fn array_arg(entry: &RegistryEntry, args: &BoundArgs) -> Result<Option<ArrayRef>, EvalError> {
    match args.value(0) {
        Value::Array(a) => Ok(Some(a.clone())),
        Value::Na => Ok(None),
        other => Err(mismatch(entry, 0, "array", other)),
    }
}

fn map_arg(entry: &RegistryEntry, args: &BoundArgs) -> Result<Option<MapRef>, EvalError> {
    match args.value(0) {
        Value::Map(m) => Ok(Some(m.clone())),
        Value::Na => Ok(None),
        other => Err(mismatch(entry, 0, "map", other)),
    }
}

fn matrix_arg(entry: &RegistryEntry, args: &BoundArgs) -> Result<Option<MatrixRef>, EvalError> {
    match args.value(0) {
        Value::Matrix(m) => Ok(Some(m.clone())),
        Value::Na => Ok(None),
        other => Err(mismatch(entry, 0, "matrix", other)),
    }
}

fn map_key(entry: &RegistryEntry, args: &BoundArgs) -> Result<MapKey, EvalError> {
    let key = args.value(1);
    MapKey::from_value(key).ok_or_else(|| mismatch(entry, 1, "bool, number or string", key))
}

fn too_large(what: &str, requested: usize) -> EvalError {
    EvalError::SizeLimit {
        what: what.to_string(),
        requested,
        limit: MAX_COLLECTION_LEN,
    }
}

fn size_arg(entry: &RegistryEntry, args: &BoundArgs, index: usize) -> Result<usize, EvalError> {
    match args.int(index) {
        None => Ok(0),
        Some(n) if n >= 0 => Ok(n as usize),
        Some(_) => Err(mismatch(entry, index, "non-negative int", args.value(index))),
    }
}

/// Reject storing `item` into `container` when that would create a cycle
/// or nest collections deeper than [`MAX_NESTING`].
fn check_insert(entry: &RegistryEntry, container: &Value, item: &Value) -> Result<(), EvalError> {
    if nesting_ok(item, container, 1) {
        Ok(())
    } else {
        Err(EvalError::Nesting {
            function: entry.name.to_string(),
            what: container.type_name().to_string(),
            limit: MAX_NESTING,
        })
    }
}

fn nesting_ok(item: &Value, container: &Value, depth: usize) -> bool {
    if item.same_collection(container) {
        return false;
    }
    match item {
        Value::Array(a) => children_ok(a.borrow().iter(), container, depth),
        Value::Map(m) => children_ok(m.borrow().values(), container, depth),
        Value::Matrix(m) => children_ok(m.borrow().cells.iter(), container, depth),
        Value::Record(r) => children_ok(r.fields.iter().map(|(_, v)| v), container, depth),
        _ => true,
    }
}

fn children_ok<'a>(
    mut children: impl Iterator<Item = &'a Value>,
    container: &Value,
    depth: usize,
) -> bool {
    depth < MAX_NESTING && children.all(|child| nesting_ok(child, container, depth + 1))
}

/// Numeric elements of an array, skipping `na`; other element types are an error.
fn numeric_elements(entry: &RegistryEntry, array: &ArrayRef) -> Result<Vec<f64>, EvalError> {
    array
        .borrow()
        .iter()
        .filter(|v| !v.is_na())
        .map(|v| match v {
            Value::Number(n) => Ok(*n),
            other => Err(mismatch(entry, 0, "array of numbers", other)),
        })
        .collect()
}

pub(super) fn call(
    entry: &RegistryEntry,
    f: CollectionFn,
    args: &BoundArgs,
) -> Result<Value, EvalError> {
    match f {
        CollectionFn::ArrayNew => {
            let size = size_arg(entry, args, 0)?;
            if size > MAX_COLLECTION_LEN {
                return Err(too_large("array", size));
            }
            let initial = args.value(1);
            check_insert(entry, &Value::Na, initial)?;
            Ok(Value::array(vec![initial.clone(); size]))
        }
        CollectionFn::ArrayFrom => {
            let items = args.rest(0);
            for item in items {
                check_insert(entry, &Value::Na, item)?;
            }
            Ok(Value::array(items.to_vec()))
        }
        CollectionFn::MapNew => Ok(Value::map()),
        CollectionFn::MatrixNew => {
            let rows = size_arg(entry, args, 0)?;
            let cols = size_arg(entry, args, 1)?;
            let initial = args.value(2);
            check_insert(entry, &Value::Na, initial)?;
            Matrix::new(rows, cols, initial.clone())
                .map(Value::matrix)
                .ok_or_else(|| too_large("matrix", rows.saturating_mul(cols)))
        }
        CollectionFn::ArrayPush
        | CollectionFn::ArrayPop
        | CollectionFn::ArrayGet
        | CollectionFn::ArraySet
        | CollectionFn::ArraySize
        | CollectionFn::ArraySum
        | CollectionFn::ArrayAvg
        | CollectionFn::ArrayMax
        | CollectionFn::ArrayMin
        | CollectionFn::ArrayClear
        | CollectionFn::ArrayIncludes => match array_arg(entry, args)? {
            Some(array) => array_op(entry, f, &array, args),
            None => Ok(Value::Na),
        },
        CollectionFn::MapPut
        | CollectionFn::MapGet
        | CollectionFn::MapContains
        | CollectionFn::MapRemove
        | CollectionFn::MapSize
        | CollectionFn::MapKeys => match map_arg(entry, args)? {
            Some(map) => map_op(entry, f, &map, args),
            None => Ok(Value::Na),
        },
        CollectionFn::MatrixGet
        | CollectionFn::MatrixSet
        | CollectionFn::MatrixRows
        | CollectionFn::MatrixCols => match matrix_arg(entry, args)? {
            Some(matrix) => matrix_op(entry, f, &matrix, args),
            None => Ok(Value::Na),
        },
    }
}

fn array_op(
    entry: &RegistryEntry,
    f: CollectionFn,
    array: &ArrayRef,
    args: &BoundArgs,
) -> Result<Value, EvalError> {
    match f {
        CollectionFn::ArrayPush => {
            let item = args.value(1);
            check_insert(entry, args.value(0), item)?;
            let mut items = array.borrow_mut();
            if items.len() >= MAX_COLLECTION_LEN {
                return Err(too_large("array", items.len() + 1));
            }
            items.push(item.clone());
            Ok(Value::Na)
        }
        CollectionFn::ArrayPop => array
            .borrow_mut()
            .pop()
            .ok_or_else(|| out_of_range("array", -1, 0)),
        CollectionFn::ArrayGet | CollectionFn::ArraySet => {
            let Some(index) = args.int(1) else {
                return Ok(Value::Na);
            };
            if f == CollectionFn::ArraySet {
                check_insert(entry, args.value(0), args.value(2))?;
            }
            let mut items = array.borrow_mut();
            let size = items.len();
            let slot = resolve_index(index, size).ok_or_else(|| out_of_range("array", index, size))?;
            if f == CollectionFn::ArrayGet {
                Ok(items[slot].clone())
            } else {
                items[slot] = args.value(2).clone();
                Ok(Value::Na)
            }
        }
        CollectionFn::ArraySize => Ok(Value::Number(array.borrow().len() as f64)),
        CollectionFn::ArrayClear => {
            array.borrow_mut().clear();
            Ok(Value::Na)
        }
        CollectionFn::ArrayIncludes => {
            let needle = args.value(1);
            Ok(Value::Bool(array.borrow().iter().any(|v| v == needle)))
        }
        CollectionFn::ArraySum => {
            let values = numeric_elements(entry, array)?;
            Ok(Value::from_f64(values.iter().sum()))
        }
        CollectionFn::ArrayAvg => {
            let values = numeric_elements(entry, array)?;
            if values.is_empty() {
                return Ok(Value::Na);
            }
            Ok(Value::from_f64(values.iter().sum::<f64>() / values.len() as f64))
        }
        CollectionFn::ArrayMax => {
            let values = numeric_elements(entry, array)?;
            Ok(Value::from_option(values.into_iter().reduce(f64::max)))
        }
        CollectionFn::ArrayMin => {
            let values = numeric_elements(entry, array)?;
            Ok(Value::from_option(values.into_iter().reduce(f64::min)))
        }
        _ => Ok(Value::Na),
    }
}

fn map_op(
    entry: &RegistryEntry,
    f: CollectionFn,
    map: &MapRef,
    args: &BoundArgs,
) -> Result<Value, EvalError> {
    match f {
        CollectionFn::MapSize => Ok(Value::Number(map.borrow().len() as f64)),
        CollectionFn::MapKeys => Ok(Value::array(
            map.borrow().keys().map(MapKey::to_value).collect(),
        )),
        CollectionFn::MapPut => {
            let key = map_key(entry, args)?;
            let item = args.value(2);
            check_insert(entry, args.value(0), item)?;
            let mut entries = map.borrow_mut();
            if entries.len() >= MAX_COLLECTION_LEN && !entries.contains_key(&key) {
                return Err(too_large("map", entries.len() + 1));
            }
            Ok(entries.insert(key, item.clone()).unwrap_or_default())
        }
        CollectionFn::MapGet => {
            let key = map_key(entry, args)?;
            Ok(map.borrow().get(&key).cloned().unwrap_or_default())
        }
        CollectionFn::MapContains => {
            let key = map_key(entry, args)?;
            Ok(Value::Bool(map.borrow().contains_key(&key)))
        }
        CollectionFn::MapRemove => {
            let key = map_key(entry, args)?;
            Ok(map.borrow_mut().remove(&key).unwrap_or_default())
        }
        _ => Ok(Value::Na),
    }
}

fn matrix_op(
    entry: &RegistryEntry,
    f: CollectionFn,
    matrix: &MatrixRef,
    args: &BoundArgs,
) -> Result<Value, EvalError> {
    match f {
        CollectionFn::MatrixRows => Ok(Value::Number(matrix.borrow().rows as f64)),
        CollectionFn::MatrixCols => Ok(Value::Number(matrix.borrow().cols as f64)),
        CollectionFn::MatrixGet | CollectionFn::MatrixSet => {
            let (Some(row), Some(col)) = (args.int(1), args.int(2)) else {
                return Ok(Value::Na);
            };
            if f == CollectionFn::MatrixSet {
                check_insert(entry, args.value(0), args.value(3))?;
            }
            let mut m = matrix.borrow_mut();
            let (rows, cols) = (m.rows, m.cols);
            if row < 0 || row as usize >= rows {
                return Err(out_of_range("matrix rows", row, rows));
            }
            if col < 0 || col as usize >= cols {
                return Err(out_of_range("matrix columns", col, cols));
            }
            let (r, c) = (row as usize, col as usize);
            if f == CollectionFn::MatrixGet {
                Ok(m.get(r, c).cloned().unwrap_or_default())
            } else {
                if let Some(cell) = m.get_mut(r, c) {
                    *cell = args.value(3).clone();
                }
                Ok(Value::Na)
            }
        }
        _ => Ok(Value::Na),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::Registry;

    fn run(name: &str, values: Vec<Value>) -> Result<Value, EvalError> {
        let entry = Registry::global().lookup(name).unwrap();
        let Some(crate::domain::registry::BuiltinId::Collection(f)) = entry.builtin() else {
            panic!("{name} is not a collection builtin");
        };
        let provided = values.len();
        let mut values = values;
        for spec in entry.params.iter().skip(provided) {
            values.push(super::super::args::default_value(spec));
        }
        let n = values.len();
        call(entry, f, &BoundArgs::new(values, vec![None; n], provided))
    }

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    #[test]
    fn negative_indices_count_from_end() {
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(-3, 3), Some(0));
        assert_eq!(resolve_index(-4, 3), None);
        assert_eq!(resolve_index(3, 3), None);
    }

    #[test]
    fn array_mutation_is_shared() {
        let array = run("arrayFrom", vec![n(1.0), n(2.0)]).unwrap();
        run("arrayPush", vec![array.clone(), n(3.0)]).unwrap();
        assert_eq!(run("arraySize", vec![array.clone()]), Ok(n(3.0)));
        assert_eq!(run("arrayGet", vec![array.clone(), n(-1.0)]), Ok(n(3.0)));
        assert_eq!(run("arraySum", vec![array.clone()]), Ok(n(6.0)));
        assert_eq!(run("arrayPop", vec![array.clone()]), Ok(n(3.0)));
        assert_eq!(run("arrayMax", vec![array.clone()]), Ok(n(2.0)));
        assert_eq!(run("arrayIncludes", vec![array, n(1.0)]), Ok(Value::Bool(true)));
    }

    #[test]
    fn array_out_of_range_is_an_error() {
        let array = run("arrayNew", vec![n(2.0), n(0.0)]).unwrap();
        let err = run("arrayGet", vec![array.clone(), n(5.0)]).unwrap_err();
        assert_eq!(err, out_of_range("array", 5, 2));
        run("arrayClear", vec![array.clone()]).unwrap();
        assert!(run("arrayPop", vec![array]).is_err());
    }

    #[test]
    fn empty_array_aggregates() {
        let array = run("arrayNew", vec![]).unwrap();
        assert_eq!(run("arraySum", vec![array.clone()]), Ok(n(0.0)));
        assert_eq!(run("arrayAvg", vec![array.clone()]), Ok(Value::Na));
        assert_eq!(run("arrayMin", vec![array]), Ok(Value::Na));
    }

    #[test]
    fn map_round_trip_and_key_types() {
        let map = run("mapNew", vec![]).unwrap();
        assert_eq!(run("mapPut", vec![map.clone(), "a".into(), n(1.0)]), Ok(Value::Na));
        assert_eq!(run("mapPut", vec![map.clone(), "a".into(), n(2.0)]), Ok(n(1.0)));
        assert_eq!(run("mapGet", vec![map.clone(), "a".into()]), Ok(n(2.0)));
        assert_eq!(run("mapGet", vec![map.clone(), "b".into()]), Ok(Value::Na));
        assert_eq!(run("mapSize", vec![map.clone()]), Ok(n(1.0)));
        let err = run("mapPut", vec![map.clone(), Value::Na, n(1.0)]).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { param, .. } if param == "key"));
        assert_eq!(run("mapRemove", vec![map.clone(), "a".into()]), Ok(n(2.0)));
        assert_eq!(run("mapContains", vec![map, "a".into()]), Ok(Value::Bool(false)));
    }

    #[test]
    fn oversized_constructors_are_errors() {
        let err = run("matrixNew", vec![n(1e10), n(1e10), n(0.0)]).unwrap_err();
        assert!(matches!(err, EvalError::SizeLimit { ref what, .. } if what == "matrix"));
        let err = run("arrayNew", vec![n(1e12), n(0.0)]).unwrap_err();
        assert!(matches!(err, EvalError::SizeLimit { requested, .. } if requested == 1_000_000_000_000));
        assert!(run("arrayNew", vec![n(MAX_COLLECTION_LEN as f64), Value::Na]).is_ok());
    }

    #[test]
    fn collections_cannot_contain_themselves() {
        let a = run("arrayNew", vec![]).unwrap();
        let err = run("arrayPush", vec![a.clone(), a.clone()]).unwrap_err();
        assert!(matches!(err, EvalError::Nesting { .. }));

        // a -> b, then b -> a closes a loop through another collection
        let b = run("arrayFrom", vec![n(1.0)]).unwrap();
        run("arrayPush", vec![a.clone(), b.clone()]).unwrap();
        assert!(run("arraySet", vec![b.clone(), n(0.0), a.clone()]).is_err());

        let m = run("mapNew", vec![]).unwrap();
        run("mapPut", vec![m.clone(), "list".into(), a.clone()]).unwrap();
        assert!(run("arrayPush", vec![b, m.clone()]).is_err());
        assert!(run("mapPut", vec![m.clone(), "self".into(), m.clone()]).is_err());

        let grid = run("matrixNew", vec![n(1.0), n(1.0)]).unwrap();
        assert!(run("matrixSet", vec![grid.clone(), n(0.0), n(0.0), grid]).is_err());

        // the rejected inserts left nothing behind
        assert_eq!(a.to_string(), "[[1]]");
        assert_eq!(a, a.clone());
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let mut value = run("arrayNew", vec![]).unwrap();
        for _ in 1..MAX_NESTING {
            value = run("arrayFrom", vec![value]).unwrap();
        }
        let err = run("arrayFrom", vec![value]).unwrap_err();
        assert!(matches!(err, EvalError::Nesting { limit, .. } if limit == MAX_NESTING));
    }

    #[test]
    fn matrix_bounds_are_checked() {
        let m = run("matrixNew", vec![n(2.0), n(3.0), n(0.0)]).unwrap();
        run("matrixSet", vec![m.clone(), n(1.0), n(2.0), n(9.0)]).unwrap();
        assert_eq!(run("matrixGet", vec![m.clone(), n(1.0), n(2.0)]), Ok(n(9.0)));
        assert_eq!(run("matrixRows", vec![m.clone()]), Ok(n(2.0)));
        assert_eq!(run("matrixCols", vec![m.clone()]), Ok(n(3.0)));
        assert!(run("matrixGet", vec![m, n(2.0), n(0.0)]).is_err());
    }
}
