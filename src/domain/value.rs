//! Runtime values produced by the evaluator.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// RGB color with a 0..=100 transparency, as used by drawing calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub transp: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, transp: 0 }
    }

    /// Build from script numbers, clamping each channel into range.
    pub fn from_components(r: f64, g: f64, b: f64, transp: f64) -> Self {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
            transp: transp.round().clamp(0.0, 100.0) as u8,
        }
    }

    pub fn with_transp(self, transp: f64) -> Self {
        Self {
            transp: transp.round().clamp(0.0, 100.0) as u8,
            ..self
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.transp > 0 {
            write!(f, "/{}", self.transp)?;
        }
        Ok(())
    }
}

/// Fixed-shape named record, e.g. Bollinger `{middle, upper, lower}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: &'static str,
    pub fields: Vec<(&'static str, Value)>,
}

impl Record {
    pub fn new(name: &'static str, fields: Vec<(&'static str, Value)>) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// Chart coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub time: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawingKind {
    Box,
    Line,
    Label,
    Table,
    Shape,
}

impl DrawingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DrawingKind::Box => "box",
            DrawingKind::Line => "line",
            DrawingKind::Label => "label",
            DrawingKind::Table => "table",
            DrawingKind::Shape => "shape",
        }
    }
}

/// Handle to a drawing held in the environment's per-kind collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawingRef {
    pub kind: DrawingKind,
    pub index: usize,
}

/// Map keys: the hashable subset of values, totally ordered.
#[derive(Debug, Clone)]
pub enum MapKey {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl MapKey {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            Value::Number(n) => Some(MapKey::Number(*n)),
            Value::Str(s) => Some(MapKey::Str(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Number(n) => Value::Number(*n),
            MapKey::Str(s) => Value::Str(s.clone()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            MapKey::Bool(_) => 0,
            MapKey::Number(_) => 1,
            MapKey::Str(_) => 2,
        }
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MapKey {}

impl PartialOrd for MapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MapKey::Bool(a), MapKey::Bool(b)) => a.cmp(b),
            (MapKey::Number(a), MapKey::Number(b)) => a.total_cmp(b),
            (MapKey::Str(a), MapKey::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Most elements one array, map, matrix or table may hold.
pub const MAX_COLLECTION_LEN: usize = 1_000_000;

/// Longest string, in bytes, that concatenation or replacement may build.
pub const MAX_STRING_LEN: usize = 1 << 20;

/// Deepest a collection may sit inside other collections.
pub const MAX_NESTING: usize = 32;

/// Cell count of a `rows` x `cols` grid, or `None` past [`MAX_COLLECTION_LEN`].
pub fn grid_len(rows: usize, cols: usize) -> Option<usize> {
    rows.checked_mul(cols)
        .filter(|&len| len <= MAX_COLLECTION_LEN)
}

/// Row-major matrix of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Value>,
}

impl Matrix {
    /// `None` when the grid would exceed [`MAX_COLLECTION_LEN`] cells.
    pub fn new(rows: usize, cols: usize, initial: Value) -> Option<Self> {
        let len = grid_len(rows, cols)?;
        Some(Self {
            rows,
            cols,
            cells: vec![initial; len],
        })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Value> {
        if row < self.rows && col < self.cols {
            self.cells.get_mut(row * self.cols + col)
        } else {
            None
        }
    }
}

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type MapRef = Rc<RefCell<BTreeMap<MapKey, Value>>>;
pub type MatrixRef = Rc<RefCell<Matrix>>;

/// A DevScript value. `Na` is the domain null, distinct from zero and false.
///
/// Arrays, maps and matrices are shared handles: copies alias the same
/// storage, so mutation through one binding is visible through all.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Na,
    Number(f64),
    Bool(bool),
    Str(String),
    Color(Color),
    Record(Rc<Record>),
    Array(ArrayRef),
    Map(MapRef),
    Matrix(MatrixRef),
    Point(Point),
    Drawing(DrawingRef),
}

impl Value {
    /// Number from an indicator result; NaN and absent become `Na`.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Value::Na
        } else {
            Value::Number(value)
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Value::Na, Value::from_f64)
    }

    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(values)))
    }

    pub fn map() -> Self {
        Value::Map(Rc::new(RefCell::new(BTreeMap::new())))
    }

    pub fn matrix(matrix: Matrix) -> Self {
        Value::Matrix(Rc::new(RefCell::new(matrix)))
    }

    pub fn record(name: &'static str, fields: Vec<(&'static str, Value)>) -> Self {
        Value::Record(Rc::new(Record::new(name, fields)))
    }

    pub fn is_na(&self) -> bool {
        matches!(self, Value::Na)
    }

    /// Whether both values are handles to the same array, map or matrix.
    pub fn same_collection(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Matrix(a), Value::Matrix(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Condition semantics: `na`, `false`, zero and NaN are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Na => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Sample for a numeric window; anything non-numeric is NaN.
    pub fn to_f64(&self) -> f64 {
        self.as_number().unwrap_or(f64::NAN)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Na => "na",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Color(_) => "color",
            Value::Record(_) => "record",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Matrix(_) => "matrix",
            Value::Point(_) => "point",
            Value::Drawing(_) => "drawing",
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::from_f64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Na => f.write_str("na"),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Color(c) => write!(f, "{c}"),
            Value::Record(r) => {
                write!(f, "{}{{", r.name)?;
                for (i, (name, value)) in r.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Array(a) => {
                f.write_str("[")?;
                for (i, value) in a.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Value::Map(m) => {
                f.write_str("{")?;
                for (i, (key, value)) in m.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {value}", key.to_value())?;
                }
                f.write_str("}")
            }
            Value::Matrix(m) => {
                let m = m.borrow();
                write!(f, "matrix({}x{})", m.rows, m.cols)
            }
            Value::Point(p) => write!(f, "point({}, {})", p.time, p.price),
            Value::Drawing(d) => write!(f, "{}#{}", d.kind.as_str(), d.index),
        }
    }
}
