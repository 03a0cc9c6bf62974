//! Builtin registry: every recognized identifier with its category and
//! parameter schema.
//!
//! The catalog itself is static data (see [`crate::domain::catalog`]); the
//! [`Registry`] indexes it by name once per process and is shared read-only
//! by the lexer, parser and evaluator. Each entry resolves to a typed
//! [`BuiltinId`] so evaluation dispatch is an exhaustive `match` rather than a
//! chain of string comparisons.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::domain::catalog::CATALOG;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    PriceField,
    BarState,
    TimeField,
    SymbolInfo,
    Indicator,
    Strategy,
    StrategyMetric,
    Drawing,
    Color,
    Math,
    String,
    Collection,
    Notification,
    Constant,
    Keyword,
    Type,
    Operator,
}

impl Category {
    /// Categories whose entries are invoked with `name(...)`.
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            Category::Indicator
                | Category::Strategy
                | Category::Drawing
                | Category::Color
                | Category::Math
                | Category::String
                | Category::Collection
                | Category::Notification
        )
    }

    /// Categories whose entries are read like variables.
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            Category::PriceField
                | Category::BarState
                | Category::TimeField
                | Category::SymbolInfo
                | Category::StrategyMetric
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Numeric history window; the current value is the last sample.
    Series,
    Number,
    Int,
    Bool,
    Str,
    Color,
    Array,
    Map,
    Matrix,
    Drawing,
    Any,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Series => "series",
            ParamType::Number => "number",
            ParamType::Int => "int",
            ParamType::Bool => "bool",
            ParamType::Str => "string",
            ParamType::Color => "color",
            ParamType::Array => "array",
            ParamType::Map => "map",
            ParamType::Matrix => "matrix",
            ParamType::Drawing => "drawing",
            ParamType::Any => "any",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    /// The parameter is required.
    Required,
    Na,
    Number(f64),
    Bool(bool),
    Str(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub default: DefaultValue,
}

impl ParamSpec {
    pub const fn required(name: &'static str, ty: ParamType) -> Self {
        Self {
            name,
            ty,
            default: DefaultValue::Required,
        }
    }

    pub const fn optional(name: &'static str, ty: ParamType, default: DefaultValue) -> Self {
        Self { name, ty, default }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.default, DefaultValue::Required)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaFn {
    Sma,
    Ema,
    Wma,
    Rma,
    Vwma,
    Rsi,
    Macd,
    Stoch,
    Atr,
    Tr,
    Bb,
    Kc,
    Stdev,
    Dev,
    Cci,
    Roc,
    Mom,
    Change,
    Highest,
    Lowest,
    Crossover,
    Crossunder,
    Cross,
    Obv,
    Vwap,
    Wpr,
    Sar,
    Supertrend,
    PivotHigh,
    PivotLow,
    Cum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyFn {
    Entry,
    Close,
    CloseAll,
    Exit,
    Cancel,
    CancelAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawingFn {
    Plot,
    BoxNew,
    LineNew,
    LabelNew,
    LabelSetText,
    TableNew,
    TableCell,
    PointNew,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFn {
    Rgb,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathFn {
    Abs,
    Max,
    Min,
    Pow,
    Sqrt,
    Log,
    Log10,
    Exp,
    Round,
    Floor,
    Ceil,
    Sign,
    Avg,
    Sum,
    Nz,
    IsNa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrFn {
    Format,
    Length,
    Contains,
    Upper,
    Lower,
    ToNumber,
    ToString,
    Substring,
    Replace,
    Split,
    Concat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionFn {
    ArrayNew,
    ArrayFrom,
    ArrayPush,
    ArrayPop,
    ArrayGet,
    ArraySet,
    ArraySize,
    ArraySum,
    ArrayAvg,
    ArrayMax,
    ArrayMin,
    ArrayClear,
    ArrayIncludes,
    MapNew,
    MapPut,
    MapGet,
    MapContains,
    MapRemove,
    MapSize,
    MapKeys,
    MatrixNew,
    MatrixGet,
    MatrixSet,
    MatrixRows,
    MatrixCols,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyLevel {
    Alert,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Time,
    Hl2,
    Hlc3,
    Hlcc4,
    Ohlc4,
}

impl PriceField {
    /// Environment series key.
    pub fn key(self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
            PriceField::Time => "time",
            PriceField::Hl2 => "hl2",
            PriceField::Hlc3 => "hlc3",
            PriceField::Hlcc4 => "hlcc4",
            PriceField::Ohlc4 => "ohlc4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarStateFlag {
    Index,
    IsFirst,
    IsLast,
    IsNew,
    IsRealtime,
    IsHistory,
    IsConfirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeField {
    Year,
    Month,
    DayOfMonth,
    DayOfWeek,
    Hour,
    Minute,
    Second,
    WeekOfYear,
    SessionIsMarket,
    SessionIsPremarket,
    SessionIsPostmarket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolField {
    Ticker,
    Exchange,
    Currency,
    Mintick,
    PointValue,
    Timezone,
    Timeframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyMetric {
    PositionSize,
    PositionAvgPrice,
    NetProfit,
    GrossProfit,
    GrossLoss,
    Equity,
    OpenProfit,
    InitialCapital,
    Cash,
    OpenTrades,
    ClosedTrades,
    WinTrades,
    LossTrades,
    EvenTrades,
    MaxDrawdown,
    MaxDrawdownPercent,
    MaxRunup,
    MaxRunupPercent,
    ProfitFactor,
    PercentProfitable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantId {
    Na,
    StrategyLong,
    StrategyShort,
    ColorRed,
    ColorGreen,
    ColorBlue,
    ColorBlack,
    ColorWhite,
    ColorYellow,
    ColorOrange,
    ColorGray,
    ColorPurple,
    MathPi,
    MathE,
    ShapeTriangleUp,
    ShapeTriangleDown,
    ShapeCircle,
    ShapeCross,
    LocationAboveBar,
    LocationBelowBar,
}

/// Typed identity of every callable, readable or constant builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinId {
    Ta(TaFn),
    Strategy(StrategyFn),
    Drawing(DrawingFn),
    Color(ColorFn),
    Math(MathFn),
    Str(StrFn),
    Collection(CollectionFn),
    Notify(NotifyLevel),
    Price(PriceField),
    BarState(BarStateFlag),
    Time(TimeField),
    Symbol(SymbolField),
    Metric(StrategyMetric),
    Constant(ConstantId),
}

impl BuiltinId {
    pub fn category(self) -> Category {
        match self {
            BuiltinId::Ta(_) => Category::Indicator,
            BuiltinId::Strategy(_) => Category::Strategy,
            BuiltinId::Drawing(_) => Category::Drawing,
            BuiltinId::Color(_) => Category::Color,
            BuiltinId::Math(_) => Category::Math,
            BuiltinId::Str(_) => Category::String,
            BuiltinId::Collection(_) => Category::Collection,
            BuiltinId::Notify(_) => Category::Notification,
            BuiltinId::Price(_) => Category::PriceField,
            BuiltinId::BarState(_) => Category::BarState,
            BuiltinId::Time(_) => Category::TimeField,
            BuiltinId::Symbol(_) => Category::SymbolInfo,
            BuiltinId::Metric(_) => Category::StrategyMetric,
            BuiltinId::Constant(_) => Category::Constant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Let,
    Var,
    If,
    Else,
    For,
    To,
    By,
    While,
    Switch,
    Case,
    Default,
    Function,
    Param,
    Try,
    Catch,
    OnTick,
    OnBar,
    Show,
    ShowShape,
    ShowCond,
    Import,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Float,
    Int,
    Bool,
    String,
    Color,
    Series,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordOperator {
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Builtin(BuiltinId),
    Keyword(Keyword),
    Type(TypeName),
    Operator(WordOperator),
}

/// Static descriptor binding a builtin name to its category and parameter schema.
#[derive(Debug, PartialEq)]
pub struct RegistryEntry {
    pub name: &'static str,
    pub kind: EntryKind,
    pub params: &'static [ParamSpec],
    /// Accepts any number of trailing arguments of the last parameter's type.
    pub variadic: bool,
}

impl RegistryEntry {
    pub fn category(&self) -> Category {
        match self.kind {
            EntryKind::Builtin(id) => id.category(),
            EntryKind::Keyword(_) => Category::Keyword,
            EntryKind::Type(_) => Category::Type,
            EntryKind::Operator(_) => Category::Operator,
        }
    }

    pub fn builtin(&self) -> Option<BuiltinId> {
        match self.kind {
            EntryKind::Builtin(id) => Some(id),
            _ => None,
        }
    }

    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| p.is_required()).count()
    }

    /// Maximum argument count, `None` when variadic.
    pub fn max_args(&self) -> Option<usize> {
        if self.variadic {
            None
        } else {
            Some(self.params.len())
        }
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.required_count() && self.max_args().is_none_or(|max| count <= max)
    }

    /// Schema for the argument at `index`, extending the last parameter for variadics.
    pub fn param_at(&self, index: usize) -> Option<&'static ParamSpec> {
        match self.params.get(index) {
            Some(p) => Some(p),
            None if self.variadic => self.params.last(),
            None => None,
        }
    }
}

/// Name index over the static catalog.
#[derive(Debug)]
pub struct Registry {
    by_name: HashMap<&'static str, &'static RegistryEntry>,
}

impl Registry {
    pub fn from_entries(entries: &'static [RegistryEntry]) -> Self {
        let by_name = entries.iter().map(|e| (e.name, e)).collect();
        Self { by_name }
    }

    /// Process-wide registry over the standard catalog, built on first access.
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let registry = Registry::from_entries(CATALOG);
            tracing::debug!(entries = registry.len(), "builtin registry loaded");
            registry
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&'static RegistryEntry> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &'static RegistryEntry> + '_ {
        self.by_name.values().copied()
    }

    /// Reverse lookup used for diagnostics and `Display` of call nodes.
    pub fn entry_for(&self, id: BuiltinId) -> Option<&'static RegistryEntry> {
        self.by_name
            .values()
            .copied()
            .find(|e| e.builtin() == Some(id))
    }
}
