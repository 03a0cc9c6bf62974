//! Standard builtin catalog. Plain static data consumed by [`Registry`].
//!
//! [`Registry`]: crate::domain::registry::Registry

use crate::domain::registry::{
    BarStateFlag, BuiltinId, CollectionFn, ColorFn, ConstantId, DefaultValue, DrawingFn,
    EntryKind, Keyword, MathFn, NotifyLevel, ParamSpec, ParamType, PriceField, RegistryEntry,
    StrFn, StrategyFn, StrategyMetric, SymbolField, TaFn, TimeField, TypeName, WordOperator,
};

use DefaultValue::{Na, Number};
use ParamType::{Any, Array, Color, Drawing, Int, Map, Matrix, Series, Str};

const fn req(name: &'static str, ty: ParamType) -> ParamSpec {
    ParamSpec::required(name, ty)
}

const fn opt(name: &'static str, ty: ParamType, default: DefaultValue) -> ParamSpec {
    ParamSpec::optional(name, ty, default)
}

const fn func(name: &'static str, id: BuiltinId, params: &'static [ParamSpec]) -> RegistryEntry {
    RegistryEntry {
        name,
        kind: EntryKind::Builtin(id),
        params,
        variadic: false,
    }
}

const fn variadic(
    name: &'static str,
    id: BuiltinId,
    params: &'static [ParamSpec],
) -> RegistryEntry {
    RegistryEntry {
        name,
        kind: EntryKind::Builtin(id),
        params,
        variadic: true,
    }
}

const fn value(name: &'static str, id: BuiltinId) -> RegistryEntry {
    func(name, id, &[])
}

const fn word(name: &'static str, kind: EntryKind) -> RegistryEntry {
    RegistryEntry {
        name,
        kind,
        params: &[],
        variadic: false,
    }
}

const fn ta(name: &'static str, f: TaFn, params: &'static [ParamSpec]) -> RegistryEntry {
    func(name, BuiltinId::Ta(f), params)
}

const fn math(name: &'static str, f: MathFn, params: &'static [ParamSpec]) -> RegistryEntry {
    func(name, BuiltinId::Math(f), params)
}

const fn text(name: &'static str, f: StrFn, params: &'static [ParamSpec]) -> RegistryEntry {
    func(name, BuiltinId::Str(f), params)
}

const fn coll(name: &'static str, f: CollectionFn, params: &'static [ParamSpec]) -> RegistryEntry {
    func(name, BuiltinId::Collection(f), params)
}

const fn price(name: &'static str, f: PriceField) -> RegistryEntry {
    value(name, BuiltinId::Price(f))
}

const fn bar_state(name: &'static str, f: BarStateFlag) -> RegistryEntry {
    value(name, BuiltinId::BarState(f))
}

const fn time(name: &'static str, f: TimeField) -> RegistryEntry {
    value(name, BuiltinId::Time(f))
}

const fn symbol(name: &'static str, f: SymbolField) -> RegistryEntry {
    value(name, BuiltinId::Symbol(f))
}

const fn metric(name: &'static str, f: StrategyMetric) -> RegistryEntry {
    value(name, BuiltinId::Metric(f))
}

const fn constant(name: &'static str, c: ConstantId) -> RegistryEntry {
    value(name, BuiltinId::Constant(c))
}

const fn kw(name: &'static str, k: Keyword) -> RegistryEntry {
    word(name, EntryKind::Keyword(k))
}

const fn ty(name: &'static str, t: TypeName) -> RegistryEntry {
    word(name, EntryKind::Type(t))
}

// Shared parameter schemas.
const SOURCE: &[ParamSpec] = &[req("source", Series)];
const SOURCE_LENGTH: &[ParamSpec] = &[req("source", Series), req("length", Int)];
const SOURCE_OPT_LENGTH: &[ParamSpec] = &[req("source", Series), opt("length", Int, Number(1.0))];
const LENGTH_14: &[ParamSpec] = &[opt("length", Int, Number(14.0))];
const TWO_SERIES: &[ParamSpec] = &[req("a", Series), req("b", Series)];
const PIVOT: &[ParamSpec] = &[
    req("source", Series),
    req("leftBars", Int),
    req("rightBars", Int),
];
const BANDS_20_2: &[ParamSpec] = &[
    req("source", Series),
    opt("length", Int, Number(20.0)),
    opt("mult", ParamType::Number, Number(2.0)),
];
const BANDS_20_15: &[ParamSpec] = &[
    req("source", Series),
    opt("length", Int, Number(20.0)),
    opt("mult", ParamType::Number, Number(1.5)),
];
const X: &[ParamSpec] = &[req("x", ParamType::Number)];
const XY: &[ParamSpec] = &[req("x", ParamType::Number), req("y", ParamType::Number)];
const NUMBERS: &[ParamSpec] = &[req("value", ParamType::Number)];
const S: &[ParamSpec] = &[req("s", Str)];
const S_SUB: &[ParamSpec] = &[req("s", Str), req("sub", Str)];
const ARR: &[ParamSpec] = &[req("array", Array)];
const ARR_VALUE: &[ParamSpec] = &[req("array", Array), req("value", Any)];
const MAP: &[ParamSpec] = &[req("map", Map)];
const MAP_KEY: &[ParamSpec] = &[req("map", Map), req("key", Any)];
const MATRIX: &[ParamSpec] = &[req("matrix", Matrix)];
const MESSAGE: &[ParamSpec] = &[req("message", Any)];
const ID: &[ParamSpec] = &[req("id", Str)];
const SEGMENT: &[ParamSpec] = &[
    req("x1", ParamType::Number),
    req("y1", ParamType::Number),
    req("x2", ParamType::Number),
    req("y2", ParamType::Number),
    opt("color", Color, Na),
];

pub static CATALOG: &[RegistryEntry] = &[
    // Price fields
    price("open", PriceField::Open),
    price("high", PriceField::High),
    price("low", PriceField::Low),
    price("close", PriceField::Close),
    price("volume", PriceField::Volume),
    price("time", PriceField::Time),
    price("hl2", PriceField::Hl2),
    price("hlc3", PriceField::Hlc3),
    price("hlcc4", PriceField::Hlcc4),
    price("ohlc4", PriceField::Ohlc4),
    // Bar state
    bar_state("barIndex", BarStateFlag::Index),
    bar_state("barStateIsFirst", BarStateFlag::IsFirst),
    bar_state("barStateIsLast", BarStateFlag::IsLast),
    bar_state("barStateIsNew", BarStateFlag::IsNew),
    bar_state("barStateIsRealtime", BarStateFlag::IsRealtime),
    bar_state("barStateIsHistory", BarStateFlag::IsHistory),
    bar_state("barStateIsConfirmed", BarStateFlag::IsConfirmed),
    // Time and session
    time("year", TimeField::Year),
    time("month", TimeField::Month),
    time("dayOfMonth", TimeField::DayOfMonth),
    time("dayOfWeek", TimeField::DayOfWeek),
    time("hour", TimeField::Hour),
    time("minute", TimeField::Minute),
    time("second", TimeField::Second),
    time("weekOfYear", TimeField::WeekOfYear),
    time("sessionIsMarket", TimeField::SessionIsMarket),
    time("sessionIsPremarket", TimeField::SessionIsPremarket),
    time("sessionIsPostmarket", TimeField::SessionIsPostmarket),
    // Symbol info
    symbol("syminfoTicker", SymbolField::Ticker),
    symbol("syminfoExchange", SymbolField::Exchange),
    symbol("syminfoCurrency", SymbolField::Currency),
    symbol("syminfoMintick", SymbolField::Mintick),
    symbol("syminfoPointValue", SymbolField::PointValue),
    symbol("syminfoTimezone", SymbolField::Timezone),
    symbol("timeframePeriod", SymbolField::Timeframe),
    // Indicators
    ta("taSma", TaFn::Sma, SOURCE_LENGTH),
    ta("taEma", TaFn::Ema, SOURCE_LENGTH),
    ta("taWma", TaFn::Wma, SOURCE_LENGTH),
    ta("taRma", TaFn::Rma, SOURCE_LENGTH),
    ta("taVwma", TaFn::Vwma, SOURCE_LENGTH),
    ta(
        "taRsi",
        TaFn::Rsi,
        &[req("source", Series), opt("length", Int, Number(14.0))],
    ),
    ta(
        "taMacd",
        TaFn::Macd,
        &[
            req("source", Series),
            opt("fastLength", Int, Number(12.0)),
            opt("slowLength", Int, Number(26.0)),
            opt("signalLength", Int, Number(9.0)),
        ],
    ),
    ta(
        "taStoch",
        TaFn::Stoch,
        &[
            opt("kLength", Int, Number(14.0)),
            opt("kSmoothing", Int, Number(1.0)),
            opt("dSmoothing", Int, Number(3.0)),
        ],
    ),
    ta("taAtr", TaFn::Atr, LENGTH_14),
    ta("taTr", TaFn::Tr, &[]),
    ta("taBb", TaFn::Bb, BANDS_20_2),
    ta("taKc", TaFn::Kc, BANDS_20_15),
    ta("taStdev", TaFn::Stdev, SOURCE_LENGTH),
    ta("taDev", TaFn::Dev, SOURCE_LENGTH),
    ta(
        "taCci",
        TaFn::Cci,
        &[req("source", Series), opt("length", Int, Number(20.0))],
    ),
    ta("taRoc", TaFn::Roc, SOURCE_LENGTH),
    ta("taMom", TaFn::Mom, SOURCE_LENGTH),
    ta("taChange", TaFn::Change, SOURCE_OPT_LENGTH),
    ta("taHighest", TaFn::Highest, SOURCE_LENGTH),
    ta("taLowest", TaFn::Lowest, SOURCE_LENGTH),
    ta("taCrossover", TaFn::Crossover, TWO_SERIES),
    ta("taCrossunder", TaFn::Crossunder, TWO_SERIES),
    ta("taCross", TaFn::Cross, TWO_SERIES),
    ta("taObv", TaFn::Obv, &[]),
    ta("taVwap", TaFn::Vwap, SOURCE),
    ta("taWpr", TaFn::Wpr, LENGTH_14),
    ta(
        "taSar",
        TaFn::Sar,
        &[
            opt("start", ParamType::Number, Number(0.02)),
            opt("increment", ParamType::Number, Number(0.02)),
            opt("maximum", ParamType::Number, Number(0.2)),
        ],
    ),
    ta(
        "taSupertrend",
        TaFn::Supertrend,
        &[
            opt("factor", ParamType::Number, Number(3.0)),
            opt("atrPeriod", Int, Number(10.0)),
        ],
    ),
    ta("taPivotHigh", TaFn::PivotHigh, PIVOT),
    ta("taPivotLow", TaFn::PivotLow, PIVOT),
    ta("taCum", TaFn::Cum, SOURCE),
    // Strategy orders
    func(
        "strategyEntry",
        BuiltinId::Strategy(StrategyFn::Entry),
        &[
            req("id", Str),
            req("direction", Str),
            opt("qty", ParamType::Number, Na),
            opt("limit", ParamType::Number, Na),
            opt("stop", ParamType::Number, Na),
        ],
    ),
    func("strategyClose", BuiltinId::Strategy(StrategyFn::Close), ID),
    func(
        "strategyCloseAll",
        BuiltinId::Strategy(StrategyFn::CloseAll),
        &[],
    ),
    func(
        "strategyExit",
        BuiltinId::Strategy(StrategyFn::Exit),
        &[
            req("id", Str),
            req("fromEntry", Str),
            opt("limit", ParamType::Number, Na),
            opt("stop", ParamType::Number, Na),
        ],
    ),
    func("strategyCancel", BuiltinId::Strategy(StrategyFn::Cancel), ID),
    func(
        "strategyCancelAll",
        BuiltinId::Strategy(StrategyFn::CancelAll),
        &[],
    ),
    // Strategy metrics
    metric("strategyPositionSize", StrategyMetric::PositionSize),
    metric("strategyPositionAvgPrice", StrategyMetric::PositionAvgPrice),
    metric("strategyNetProfit", StrategyMetric::NetProfit),
    metric("strategyGrossProfit", StrategyMetric::GrossProfit),
    metric("strategyGrossLoss", StrategyMetric::GrossLoss),
    metric("strategyEquity", StrategyMetric::Equity),
    metric("strategyOpenProfit", StrategyMetric::OpenProfit),
    metric("strategyInitialCapital", StrategyMetric::InitialCapital),
    metric("strategyCash", StrategyMetric::Cash),
    metric("strategyOpenTrades", StrategyMetric::OpenTrades),
    metric("strategyClosedTrades", StrategyMetric::ClosedTrades),
    metric("strategyWinTrades", StrategyMetric::WinTrades),
    metric("strategyLossTrades", StrategyMetric::LossTrades),
    metric("strategyEvenTrades", StrategyMetric::EvenTrades),
    metric("strategyMaxDrawdown", StrategyMetric::MaxDrawdown),
    metric("strategyMaxDrawdownPercent", StrategyMetric::MaxDrawdownPercent),
    metric("strategyMaxRunup", StrategyMetric::MaxRunup),
    metric("strategyMaxRunupPercent", StrategyMetric::MaxRunupPercent),
    metric("strategyProfitFactor", StrategyMetric::ProfitFactor),
    metric("strategyPercentProfitable", StrategyMetric::PercentProfitable),
    // Drawing
    func(
        "plot",
        BuiltinId::Drawing(DrawingFn::Plot),
        &[
            req("series", ParamType::Number),
            opt("title", Str, DefaultValue::Str("plot")),
            opt("color", Color, Na),
        ],
    ),
    func(
        "boxNew",
        BuiltinId::Drawing(DrawingFn::BoxNew),
        &[
            req("left", ParamType::Number),
            req("top", ParamType::Number),
            req("right", ParamType::Number),
            req("bottom", ParamType::Number),
            opt("color", Color, Na),
        ],
    ),
    func("lineNew", BuiltinId::Drawing(DrawingFn::LineNew), SEGMENT),
    func(
        "labelNew",
        BuiltinId::Drawing(DrawingFn::LabelNew),
        &[
            req("x", ParamType::Number),
            req("y", ParamType::Number),
            opt("text", Str, DefaultValue::Str("")),
            opt("color", Color, Na),
        ],
    ),
    func(
        "labelSetText",
        BuiltinId::Drawing(DrawingFn::LabelSetText),
        &[req("label", Drawing), req("text", Str)],
    ),
    func(
        "tableNew",
        BuiltinId::Drawing(DrawingFn::TableNew),
        &[req("rows", Int), req("columns", Int)],
    ),
    func(
        "tableCell",
        BuiltinId::Drawing(DrawingFn::TableCell),
        &[
            req("table", Drawing),
            req("row", Int),
            req("column", Int),
            req("text", Any),
        ],
    ),
    func(
        "pointNew",
        BuiltinId::Drawing(DrawingFn::PointNew),
        &[req("time", ParamType::Number), req("price", ParamType::Number)],
    ),
    // Colors
    func(
        "colorRgb",
        BuiltinId::Color(ColorFn::Rgb),
        &[
            req("red", ParamType::Number),
            req("green", ParamType::Number),
            req("blue", ParamType::Number),
            opt("transp", ParamType::Number, Number(0.0)),
        ],
    ),
    func(
        "colorNew",
        BuiltinId::Color(ColorFn::New),
        &[req("color", Color), opt("transp", ParamType::Number, Number(0.0))],
    ),
    // Math
    math("mathAbs", MathFn::Abs, X),
    variadic("mathMax", BuiltinId::Math(MathFn::Max), NUMBERS),
    variadic("mathMin", BuiltinId::Math(MathFn::Min), NUMBERS),
    math("mathPow", MathFn::Pow, XY),
    math("mathSqrt", MathFn::Sqrt, X),
    math("mathLog", MathFn::Log, X),
    math("mathLog10", MathFn::Log10, X),
    math("mathExp", MathFn::Exp, X),
    math(
        "mathRound",
        MathFn::Round,
        &[req("x", ParamType::Number), opt("precision", Int, Number(0.0))],
    ),
    math("mathFloor", MathFn::Floor, X),
    math("mathCeil", MathFn::Ceil, X),
    math("mathSign", MathFn::Sign, X),
    variadic("mathAvg", BuiltinId::Math(MathFn::Avg), NUMBERS),
    math("mathSum", MathFn::Sum, SOURCE_LENGTH),
    math(
        "nz",
        MathFn::Nz,
        &[req("x", Any), opt("replacement", Any, Number(0.0))],
    ),
    math("isNa", MathFn::IsNa, &[req("x", Any)]),
    // Strings
    variadic(
        "strFormat",
        BuiltinId::Str(StrFn::Format),
        &[req("format", Str), opt("arg", Any, Na)],
    ),
    text("strLength", StrFn::Length, S),
    text("strContains", StrFn::Contains, S_SUB),
    text("strUpper", StrFn::Upper, S),
    text("strLower", StrFn::Lower, S),
    text("strToNumber", StrFn::ToNumber, S),
    text("strToString", StrFn::ToString, &[req("value", Any)]),
    text(
        "strSubstring",
        StrFn::Substring,
        &[req("s", Str), req("begin", Int), opt("end", Int, Na)],
    ),
    text(
        "strReplace",
        StrFn::Replace,
        &[req("s", Str), req("target", Str), req("replacement", Str)],
    ),
    text("strSplit", StrFn::Split, &[req("s", Str), req("separator", Str)]),
    variadic(
        "strConcat",
        BuiltinId::Str(StrFn::Concat),
        &[req("value", Any)],
    ),
    // Arrays
    coll(
        "arrayNew",
        CollectionFn::ArrayNew,
        &[opt("size", Int, Number(0.0)), opt("initial", Any, Na)],
    ),
    variadic(
        "arrayFrom",
        BuiltinId::Collection(CollectionFn::ArrayFrom),
        &[opt("value", Any, Na)],
    ),
    coll("arrayPush", CollectionFn::ArrayPush, ARR_VALUE),
    coll("arrayPop", CollectionFn::ArrayPop, ARR),
    coll(
        "arrayGet",
        CollectionFn::ArrayGet,
        &[req("array", Array), req("index", Int)],
    ),
    coll(
        "arraySet",
        CollectionFn::ArraySet,
        &[req("array", Array), req("index", Int), req("value", Any)],
    ),
    coll("arraySize", CollectionFn::ArraySize, ARR),
    coll("arraySum", CollectionFn::ArraySum, ARR),
    coll("arrayAvg", CollectionFn::ArrayAvg, ARR),
    coll("arrayMax", CollectionFn::ArrayMax, ARR),
    coll("arrayMin", CollectionFn::ArrayMin, ARR),
    coll("arrayClear", CollectionFn::ArrayClear, ARR),
    coll("arrayIncludes", CollectionFn::ArrayIncludes, ARR_VALUE),
    // Maps
    coll("mapNew", CollectionFn::MapNew, &[]),
    coll(
        "mapPut",
        CollectionFn::MapPut,
        &[req("map", Map), req("key", Any), req("value", Any)],
    ),
    coll("mapGet", CollectionFn::MapGet, MAP_KEY),
    coll("mapContains", CollectionFn::MapContains, MAP_KEY),
    coll("mapRemove", CollectionFn::MapRemove, MAP_KEY),
    coll("mapSize", CollectionFn::MapSize, MAP),
    coll("mapKeys", CollectionFn::MapKeys, MAP),
    // Matrices
    coll(
        "matrixNew",
        CollectionFn::MatrixNew,
        &[req("rows", Int), req("columns", Int), opt("initial", Any, Na)],
    ),
    coll(
        "matrixGet",
        CollectionFn::MatrixGet,
        &[req("matrix", Matrix), req("row", Int), req("column", Int)],
    ),
    coll(
        "matrixSet",
        CollectionFn::MatrixSet,
        &[
            req("matrix", Matrix),
            req("row", Int),
            req("column", Int),
            req("value", Any),
        ],
    ),
    coll("matrixRows", CollectionFn::MatrixRows, MATRIX),
    coll("matrixCols", CollectionFn::MatrixCols, MATRIX),
    // Notifications
    func("alert", BuiltinId::Notify(NotifyLevel::Alert), MESSAGE),
    func("logInfo", BuiltinId::Notify(NotifyLevel::Info), MESSAGE),
    func("logWarning", BuiltinId::Notify(NotifyLevel::Warning), MESSAGE),
    func("logError", BuiltinId::Notify(NotifyLevel::Error), MESSAGE),
    // Constants
    constant("na", ConstantId::Na),
    constant("strategyLong", ConstantId::StrategyLong),
    constant("strategyShort", ConstantId::StrategyShort),
    constant("colorRed", ConstantId::ColorRed),
    constant("colorGreen", ConstantId::ColorGreen),
    constant("colorBlue", ConstantId::ColorBlue),
    constant("colorBlack", ConstantId::ColorBlack),
    constant("colorWhite", ConstantId::ColorWhite),
    constant("colorYellow", ConstantId::ColorYellow),
    constant("colorOrange", ConstantId::ColorOrange),
    constant("colorGray", ConstantId::ColorGray),
    constant("colorPurple", ConstantId::ColorPurple),
    constant("mathPi", ConstantId::MathPi),
    constant("mathE", ConstantId::MathE),
    constant("shapeTriangleUp", ConstantId::ShapeTriangleUp),
    constant("shapeTriangleDown", ConstantId::ShapeTriangleDown),
    constant("shapeCircle", ConstantId::ShapeCircle),
    constant("shapeCross", ConstantId::ShapeCross),
    constant("locationAboveBar", ConstantId::LocationAboveBar),
    constant("locationBelowBar", ConstantId::LocationBelowBar),
    // Keywords
    kw("let", Keyword::Let),
    kw("var", Keyword::Var),
    kw("if", Keyword::If),
    kw("else", Keyword::Else),
    kw("for", Keyword::For),
    kw("to", Keyword::To),
    kw("by", Keyword::By),
    kw("while", Keyword::While),
    kw("switch", Keyword::Switch),
    kw("case", Keyword::Case),
    kw("default", Keyword::Default),
    kw("function", Keyword::Function),
    kw("param", Keyword::Param),
    kw("try", Keyword::Try),
    kw("catch", Keyword::Catch),
    kw("onTick", Keyword::OnTick),
    kw("onBar", Keyword::OnBar),
    kw("show", Keyword::Show),
    kw("showshape", Keyword::ShowShape),
    kw("showcond", Keyword::ShowCond),
    kw("import", Keyword::Import),
    kw("export", Keyword::Export),
    // Type declarations
    ty("float", TypeName::Float),
    ty("int", TypeName::Int),
    ty("bool", TypeName::Bool),
    ty("string", TypeName::String),
    ty("color", TypeName::Color),
    ty("series", TypeName::Series),
    // Word operators
    word("and", EntryKind::Operator(WordOperator::And)),
    word("or", EntryKind::Operator(WordOperator::Or)),
    word("not", EntryKind::Operator(WordOperator::Not)),
];
