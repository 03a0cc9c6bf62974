//! Rolling market-data environment seen by a running script.
//!
//! Holds the OHLCV history and derived price channels, the bar index and
//! bar-state flags, series-backed user variables, per-call-site history and
//! indicator state, plot outputs, drawings, notifications and the strategy
//! ledger. `update_bar` fully completes before the evaluator runs for that bar.
//!
//! Variables are carried forward on every new bar so `x[1]` always reads the
//! value `x` held at the close of the previous bar. A realtime revision
//! (`update_tick`) rolls everything the script wrote on the current bar back
//! to its state at the bar's open before the script runs again.

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

use crate::domain::account::StrategyAccount;
use crate::domain::ast::CallSiteId;
use crate::domain::config::{EngineSettings, InstrumentInfo};
use crate::domain::drawing::Drawings;
use crate::domain::indicator::{SarState, SuperTrendState};
use crate::domain::metrics::strategy_metric;
use crate::domain::notification::Notification;
use crate::domain::ohlcv::Bar;
use crate::domain::registry::{
    BarStateFlag, BuiltinId, NotifyLevel, PriceField, Registry, StrategyMetric, SymbolField,
    TimeField,
};
use crate::domain::series::{RollingSeries, StampedSeries};
use crate::domain::value::{Color, Value};

const PRICE_FIELDS: [PriceField; 10] = [
    PriceField::Open,
    PriceField::High,
    PriceField::Low,
    PriceField::Close,
    PriceField::Volume,
    PriceField::Time,
    PriceField::Hl2,
    PriceField::Hlc3,
    PriceField::Hlcc4,
    PriceField::Ohlc4,
];

fn field_value(bar: &Bar, field: PriceField) -> f64 {
    match field {
        PriceField::Open => bar.open,
        PriceField::High => bar.high,
        PriceField::Low => bar.low,
        PriceField::Close => bar.close,
        PriceField::Volume => bar.volume,
        PriceField::Time => bar.time as f64,
        PriceField::Hl2 => bar.hl2(),
        PriceField::Hlc3 => bar.hlc3(),
        PriceField::Hlcc4 => bar.hlcc4(),
        PriceField::Ohlc4 => bar.ohlc4(),
    }
}

/// Carried state of a stateful indicator call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorState {
    Sar(SarState),
    SuperTrend(SuperTrendState),
}

/// `committed` is the state as of the previous bar's close; `current` is this
/// bar's result, recomputed from `committed` on every revision.
#[derive(Debug, Clone, Default)]
struct StateSlot {
    stamp: Option<usize>,
    committed: Option<IndicatorState>,
    current: Option<IndicatorState>,
}

#[derive(Debug, Clone)]
struct Variable {
    series: RollingSeries<Value>,
    created: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub title: String,
    pub color: Option<Color>,
    pub series: StampedSeries<f64>,
}

/// Where a series-typed argument reads its history from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesSource {
    Price(PriceField),
    Variable(String),
    /// Captured expression history for argument `.1` of call site `.0`.
    Site(CallSiteId, usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BarFlags {
    is_new: bool,
    is_realtime: bool,
    is_confirmed: bool,
    is_last: bool,
}

#[derive(Debug, Clone)]
pub struct Environment {
    max_bars_back: usize,
    bars_seen: usize,
    current: Option<Bar>,
    prices: HashMap<PriceField, RollingSeries<f64>>,
    flags: BarFlags,
    variables: HashMap<String, Variable>,
    site_series: HashMap<(CallSiteId, usize), StampedSeries<f64>>,
    states: HashMap<CallSiteId, StateSlot>,
    plots: Vec<Plot>,
    drawings: Drawings,
    notifications: Vec<Notification>,
    notifications_raised: usize,
    account: StrategyAccount,
    instrument: InstrumentInfo,
    offset: FixedOffset,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(&EngineSettings::default(), InstrumentInfo::default())
    }
}

impl Environment {
    pub fn new(settings: &EngineSettings, instrument: InstrumentInfo) -> Self {
        let max_bars_back = settings.max_bars_back.max(1);
        let prices = PRICE_FIELDS
            .iter()
            .map(|&f| (f, RollingSeries::new(max_bars_back)))
            .collect();
        Self {
            max_bars_back,
            bars_seen: 0,
            current: None,
            prices,
            flags: BarFlags::default(),
            variables: HashMap::new(),
            site_series: HashMap::new(),
            states: HashMap::new(),
            plots: Vec::new(),
            drawings: Drawings::default(),
            notifications: Vec::new(),
            notifications_raised: 0,
            account: StrategyAccount::new(settings.initial_capital),
            offset: instrument.utc_offset(),
            instrument,
        }
    }

    pub fn with_max_bars_back(max_bars_back: usize) -> Self {
        let settings = EngineSettings {
            max_bars_back,
            ..EngineSettings::default()
        };
        Self::new(&settings, InstrumentInfo::default())
    }

    pub fn max_bars_back(&self) -> usize {
        self.max_bars_back
    }

    /// Append a new bar: price channels, flags, variable carry-forward,
    /// pending-order fills and the equity mark.
    pub fn update_bar(&mut self, bar: Bar) {
        self.bars_seen += 1;
        for field in PRICE_FIELDS {
            if let Some(series) = self.prices.get_mut(&field) {
                series.push(field_value(&bar, field));
            }
        }
        self.current = Some(bar);
        self.flags = BarFlags {
            is_new: true,
            is_realtime: false,
            is_confirmed: true,
            is_last: false,
        };
        for variable in self.variables.values_mut() {
            if let Some(last) = variable.series.last().cloned() {
                variable.series.push(last);
            }
        }

        let index = self.bars_seen - 1;
        let filled = self.account.fill_pending(&bar, index);
        self.account.record_equity(bar.time, bar.close);
        tracing::trace!(bar_index = index, close = bar.close, filled, "bar appended");
    }

    /// Revise the current bar in place (realtime update). On an empty
    /// environment this appends like `update_bar`.
    pub fn update_tick(&mut self, bar: Bar) {
        if self.current.is_none() {
            self.update_bar(bar);
        } else {
            for field in PRICE_FIELDS {
                if let Some(series) = self.prices.get_mut(&field) {
                    series.replace_last(field_value(&bar, field));
                }
            }
            self.current = Some(bar);
            self.rollback_current_bar();
            self.account.record_equity(bar.time, bar.close);
        }
        self.flags.is_new = false;
        self.flags.is_realtime = true;
        self.flags.is_confirmed = false;
    }

    fn rollback_current_bar(&mut self) {
        let stamp = self.bars_seen;
        self.variables.retain(|_, v| v.created != stamp);
        for variable in self.variables.values_mut() {
            if let Some(previous) = variable.series.get(1).cloned() {
                variable.series.replace_last(previous);
            }
        }
        if let Some(index) = self.bar_index() {
            self.drawings.truncate_from(index);
        }
    }

    /// Mark whether the current bar is the last one of the feed.
    pub fn mark_last(&mut self, is_last: bool) {
        self.flags.is_last = is_last;
    }

    /// Number of bars appended so far; also the stamp of the current bar.
    pub fn stamp(&self) -> usize {
        self.bars_seen
    }

    pub fn bar_index(&self) -> Option<usize> {
        self.bars_seen.checked_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.bars_seen == 0
    }

    pub fn current_bar(&self) -> Option<&Bar> {
        self.current.as_ref()
    }

    /// Oldest-first retained history of a price channel.
    pub fn price_window(&self, field: PriceField) -> &[f64] {
        self.prices.get(&field).map_or(&[], |s| s.window())
    }

    pub fn price(&self, field: PriceField, offset: usize) -> Value {
        self.prices
            .get(&field)
            .and_then(|s| s.get(offset))
            .map_or(Value::Na, |&v| Value::from_f64(v))
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Value of `name` as of `offset` bars ago: user variables first, then
    /// price channels, then plot titles. Unknown names and missing history are `na`.
    pub fn get(&self, name: &str, offset: usize) -> Value {
        if let Some(variable) = self.variables.get(name) {
            return variable.series.get(offset).cloned().unwrap_or_default();
        }
        if let Some(field) = price_field(name) {
            return self.price(field, offset);
        }
        self.plot(name)
            .and_then(|p| p.series.series().get(offset))
            .map_or(Value::Na, |&v| Value::from_f64(v))
    }

    /// Write `name` for the current bar.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.variables.get_mut(name) {
            Some(variable) => variable.series.replace_last(value),
            None => {
                let mut series = RollingSeries::new(self.max_bars_back);
                series.push(value);
                self.variables.insert(
                    name.to_string(),
                    Variable {
                        series,
                        created: self.bars_seen,
                    },
                );
            }
        }
    }

    /// Oldest-first history of a variable, price channel or plot.
    pub fn get_series(&self, name: &str) -> Vec<Value> {
        if let Some(variable) = self.variables.get(name) {
            return variable.series.to_vec();
        }
        let numbers = match price_field(name) {
            Some(field) => self.price_window(field),
            None => match self.plot(name) {
                Some(plot) => plot.series.series().window(),
                None => &[],
            },
        };
        numbers.iter().map(|&v| Value::from_f64(v)).collect()
    }

    /// Record the current bar's sample of a captured argument expression.
    pub fn record_site(&mut self, site: CallSiteId, arg: usize, value: f64) {
        let stamp = self.bars_seen;
        let capacity = self.max_bars_back;
        self.site_series
            .entry((site, arg))
            .or_insert_with(|| StampedSeries::new(capacity))
            .record(stamp, value);
    }

    /// Numeric history behind a series argument. Non-numeric variable samples read as NaN.
    pub fn series_window(&self, source: &SeriesSource) -> Cow<'_, [f64]> {
        match source {
            SeriesSource::Price(field) => Cow::Borrowed(self.price_window(*field)),
            SeriesSource::Variable(name) => Cow::Owned(
                self.variables
                    .get(name)
                    .map(|v| v.series.iter().map(Value::to_f64).collect())
                    .unwrap_or_default(),
            ),
            SeriesSource::Site(site, arg) => Cow::Borrowed(
                self.site_series
                    .get(&(*site, *arg))
                    .map_or(&[][..], |s| s.series().window()),
            ),
        }
    }

    /// Committed state of a stateful call site, rolling the slot over on a new bar.
    pub fn begin_state(&mut self, site: CallSiteId) -> Option<IndicatorState> {
        let stamp = self.bars_seen;
        let slot = self.states.entry(site).or_default();
        if slot.stamp != Some(stamp) {
            slot.committed = slot.current;
            slot.stamp = Some(stamp);
        }
        slot.committed
    }

    /// Store this bar's state for `site`; `None` keeps the committed state.
    pub fn commit_state(&mut self, site: CallSiteId, state: Option<IndicatorState>) {
        if let Some(slot) = self.states.get_mut(&site) {
            slot.current = state.or(slot.committed);
        }
    }

    pub fn bar_state(&self, flag: BarStateFlag) -> Value {
        let Some(index) = self.bar_index() else {
            return match flag {
                BarStateFlag::Index => Value::Na,
                _ => Value::Bool(false),
            };
        };
        let flags = self.flags;
        match flag {
            BarStateFlag::Index => Value::Number(index as f64),
            BarStateFlag::IsFirst => Value::Bool(index == 0),
            BarStateFlag::IsLast => Value::Bool(flags.is_last),
            BarStateFlag::IsNew => Value::Bool(flags.is_new),
            BarStateFlag::IsRealtime => Value::Bool(flags.is_realtime),
            BarStateFlag::IsHistory => Value::Bool(!flags.is_realtime),
            BarStateFlag::IsConfirmed => Value::Bool(flags.is_confirmed),
        }
    }

    fn local_time(&self) -> Option<DateTime<FixedOffset>> {
        let bar = self.current.as_ref()?;
        Some(bar.datetime()?.with_timezone(&self.offset))
    }

    /// Calendar components of the current bar's open time in the instrument's time zone.
    pub fn time_field(&self, field: TimeField) -> Value {
        let Some(t) = self.local_time() else {
            return Value::Na;
        };
        let hour = t.hour();
        let open = self.instrument.session_open_hour;
        let close = self.instrument.session_close_hour;
        match field {
            TimeField::Year => Value::Number(f64::from(t.year())),
            TimeField::Month => Value::Number(f64::from(t.month())),
            TimeField::DayOfMonth => Value::Number(f64::from(t.day())),
            TimeField::DayOfWeek => Value::Number(f64::from(t.weekday().number_from_sunday())),
            TimeField::Hour => Value::Number(f64::from(hour)),
            TimeField::Minute => Value::Number(f64::from(t.minute())),
            TimeField::Second => Value::Number(f64::from(t.second())),
            TimeField::WeekOfYear => Value::Number(f64::from(t.iso_week().week())),
            TimeField::SessionIsMarket => Value::Bool(hour >= open && hour < close),
            TimeField::SessionIsPremarket => Value::Bool(hour < open),
            TimeField::SessionIsPostmarket => Value::Bool(hour >= close),
        }
    }

    pub fn symbol_field(&self, field: SymbolField) -> Value {
        let info = &self.instrument;
        match field {
            SymbolField::Ticker => Value::Str(info.ticker.clone()),
            SymbolField::Exchange => Value::Str(info.exchange.clone()),
            SymbolField::Currency => Value::Str(info.currency.clone()),
            SymbolField::Mintick => Value::Number(info.mintick),
            SymbolField::PointValue => Value::Number(info.point_value),
            SymbolField::Timezone => Value::Str(info.timezone.clone()),
            SymbolField::Timeframe => Value::Str(info.timeframe.clone()),
        }
    }

    pub fn instrument(&self) -> &InstrumentInfo {
        &self.instrument
    }

    /// Strategy metric with open positions marked at the current close.
    pub fn metric(&self, metric: StrategyMetric) -> Value {
        let mark = self.current.map_or(f64::NAN, |b| b.close);
        Value::from_f64(strategy_metric(&self.account, metric, mark))
    }

    pub fn account(&self) -> &StrategyAccount {
        &self.account
    }

    pub fn account_mut(&mut self) -> &mut StrategyAccount {
        &mut self.account
    }

    /// Record the current bar's value of the plot `title`, creating it on first use.
    pub fn plot_value(&mut self, title: &str, value: f64, color: Option<Color>) {
        let stamp = self.bars_seen;
        let index = match self.plots.iter().position(|p| p.title == title) {
            Some(index) => index,
            None => {
                self.plots.push(Plot {
                    title: title.to_string(),
                    color,
                    series: StampedSeries::new(self.max_bars_back),
                });
                self.plots.len() - 1
            }
        };
        let plot = &mut self.plots[index];
        if color.is_some() {
            plot.color = color;
        }
        plot.series.record(stamp, value);
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn plot(&self, title: &str) -> Option<&Plot> {
        self.plots.iter().find(|p| p.title == title)
    }

    pub fn drawings(&self) -> &Drawings {
        &self.drawings
    }

    pub fn drawings_mut(&mut self) -> &mut Drawings {
        &mut self.drawings
    }

    pub fn notify(&mut self, level: NotifyLevel, message: String) {
        let notification = Notification {
            level,
            message,
            bar_index: self.bar_index().unwrap_or(0),
            time: self.current.map_or(0, |b| b.time),
        };
        tracing::debug!(%notification, "script notification");
        self.notifications.push(notification);
        self.notifications_raised += 1;
    }

    /// Notifications raised since the last [`Environment::take_notifications`].
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Remove and return the pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Every notification raised so far, taken or not.
    pub fn notifications_raised(&self) -> usize {
        self.notifications_raised
    }
}

fn price_field(name: &str) -> Option<PriceField> {
    Registry::global()
        .lookup(name)
        .and_then(|entry| match entry.builtin() {
            Some(BuiltinId::Price(field)) => Some(field),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Direction;
    use proptest::prelude::*;

    fn bar(close: f64, time: i64) -> Bar {
        Bar {
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
            time,
        }
    }

    const DAY: i64 = 86_400_000;

    #[test]
    fn empty_environment_reads_na() {
        let env = Environment::default();
        assert_eq!(env.get("close", 0), Value::Na);
        assert_eq!(env.bar_state(BarStateFlag::Index), Value::Na);
        assert_eq!(env.time_field(TimeField::Year), Value::Na);
        assert!(env.get_series("close").is_empty());
    }

    #[test]
    fn update_bar_appends_derived_channels() {
        let mut env = Environment::default();
        env.update_bar(Bar {
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 100.0,
            time: 0,
        });
        assert_eq!(env.get("hl2", 0), Value::Number(10.5));
        assert_eq!(env.get("ohlc4", 0), Value::Number(10.5));
        assert_eq!(env.get("volume", 0), Value::Number(100.0));
        assert_eq!(env.bar_state(BarStateFlag::Index), Value::Number(0.0));
        assert_eq!(env.bar_state(BarStateFlag::IsFirst), Value::Bool(true));
    }

    #[test]
    fn history_offsets_read_back() {
        let mut env = Environment::default();
        for (i, c) in [1.0, 2.0, 3.0].into_iter().enumerate() {
            env.update_bar(bar(c, i as i64 * DAY));
        }
        assert_eq!(env.get("close", 0), Value::Number(3.0));
        assert_eq!(env.get("close", 2), Value::Number(1.0));
        assert_eq!(env.get("close", 3), Value::Na);
        assert_eq!(env.bar_state(BarStateFlag::Index), Value::Number(2.0));
    }

    #[test]
    fn variables_carry_forward_between_bars() {
        let mut env = Environment::default();
        env.update_bar(bar(1.0, 0));
        env.set("x", Value::Number(5.0));
        env.set("x", Value::Number(6.0));
        env.update_bar(bar(2.0, DAY));
        assert_eq!(env.get("x", 0), Value::Number(6.0));
        env.set("x", Value::Number(7.0));
        assert_eq!(env.get("x", 1), Value::Number(6.0));
        assert_eq!(
            env.get_series("x"),
            vec![Value::Number(6.0), Value::Number(7.0)]
        );
    }

    #[test]
    fn tick_revises_current_bar() {
        let mut env = Environment::default();
        env.update_bar(bar(10.0, 0));
        env.update_tick(bar(12.0, 0));
        assert_eq!(env.get_series("close").len(), 1);
        assert_eq!(env.get("close", 0), Value::Number(12.0));
        assert_eq!(env.bar_state(BarStateFlag::IsNew), Value::Bool(false));
        assert_eq!(env.bar_state(BarStateFlag::IsRealtime), Value::Bool(true));
        assert_eq!(env.bar_state(BarStateFlag::IsHistory), Value::Bool(false));
        assert_eq!(env.bar_state(BarStateFlag::IsConfirmed), Value::Bool(false));
    }

    #[test]
    fn tick_on_empty_environment_appends() {
        let mut env = Environment::default();
        env.update_tick(bar(10.0, 0));
        assert_eq!(env.get("close", 0), Value::Number(10.0));
        assert_eq!(env.bar_state(BarStateFlag::Index), Value::Number(0.0));
    }

    #[test]
    fn tick_rolls_back_script_writes() {
        let mut env = Environment::default();
        env.update_bar(bar(1.0, 0));
        env.set("count", Value::Number(1.0));
        env.update_bar(bar(2.0, DAY));
        env.set("count", Value::Number(2.0));
        env.set("fresh", Value::Bool(true));
        env.update_tick(bar(2.5, DAY));
        assert_eq!(env.get("count", 0), Value::Number(1.0));
        assert!(!env.has_variable("fresh"));
    }

    #[test]
    fn state_slots_recompute_from_committed_within_a_bar() {
        let st = |v: f64| {
            Some(IndicatorState::Sar(SarState {
                is_long: true,
                sar: v,
                ep: v,
                af: 0.02,
            }))
        };
        let mut env = Environment::default();
        env.update_bar(bar(1.0, 0));
        assert_eq!(env.begin_state(7), None);
        env.commit_state(7, st(1.0));
        env.update_bar(bar(2.0, DAY));
        assert_eq!(env.begin_state(7), st(1.0));
        env.commit_state(7, st(2.0));
        // revision of the same bar starts again from the committed state
        assert_eq!(env.begin_state(7), st(1.0));
        env.commit_state(7, st(2.5));
        env.update_bar(bar(3.0, 2 * DAY));
        assert_eq!(env.begin_state(7), st(2.5));
    }

    #[test]
    fn site_series_capture_once_per_bar() {
        let mut env = Environment::default();
        env.update_bar(bar(1.0, 0));
        env.record_site(3, 0, 1.0);
        env.record_site(3, 0, 1.5);
        env.update_bar(bar(2.0, DAY));
        env.record_site(3, 0, 2.0);
        let window = env.series_window(&SeriesSource::Site(3, 0));
        assert_eq!(&window[..], &[1.5, 2.0]);
        assert!(env.series_window(&SeriesSource::Site(9, 0)).is_empty());
    }

    #[test]
    fn time_components_use_instrument_offset() {
        let instrument = InstrumentInfo {
            timezone: "UTC+10".into(),
            session_open_hour: 10,
            session_close_hour: 16,
            ..InstrumentInfo::default()
        };
        let mut env = Environment::new(&EngineSettings::default(), instrument);
        // 2024-01-15 00:30 UTC is 10:30 in UTC+10, a Monday
        env.update_bar(bar(1.0, 1_705_278_600_000));
        assert_eq!(env.time_field(TimeField::Hour), Value::Number(10.0));
        assert_eq!(env.time_field(TimeField::Minute), Value::Number(30.0));
        assert_eq!(env.time_field(TimeField::DayOfWeek), Value::Number(2.0));
        assert_eq!(env.time_field(TimeField::WeekOfYear), Value::Number(3.0));
        assert_eq!(env.time_field(TimeField::SessionIsMarket), Value::Bool(true));
        assert_eq!(env.time_field(TimeField::SessionIsPremarket), Value::Bool(false));
    }

    #[test]
    fn symbol_fields_come_from_instrument() {
        let instrument = InstrumentInfo {
            ticker: "BHP".into(),
            ..InstrumentInfo::default()
        };
        let env = Environment::new(&EngineSettings::default(), instrument);
        assert_eq!(env.symbol_field(SymbolField::Ticker), Value::Str("BHP".into()));
        assert_eq!(env.symbol_field(SymbolField::Mintick), Value::Number(0.01));
    }

    #[test]
    fn plots_are_readable_as_series() {
        let mut env = Environment::default();
        env.update_bar(bar(1.0, 0));
        env.plot_value("fast", 1.0, None);
        env.update_bar(bar(2.0, DAY));
        env.plot_value("fast", 2.0, None);
        assert_eq!(
            env.get_series("fast"),
            vec![Value::Number(1.0), Value::Number(2.0)]
        );
        assert_eq!(env.get("fast", 1), Value::Number(1.0));
    }

    #[test]
    fn pending_orders_fill_on_next_bar_and_equity_is_marked() {
        let mut env = Environment::default();
        env.update_bar(bar(100.0, 0));
        env.account_mut()
            .entry("a", Direction::Long, 1.0, 100.0, 0, 0)
            .unwrap();
        env.update_bar(bar(110.0, DAY));
        assert_eq!(env.metric(StrategyMetric::OpenProfit), Value::Number(10.0));
        assert_eq!(env.account().equity_curve().len(), 2);
    }

    proptest! {
        #[test]
        fn series_length_is_min_of_bars_and_capacity(n in 0usize..200, cap in 1usize..64) {
            let mut env = Environment::with_max_bars_back(cap);
            for i in 0..n {
                env.update_bar(bar(i as f64, i as i64 * DAY));
            }
            for name in ["open", "high", "low", "close", "volume", "time"] {
                prop_assert_eq!(env.get_series(name).len(), n.min(cap));
            }
        }
    }
}
