//! Runtime settings loaded through [`ConfigPort`].
//!
//! Every key has a default, so an empty configuration is valid. Values are
//! checked by [`crate::domain::config_validation`] before they are read here.

use std::collections::HashMap;

use chrono::{FixedOffset, Offset, Utc};

use crate::domain::config_validation::validate_runtime_config;
use crate::domain::error::DevScriptError;
use crate::domain::series::DEFAULT_MAX_BARS_BACK;
use crate::domain::value::Value;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_QTY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub max_bars_back: usize,
    /// Node visits allowed per bar before evaluation aborts.
    pub max_steps: u64,
    pub initial_capital: f64,
    pub default_qty: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_bars_back: DEFAULT_MAX_BARS_BACK,
            max_steps: DEFAULT_MAX_STEPS,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            default_qty: DEFAULT_QTY,
        }
    }
}

/// Static metadata for the traded symbol, exposed as `syminfo*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentInfo {
    pub ticker: String,
    pub exchange: String,
    pub currency: String,
    pub mintick: f64,
    pub point_value: f64,
    pub timezone: String,
    pub timeframe: String,
    pub session_open_hour: u32,
    pub session_close_hour: u32,
}

impl Default for InstrumentInfo {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            exchange: String::new(),
            currency: "USD".to_string(),
            mintick: 0.01,
            point_value: 1.0,
            timezone: "UTC".to_string(),
            timeframe: "1D".to_string(),
            session_open_hour: 9,
            session_close_hour: 16,
        }
    }
}

impl InstrumentInfo {
    /// Offset used for time components and session flags. Unparseable zones fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        parse_utc_offset(&self.timezone).unwrap_or_else(|| Utc.fix())
    }
}

/// Parse `UTC`, `UTC+5`, `UTC-03:30`, `+09:00` or `-0500` into a fixed offset.
pub fn parse_utc_offset(zone: &str) -> Option<FixedOffset> {
    let zone = zone.trim();
    let rest = zone
        .strip_prefix("UTC")
        .or_else(|| zone.strip_prefix("GMT"))
        .unwrap_or(zone);
    if rest.is_empty() {
        return Some(Utc.fix());
    }
    let (sign, digits) = match rest.as_bytes().first()? {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Everything the engine reads from configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub engine: EngineSettings,
    pub instrument: InstrumentInfo,
    /// `[params]` overrides for `param` declarations, keyed by parameter name.
    pub params: HashMap<String, Value>,
}

impl RuntimeConfig {
    /// Validate then load every section. Missing keys take their defaults.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, DevScriptError> {
        validate_runtime_config(config)?;

        let defaults = EngineSettings::default();
        let engine = EngineSettings {
            max_bars_back: config.get_int(
                "engine",
                "max_bars_back",
                defaults.max_bars_back as i64,
            ) as usize,
            max_steps: config.get_int("engine", "max_steps", defaults.max_steps as i64) as u64,
            initial_capital: config.get_double(
                "strategy",
                "initial_capital",
                defaults.initial_capital,
            ),
            default_qty: config.get_double("strategy", "default_qty", defaults.default_qty),
        };

        let base = InstrumentInfo::default();
        let text = |key: &str, fallback: String| {
            config
                .get_string("instrument", key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
        };
        let instrument = InstrumentInfo {
            ticker: text("ticker", base.ticker.clone()),
            exchange: text("exchange", base.exchange.clone()),
            currency: text("currency", base.currency.clone()),
            mintick: config.get_double("instrument", "mintick", base.mintick),
            point_value: config.get_double("instrument", "point_value", base.point_value),
            timezone: text("timezone", base.timezone.clone()),
            timeframe: text("timeframe", base.timeframe.clone()),
            session_open_hour: config.get_int(
                "instrument",
                "session_open_hour",
                base.session_open_hour as i64,
            ) as u32,
            session_close_hour: config.get_int(
                "instrument",
                "session_close_hour",
                base.session_close_hour as i64,
            ) as u32,
        };

        let params = config
            .keys("params")
            .into_iter()
            .filter_map(|key| {
                let raw = config.get_string("params", &key)?;
                Some((key, parse_param_value(&raw)))
            })
            .collect();

        Ok(Self {
            engine,
            instrument,
            params,
        })
    }
}

/// `true`/`false`, a number, or a string (surrounding quotes stripped).
pub fn parse_param_value(raw: &str) -> Value {
    let raw = raw.trim();
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "na" => return Value::Na,
        _ => {}
    }
    if let Ok(n) = raw.parse::<f64>() {
        return Value::Number(n);
    }
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    Value::Str(unquoted.to_string())
}
