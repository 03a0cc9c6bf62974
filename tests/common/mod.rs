#![allow(dead_code)]

use devscript::domain::config::RuntimeConfig;
pub use devscript::domain::ohlcv::Bar;
use devscript::domain::runtime::{Engine, compile};
use devscript::domain::value::Value;
use std::io::Write;

pub const DAY: i64 = 86_400_000;

pub fn make_bar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar {
        open,
        high,
        low,
        close,
        volume,
        time: i as i64 * DAY,
    }
}

/// A bar whose open, high and low all sit at `close`.
pub fn flat_bar(i: usize, close: f64) -> Bar {
    make_bar(i, close, close, close, close, 1_000.0)
}

pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| flat_bar(i, c))
        .collect()
}

pub fn engine(source: &str) -> Engine {
    let program = compile(source).unwrap();
    Engine::new(program, &RuntimeConfig::default())
}

pub fn engine_with(source: &str, config: &RuntimeConfig) -> Engine {
    let program = compile(source).unwrap();
    Engine::new(program, config)
}

/// Run `source` over `closes` and return the engine for inspection.
pub fn run_closes(source: &str, closes: &[f64]) -> Engine {
    let mut engine = engine(source);
    engine.run(&make_bars(closes)).unwrap();
    engine
}

pub fn number(engine: &Engine, name: &str) -> f64 {
    match engine.environment().get(name, 0) {
        Value::Number(n) => n,
        other => panic!("expected {name} to be a number, got {other:?}"),
    }
}

pub fn bars_csv(bars: &[Bar]) -> String {
    let mut out = String::from("time,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.time, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
