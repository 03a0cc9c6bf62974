//! End-to-end tests driving compiled scripts through the engine.
//!
//! Tests cover:
//! - Purity of expression evaluation against an unchanged environment
//! - History length accounting under `max_bars_back`
//! - Constant-series indicator behaviour (SMA, EMA, RSI)
//! - Strategy ledger profit and drawdown
//! - Pivot strictness
//! - The constant-then-breakout bar scenario

mod common;

use approx::assert_relative_eq;
use common::*;
use devscript::adapters::file_config_adapter::FileConfigAdapter;
use devscript::domain::account::EquityPoint;
use devscript::domain::config::RuntimeConfig;
use devscript::domain::error::{DevScriptError, EvalError};
use devscript::domain::evaluator::Evaluator;
use devscript::domain::metrics::max_drawdown;
use devscript::domain::runtime::compile;
use devscript::domain::value::Value;
use proptest::prelude::*;

mod purity {
    use super::*;

    #[test]
    fn expression_is_pure_against_unchanged_environment() {
        let engine = run_closes("", &[10.0, 11.0, 12.5]);
        let program = compile("(close * 2 + high[1]) / taSma(close, 2)").unwrap();
        let node = &program.statements[0];

        let mut env = engine.environment().clone();
        let mut evaluator = Evaluator::default();
        let first = evaluator.evaluate(node, &mut env).unwrap();
        let second = evaluator.evaluate(node, &mut env).unwrap();
        assert_eq!(first, second);
        assert!(!first.is_na());
    }

    #[test]
    fn two_engines_agree_on_the_same_bars() {
        let source = "let e = taEma(close, 3)\nlet r = taRsi(close, 3)";
        let closes = [10.0, 12.0, 11.0, 13.0, 12.5, 14.0];
        let a = run_closes(source, &closes);
        let b = run_closes(source, &closes);
        assert_eq!(a.environment().get("e", 0), b.environment().get("e", 0));
        assert_eq!(a.environment().get("r", 0), b.environment().get("r", 0));
    }
}

mod history_accounting {
    use super::*;

    proptest! {
        #[test]
        fn price_series_length_is_capped(n in 1usize..60, cap in 1usize..40) {
            let mut config = RuntimeConfig::default();
            config.engine.max_bars_back = cap;
            let mut engine = engine_with("let c = close", &config);
            let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
            engine.run(&make_bars(&closes)).unwrap();

            let env = engine.environment();
            for name in ["open", "high", "low", "close", "volume"] {
                prop_assert_eq!(env.get_series(name).len(), n.min(cap));
            }
            prop_assert_eq!(env.get_series("c").len(), n.min(cap));
        }
    }
}

mod constant_series {
    use super::*;

    const SOURCE: &str = "let s = taSma(close, 5)\nlet e = taEma(close, 5)\nlet r = taRsi(close, 5)";

    #[test]
    fn sma_and_ema_equal_the_constant() {
        let engine = run_closes(SOURCE, &[42.0; 12]);
        assert_relative_eq!(number(&engine, "s"), 42.0, epsilon = 1e-9);
        assert_relative_eq!(number(&engine, "e"), 42.0, epsilon = 1e-9);
    }

    #[test]
    fn rsi_without_losses_is_100() {
        let engine = run_closes(SOURCE, &[42.0; 12]);
        assert_relative_eq!(number(&engine, "r"), 100.0, epsilon = 1e-9);

        let rising: Vec<f64> = (0..12).map(|i| 10.0 + i as f64).collect();
        let engine = run_closes(SOURCE, &rising);
        assert_relative_eq!(number(&engine, "r"), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn indicators_are_na_during_warmup() {
        let engine = run_closes(SOURCE, &[42.0; 3]);
        let env = engine.environment();
        assert_eq!(env.get("s", 0), Value::Na);
        assert_eq!(env.get("r", 0), Value::Na);
    }
}

mod strategy_ledger {
    use super::*;

    #[test]
    fn single_long_trade_profit_and_net_profit() {
        let script = "\
if barIndex == 0 { strategyEntry(\"L\", strategyLong, 2) }
if barIndex == 2 { strategyClose(\"L\") }
let np = strategyNetProfit";
        let engine = run_closes(script, &[100.0, 110.0, 125.0]);
        let account = engine.environment().account();

        let trades = account.closed_trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].entry_price, 100.0);
        assert_eq!(trades[0].exit_price, 125.0);
        assert_eq!(trades[0].profit, (125.0 - 100.0) * 2.0);
        assert_eq!(number(&engine, "np"), trades[0].profit);
        assert!(account.open_positions().is_empty());
    }

    #[test]
    fn short_trade_profits_from_a_fall() {
        let script = "\
if barIndex == 0 { strategyEntry(\"S\", strategyShort) }
if barIndex == 1 { strategyClose(\"S\") }";
        let engine = run_closes(script, &[50.0, 45.0]);
        let trades = engine.environment().account().closed_trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].profit, 5.0);
    }

    #[test]
    fn closing_unknown_position_is_a_no_op() {
        let engine = run_closes("let closed = strategyClose(\"nope\")", &[1.0]);
        assert_eq!(engine.environment().get("closed", 0), Value::Bool(false));
        assert!(engine.environment().account().closed_trades().is_empty());
    }

    #[test]
    fn non_positive_quantity_is_catchable() {
        let script = "\
var caught = 0
try { strategyEntry(\"L\", strategyLong, -1) } catch { caught = 1 }";
        let engine = run_closes(script, &[1.0]);
        assert_eq!(number(&engine, "caught"), 1.0);
        assert!(engine.environment().account().open_positions().is_empty());
    }

    #[test]
    fn drawdown_of_known_curve() {
        let curve: Vec<EquityPoint> = [100.0, 90.0, 95.0, 80.0, 120.0]
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                time: i as i64,
                equity,
            })
            .collect();
        let (dd, dd_pct) = max_drawdown(&curve);
        assert_eq!(dd, 20.0);
        assert_relative_eq!(dd_pct, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn rising_equity_has_no_drawdown() {
        let script = "\
if barIndex == 0 { strategyEntry(\"L\", strategyLong) }
let dd = strategyMaxDrawdown";
        let engine = run_closes(script, &[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(number(&engine, "dd"), 0.0);
    }
}

mod pivots {
    use super::*;

    const SOURCE: &str = "let ph = taPivotHigh(close, 2, 2)\nlet pl = taPivotLow(close, 2, 2)";

    #[test]
    fn strict_peak_is_reported_right_bars_later() {
        let engine = run_closes(SOURCE, &[1.0, 2.0, 5.0, 2.0, 1.0]);
        assert_eq!(engine.environment().get("ph", 0), Value::Number(5.0));
        assert_eq!(engine.environment().get("pl", 0), Value::Na);
    }

    #[test]
    fn equal_neighbour_cancels_the_pivot() {
        for closes in [
            [1.0, 5.0, 5.0, 2.0, 1.0],
            [1.0, 2.0, 5.0, 5.0, 1.0],
            [6.0, 2.0, 5.0, 2.0, 1.0],
        ] {
            let engine = run_closes(SOURCE, &closes);
            assert_eq!(engine.environment().get("ph", 0), Value::Na, "{closes:?}");
        }
    }

    #[test]
    fn strict_trough_is_pivot_low() {
        let engine = run_closes(SOURCE, &[5.0, 4.0, 1.0, 3.0, 6.0]);
        assert_eq!(engine.environment().get("pl", 0), Value::Number(1.0));
    }
}

mod breakout_scenario {
    use super::*;

    #[test]
    fn sma_rises_after_breakout_bar_and_bar_index_steps_by_one() {
        let mut engine = engine("let s = taSma(close, 20)\nlet bi = barIndex");
        for i in 0..20 {
            engine
                .on_bar(make_bar(i, 10.0, 12.0, 9.0, 11.0, 100.0))
                .unwrap();
            assert_eq!(number(&engine, "bi"), i as f64);
        }
        let before = number(&engine, "s");
        assert_relative_eq!(before, 11.0, epsilon = 1e-9);

        engine
            .on_bar(make_bar(20, 11.0, 15.0, 10.0, 14.0, 200.0))
            .unwrap();
        assert_eq!(number(&engine, "bi"), 20.0);
        let after = number(&engine, "s");
        assert!(after > before);
        assert_relative_eq!(after, 11.15, epsilon = 1e-9);
    }
}

mod errors {
    use super::*;

    #[test]
    fn evaluation_error_keeps_earlier_statements() {
        let mut engine = engine("let a = close\nlet b = arrayGet(arrayNew(), 3)\nlet c = 1");
        let err = engine.run(&make_bars(&[7.0])).unwrap_err();
        let DevScriptError::Evaluation { bar_index, source } = err else {
            panic!("expected evaluation error");
        };
        assert_eq!(bar_index, 0);
        assert!(matches!(source, EvalError::IndexOutOfRange { .. }));
        assert_eq!(engine.environment().get("a", 0), Value::Number(7.0));
        assert!(!engine.environment().has_variable("c"));
    }

    #[test]
    fn division_by_zero_is_na() {
        let engine = run_closes("let q = close / 0", &[3.0]);
        assert_eq!(engine.environment().get("q", 0), Value::Na);
    }
}

mod configuration {
    use super::*;

    #[test]
    fn ini_settings_flow_into_the_engine() {
        let adapter = FileConfigAdapter::from_string(
            "[engine]\nmax_bars_back = 3\n\n[strategy]\ninitial_capital = 5000\n\n[params]\nlength = 2\n",
        )
        .unwrap();
        let config = RuntimeConfig::from_port(&adapter).unwrap();
        let mut engine = engine_with(
            "param length = 10\nlet s = taSma(close, length)\nlet cap = strategyInitialCapital",
            &config,
        );
        engine.run(&make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();

        assert_eq!(number(&engine, "s"), 4.5);
        assert_eq!(number(&engine, "cap"), 5000.0);
        assert_eq!(engine.environment().get_series("close").len(), 3);
    }
}

mod resource_limits {
    use super::*;

    #[test]
    fn huge_constructors_fail_inside_try_and_the_run_continues() {
        let script = "\
var caught = 0
try { matrixNew(10000000000, 10000000000, 0) } catch { caught = caught + 1 }
try { arrayNew(10000000000) } catch { caught = caught + 1 }
try { tableNew(10000000000, 10000000000) } catch { caught = caught + 1 }";
        let engine = run_closes(script, &[1.0, 2.0]);
        assert_eq!(number(&engine, "caught"), 6.0);
    }

    #[test]
    fn uncaught_oversized_array_reports_a_size_error() {
        let mut engine = engine("let a = arrayNew(10000000000)");
        let err = engine.run(&make_bars(&[1.0])).unwrap_err();
        let DevScriptError::Evaluation { source, .. } = err else {
            panic!("expected evaluation error");
        };
        assert!(matches!(source, EvalError::SizeLimit { .. }));
    }

    #[test]
    fn cycles_through_arrays_and_maps_are_rejected() {
        let script = "\
var caught = 0
let a = arrayNew()
let b = arrayNew()
let m = mapNew()
try { arrayPush(a, a) } catch { caught = caught + 1 }
arrayPush(b, a)
try { arrayPush(a, b) } catch { caught = caught + 1 }
mapPut(m, 1, b)
try { arrayPush(a, m) } catch { caught = caught + 1 }
let same = a == a
let has = arrayIncludes(b, a)
let text = strToString(b)";
        let engine = run_closes(script, &[1.0]);
        let env = engine.environment();
        assert_eq!(number(&engine, "caught"), 3.0);
        assert_eq!(env.get("same", 0), Value::Bool(true));
        assert_eq!(env.get("has", 0), Value::Bool(true));
        assert_eq!(env.get("text", 0), Value::Str("[[]]".into()));
    }
}
