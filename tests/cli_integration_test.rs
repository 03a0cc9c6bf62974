//! CLI integration tests.
//!
//! Tests cover:
//! - Config loading from INI files on disk
//! - `check` with lenient and strict lexing
//! - `run` over CSV files, including each failure category's exit code
//! - `eval` against fed bars
//! - Summary rendering

mod common;

use clap::Parser;
use common::*;
use devscript::cli::{self, Cli};
use devscript::domain::error::DevScriptError;
use devscript::domain::value::Value;
use std::path::Path;
use std::process::ExitCode;

// ExitCode is compared through its Debug output.
fn code(exit: ExitCode) -> String {
    format!("{exit:?}")
}

fn expect(exit: ExitCode, expected: u8) {
    assert_eq!(code(exit), code(ExitCode::from(expected)));
}

fn run_args(args: &[&str]) -> ExitCode {
    let mut full = vec!["devscript"];
    full.extend_from_slice(args);
    cli::run(Cli::parse_from(full))
}

fn path(file: &tempfile::NamedTempFile) -> &str {
    file.path().to_str().unwrap()
}

const SCRIPT: &str = r#"
param length = 3
let fast = taSma(close, length)
plot(fast, "fast")
if barIndex == 1 { strategyEntry("L", strategyLong) }
if barIndex == 4 { strategyClose("L") }
"#;

fn sample_csv() -> tempfile::NamedTempFile {
    write_temp(&bars_csv(&make_bars(&[10.0, 11.0, 12.0, 13.0, 15.0, 14.0])), ".csv")
}

mod config_loading {
    use super::*;

    #[test]
    fn no_path_gives_defaults() {
        let config = cli::load_config(None).unwrap();
        assert_eq!(config.engine.max_bars_back, 5000);
        assert!(config.params.is_empty());
    }

    #[test]
    fn reads_ini_file() {
        let ini = write_temp(
            "[engine]\nmax_bars_back = 50\n\n[instrument]\nticker = BHP\n\n[params]\nlength = 5\n",
            ".ini",
        );
        let config = cli::load_config(Some(ini.path())).unwrap();
        assert_eq!(config.engine.max_bars_back, 50);
        assert_eq!(config.instrument.ticker, "BHP");
        assert_eq!(config.params.get("length"), Some(&Value::Number(5.0)));
    }

    #[test]
    fn missing_file_is_parse_error() {
        let err = cli::load_config(Some(Path::new("/nonexistent/devscript.ini"))).unwrap_err();
        assert!(matches!(err, DevScriptError::ConfigParse { .. }));
    }

    #[test]
    fn invalid_value_is_rejected() {
        let ini = write_temp("[engine]\nmax_bars_back = 0\n", ".ini");
        let err = cli::load_config(Some(ini.path())).unwrap_err();
        assert!(matches!(err, DevScriptError::ConfigInvalid { .. }));
    }
}

mod check_command {
    use super::*;

    #[test]
    fn valid_script_passes() {
        let script = write_temp(SCRIPT, ".ds");
        expect(run_args(&["check", "--script", path(&script)]), 0);
    }

    #[test]
    fn syntax_error_exits_with_compile_code() {
        let script = write_temp("let x = (1 + 2\n", ".ds");
        expect(run_args(&["check", "--script", path(&script)]), 4);
    }

    #[test]
    fn strict_mode_rejects_stray_characters() {
        let script = write_temp("let x = 1 $\n", ".ds");
        expect(run_args(&["check", "--script", path(&script)]), 0);
        expect(run_args(&["check", "--script", path(&script), "--strict"]), 4);
    }

    #[test]
    fn missing_script_is_io_error() {
        expect(run_args(&["check", "--script", "/nonexistent/script.ds"]), 1);
    }
}

mod run_command {
    use super::*;

    #[test]
    fn runs_script_over_csv() {
        let script = write_temp(SCRIPT, ".ds");
        let data = sample_csv();
        expect(
            run_args(&["run", "--script", path(&script), "--data", path(&data)]),
            0,
        );
    }

    #[test]
    fn config_params_are_applied() {
        let script = write_temp(SCRIPT, ".ds");
        let data = sample_csv();
        let ini = write_temp("[params]\nlength = 2\n", ".ini");
        expect(
            run_args(&[
                "run",
                "--script",
                path(&script),
                "--data",
                path(&data),
                "--config",
                path(&ini),
            ]),
            0,
        );
    }

    #[test]
    fn bad_config_exits_with_config_code() {
        let script = write_temp(SCRIPT, ".ds");
        let data = sample_csv();
        let ini = write_temp("[engine]\nmax_steps = 0\n", ".ini");
        expect(
            run_args(&[
                "run",
                "--script",
                path(&script),
                "--data",
                path(&data),
                "--config",
                path(&ini),
            ]),
            2,
        );
    }

    #[test]
    fn malformed_csv_exits_with_data_code() {
        let script = write_temp(SCRIPT, ".ds");
        let data = write_temp("time,open,high,low,close,volume\n0,1,2,0,x,5\n", ".csv");
        expect(
            run_args(&["run", "--script", path(&script), "--data", path(&data)]),
            3,
        );
    }

    #[test]
    fn empty_csv_exits_with_no_data_code() {
        let script = write_temp(SCRIPT, ".ds");
        let data = write_temp("time,open,high,low,close,volume\n", ".csv");
        expect(
            run_args(&["run", "--script", path(&script), "--data", path(&data)]),
            5,
        );
    }

    #[test]
    fn uncaught_evaluation_error_exits_with_evaluation_code() {
        let script = write_temp("let x = arrayGet(arrayNew(), 0)\n", ".ds");
        let data = sample_csv();
        expect(
            run_args(&["run", "--script", path(&script), "--data", path(&data)]),
            6,
        );
    }
}

mod eval_command {
    use super::*;

    #[test]
    fn evaluates_builtin_after_feeding_bars() {
        let data = sample_csv();
        expect(run_args(&["eval", "--expr", "taTr", "--data", path(&data)]), 0);
        expect(run_args(&["eval", "--expr", "x + 1", "--data", path(&data)]), 0);
    }

    #[test]
    fn missing_data_exits_with_data_code() {
        expect(
            run_args(&["eval", "--expr", "close", "--data", "/nonexistent/bars.csv"]),
            3,
        );
    }
}

mod summary {
    use super::*;

    #[test]
    fn summary_lists_plots_and_ledger() {
        let engine = run_closes(SCRIPT, &[10.0, 11.0, 12.0, 13.0, 15.0, 14.0]);
        let out = cli::render_summary(engine.environment());

        assert!(out.contains("bars: 6"), "{out}");
        assert!(out.contains("plot fast: 14"), "{out}");
        assert!(out.contains("trades: 1 (won 1, lost 0, even 0)"), "{out}");
        assert!(out.contains("net profit: 4.00"), "{out}");
        assert!(out.contains("open positions: 0"), "{out}");
        assert!(out.contains("max drawdown: "), "{out}");
        assert!(out.contains("notifications: 0"), "{out}");
    }

    #[test]
    fn summary_counts_notifications_after_they_are_forwarded() {
        let engine = run_closes("logInfo(\"tick\")", &[1.0, 2.0, 3.0]);
        assert!(engine.environment().notifications().is_empty());
        let out = cli::render_summary(engine.environment());
        assert!(out.ends_with("notifications: 3\n"), "{out}");
    }
}
