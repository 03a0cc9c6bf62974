//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarFeed;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::tracing_notifier::TracingNotifier;
use crate::domain::ast::Program;
use crate::domain::config::RuntimeConfig;
use crate::domain::environment::Environment;
use crate::domain::error::DevScriptError;
use crate::domain::metrics::{TradeStats, max_drawdown};
use crate::domain::runtime::{Engine, compile, compile_strict};
use crate::domain::value::Value;
use crate::ports::data_port::BarFeed;

#[derive(Parser, Debug)]
#[command(name = "devscript", about = "DevScript indicator and strategy runtime")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a script over a CSV bar file
    Run {
        #[arg(short, long)]
        script: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Compile a script without running it
    Check {
        #[arg(short, long)]
        script: PathBuf,
        /// Reject unrecognized characters instead of skipping them
        #[arg(long)]
        strict: bool,
    },
    /// Feed bars, then evaluate the first builtin named in an expression
    Eval {
        #[arg(short, long)]
        expr: String,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            script,
            data,
            config,
        } => run_script(&script, &data, config.as_deref()),
        Command::Check { script, strict } => run_check(&script, strict),
        Command::Eval { expr, data, config } => run_eval(&expr, &data, config.as_deref()),
    }
}

fn fail(err: DevScriptError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

/// Load and validate the INI config, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<RuntimeConfig, DevScriptError> {
    let Some(path) = path else {
        return Ok(RuntimeConfig::default());
    };
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| DevScriptError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    RuntimeConfig::from_port(&adapter)
}

/// Read and compile a script, printing compile errors with a caret under the offending column.
fn load_program(path: &Path, strict: bool) -> Result<Program, ExitCode> {
    let source = fs::read_to_string(path).map_err(|e| fail(e.into()))?;
    let compiled = if strict {
        compile_strict(&source)
    } else {
        compile(&source)
    };
    compiled.map_err(|e| {
        eprintln!(
            "error: failed to compile {}:\n{}",
            path.display(),
            e.display_with_context(&source)
        );
        ExitCode::from(&DevScriptError::Compile(e))
    })
}

fn run_script(script: &Path, data: &Path, config: Option<&Path>) -> ExitCode {
    let config = match load_config(config) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let program = match load_program(script, false) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let bars = match CsvBarFeed::new(data.to_path_buf()).fetch_bars() {
        Ok(b) => b,
        Err(e) => return fail(e),
    };

    eprintln!("Running {} over {} bars", script.display(), bars.len());
    let mut engine = Engine::new(program, &config).with_notifier(Box::new(TracingNotifier));
    if let Err(e) = engine.run(&bars) {
        return fail(e);
    }
    print!("{}", render_summary(engine.environment()));
    ExitCode::SUCCESS
}

fn run_check(script: &Path, strict: bool) -> ExitCode {
    match load_program(script, strict) {
        Ok(program) => {
            println!(
                "OK: {} statements, {} call sites",
                program.statements.len(),
                program.call_sites
            );
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

fn run_eval(expr: &str, data: &Path, config: Option<&Path>) -> ExitCode {
    let config = match load_config(config) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let bars = match CsvBarFeed::new(data.to_path_buf()).fetch_bars() {
        Ok(b) => b,
        Err(e) => return fail(e),
    };
    let mut engine = Engine::new(Program::default(), &config);
    if let Err(e) = engine.run(&bars) {
        return fail(e);
    }
    match engine.evaluate_code(expr) {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(source) => fail(DevScriptError::Evaluation {
            bar_index: engine.environment().bar_index().unwrap_or(0),
            source,
        }),
    }
}

/// Plot values on the last bar, ledger statistics and notification count.
pub fn render_summary(env: &Environment) -> String {
    let mut out = format!("bars: {}\n", env.stamp());
    for plot in env.plots() {
        let last = plot
            .series
            .series()
            .last()
            .map_or(Value::Na, |&v| Value::from_f64(v));
        out.push_str(&format!("plot {}: {}\n", plot.title, last));
    }

    let account = env.account();
    let stats = TradeStats::compute(account.closed_trades());
    let (dd, dd_pct) = max_drawdown(account.equity_curve());
    out.push_str(&format!(
        "trades: {} (won {}, lost {}, even {})\n",
        stats.total_trades(),
        stats.trades_won,
        stats.trades_lost,
        stats.trades_even
    ));
    out.push_str(&format!("open positions: {}\n", account.open_positions().len()));
    out.push_str(&format!("net profit: {:.2}\n", stats.net_profit));
    out.push_str(&format!("max drawdown: {:.2} ({:.2}%)\n", dd, dd_pct));
    out.push_str(&format!("notifications: {}\n", env.notifications_raised()));
    out
}
