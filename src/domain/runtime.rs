//! Compile scripts and drive them bar by bar.

use crate::domain::ast::Program;
use crate::domain::config::RuntimeConfig;
use crate::domain::environment::Environment;
use crate::domain::error::{CompileError, DevScriptError, EvalError};
use crate::domain::evaluator::{Evaluator, EvaluatorSettings, Phase};
use crate::domain::lexer::{tokenize, tokenize_strict};
use crate::domain::ohlcv::Bar;
use crate::domain::parser::{parse_program, resolve_single};
use crate::domain::registry::Registry;
use crate::domain::value::Value;
use crate::ports::notification_port::NotificationPort;

/// Compile source text. Unrecognized characters are skipped.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let tokens = tokenize(source, Registry::global());
    finish(parse_program(&tokens))
}

/// Compile source text, rejecting unrecognized characters.
pub fn compile_strict(source: &str) -> Result<Program, CompileError> {
    let tokens = tokenize_strict(source, Registry::global())?;
    finish(parse_program(&tokens))
}

fn finish(result: Result<Program, CompileError>) -> Result<Program, CompileError> {
    match &result {
        Ok(program) => tracing::debug!(
            statements = program.statements.len(),
            call_sites = program.call_sites,
            "script compiled"
        ),
        Err(e) => tracing::debug!(error = %e, "compile failed"),
    }
    result
}

/// A compiled program bound to its market-data environment.
pub struct Engine {
    program: Program,
    evaluator: Evaluator,
    env: Environment,
    notifier: Option<Box<dyn NotificationPort>>,
}

impl Engine {
    pub fn new(program: Program, config: &RuntimeConfig) -> Self {
        let evaluator = Evaluator::new(EvaluatorSettings::from(&config.engine))
            .with_params(config.params.clone());
        Self {
            program,
            evaluator,
            env: Environment::new(&config.engine, config.instrument.clone()),
            notifier: None,
        }
    }

    /// Forward script notifications to `notifier` as they are raised.
    pub fn with_notifier(mut self, notifier: Box<dyn NotificationPort>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Append `bar` and run the program with `onBar` blocks.
    pub fn on_bar(&mut self, bar: Bar) -> Result<Value, EvalError> {
        self.env.update_bar(bar);
        self.execute(Phase::Bar)
    }

    /// Revise the current bar with `bar` and run the program with `onTick` blocks.
    pub fn on_tick(&mut self, bar: Bar) -> Result<Value, EvalError> {
        self.env.update_tick(bar);
        self.execute(Phase::Tick)
    }

    /// Feed a batch of historical bars, stopping at the first evaluation error.
    pub fn run(&mut self, bars: &[Bar]) -> Result<(), DevScriptError> {
        let last = bars.len().saturating_sub(1);
        for (i, bar) in bars.iter().enumerate() {
            self.env.update_bar(*bar);
            self.env.mark_last(i == last);
            if let Err(source) = self.execute(Phase::Bar) {
                let bar_index = self.env.bar_index().unwrap_or(0);
                tracing::warn!(bar_index, error = %source, "evaluation aborted");
                return Err(DevScriptError::Evaluation { bar_index, source });
            }
        }
        tracing::info!(
            bars = bars.len(),
            trades = self.env.account().closed_trades().len(),
            "run complete"
        );
        Ok(())
    }

    /// Evaluate the first builtin named in `code` against the current environment,
    /// with every parameter at its default. Code naming no builtin yields `na`.
    pub fn evaluate_code(&mut self, code: &str) -> Result<Value, EvalError> {
        let registry = Registry::global();
        let tokens = tokenize(code, registry);
        match resolve_single(&tokens, registry) {
            Some(entry) => self.evaluator.call_entry(entry, &mut self.env),
            None => Ok(Value::Na),
        }
    }

    fn execute(&mut self, phase: Phase) -> Result<Value, EvalError> {
        let result = self.evaluator.run(&self.program, &mut self.env, phase);
        self.forward_notifications();
        result
    }

    /// Hand pending notifications to the notifier. They are dropped either way.
    fn forward_notifications(&mut self) {
        let pending = self.env.take_notifications();
        if let Some(notifier) = &self.notifier {
            for notification in &pending {
                notifier.notify(notification);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::Notification;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn bar(close: f64, i: i64) -> Bar {
        Bar {
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000.0,
            time: i * 60_000,
        }
    }

    struct Collect(Rc<RefCell<Vec<String>>>);

    impl NotificationPort for Collect {
        fn notify(&self, notification: &Notification) {
            self.0.borrow_mut().push(notification.message.clone());
        }
    }

    #[test]
    fn strict_compile_rejects_stray_characters() {
        assert!(compile("let x = 1 $").is_ok());
        assert!(matches!(
            compile_strict("let x = 1 $"),
            Err(CompileError::Lex(_))
        ));
    }

    #[test]
    fn notifications_are_forwarded_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let program = compile("logInfo(\"bar\")").unwrap();
        let mut engine = Engine::new(program, &RuntimeConfig::default())
            .with_notifier(Box::new(Collect(Rc::clone(&seen))));
        engine.run(&[bar(1.0, 0), bar(2.0, 1)]).unwrap();
        assert_eq!(*seen.borrow(), vec!["bar", "bar"]);
    }

    #[test]
    fn forwarded_notifications_are_not_retained() {
        let program = compile("logInfo(\"a\")\nalert(\"b\")").unwrap();
        let mut engine = Engine::new(program, &RuntimeConfig::default());
        let bars: Vec<Bar> = (0..500).map(|i| bar(1.0, i)).collect();
        engine.run(&bars).unwrap();
        assert!(engine.environment().notifications().is_empty());
        assert_eq!(engine.environment().notifications_raised(), 1_000);
    }

    #[test]
    fn run_reports_the_failing_bar() {
        let program = compile("if close > 1 { arrayGet(arrayNew(), 0) }").unwrap();
        let mut engine = Engine::new(program, &RuntimeConfig::default());
        let err = engine
            .run(&[bar(1.0, 0), bar(1.0, 1), bar(2.0, 2)])
            .unwrap_err();
        assert!(matches!(err, DevScriptError::Evaluation { bar_index: 2, .. }));
    }

    #[test]
    fn last_bar_is_marked() {
        let program = compile("var last = -1\nif barStateIsLast { last = barIndex }").unwrap();
        let mut engine = Engine::new(program, &RuntimeConfig::default());
        engine.run(&[bar(1.0, 0), bar(2.0, 1), bar(3.0, 2)]).unwrap();
        assert_eq!(engine.environment().get("last", 0), Value::Number(2.0));
    }

    #[test]
    fn tick_revises_the_current_bar() {
        let program = compile("var n = 0\nn = n + 1\nlet c = close").unwrap();
        let mut engine = Engine::new(program, &RuntimeConfig::default());
        engine.on_bar(bar(10.0, 0)).unwrap();
        engine.on_tick(bar(11.0, 0)).unwrap();
        engine.on_tick(bar(12.0, 0)).unwrap();
        let env = engine.environment();
        assert_eq!(env.get("n", 0), Value::Number(1.0));
        assert_eq!(env.get("c", 0), Value::Number(12.0));
        assert_eq!(env.get_series("close").len(), 1);
    }

    #[test]
    fn evaluate_code_calls_first_builtin() {
        let mut engine = Engine::new(Program::default(), &RuntimeConfig::default());
        engine.run(&[bar(5.0, 0), bar(7.0, 1)]).unwrap();
        assert_eq!(engine.evaluate_code("close"), Ok(Value::Number(7.0)));
        assert_eq!(engine.evaluate_code("myVar + 1"), Ok(Value::Na));
        assert_eq!(engine.evaluate_code("taTr"), Ok(Value::Number(3.0)));
    }
}
