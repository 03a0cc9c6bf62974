//! Tree-walking evaluator for DevScript programs.
//!
//! One [`Evaluator::run`] executes a program's statements against the
//! environment for the current bar. Top-level variables live in the
//! environment as series; function calls push a local scope that shadows
//! them. Builtin calls bind their arguments against the registry schema and
//! dispatch on [`BuiltinId`].
//!
//! # Evaluation semantics
//!
//! - `na` propagates through arithmetic and is falsy in conditions
//! - `and` / `or` short-circuit and always produce a bool
//! - `x[n]` reads `n` bars back; negative or fractional offsets are errors
//! - loops and blocks evaluate to their last statement, `na` when empty
//! - every node visit counts against a per-bar step budget that `try` cannot catch

pub mod args;
mod collections;
mod drawing;
mod math;
pub mod operators;
mod strategy;
mod ta;
pub mod text;

use std::collections::HashMap;
use std::rc::Rc;

use crate::domain::ast::{
    BinaryOp, Call, Callee, CallSiteId, EventKind, FunctionDecl, Node, Program, ShowKind,
    SwitchCase,
};
use crate::domain::config::{DEFAULT_MAX_STEPS, DEFAULT_QTY, EngineSettings};
use crate::domain::drawing::ShapeDrawing;
use crate::domain::environment::{Environment, SeriesSource};
use crate::domain::error::{ArityError, EvalError};
use crate::domain::registry::{
    BuiltinId, ConstantId, NotifyLevel, ParamType, RegistryEntry, TypeName,
};
use crate::domain::value::{Color, Value};

use self::args::{BoundArgs, check_type, default_value};

/// Maximum nesting of user function calls.
pub const DEFAULT_RECURSION_LIMIT: usize = 64;

/// Call site used for zero-argument calls made outside a program.
const DETACHED_SITE: CallSiteId = CallSiteId::MAX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorSettings {
    pub max_steps: u64,
    pub recursion_limit: usize,
    pub default_qty: f64,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            default_qty: DEFAULT_QTY,
        }
    }
}

impl From<&EngineSettings> for EvaluatorSettings {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            max_steps: settings.max_steps,
            default_qty: settings.default_qty,
            ..Self::default()
        }
    }
}

/// Which event blocks a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A new bar was appended; `onBar` blocks run.
    Bar,
    /// The current bar was revised in place; `onTick` blocks run.
    Tick,
}

impl Phase {
    fn runs(self, kind: EventKind) -> bool {
        matches!(
            (self, kind),
            (Phase::Bar, EventKind::OnBar) | (Phase::Tick, EventKind::OnTick)
        )
    }
}

#[derive(Debug)]
pub struct Evaluator {
    settings: EvaluatorSettings,
    functions: HashMap<String, Rc<FunctionDecl>>,
    scopes: Vec<HashMap<String, Value>>,
    params: HashMap<String, Value>,
    steps: u64,
    phase: Phase,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluatorSettings::default())
    }
}

impl Evaluator {
    pub fn new(settings: EvaluatorSettings) -> Self {
        Self {
            settings,
            functions: HashMap::new(),
            scopes: Vec::new(),
            params: HashMap::new(),
            steps: 0,
            phase: Phase::Bar,
        }
    }

    /// Overrides for `param` declarations, keyed by parameter name.
    pub fn with_params(mut self, params: HashMap<String, Value>) -> Self {
        self.params = params;
        self
    }

    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    /// Execute every statement of `program` for the current bar and return the
    /// value of the last one.
    pub fn run(
        &mut self,
        program: &Program,
        env: &mut Environment,
        phase: Phase,
    ) -> Result<Value, EvalError> {
        self.steps = 0;
        self.scopes.clear();
        self.phase = phase;
        for decl in program.functions() {
            self.functions.insert(decl.name.clone(), Rc::clone(decl));
        }
        self.eval_block(&program.statements, env)
    }

    /// Call a builtin with no written arguments, every parameter at its default.
    pub fn call_entry(
        &mut self,
        entry: &'static RegistryEntry,
        env: &mut Environment,
    ) -> Result<Value, EvalError> {
        let Some(id) = entry.builtin() else {
            return Ok(Value::Na);
        };
        let required = entry.required_count();
        if required > 0 {
            return Err(ArityError {
                name: entry.name.to_string(),
                min: required,
                max: entry.max_args(),
                found: 0,
                position: 0,
            }
            .into());
        }
        self.steps = 0;
        let bound = self.bind_args(entry, &[], DETACHED_SITE, env)?;
        self.dispatch(entry, id, DETACHED_SITE, &bound, env)
    }

    fn tick(&mut self) -> Result<(), EvalError> {
        self.steps += 1;
        if self.steps > self.settings.max_steps {
            return Err(EvalError::StepBudgetExceeded(self.settings.max_steps));
        }
        Ok(())
    }

    fn local(&self, name: &str) -> Option<&Value> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    fn in_function(&self) -> bool {
        !self.scopes.is_empty()
    }

    /// Bind `name` in the innermost function scope, or the environment at top level.
    fn assign_local(&mut self, name: &str, value: Value, env: &mut Environment) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.to_string(), value);
            }
            None => env.set(name, value),
        }
    }

    fn eval_block(&mut self, nodes: &[Node], env: &mut Environment) -> Result<Value, EvalError> {
        let mut last = Value::Na;
        for node in nodes {
            last = self.evaluate(node, env)?;
        }
        Ok(last)
    }

    pub fn evaluate(&mut self, node: &Node, env: &mut Environment) -> Result<Value, EvalError> {
        self.tick()?;
        match node {
            Node::Number(n) => Ok(Value::from_f64(*n)),
            Node::Str(s) => Ok(Value::Str(s.clone())),
            Node::Bool(b) => Ok(Value::Bool(*b)),
            Node::Builtin { id, .. } => Ok(read_builtin(*id, env)),
            Node::Constant(c) => Ok(constant_value(*c)),
            Node::Identifier(name) => match self.local(name) {
                Some(value) => Ok(value.clone()),
                None => Ok(env.get(name, 0)),
            },
            Node::History {
                target,
                offset,
                site,
            } => self.history(target, offset, *site, env),
            Node::Field { target, field } => {
                let value = self.evaluate(target, env)?;
                field_of(&value, field)
            }
            Node::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                if !self.evaluate(left, env)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.evaluate(right, env)?.is_truthy()))
            }
            Node::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                if self.evaluate(left, env)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.evaluate(right, env)?.is_truthy()))
            }
            Node::Binary { op, left, right } => {
                let l = self.evaluate(left, env)?;
                let r = self.evaluate(right, env)?;
                operators::binary(*op, &l, &r)
            }
            Node::Unary { op, operand } => {
                let value = self.evaluate(operand, env)?;
                operators::unary(*op, &value)
            }
            Node::Ternary {
                condition,
                then,
                otherwise,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    self.evaluate(then, env)
                } else {
                    self.evaluate(otherwise, env)
                }
            }
            Node::Call(call) => self.call(call, env),
            Node::VarDecl {
                name,
                ty,
                value,
                persistent,
            } => self.declare(name, *ty, value, *persistent, env),
            Node::Assign { name, value } => {
                let value = self.evaluate(value, env)?;
                let local = self.scopes.last().is_some_and(|s| s.contains_key(name));
                if local || (self.in_function() && !env.has_variable(name)) {
                    self.assign_local(name, value.clone(), env);
                } else {
                    env.set(name, value.clone());
                }
                Ok(value)
            }
            Node::Param { name, ty, default } => {
                let value = match self.params.get(name) {
                    Some(value) => value.clone(),
                    None => self.evaluate(default, env)?,
                };
                let value = coerce(*ty, value);
                env.set(name, value.clone());
                Ok(value)
            }
            Node::If {
                condition,
                then,
                otherwise,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    self.eval_block(then, env)
                } else if let Some(otherwise) = otherwise {
                    self.eval_block(otherwise, env)
                } else {
                    Ok(Value::Na)
                }
            }
            Node::For {
                var,
                from,
                to,
                step,
                body,
            } => self.for_loop(var, from, to, step.as_deref(), body, env),
            Node::While { condition, body } => {
                let mut last = Value::Na;
                loop {
                    self.tick()?;
                    if !self.evaluate(condition, env)?.is_truthy() {
                        break;
                    }
                    last = self.eval_block(body, env)?;
                }
                Ok(last)
            }
            Node::Switch {
                subject,
                cases,
                default,
            } => self.switch(subject.as_deref(), cases, default.as_deref(), env),
            Node::Block(body) => self.eval_block(body, env),
            Node::Function(decl) => {
                self.functions.insert(decl.name.clone(), Rc::clone(decl));
                Ok(Value::Na)
            }
            Node::Show { kind, args, .. } => self.show(*kind, args, env),
            Node::Event { kind, body } => {
                if self.phase.runs(*kind) {
                    self.eval_block(body, env)
                } else {
                    Ok(Value::Na)
                }
            }
            Node::TryCatch { body, handler } => match self.eval_block(body, env) {
                Ok(value) => Ok(value),
                Err(e) if e.is_catchable() => {
                    tracing::debug!(error = %e, "script error caught");
                    self.eval_block(handler, env)
                }
                Err(e) => Err(e),
            },
            Node::Import(module) => {
                tracing::debug!(module, "import ignored");
                Ok(Value::Na)
            }
            Node::Export(_) => Ok(Value::Na),
        }
    }

    fn declare(
        &mut self,
        name: &str,
        ty: Option<TypeName>,
        value: &Node,
        persistent: bool,
        env: &mut Environment,
    ) -> Result<Value, EvalError> {
        if self.in_function() {
            if persistent {
                if let Some(existing) = self.local(name) {
                    return Ok(existing.clone());
                }
            }
            let value = coerce(ty, self.evaluate(value, env)?);
            self.assign_local(name, value.clone(), env);
            return Ok(value);
        }
        if persistent && env.has_variable(name) {
            return Ok(env.get(name, 0));
        }
        let value = coerce(ty, self.evaluate(value, env)?);
        env.set(name, value.clone());
        Ok(value)
    }

    fn history(
        &mut self,
        target: &Node,
        offset: &Node,
        site: CallSiteId,
        env: &mut Environment,
    ) -> Result<Value, EvalError> {
        let raw = self.evaluate(offset, env)?;
        let offset = match raw {
            Value::Number(n) if n >= 0.0 && n.fract() == 0.0 => n as usize,
            other => {
                return Err(EvalError::InvalidOffset {
                    name: target.series_name().unwrap_or("expression").to_string(),
                    offset: other.as_number().unwrap_or(f64::NAN),
                });
            }
        };
        match target {
            Node::Identifier(name) => match self.local(name) {
                Some(value) if offset == 0 => Ok(value.clone()),
                Some(_) => Ok(Value::Na),
                None => Ok(env.get(name, offset)),
            },
            Node::Builtin {
                id: BuiltinId::Price(field),
                ..
            } => Ok(env.price(*field, offset)),
            other => {
                let value = self.evaluate(other, env)?;
                env.record_site(site, 0, value.to_f64());
                let window = env.series_window(&SeriesSource::Site(site, 0));
                Ok(window
                    .len()
                    .checked_sub(offset + 1)
                    .map_or(Value::Na, |i| Value::from_f64(window[i])))
            }
        }
    }

    fn for_loop(
        &mut self,
        var: &str,
        from: &Node,
        to: &Node,
        step: Option<&Node>,
        body: &[Node],
        env: &mut Environment,
    ) -> Result<Value, EvalError> {
        let start = self.evaluate(from, env)?;
        let end = self.evaluate(to, env)?;
        let (Some(start), Some(end)) = (loop_bound("from", &start)?, loop_bound("to", &end)?)
        else {
            return Ok(Value::Na);
        };
        let step = match step {
            Some(node) => {
                let value = self.evaluate(node, env)?;
                match loop_bound("by", &value)? {
                    Some(step) => step,
                    None => return Ok(Value::Na),
                }
            }
            None if start <= end => 1.0,
            None => -1.0,
        };
        if step == 0.0 {
            return Ok(Value::Na);
        }

        let mut last = Value::Na;
        let mut i = start;
        while (step > 0.0 && i <= end) || (step < 0.0 && i >= end) {
            self.tick()?;
            self.assign_local(var, Value::Number(i), env);
            last = self.eval_block(body, env)?;
            i += step;
        }
        Ok(last)
    }

    fn switch(
        &mut self,
        subject: Option<&Node>,
        cases: &[SwitchCase],
        default: Option<&[Node]>,
        env: &mut Environment,
    ) -> Result<Value, EvalError> {
        let subject = match subject {
            Some(node) => Some(self.evaluate(node, env)?),
            None => None,
        };
        for case in cases {
            let value = self.evaluate(&case.value, env)?;
            let matched = match &subject {
                Some(subject) => !subject.is_na() && *subject == value,
                None => value.is_truthy(),
            };
            if matched {
                return self.eval_block(&case.body, env);
            }
        }
        match default {
            Some(body) => self.eval_block(body, env),
            None => Ok(Value::Na),
        }
    }

    fn call(&mut self, call: &Call, env: &mut Environment) -> Result<Value, EvalError> {
        match &call.callee {
            Callee::Builtin(entry) => {
                let Some(id) = entry.builtin() else {
                    return Ok(Value::Na);
                };
                let bound = self.bind_args(entry, &call.args, call.site, env)?;
                self.dispatch(entry, id, call.site, &bound, env)
            }
            Callee::User(name) => self.call_user(name, &call.args, call.position, env),
        }
    }

    /// Evaluate call arguments in schema order, type-check them and fill
    /// omitted optionals. Series parameters also carry their history source.
    fn bind_args(
        &mut self,
        entry: &'static RegistryEntry,
        args: &[Node],
        site: CallSiteId,
        env: &mut Environment,
    ) -> Result<BoundArgs, EvalError> {
        let capacity = args.len().max(entry.params.len());
        let mut values = Vec::with_capacity(capacity);
        let mut sources = Vec::with_capacity(capacity);
        for (index, arg) in args.iter().enumerate() {
            let spec = entry.param_at(index);
            let (value, source) = match spec {
                Some(spec) if spec.ty == ParamType::Series => {
                    self.series_arg(arg, site, index, env)?
                }
                _ => (self.evaluate(arg, env)?, None),
            };
            if let Some(spec) = spec {
                check_type(entry, spec, &value)?;
            }
            values.push(value);
            sources.push(source);
        }
        for spec in entry.params.iter().skip(args.len()) {
            values.push(default_value(spec));
            sources.push(None);
        }
        Ok(BoundArgs::new(values, sources, args.len()))
    }

    fn series_arg(
        &mut self,
        node: &Node,
        site: CallSiteId,
        index: usize,
        env: &mut Environment,
    ) -> Result<(Value, Option<SeriesSource>), EvalError> {
        match node {
            Node::Builtin {
                id: BuiltinId::Price(field),
                ..
            } => Ok((env.price(*field, 0), Some(SeriesSource::Price(*field)))),
            Node::Identifier(name) if self.local(name).is_none() && env.has_variable(name) => Ok((
                env.get(name, 0),
                Some(SeriesSource::Variable(name.clone())),
            )),
            other => {
                let value = self.evaluate(other, env)?;
                env.record_site(site, index, value.to_f64());
                Ok((value, Some(SeriesSource::Site(site, index))))
            }
        }
    }

    fn dispatch(
        &mut self,
        entry: &'static RegistryEntry,
        id: BuiltinId,
        site: CallSiteId,
        args: &BoundArgs,
        env: &mut Environment,
    ) -> Result<Value, EvalError> {
        match id {
            BuiltinId::Ta(f) => ta::call(f, site, args, env),
            BuiltinId::Strategy(f) => strategy::call(f, args, env, self.settings.default_qty),
            BuiltinId::Drawing(f) => drawing::call(f, args, env),
            BuiltinId::Color(f) => Ok(drawing::color(f, args)),
            BuiltinId::Math(f) => Ok(math::call(f, args, env)),
            BuiltinId::Str(f) => text::call(f, args),
            BuiltinId::Collection(f) => collections::call(entry, f, args),
            BuiltinId::Notify(level) => {
                env.notify(level, args.value(0).to_string());
                Ok(Value::Na)
            }
            BuiltinId::Price(_)
            | BuiltinId::BarState(_)
            | BuiltinId::Time(_)
            | BuiltinId::Symbol(_)
            | BuiltinId::Metric(_)
            | BuiltinId::Constant(_) => Ok(read_builtin(id, env)),
        }
    }

    fn call_user(
        &mut self,
        name: &str,
        args: &[Node],
        position: usize,
        env: &mut Environment,
    ) -> Result<Value, EvalError> {
        let decl = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedFunction(name.to_string()))?;
        if args.len() > decl.params.len() {
            return Err(ArityError {
                name: name.to_string(),
                min: 0,
                max: Some(decl.params.len()),
                found: args.len(),
                position,
            }
            .into());
        }
        if self.scopes.len() >= self.settings.recursion_limit {
            return Err(EvalError::RecursionLimit(self.settings.recursion_limit));
        }

        let mut frame = HashMap::with_capacity(decl.params.len());
        for (i, param) in decl.params.iter().enumerate() {
            let value = match args.get(i) {
                Some(arg) => self.evaluate(arg, env)?,
                None => Value::Na,
            };
            frame.insert(param.clone(), value);
        }
        self.scopes.push(frame);
        let result = self.eval_block(&decl.body, env);
        self.scopes.pop();
        result
    }

    fn show(
        &mut self,
        kind: ShowKind,
        args: &[Node],
        env: &mut Environment,
    ) -> Result<Value, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg, env)?);
        }
        let first = values.first().cloned().unwrap_or_default();
        let text = |index: usize, fallback: &str| match values.get(index) {
            Some(Value::Str(s)) => s.clone(),
            _ => fallback.to_string(),
        };

        match kind {
            ShowKind::Show => {
                let color = match values.get(2) {
                    Some(Value::Color(c)) => Some(*c),
                    _ => None,
                };
                env.plot_value(&text(1, "show"), first.to_f64(), color);
                Ok(first)
            }
            ShowKind::ShowShape => {
                let hit = first.is_truthy();
                if hit {
                    let shape = ShapeDrawing {
                        title: text(1, "showshape"),
                        shape: text(2, "circle"),
                        location: text(3, "abovebar"),
                        bar_index: env.bar_index().unwrap_or(0),
                        time: env.current_bar().map_or(0, |b| b.time),
                    };
                    env.drawings_mut().add_shape(shape);
                }
                Ok(Value::Bool(hit))
            }
            ShowKind::ShowCond => {
                let hit = first.is_truthy();
                if hit {
                    let title = text(1, "showcond");
                    let message = text(2, &title);
                    env.notify(NotifyLevel::Alert, message);
                }
                Ok(Value::Bool(hit))
            }
        }
    }
}

fn loop_bound(param: &str, value: &Value) -> Result<Option<f64>, EvalError> {
    match value {
        Value::Number(n) if !n.is_nan() => Ok(Some(*n)),
        Value::Na => Ok(None),
        other => Err(EvalError::TypeMismatch {
            function: "for".to_string(),
            param: param.to_string(),
            expected: "number".to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

fn coerce(ty: Option<TypeName>, value: Value) -> Value {
    match (ty, value) {
        (Some(TypeName::Int), Value::Number(n)) => Value::Number(n.trunc()),
        (Some(TypeName::Float | TypeName::Series), Value::Bool(b)) => {
            Value::Number(if b { 1.0 } else { 0.0 })
        }
        (Some(TypeName::Bool), Value::Number(n)) => Value::Bool(n != 0.0),
        (_, value) => value,
    }
}

fn field_of(value: &Value, field: &str) -> Result<Value, EvalError> {
    match value {
        Value::Na => Ok(Value::Na),
        Value::Record(record) => record
            .field(field)
            .cloned()
            .ok_or_else(|| EvalError::UnknownField(record.name.to_string(), field.to_string())),
        Value::Point(point) => match field {
            "time" => Ok(Value::from_f64(point.time)),
            "price" => Ok(Value::from_f64(point.price)),
            _ => Err(EvalError::UnknownField("point".to_string(), field.to_string())),
        },
        other => Err(EvalError::UnknownField(
            other.type_name().to_string(),
            field.to_string(),
        )),
    }
}

/// Current value of a readable builtin.
fn read_builtin(id: BuiltinId, env: &Environment) -> Value {
    match id {
        BuiltinId::Price(field) => env.price(field, 0),
        BuiltinId::BarState(flag) => env.bar_state(flag),
        BuiltinId::Time(field) => env.time_field(field),
        BuiltinId::Symbol(field) => env.symbol_field(field),
        BuiltinId::Metric(metric) => env.metric(metric),
        BuiltinId::Constant(c) => constant_value(c),
        _ => Value::Na,
    }
}

pub fn constant_value(id: ConstantId) -> Value {
    match id {
        ConstantId::Na => Value::Na,
        ConstantId::StrategyLong => Value::from("long"),
        ConstantId::StrategyShort => Value::from("short"),
        ConstantId::ColorRed => Value::Color(Color::rgb(255, 0, 0)),
        ConstantId::ColorGreen => Value::Color(Color::rgb(0, 128, 0)),
        ConstantId::ColorBlue => Value::Color(Color::rgb(0, 0, 255)),
        ConstantId::ColorBlack => Value::Color(Color::rgb(0, 0, 0)),
        ConstantId::ColorWhite => Value::Color(Color::rgb(255, 255, 255)),
        ConstantId::ColorYellow => Value::Color(Color::rgb(255, 255, 0)),
        ConstantId::ColorOrange => Value::Color(Color::rgb(255, 165, 0)),
        ConstantId::ColorGray => Value::Color(Color::rgb(128, 128, 128)),
        ConstantId::ColorPurple => Value::Color(Color::rgb(128, 0, 128)),
        ConstantId::MathPi => Value::Number(std::f64::consts::PI),
        ConstantId::MathE => Value::Number(std::f64::consts::E),
        ConstantId::ShapeTriangleUp => Value::from("triangleup"),
        ConstantId::ShapeTriangleDown => Value::from("triangledown"),
        ConstantId::ShapeCircle => Value::from("circle"),
        ConstantId::ShapeCross => Value::from("cross"),
        ConstantId::LocationAboveBar => Value::from("abovebar"),
        ConstantId::LocationBelowBar => Value::from("belowbar"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lexer::tokenize;
    use crate::domain::ohlcv::Bar;
    use crate::domain::parser::parse_program;
    use crate::domain::registry::Registry;

    const DAY: i64 = 86_400_000;

    fn compile(src: &str) -> Program {
        parse_program(&tokenize(src, Registry::global()))
            .unwrap_or_else(|e| panic!("compile failed for {src:?}: {e}"))
    }

    struct Harness {
        program: Program,
        evaluator: Evaluator,
        env: Environment,
    }

    impl Harness {
        fn new(src: &str) -> Self {
            Self::with_evaluator(src, Evaluator::default())
        }

        fn with_evaluator(src: &str, evaluator: Evaluator) -> Self {
            Self {
                program: compile(src),
                evaluator,
                env: Environment::default(),
            }
        }

        fn push(&mut self, close: f64) -> Result<Value, EvalError> {
            let time = self.env.stamp() as i64 * DAY;
            self.env.update_bar(Bar {
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 100.0,
                time,
            });
            self.evaluator.run(&self.program, &mut self.env, Phase::Bar)
        }

        fn get(&self, name: &str) -> Value {
            self.env.get(name, 0)
        }
    }

    fn n(value: f64) -> Value {
        Value::Number(value)
    }

    #[test]
    fn arithmetic_and_na_propagation() {
        let mut h = Harness::new("let x = 1 + 2 * 3\nlet y = na + 1\nlet z = 5 / 0");
        h.push(10.0).unwrap();
        assert_eq!(h.get("x"), n(7.0));
        assert_eq!(h.get("y"), Value::Na);
        assert_eq!(h.get("z"), Value::Na);
    }

    #[test]
    fn var_initialises_once_and_carries_forward() {
        let mut h = Harness::new("var count = 0\ncount = count + 1\nlet c = close");
        for close in [10.0, 11.0, 12.0] {
            h.push(close).unwrap();
        }
        assert_eq!(h.get("count"), n(3.0));
        assert_eq!(h.env.get("count", 1), n(2.0));
        assert_eq!(h.env.get("c", 2), n(10.0));
    }

    #[test]
    fn history_reads_previous_bars() {
        let mut h = Harness::new("let prev = close[1]\nlet smaPrev = taSma(close, 1)[1]");
        h.push(10.0).unwrap();
        assert_eq!(h.get("prev"), Value::Na);
        h.push(11.0).unwrap();
        assert_eq!(h.get("prev"), n(10.0));
        assert_eq!(h.get("smaPrev"), n(10.0));
    }

    #[test]
    fn negative_or_fractional_offsets_are_errors() {
        let mut h = Harness::new("let bad = close[-1]");
        let err = h.push(10.0).unwrap_err();
        assert_eq!(
            err,
            EvalError::InvalidOffset {
                name: "close".into(),
                offset: -1.0
            }
        );
        let mut h = Harness::new("let bad = close[1.5]");
        assert!(matches!(h.push(10.0), Err(EvalError::InvalidOffset { .. })));
    }

    #[test]
    fn expression_arguments_are_captured_per_site() {
        let mut h = Harness::new("let s = taSma(close * 2, 2)");
        h.push(10.0).unwrap();
        h.push(12.0).unwrap();
        assert_eq!(h.get("s"), n(22.0));
    }

    #[test]
    fn user_functions_use_local_scope() {
        let mut h = Harness::new(
            "function double(x) { let t = x * 2\n t }\nlet y = double(close)\nfunction f(a, b) { isNa(b) }\nlet missing = f(1)",
        );
        h.push(10.0).unwrap();
        assert_eq!(h.get("y"), n(20.0));
        assert_eq!(h.get("missing"), Value::Bool(true));
        assert!(!h.env.has_variable("t"));
        assert!(!h.env.has_variable("x"));
    }

    #[test]
    fn recursion_is_limited() {
        let mut h = Harness::new("function down(n) { down(n + 1) }\nlet r = down(0)");
        assert_eq!(
            h.push(10.0),
            Err(EvalError::RecursionLimit(DEFAULT_RECURSION_LIMIT))
        );
    }

    #[test]
    fn too_many_user_arguments() {
        let mut h = Harness::new("function one(a) { a }\nlet r = one(1, 2)");
        assert!(matches!(h.push(10.0), Err(EvalError::Arity(_))));
        let mut h = Harness::new("let r = nothing(1)");
        assert_eq!(
            h.push(10.0),
            Err(EvalError::UndefinedFunction("nothing".into()))
        );
    }

    #[test]
    fn loops_evaluate_their_bodies() {
        let mut h = Harness::new(
            "var total = 0\nfor i = 1 to 4 { total = total + i }\nvar down = 0\nfor j = 10 to 0 by -5 { down = down + 1 }\nvar none = 0\nfor k = 0 to 3 by 0 { none = none + 1 }\nlet w = 0\nwhile w < 5 { w = w + 1 }",
        );
        h.push(10.0).unwrap();
        assert_eq!(h.get("total"), n(10.0));
        assert_eq!(h.get("down"), n(3.0));
        assert_eq!(h.get("none"), n(0.0));
        assert_eq!(h.get("w"), n(5.0));
    }

    #[test]
    fn switch_matches_subject_or_conditions() {
        let mut h = Harness::new(
            r#"var label = ""
            switch 2 { case 1: { label = "one" } case 2: { label = "two" } default: { label = "other" } }
            var size = ""
            switch { case close > 100: { size = "big" } default: { size = "small" } }"#,
        );
        h.push(10.0).unwrap();
        assert_eq!(h.get("label"), Value::from("two"));
        assert_eq!(h.get("size"), Value::from("small"));
    }

    #[test]
    fn try_catches_runtime_errors() {
        let mut h = Harness::new(
            "var caught = false\ntry { arrayGet(arrayNew(), 5) } catch { caught = true }",
        );
        h.push(10.0).unwrap();
        assert_eq!(h.get("caught"), Value::Bool(true));
    }

    #[test]
    fn step_budget_is_not_catchable() {
        let settings = EvaluatorSettings {
            max_steps: 100,
            ..EvaluatorSettings::default()
        };
        let mut h = Harness::with_evaluator(
            "var n = 0\ntry { while true { n = n + 1 } } catch { n = -1 }",
            Evaluator::new(settings),
        );
        assert_eq!(h.push(10.0), Err(EvalError::StepBudgetExceeded(100)));
    }

    #[test]
    fn event_blocks_follow_phase() {
        let mut h = Harness::new(
            "var bars = 0\nvar ticks = 0\nonBar { bars = bars + 1 }\nonTick { ticks = ticks + 1 }",
        );
        h.push(10.0).unwrap();
        h.evaluator
            .run(&h.program, &mut h.env, Phase::Tick)
            .unwrap();
        assert_eq!(h.get("bars"), n(1.0));
        assert_eq!(h.get("ticks"), n(1.0));
    }

    #[test]
    fn params_take_overrides() {
        let params = HashMap::from([("length".to_string(), n(3.0))]);
        let evaluator = Evaluator::default().with_params(params);
        let mut h = Harness::with_evaluator(
            "param length: int = 14\nparam mult = 2\nlet l = length * mult",
            evaluator,
        );
        h.push(10.0).unwrap();
        assert_eq!(h.get("l"), n(6.0));
    }

    #[test]
    fn record_fields() {
        let mut h = Harness::new("let u = taBb(close, 2, 2).upper");
        h.push(10.0).unwrap();
        assert_eq!(h.get("u"), Value::Na);
        h.push(10.0).unwrap();
        assert_eq!(h.get("u"), n(10.0));

        let mut h = Harness::new("let bad = taBb(close, 1, 2).nope");
        assert_eq!(
            h.push(10.0),
            Err(EvalError::UnknownField("bb".into(), "nope".into()))
        );
    }

    #[test]
    fn argument_types_are_checked() {
        let mut h = Harness::new("let s = taSma(close, \"ten\")");
        assert!(matches!(h.push(10.0), Err(EvalError::TypeMismatch { .. })));
    }

    #[test]
    fn strategy_calls_drive_the_ledger() {
        let mut h = Harness::new(
            "if close > 100 { strategyEntry(\"L\", strategyLong) }\nif close < 100 { strategyClose(\"L\") }",
        );
        for close in [101.0, 105.0, 99.0] {
            h.push(close).unwrap();
        }
        let trades = h.env.account().closed_trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].profit, -2.0);
        assert!(h.env.account().open_positions().is_empty());
    }

    #[test]
    fn show_plots_and_showcond_alerts() {
        let mut h = Harness::new(
            "show(close, \"c\", colorRed)\nshowcond(close > 10, \"up\", \"rising\")\nshowshape(close > 100, \"big\")",
        );
        h.push(10.5).unwrap();
        assert_eq!(h.env.get("c", 0), n(10.5));
        assert_eq!(h.env.plot("c").and_then(|p| p.color), Some(Color::rgb(255, 0, 0)));
        let alerts = h.env.notifications();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, NotifyLevel::Alert);
        assert_eq!(alerts[0].message, "rising");
        assert!(h.env.drawings().shapes.is_empty());
    }

    #[test]
    fn notifications_and_strings() {
        let mut h = Harness::new("logWarning(strFormat(\"close={0}\", close))");
        h.push(12.0).unwrap();
        assert_eq!(h.env.notifications()[0].message, "close=12");
        assert_eq!(h.env.notifications()[0].level, NotifyLevel::Warning);
    }

    #[test]
    fn oversized_constructors_are_catchable() {
        let mut h = Harness::new(
            "var caught = 0
try { matrixNew(10000000000, 10000000000, 0) } catch { caught = caught + 1 }
try { arrayNew(10000000000) } catch { caught = caught + 1 }
try { tableNew(10000000000, 10000000000) } catch { caught = caught + 1 }
try { matrixNew(-1, 3) } catch { caught = caught + 1 }",
        );
        h.push(10.0).unwrap();
        assert_eq!(h.get("caught"), n(4.0));
        assert!(h.env.drawings().tables.is_empty());
    }

    #[test]
    fn self_containing_collections_are_rejected() {
        let mut h = Harness::new(
            "var caught = 0
let a = arrayFrom(1)
let m = mapNew()
try { arrayPush(a, a) } catch { caught = caught + 1 }
mapPut(m, \"inner\", a)
try { arrayPush(a, m) } catch { caught = caught + 1 }
try { mapPut(m, \"self\", m) } catch { caught = caught + 1 }
let same = a == a
let found = arrayIncludes(a, 1)
let shown = strToString(a)",
        );
        h.push(10.0).unwrap();
        assert_eq!(h.get("caught"), n(3.0));
        assert_eq!(h.get("same"), Value::Bool(true));
        assert_eq!(h.get("found"), Value::Bool(true));
        assert_eq!(h.get("shown"), Value::Str("[1]".into()));
    }

    #[test]
    fn call_entry_uses_defaults() {
        let mut env = Environment::default();
        let mut evaluator = Evaluator::default();
        let close = Registry::global().lookup("close").unwrap();
        assert_eq!(evaluator.call_entry(close, &mut env), Ok(Value::Na));
        let sma = Registry::global().lookup("taSma").unwrap();
        assert!(matches!(
            evaluator.call_entry(sma, &mut env),
            Err(EvalError::Arity(_))
        ));
        let pi = Registry::global().lookup("mathPi").unwrap();
        assert_eq!(
            evaluator.call_entry(pi, &mut env),
            Ok(n(std::f64::consts::PI))
        );
    }
}
