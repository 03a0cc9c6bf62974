//! Domain error types.
//!
//! Compile-time errors (`LexError`, `SyntaxError`, `ArityError`) abort a
//! compile. `EvalError` aborts the current bar unless caught by a `try` block.
//! `LedgerError` is raised by the strategy account and surfaces through
//! `EvalError::Ledger` when triggered from a script.

/// Unrecognized character, raised only by the strict lexer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unexpected character '{character}' at position {position}")]
pub struct LexError {
    pub character: char,
    pub position: usize,
}

/// A syntax error with the expected token and the byte position of the offending one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("syntax error at position {position}: expected {expected}, found {found}")]
pub struct SyntaxError {
    pub expected: String,
    pub found: String,
    pub position: usize,
}

impl SyntaxError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        display_with_caret(input, self.position, &self.to_string())
    }
}

/// A call whose argument count violates its registry schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{name} expects {} arguments, found {found} (position {position})", arity_range(.min, .max))]
pub struct ArityError {
    pub name: String,
    pub min: usize,
    pub max: Option<usize>,
    pub found: usize,
    pub position: usize,
}

fn arity_range(min: &usize, max: &Option<usize>) -> String {
    match max {
        Some(max) if max == min => format!("{min}"),
        Some(max) => format!("{min} to {max}"),
        None => format!("at least {min}"),
    }
}

/// Errors produced while compiling source text into a program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Arity(#[from] ArityError),
}

impl CompileError {
    pub fn position(&self) -> usize {
        match self {
            CompileError::Lex(e) => e.position,
            CompileError::Syntax(e) => e.position,
            CompileError::Arity(e) => e.position,
        }
    }

    pub fn display_with_context(&self, input: &str) -> String {
        display_with_caret(input, self.position(), &self.to_string())
    }
}

fn display_with_caret(input: &str, position: usize, message: &str) -> String {
    // Show only the line that holds the position so the caret lines up.
    let position = position.min(input.len());
    let line_start = input[..position].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = input[position..]
        .find('\n')
        .map(|i| position + i)
        .unwrap_or(input.len());
    let column = input[line_start..position].chars().count();
    let caret = " ".repeat(column) + "^";
    format!(
        "{line}\n{caret}\n{err}",
        line = &input[line_start..line_end],
        caret = caret,
        err = message
    )
}

/// Strategy ledger failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("no open position with id '{0}'")]
    UnknownPosition(String),
    #[error("order quantity must be positive, got {0}")]
    NonPositiveQuantity(f64),
    #[error("position '{0}' is already open")]
    DuplicatePosition(String),
}

/// Runtime evaluation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("invalid operands for '{op}': {left} and {right}")]
    InvalidOperand {
        op: String,
        left: String,
        right: String,
    },
    #[error("invalid history offset {offset} for '{name}'")]
    InvalidOffset { name: String, offset: f64 },
    #[error("index {index} out of range for {what} of size {size}")]
    IndexOutOfRange {
        what: String,
        index: i64,
        size: usize,
    },
    #[error("{function}: parameter '{param}' expects {expected}, found {found}")]
    TypeMismatch {
        function: String,
        param: String,
        expected: String,
        found: String,
    },
    #[error("{what} of size {requested} exceeds the limit of {limit}")]
    SizeLimit {
        what: String,
        requested: usize,
        limit: usize,
    },
    #[error("{function}: {what} would contain itself or nest deeper than {limit} levels")]
    Nesting {
        function: String,
        what: String,
        limit: usize,
    },
    #[error("undefined function '{0}'")]
    UndefinedFunction(String),
    #[error("'{0}' has no field '{1}'")]
    UnknownField(String, String),
    #[error("recursion limit of {0} exceeded")]
    RecursionLimit(usize),
    #[error("evaluation step budget of {0} exceeded")]
    StepBudgetExceeded(u64),
    #[error(transparent)]
    Arity(#[from] ArityError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl EvalError {
    /// Whether a `try` block may intercept this error.
    pub fn is_catchable(&self) -> bool {
        !matches!(self, EvalError::StepBudgetExceeded(_))
    }
}

/// Top-level error type for devscript.
#[derive(Debug, thiserror::Error)]
pub enum DevScriptError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("evaluation failed on bar {bar_index}: {source}")]
    Evaluation {
        bar_index: usize,
        #[source]
        source: EvalError,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no bars found in {source_name}")]
    NoData { source_name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DevScriptError> for std::process::ExitCode {
    fn from(err: &DevScriptError) -> Self {
        let code: u8 = match err {
            DevScriptError::Io(_) => 1,
            DevScriptError::ConfigParse { .. }
            | DevScriptError::ConfigMissing { .. }
            | DevScriptError::ConfigInvalid { .. } => 2,
            DevScriptError::Data { .. } => 3,
            DevScriptError::Compile(_) => 4,
            DevScriptError::NoData { .. } => 5,
            DevScriptError::Evaluation { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
