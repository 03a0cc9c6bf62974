//! Abstract syntax tree for DevScript programs.

use std::fmt;
use std::rc::Rc;

use crate::domain::registry::{BuiltinId, ConstantId, RegistryEntry, TypeName};

/// Identifies one call (or capture) site in a program. Assigned by the parser
/// in source order; keys per-site series and indicator state in the environment.
pub type CallSiteId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowKind {
    /// `show(value, title?, color?)`: plot a value.
    Show,
    /// `showshape(condition, title?, shape?, location?)`: mark bars where the condition holds.
    ShowShape,
    /// `showcond(condition, title?, message?)`: alert when the condition holds.
    ShowCond,
}

impl ShowKind {
    pub fn name(self) -> &'static str {
        match self {
            ShowKind::Show => "show",
            ShowKind::ShowShape => "showshape",
            ShowKind::ShowCond => "showcond",
        }
    }

    /// (min, max) argument counts.
    pub fn arity(self) -> (usize, usize) {
        match self {
            ShowKind::Show => (1, 3),
            ShowKind::ShowShape => (1, 4),
            ShowKind::ShowCond => (1, 3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    OnBar,
    OnTick,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Builtin(&'static RegistryEntry),
    User(String),
}

impl Callee {
    pub fn name(&self) -> &str {
        match self {
            Callee::Builtin(entry) => entry.name,
            Callee::User(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Callee,
    pub args: Vec<Node>,
    pub site: CallSiteId,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: Node,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Str(String),
    Bool(bool),
    /// Builtin readable value: price field, bar state, time, symbol info, strategy metric.
    Builtin { name: &'static str, id: BuiltinId },
    Constant(ConstantId),
    Identifier(String),
    /// `target[offset]`
    History {
        target: Box<Node>,
        offset: Box<Node>,
        site: CallSiteId,
    },
    /// `target.field`
    Field { target: Box<Node>, field: String },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Unary { op: UnaryOp, operand: Box<Node> },
    Ternary {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    Call(Call),
    /// `let` (re-evaluated every bar) or `var` (initialised once).
    VarDecl {
        name: String,
        ty: Option<TypeName>,
        value: Box<Node>,
        persistent: bool,
    },
    Assign { name: String, value: Box<Node> },
    Param {
        name: String,
        ty: Option<TypeName>,
        default: Box<Node>,
    },
    If {
        condition: Box<Node>,
        then: Vec<Node>,
        otherwise: Option<Vec<Node>>,
    },
    For {
        var: String,
        from: Box<Node>,
        to: Box<Node>,
        step: Option<Box<Node>>,
        body: Vec<Node>,
    },
    While { condition: Box<Node>, body: Vec<Node> },
    Switch {
        subject: Option<Box<Node>>,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Node>>,
    },
    Block(Vec<Node>),
    Function(Rc<FunctionDecl>),
    Show {
        kind: ShowKind,
        args: Vec<Node>,
        site: CallSiteId,
    },
    Event { kind: EventKind, body: Vec<Node> },
    TryCatch { body: Vec<Node>, handler: Vec<Node> },
    Import(String),
    Export(String),
}

impl Node {
    /// Name of the environment series a node reads directly, if any.
    pub fn series_name(&self) -> Option<&str> {
        match self {
            Node::Identifier(name) => Some(name),
            Node::Builtin { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A compiled program: top-level statements plus the number of call sites.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Node>,
    pub call_sites: usize,
}

impl Program {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Rc<FunctionDecl>> {
        self.statements.iter().filter_map(|s| match s {
            Node::Function(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().filter_map(|s| match s {
            Node::Param { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}
