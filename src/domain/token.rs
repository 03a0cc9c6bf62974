//! Lexical tokens.

use std::fmt;

use crate::domain::registry::RegistryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    String,
    Boolean,
    Identifier,
    Keyword,
    BuiltinVariable,
    BuiltinFunction,
    TypeDeclaration,
    Constant,
    Operator,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
}

impl TokenKind {
    /// Whether a token of this kind can close an operand, making a following
    /// `-` binary rather than a sign.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::String
                | TokenKind::Boolean
                | TokenKind::Identifier
                | TokenKind::BuiltinVariable
                | TokenKind::Constant
                | TokenKind::RParen
                | TokenKind::RBracket
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Boolean => "boolean",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::BuiltinVariable => "builtin variable",
            TokenKind::BuiltinFunction => "builtin function",
            TokenKind::TypeDeclaration => "type",
            TokenKind::Constant => "constant",
            TokenKind::Operator => "operator",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
}

/// A classified lexeme. `position` is the byte offset of the lexeme in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub position: usize,
    /// Registry entry for words that name a builtin, keyword, type or operator.
    pub entry: Option<&'static RegistryEntry>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            position,
            entry: None,
        }
    }

    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn with_entry(mut self, entry: &'static RegistryEntry) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.lexeme == op
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme == keyword
    }

    /// Short rendering used in syntax error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::String => format!("string \"{}\"", self.lexeme),
            _ => format!("'{}'", self.lexeme),
        }
    }
}
