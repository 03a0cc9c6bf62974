//! DevScript lexer.
//!
//! Single left-to-right scan. Words are classified against the builtin
//! [`Registry`]; anything unknown is an identifier. Characters that match no
//! rule are skipped by [`tokenize`] and rejected by [`tokenize_strict`].

use crate::domain::error::LexError;
use crate::domain::registry::{Category, EntryKind, Registry};
use crate::domain::token::{Literal, Token, TokenKind};

/// Tokenize leniently: unrecognized characters are dropped.
pub fn tokenize(source: &str, registry: &Registry) -> Vec<Token> {
    let scan = Scanner::new(source, registry).scan();
    if !scan.skipped.is_empty() {
        tracing::debug!(count = scan.skipped.len(), "lexer skipped unrecognized characters");
    }
    scan.tokens
}

/// Tokenize, failing on the first unrecognized character.
pub fn tokenize_strict(source: &str, registry: &Registry) -> Result<Vec<Token>, LexError> {
    let scan = Scanner::new(source, registry).scan();
    match scan.skipped.first() {
        Some(&(character, position)) => Err(LexError {
            character,
            position,
        }),
        None => Ok(scan.tokens),
    }
}

struct Scan {
    tokens: Vec<Token>,
    skipped: Vec<(char, usize)>,
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    registry: &'a Registry,
    tokens: Vec<Token>,
    skipped: Vec<(char, usize)>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, registry: &'a Registry) -> Self {
        Self {
            input,
            pos: 0,
            registry,
            tokens: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.remaining().chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn scan(mut self) -> Scan {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '/' if self.peek_second() == Some('/') => self.skip_comment(),
                c if c.is_ascii_alphabetic() || c == '_' => self.scan_word(start),
                c if c.is_ascii_digit() => self.scan_number(start),
                '-' if self.sign_allowed() && self.peek_second().is_some_and(|c| c.is_ascii_digit()) => {
                    self.scan_number(start)
                }
                '"' => self.scan_string(start),
                '(' => self.single(TokenKind::LParen, start),
                ')' => self.single(TokenKind::RParen, start),
                '{' => self.single(TokenKind::LBrace, start),
                '}' => self.single(TokenKind::RBrace, start),
                '[' => self.single(TokenKind::LBracket, start),
                ']' => self.single(TokenKind::RBracket, start),
                ',' => self.single(TokenKind::Comma, start),
                ':' => self.single(TokenKind::Colon, start),
                '=' | '!' | '<' | '>' if self.peek_second() == Some('=') => {
                    self.pos += 2;
                    self.push(Token::new(TokenKind::Operator, &self.input[start..self.pos], start));
                }
                '+' | '-' | '*' | '/' | '%' | '<' | '>' | '=' | '!' | '?' | '.' => {
                    self.single(TokenKind::Operator, start)
                }
                other => {
                    self.advance();
                    self.skipped.push((other, start));
                }
            }
        }
        Scan {
            tokens: self.tokens,
            skipped: self.skipped,
        }
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn single(&mut self, kind: TokenKind, start: usize) {
        self.advance();
        let lexeme = &self.input[start..self.pos];
        self.push(Token::new(kind, lexeme, start));
    }

    fn sign_allowed(&self) -> bool {
        self.tokens.last().is_none_or(|t| !t.kind.ends_operand())
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn scan_word(&mut self, start: usize) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let word = &self.input[start..self.pos];
        let token = match word {
            "true" | "false" => Token::new(TokenKind::Boolean, word, start)
                .with_literal(Literal::Bool(word == "true")),
            _ => match self.registry.lookup(word) {
                Some(entry) => Token::new(classify(entry.kind, entry.category()), word, start)
                    .with_entry(entry),
                None => Token::new(TokenKind::Identifier, word, start),
            },
        };
        self.push(token);
    }

    fn scan_number(&mut self, start: usize) {
        if self.peek() == Some('-') {
            self.advance();
        }
        self.consume_digits();
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.consume_digits();
        }
        let lexeme = &self.input[start..self.pos];
        // Digits with an optional single fraction always parse.
        let value = lexeme.parse::<f64>().unwrap_or(f64::NAN);
        self.push(Token::new(TokenKind::Number, lexeme, start).with_literal(Literal::Number(value)));
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_string(&mut self, start: usize) {
        self.advance();
        let body_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '"' {
                break;
            }
            self.advance();
        }
        let body = self.input[body_start..self.pos].to_string();
        // Unterminated strings run to end of input.
        if self.peek() == Some('"') {
            self.advance();
        }
        self.push(Token::new(TokenKind::String, body.clone(), start).with_literal(Literal::Str(body)));
    }
}

fn classify(kind: EntryKind, category: Category) -> TokenKind {
    match kind {
        EntryKind::Keyword(_) => TokenKind::Keyword,
        EntryKind::Type(_) => TokenKind::TypeDeclaration,
        EntryKind::Operator(_) => TokenKind::Operator,
        EntryKind::Builtin(_) => match category {
            Category::Constant => TokenKind::Constant,
            c if c.is_callable() => TokenKind::BuiltinFunction,
            _ => TokenKind::BuiltinVariable,
        },
    }
}
