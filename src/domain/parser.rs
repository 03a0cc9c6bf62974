//! DevScript parser.
//!
//! Two entry points with different contracts:
//! - [`parse_program`] builds a full statement tree by recursive descent and
//!   checks every builtin call's arity against its registry schema.
//! - [`resolve_single`] returns the first registry-recognized token's entry
//!   without building a tree; it backs ad hoc single-name evaluation.

use std::rc::Rc;

use crate::domain::ast::{
    BinaryOp, Call, CallSiteId, Callee, EventKind, FunctionDecl, Node, Program, ShowKind,
    SwitchCase, UnaryOp,
};
use crate::domain::error::{ArityError, CompileError, SyntaxError};
use crate::domain::registry::{
    BuiltinId, Category, EntryKind, Keyword, Registry, RegistryEntry, TypeName,
};
use crate::domain::token::{Literal, Token, TokenKind};

/// Parse a token stream into a program. An empty stream is an empty program.
pub fn parse_program(tokens: &[Token]) -> Result<Program, CompileError> {
    let mut parser = Parser::new(tokens);
    let mut statements = Vec::new();
    while !parser.at_end() {
        statements.push(parser.parse_statement()?);
    }
    Ok(Program {
        statements,
        call_sites: parser.next_site,
    })
}

/// Entry of the first token whose lexeme is a registry key.
pub fn resolve_single(tokens: &[Token], registry: &Registry) -> Option<&'static RegistryEntry> {
    tokens.iter().find_map(|t| registry.lookup(&t.lexeme))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    next_site: CallSiteId,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            next_site: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + ahead)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn alloc_site(&mut self) -> CallSiteId {
        let site = self.next_site;
        self.next_site += 1;
        site
    }

    /// Byte position of the current token, or end of the last one.
    fn position(&self) -> usize {
        match self.peek() {
            Some(t) => t.position,
            None => self
                .tokens
                .last()
                .map(|t| t.position + t.lexeme.len())
                .unwrap_or(0),
        }
    }

    fn error(&self, expected: impl Into<String>) -> CompileError {
        let found = self
            .peek()
            .map(Token::describe)
            .unwrap_or_else(|| "end of input".to_string());
        SyntaxError {
            expected: expected.into(),
            found,
            position: self.position(),
        }
        .into()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn check_operator(&self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.is_operator(op))
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_some_and(|t| is_keyword(t, keyword))
    }

    fn consume_operator(&mut self, op: &str) -> bool {
        if self.check_operator(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'a Token, CompileError> {
        if self.check(kind) {
            self.advance().ok_or_else(|| self.error(kind.to_string()))
        } else {
            Err(self.error(kind.to_string()))
        }
    }

    fn expect_operator(&mut self, op: &str) -> Result<(), CompileError> {
        if self.consume_operator(op) {
            Ok(())
        } else {
            Err(self.error(format!("'{op}'")))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, text: &str) -> Result<(), CompileError> {
        if self.consume_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(format!("'{text}'")))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, CompileError> {
        Ok(self.expect(TokenKind::Identifier)?.lexeme.clone())
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> Result<Node, CompileError> {
        let Some(token) = self.peek() else {
            return Err(self.error("statement"));
        };
        if let Some(EntryKind::Keyword(keyword)) = token.entry.map(|e| e.kind) {
            match keyword {
                Keyword::Let | Keyword::Var => return self.parse_var_decl(),
                Keyword::Param => return self.parse_param(),
                Keyword::If => return self.parse_if(),
                Keyword::For => return self.parse_for(),
                Keyword::While => return self.parse_while(),
                Keyword::Switch => return self.parse_switch(),
                Keyword::Function => return self.parse_function(),
                Keyword::Show => return self.parse_show(ShowKind::Show),
                Keyword::ShowShape => return self.parse_show(ShowKind::ShowShape),
                Keyword::ShowCond => return self.parse_show(ShowKind::ShowCond),
                Keyword::OnBar => return self.parse_event(EventKind::OnBar),
                Keyword::OnTick => return self.parse_event(EventKind::OnTick),
                Keyword::Try => return self.parse_try(),
                Keyword::Import => return self.parse_import(),
                Keyword::Export => return self.parse_export(),
                Keyword::Else
                | Keyword::To
                | Keyword::By
                | Keyword::Case
                | Keyword::Default
                | Keyword::Catch => return Err(self.error("statement")),
            }
        }
        if token.kind == TokenKind::LBrace {
            return Ok(Node::Block(self.parse_block()?));
        }
        if token.kind == TokenKind::Identifier
            && self.peek_at(1).is_some_and(|t| t.is_operator("="))
        {
            let name = token.lexeme.clone();
            self.pos += 2;
            let value = self.parse_expression()?;
            return Ok(Node::Assign {
                name,
                value: Box::new(value),
            });
        }
        self.parse_expression()
    }

    fn parse_block(&mut self) -> Result<Vec<Node>, CompileError> {
        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error("'}'"));
            }
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(body)
    }

    fn parse_type_annotation(&mut self) -> Result<Option<TypeName>, CompileError> {
        if !self.check(TokenKind::Colon) {
            return Ok(None);
        }
        self.pos += 1;
        match self.peek().and_then(|t| t.entry).map(|e| e.kind) {
            Some(EntryKind::Type(ty)) => {
                self.pos += 1;
                Ok(Some(ty))
            }
            _ => Err(self.error("type name")),
        }
    }

    fn parse_var_decl(&mut self) -> Result<Node, CompileError> {
        let persistent = self.check_keyword(Keyword::Var);
        self.pos += 1;
        let name = self.expect_identifier()?;
        let ty = self.parse_type_annotation()?;
        self.expect_operator("=")?;
        let value = self.parse_expression()?;
        Ok(Node::VarDecl {
            name,
            ty,
            value: Box::new(value),
            persistent,
        })
    }

    fn parse_param(&mut self) -> Result<Node, CompileError> {
        self.pos += 1;
        let name = self.expect_identifier()?;
        let ty = self.parse_type_annotation()?;
        self.expect_operator("=")?;
        let default = self.parse_expression()?;
        Ok(Node::Param {
            name,
            ty,
            default: Box::new(default),
        })
    }

    fn parse_if(&mut self) -> Result<Node, CompileError> {
        self.pos += 1;
        let condition = self.parse_expression()?;
        let then = self.parse_block()?;
        let otherwise = if self.consume_keyword(Keyword::Else) {
            if self.check_keyword(Keyword::If) {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Node::If {
            condition: Box::new(condition),
            then,
            otherwise,
        })
    }

    fn parse_for(&mut self) -> Result<Node, CompileError> {
        self.pos += 1;
        let var = self.expect_identifier()?;
        self.expect_operator("=")?;
        let from = self.parse_expression()?;
        self.expect_keyword(Keyword::To, "to")?;
        let to = self.parse_expression()?;
        let step = if self.consume_keyword(Keyword::By) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(Node::For {
            var,
            from: Box::new(from),
            to: Box::new(to),
            step,
            body,
        })
    }

    fn parse_while(&mut self) -> Result<Node, CompileError> {
        self.pos += 1;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Node::While {
            condition: Box::new(condition),
            body,
        })
    }

    fn parse_switch(&mut self) -> Result<Node, CompileError> {
        self.pos += 1;
        let subject = if self.check(TokenKind::LBrace) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(TokenKind::LBrace)?;
        let mut cases = Vec::new();
        let mut default = None;
        while !self.check(TokenKind::RBrace) {
            if self.consume_keyword(Keyword::Case) {
                let value = self.parse_expression()?;
                self.expect(TokenKind::Colon)?;
                let body = self.parse_block()?;
                cases.push(SwitchCase { value, body });
            } else if self.consume_keyword(Keyword::Default) {
                self.expect(TokenKind::Colon)?;
                default = Some(self.parse_block()?);
            } else {
                return Err(self.error("'case', 'default' or '}'"));
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Node::Switch {
            subject,
            cases,
            default,
        })
    }

    fn parse_function(&mut self) -> Result<Node, CompileError> {
        self.pos += 1;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier()?);
                if self.check(TokenKind::Comma) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Node::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    fn parse_show(&mut self, kind: ShowKind) -> Result<Node, CompileError> {
        let position = self.position();
        self.pos += 1;
        let args = self.parse_arguments()?;
        let (min, max) = kind.arity();
        if args.len() < min || args.len() > max {
            return Err(ArityError {
                name: kind.name().to_string(),
                min,
                max: Some(max),
                found: args.len(),
                position,
            }
            .into());
        }
        Ok(Node::Show {
            kind,
            args,
            site: self.alloc_site(),
        })
    }

    fn parse_event(&mut self, kind: EventKind) -> Result<Node, CompileError> {
        self.pos += 1;
        let body = self.parse_block()?;
        Ok(Node::Event { kind, body })
    }

    fn parse_try(&mut self) -> Result<Node, CompileError> {
        self.pos += 1;
        let body = self.parse_block()?;
        self.expect_keyword(Keyword::Catch, "catch")?;
        let handler = self.parse_block()?;
        Ok(Node::TryCatch { body, handler })
    }

    fn parse_import(&mut self) -> Result<Node, CompileError> {
        self.pos += 1;
        let token = self.expect(TokenKind::String)?;
        Ok(Node::Import(token.lexeme.clone()))
    }

    fn parse_export(&mut self) -> Result<Node, CompileError> {
        self.pos += 1;
        Ok(Node::Export(self.expect_identifier()?))
    }

    // ---- expressions ----

    fn parse_expression(&mut self) -> Result<Node, CompileError> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Node, CompileError> {
        let condition = self.parse_or()?;
        if !self.consume_operator("?") {
            return Ok(condition);
        }
        let then = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        let otherwise = self.parse_expression()?;
        Ok(Node::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> Result<Node, CompileError> {
        let mut left = self.parse_and()?;
        while self.consume_operator("or") {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node, CompileError> {
        let mut left = self.parse_equality()?;
        while self.consume_operator("and") {
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Node, CompileError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = if self.consume_operator("==") {
                BinaryOp::Eq
            } else if self.consume_operator("!=") {
                BinaryOp::Ne
            } else {
                break;
            };
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Node, CompileError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.consume_operator("<") {
                BinaryOp::Lt
            } else if self.consume_operator("<=") {
                BinaryOp::Le
            } else if self.consume_operator(">") {
                BinaryOp::Gt
            } else if self.consume_operator(">=") {
                BinaryOp::Ge
            } else {
                break;
            };
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Node, CompileError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.consume_operator("+") {
                BinaryOp::Add
            } else if self.consume_operator("-") {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Node, CompileError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.consume_operator("*") {
                BinaryOp::Mul
            } else if self.consume_operator("/") {
                BinaryOp::Div
            } else if self.consume_operator("%") {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node, CompileError> {
        let op = if self.consume_operator("-") {
            UnaryOp::Neg
        } else if self.consume_operator("not") || self.consume_operator("!") {
            UnaryOp::Not
        } else {
            return self.parse_postfix();
        };
        let operand = self.parse_unary()?;
        Ok(Node::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> Result<Node, CompileError> {
        let mut node = self.parse_primary()?;
        loop {
            if self.check(TokenKind::LBracket) {
                self.pos += 1;
                let offset = self.parse_expression()?;
                self.expect(TokenKind::RBracket)?;
                node = Node::History {
                    target: Box::new(node),
                    offset: Box::new(offset),
                    site: self.alloc_site(),
                };
            } else if self.check_operator(".") {
                self.pos += 1;
                let field = match self.peek() {
                    Some(t) if is_word(t) => t.lexeme.clone(),
                    _ => return Err(self.error("field name")),
                };
                self.pos += 1;
                node = Node::Field {
                    target: Box::new(node),
                    field,
                };
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Node, CompileError> {
        let Some(token) = self.peek() else {
            return Err(self.error("expression"));
        };
        match token.kind {
            TokenKind::Number => {
                self.pos += 1;
                match token.literal {
                    Some(Literal::Number(n)) => Ok(Node::Number(n)),
                    _ => Err(self.error("number")),
                }
            }
            TokenKind::String => {
                self.pos += 1;
                Ok(Node::Str(token.lexeme.clone()))
            }
            TokenKind::Boolean => {
                self.pos += 1;
                Ok(Node::Bool(token.literal == Some(Literal::Bool(true))))
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Identifier => {
                self.pos += 1;
                if self.check(TokenKind::LParen) {
                    self.parse_call(Callee::User(token.lexeme.clone()), token.position)
                } else {
                    Ok(Node::Identifier(token.lexeme.clone()))
                }
            }
            TokenKind::BuiltinFunction => {
                let Some(entry) = token.entry else {
                    return Err(self.error("expression"));
                };
                self.pos += 1;
                if !self.check(TokenKind::LParen) {
                    return Err(self.error("'('"));
                }
                self.parse_call(Callee::Builtin(entry), token.position)
            }
            TokenKind::BuiltinVariable => {
                let Some((entry, id)) = token.entry.and_then(|e| Some((e, e.builtin()?))) else {
                    return Err(self.error("expression"));
                };
                self.pos += 1;
                Ok(Node::Builtin {
                    name: entry.name,
                    id,
                })
            }
            TokenKind::Constant => match token.entry.and_then(RegistryEntry::builtin) {
                Some(BuiltinId::Constant(c)) => {
                    self.pos += 1;
                    Ok(Node::Constant(c))
                }
                _ => Err(self.error("expression")),
            },
            _ => Err(self.error("expression")),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Node>, CompileError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if self.check(TokenKind::Comma) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_call(&mut self, callee: Callee, position: usize) -> Result<Node, CompileError> {
        let args = self.parse_arguments()?;
        if let Callee::Builtin(entry) = &callee {
            check_arity(entry, args.len(), position)?;
        }
        Ok(Node::Call(Call {
            callee,
            args,
            site: self.alloc_site(),
            position,
        }))
    }
}

/// Validate an argument count against a callable's schema.
pub fn check_arity(
    entry: &RegistryEntry,
    found: usize,
    position: usize,
) -> Result<(), ArityError> {
    if entry.accepts_arity(found) {
        Ok(())
    } else {
        Err(ArityError {
            name: entry.name.to_string(),
            min: entry.required_count(),
            max: entry.max_args(),
            found,
            position,
        })
    }
}

fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
    Node::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn is_keyword(token: &Token, keyword: Keyword) -> bool {
    token.kind == TokenKind::Keyword
        && token
            .entry
            .is_some_and(|e| e.kind == EntryKind::Keyword(keyword))
}

fn is_word(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier
        | TokenKind::Keyword
        | TokenKind::BuiltinVariable
        | TokenKind::BuiltinFunction
        | TokenKind::TypeDeclaration
        | TokenKind::Constant => true,
        TokenKind::Operator => token.entry.is_some_and(|e| e.category() == Category::Operator),
        _ => false,
    }
}
