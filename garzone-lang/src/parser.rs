// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::LangError;
use crate::ast::{
    AssignTarget,
    BinaryOperator,
    Expression,
    Program,
    Statement,
    UnaryOperator,
    VariableDecl,
};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::Type;

/// Recursive-descent parser with two tokens of lookahead (the second one
/// only distinguishes labels from expression statements).
pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
}

fn is_type_keyword(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Int | TokenKind::String | TokenKind::Boolean | TokenKind::Real)
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self { lexer, current, peek }
    }

    pub fn parse(mut self) -> Result<Program, LangError> {
        self.parse_program()
    }

    fn advance(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    /// Consumes the current token if it has the expected kind.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.current.kind == kind {
            self.advance();
            return true;
        }
        false
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, LangError> {
        Err(LangError::parse(message, self.current.line, self.current.column))
    }

    fn parse_program(&mut self) -> Result<Program, LangError> {
        if !self.expect(TokenKind::Program) {
            return self.error("Expected 'program'");
        }

        let mut declarations = Vec::new();
        let mut statements = Vec::new();

        while !self.current.is(TokenKind::EndOfFile) {
            if is_type_keyword(self.current.kind) {
                declarations.extend(self.parse_declarations()?);
            } else {
                statements.push(self.parse_statement()?);
            }
        }

        Ok(Program { declarations, statements })
    }

    fn parse_declarations(&mut self) -> Result<Vec<VariableDecl>, LangError> {
        let ty = self.parse_type()?;
        let mut declarations = self.parse_variable_list(ty)?;

        while self.expect(TokenKind::Semicolon) {
            if !is_type_keyword(self.current.kind) {
                break;
            }
            let ty = self.parse_type()?;
            declarations.extend(self.parse_variable_list(ty)?);
        }

        Ok(declarations)
    }

    fn parse_type(&mut self) -> Result<Type, LangError> {
        let ty = match self.current.kind {
            TokenKind::Int => Type::Int,
            TokenKind::String => Type::String,
            TokenKind::Boolean => Type::Boolean,
            TokenKind::Real => Type::Real,
            _ => return self.error("Expected type (int, string, boolean or real)"),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_variable_list(&mut self, ty: Type) -> Result<Vec<VariableDecl>, LangError> {
        let mut variables = vec![self.parse_variable_decl(ty)?];
        while self.expect(TokenKind::Comma) {
            variables.push(self.parse_variable_decl(ty)?);
        }
        Ok(variables)
    }

    fn parse_variable_decl(&mut self, ty: Type) -> Result<VariableDecl, LangError> {
        if !self.current.is(TokenKind::Identifier) {
            return self.error("Expected identifier");
        }

        let name = self.current.text.clone();
        self.advance();

        let initializer = if self.expect(TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(VariableDecl { name, ty, initializer })
    }

    fn parse_expression(&mut self) -> Result<Expression, LangError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expression, LangError> {
        let left = self.parse_or()?;

        if self.current.is(TokenKind::Assign) {
            let target = match left {
                Expression::Identifier(name) => AssignTarget::Variable(name),
                Expression::EnvironmentVariable(name) => AssignTarget::Environment(name),
                _ => return self.error("Left side of assignment must be an identifier or an environment variable"),
            };

            self.advance();
            let value = self.parse_assignment()?;
            return Ok(Expression::Assignment { target, value: Box::new(value) });
        }

        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expression, LangError> {
        let mut left = self.parse_and()?;

        while self.current.is(TokenKind::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::Binary {
                op: BinaryOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, LangError> {
        let mut left = self.parse_equality()?;

        while self.current.is(TokenKind::And) {
            self.advance();
            let right = self.parse_equality()?;
            left = Expression::Binary {
                op: BinaryOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, LangError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Equal => BinaryOperator::Equal,
                TokenKind::NotEqual => BinaryOperator::NotEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = Expression::Binary { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expression, LangError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Less => BinaryOperator::Less,
                TokenKind::Greater => BinaryOperator::Greater,
                TokenKind::LessEqual => BinaryOperator::LessEqual,
                TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expression::Binary { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, LangError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expression::Binary { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, LangError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Multiply => BinaryOperator::Multiply,
                TokenKind::Divide => BinaryOperator::Divide,
                TokenKind::Modulo => BinaryOperator::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::Binary { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, LangError> {
        let op = match self.current.kind {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Not => UnaryOperator::Not,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expression::Unary { op, operand: Box::new(operand) })
    }

    fn parse_primary(&mut self) -> Result<Expression, LangError> {
        let token = self.current.clone();

        match token.kind {
            TokenKind::Integer => {
                let Ok(value) = token.text.parse::<i64>() else {
                    return self.error(format!("Invalid integer literal '{}'", token.text));
                };
                self.advance();
                Ok(Expression::IntegerLiteral(value))
            }

            TokenKind::RealNumber => {
                let Ok(value) = token.text.parse::<f64>() else {
                    return self.error(format!("Invalid real literal '{}'", token.text));
                };
                self.advance();
                Ok(Expression::RealLiteral(value))
            }

            TokenKind::StringLiteral => {
                self.advance();
                Ok(Expression::StringLiteral(token.text))
            }

            TokenKind::True => {
                self.advance();
                Ok(Expression::BooleanLiteral(true))
            }

            TokenKind::False => {
                self.advance();
                Ok(Expression::BooleanLiteral(false))
            }

            TokenKind::Identifier => {
                self.advance();
                Ok(Expression::Identifier(token.text))
            }

            TokenKind::EnvVar => {
                self.advance();
                Ok(Expression::EnvironmentVariable(token.text))
            }

            TokenKind::LeftParen => {
                self.advance();
                let expression = self.parse_expression()?;
                if !self.expect(TokenKind::RightParen) {
                    return self.error("Expected ')' after expression");
                }
                Ok(expression)
            }

            // The lexer's diagnostic, with its position, becomes the parse
            // error.
            TokenKind::Error => self.error(token.text),

            _ => self.error(format!("Unexpected token in expression: '{}'", token.text)),
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, LangError> {
        match self.current.kind {
            TokenKind::LeftBrace => self.parse_compound_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Read => self.parse_read_statement(),
            TokenKind::Write => self.parse_write_statement(),
            TokenKind::Identifier if self.peek.is(TokenKind::Colon) => self.parse_labeled_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_compound_statement(&mut self) -> Result<Statement, LangError> {
        if !self.expect(TokenKind::LeftBrace) {
            return self.error("Expected '{'");
        }

        let mut statements = Vec::new();
        while !self.current.is(TokenKind::RightBrace) {
            if self.current.is(TokenKind::EndOfFile) {
                return self.error("Expected '}' after compound statement");
            }
            statements.push(self.parse_statement()?);
        }

        self.advance();
        Ok(Statement::Compound(statements))
    }

    fn parse_if_statement(&mut self) -> Result<Statement, LangError> {
        self.advance();

        if !self.expect(TokenKind::LeftParen) {
            return self.error("Expected '(' after 'if'");
        }

        let condition = self.parse_expression()?;

        if !self.expect(TokenKind::RightParen) {
            return self.error("Expected ')' after if condition");
        }

        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.expect(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If { condition, then_branch, else_branch })
    }

    fn parse_while_statement(&mut self) -> Result<Statement, LangError> {
        self.advance();

        if !self.expect(TokenKind::LeftParen) {
            return self.error("Expected '(' after 'while'");
        }

        let condition = self.parse_expression()?;

        if !self.expect(TokenKind::RightParen) {
            return self.error("Expected ')' after while condition");
        }

        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While { condition, body })
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, LangError> {
        self.advance();

        let body = Box::new(self.parse_statement()?);

        if !self.expect(TokenKind::While) {
            return self.error("Expected 'while' after do statement");
        }

        if !self.expect(TokenKind::LeftParen) {
            return self.error("Expected '(' after 'while'");
        }

        let condition = self.parse_expression()?;

        if !self.expect(TokenKind::RightParen) {
            return self.error("Expected ')' after while condition");
        }

        if !self.expect(TokenKind::Semicolon) {
            return self.error("Expected ';' after do-while statement");
        }

        Ok(Statement::DoWhile { condition, body })
    }

    fn parse_for_statement(&mut self) -> Result<Statement, LangError> {
        self.advance();

        if !self.expect(TokenKind::LeftParen) {
            return self.error("Expected '(' after 'for'");
        }

        let init = if self.current.is(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        if !self.expect(TokenKind::Semicolon) {
            return self.error("Expected ';' after for init");
        }

        let condition = if self.current.is(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        if !self.expect(TokenKind::Semicolon) {
            return self.error("Expected ';' after for condition");
        }

        let update = if self.current.is(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        if !self.expect(TokenKind::RightParen) {
            return self.error("Expected ')' after for update");
        }

        let body = Box::new(self.parse_statement()?);
        Ok(Statement::For { init, condition, update, body })
    }

    fn parse_read_statement(&mut self) -> Result<Statement, LangError> {
        self.advance();

        if !self.expect(TokenKind::LeftParen) {
            return self.error("Expected '(' after 'read'");
        }

        if !self.current.is(TokenKind::Identifier) {
            return self.error("Expected identifier in read statement");
        }

        let variable = self.current.text.clone();
        self.advance();

        if !self.expect(TokenKind::RightParen) {
            return self.error("Expected ')' after read variable");
        }

        if !self.expect(TokenKind::Semicolon) {
            return self.error("Expected ';' after read statement");
        }

        Ok(Statement::Read { variable })
    }

    fn parse_write_statement(&mut self) -> Result<Statement, LangError> {
        self.advance();

        if !self.expect(TokenKind::LeftParen) {
            return self.error("Expected '(' after 'write'");
        }

        let arguments = self.parse_expression_list()?;

        if !self.expect(TokenKind::RightParen) {
            return self.error("Expected ')' after write arguments");
        }

        if !self.expect(TokenKind::Semicolon) {
            return self.error("Expected ';' after write statement");
        }

        Ok(Statement::Write { arguments })
    }

    /// Labels are recognized and dropped; nothing jumps to them.
    fn parse_labeled_statement(&mut self) -> Result<Statement, LangError> {
        self.advance();
        self.advance();
        self.parse_statement()
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, LangError> {
        let expression = self.parse_expression()?;
        if !self.expect(TokenKind::Semicolon) {
            return self.error("Expected ';' after expression");
        }
        Ok(Statement::Expression(expression))
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>, LangError> {
        let mut expressions = Vec::new();

        if !self.current.is(TokenKind::RightParen) {
            expressions.push(self.parse_expression()?);
            while self.expect(TokenKind::Comma) {
                expressions.push(self.parse_expression()?);
            }
        }

        Ok(expressions)
    }
}
