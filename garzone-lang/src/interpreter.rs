// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::io::BufRead;

use hashbrown::HashMap;

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
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::scope::{ScopeArena, ScopeId};
use crate::value::{Type, Value};

/// Runs scripts against a snapshot of the environment, with `write` output
/// going through an injectable sink and `read` input coming from an
/// injectable source.
///
/// The defaults are the process environment and standard input; the CGI
/// wrapper swaps the sink for a buffer it later ships as the response body.
pub struct Interpreter<'a> {
    environment: HashMap<String, String>,
    output: Box<dyn FnMut(&str) + 'a>,
    input: Box<dyn BufRead + 'a>,
}

impl<'a> Interpreter<'a> {
    /// An interpreter over the current process environment.
    pub fn new(output: impl FnMut(&str) + 'a) -> Self {
        Self::with_environment(std::env::vars().collect(), output)
    }

    pub fn with_environment(environment: HashMap<String, String>, output: impl FnMut(&str) + 'a) -> Self {
        Self {
            environment,
            output: Box::new(output),
            input: Box::new(std::io::BufReader::new(std::io::stdin())),
        }
    }

    /// Replaces the source the `read` statement consumes.
    pub fn with_input(mut self, input: impl BufRead + 'a) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Lex, parse and execute a whole script.
    pub fn interpret(&mut self, source: &str) -> Result<(), LangError> {
        let program = Parser::new(Lexer::new(source)).parse()?;

        let scopes = ScopeArena::new();
        let current = scopes.root();
        let mut evaluator = Evaluator { scopes, current, interpreter: self };
        evaluator.run(&program)
    }
}

/// The tree walker. Threads the scope arena and the id of the scope it is
/// currently in.
struct Evaluator<'e, 'a> {
    scopes: ScopeArena,
    current: ScopeId,
    interpreter: &'e mut Interpreter<'a>,
}

impl Evaluator<'_, '_> {
    fn run(&mut self, program: &Program) -> Result<(), LangError> {
        for declaration in &program.declarations {
            self.declare(declaration)?;
        }
        for statement in &program.statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn declare(&mut self, declaration: &VariableDecl) -> Result<(), LangError> {
        let value = match &declaration.initializer {
            Some(initializer) => {
                let value = self.evaluate(initializer)?;
                if value.value_type() != declaration.ty {
                    return Err(LangError::runtime(format!(
                        "initializer for '{}' has type {}, expected {}",
                        declaration.name,
                        value.value_type().name(),
                        declaration.ty.name())));
                }
                value
            }
            None => Value::zero_of(declaration.ty),
        };

        self.scopes.declare(self.current, &declaration.name, value)
    }

    fn execute(&mut self, statement: &Statement) -> Result<(), LangError> {
        match statement {
            Statement::Compound(statements) => {
                let parent = self.current;
                self.current = self.scopes.push_child(parent);

                let mut result = Ok(());
                for statement in statements {
                    result = self.execute(statement);
                    if result.is_err() {
                        break;
                    }
                }

                self.current = parent;
                result
            }

            Statement::If { condition, then_branch, else_branch } => {
                if self.condition(condition)? {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }

            Statement::While { condition, body } => {
                while self.condition(condition)? {
                    self.execute(body)?;
                }
                Ok(())
            }

            Statement::DoWhile { condition, body } => {
                loop {
                    self.execute(body)?;
                    if !self.condition(condition)? {
                        return Ok(());
                    }
                }
            }

            Statement::For { init, condition, update, body } => {
                if let Some(init) = init {
                    self.evaluate(init)?;
                }
                loop {
                    if let Some(condition) = condition {
                        if !self.condition(condition)? {
                            return Ok(());
                        }
                    }
                    self.execute(body)?;
                    if let Some(update) = update {
                        self.evaluate(update)?;
                    }
                }
            }

            Statement::Write { arguments } => {
                for argument in arguments {
                    let value = self.evaluate(argument)?;
                    (self.interpreter.output)(&value.to_string());
                }
                Ok(())
            }

            Statement::Read { variable } => self.execute_read(variable),

            Statement::Expression(expression) => {
                self.evaluate(expression)?;
                Ok(())
            }
        }
    }

    /// Loop and branch conditions must be boolean at runtime.
    fn condition(&mut self, expression: &Expression) -> Result<bool, LangError> {
        match self.evaluate(expression)? {
            Value::Boolean(value) => Ok(value),
            other => Err(LangError::runtime(format!(
                "condition has type {}, expected boolean", other.value_type().name()))),
        }
    }

    /// Reads one line of input and stores it into the variable, parsed as
    /// the variable's current type. Booleans additionally accept `1`/`0`.
    fn execute_read(&mut self, variable: &str) -> Result<(), LangError> {
        let ty = self.scopes.get(self.current, variable)?.value_type();

        let mut line = String::new();
        self.interpreter.input.read_line(&mut line)
            .map_err(|error| LangError::runtime(format!("failed to read input: {error}")))?;
        let text = line.trim_end_matches(['\r', '\n']);

        let text = match (ty, text) {
            (Type::Boolean, "1") => "true",
            (Type::Boolean, "0") => "false",
            (_, text) => text,
        };

        let value = Value::from_text(ty, text)?;
        self.scopes.set(self.current, variable, value)
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value, LangError> {
        match expression {
            Expression::IntegerLiteral(value) => Ok(Value::Int(*value)),
            Expression::RealLiteral(value) => Ok(Value::Real(*value)),
            Expression::StringLiteral(value) => Ok(Value::String(value.clone())),
            Expression::BooleanLiteral(value) => Ok(Value::Boolean(*value)),

            Expression::Identifier(name) => self.scopes.get(self.current, name),

            Expression::EnvironmentVariable(name) => {
                Ok(Value::String(self.interpreter.environment.get(name).cloned().unwrap_or_default()))
            }

            // `and`/`or` short-circuit: the right operand is only touched
            // when the left one does not decide the result.
            Expression::Binary { op: BinaryOperator::And, left, right } => {
                if !self.evaluate(left)?.as_boolean()? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.evaluate(right)?.as_boolean()?))
            }

            Expression::Binary { op: BinaryOperator::Or, left, right } => {
                if self.evaluate(left)?.as_boolean()? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.evaluate(right)?.as_boolean()?))
            }

            Expression::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply_binary(*op, left, right)
            }

            Expression::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                apply_unary(*op, value)
            }

            Expression::Assignment { target, value } => {
                let value = self.evaluate(value)?;
                match target {
                    AssignTarget::Variable(name) => {
                        self.scopes.set(self.current, name, value.clone())?;
                    }
                    AssignTarget::Environment(name) => {
                        self.interpreter.environment.insert(name.clone(), value.to_string());
                    }
                }
                Ok(value)
            }
        }
    }
}

fn unsupported(op: BinaryOperator, left: &Value, right: &Value) -> LangError {
    LangError::runtime(format!(
        "unsupported operand types for '{}': {} and {}",
        op.symbol(),
        left.value_type().name(),
        right.value_type().name()))
}

/// Promote a mixed int/real pair to reals. Pairs that are not numeric at
/// all are unsupported for `op`.
fn numeric_pair(op: BinaryOperator, left: &Value, right: &Value) -> Result<(f64, f64), LangError> {
    match (left, right) {
        (Value::Int(l), Value::Real(r)) => Ok((*l as f64, *r)),
        (Value::Real(l), Value::Int(r)) => Ok((*l, *r as f64)),
        (Value::Real(l), Value::Real(r)) => Ok((*l, *r)),
        _ => Err(unsupported(op, left, right)),
    }
}

fn apply_binary(op: BinaryOperator, left: Value, right: Value) -> Result<Value, LangError> {
    use BinaryOperator::*;

    match op {
        Add => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.wrapping_add(*r))),
            (Value::String(l), Value::String(r)) => Ok(Value::String(format!("{l}{r}"))),
            _ => numeric_pair(op, &left, &right).map(|(l, r)| Value::Real(l + r)),
        },

        Subtract => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.wrapping_sub(*r))),
            _ => numeric_pair(op, &left, &right).map(|(l, r)| Value::Real(l - r)),
        },

        Multiply => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.wrapping_mul(*r))),
            _ => numeric_pair(op, &left, &right).map(|(l, r)| Value::Real(l * r)),
        },

        Divide => match (&left, &right) {
            (Value::Int(_), Value::Int(0)) => Err(LangError::runtime("division by zero")),
            (Value::Int(l), Value::Int(r)) => l.checked_div(*r)
                .map(Value::Int)
                .ok_or_else(|| LangError::runtime("integer overflow in division")),
            _ => {
                let (l, r) = numeric_pair(op, &left, &right)?;
                if r == 0.0 {
                    return Err(LangError::runtime("division by zero"));
                }
                Ok(Value::Real(l / r))
            }
        },

        Modulo => match (&left, &right) {
            (Value::Int(_), Value::Int(0)) => Err(LangError::runtime("division by zero")),
            (Value::Int(l), Value::Int(r)) => l.checked_rem(*r)
                .map(Value::Int)
                .ok_or_else(|| LangError::runtime("integer overflow in modulo")),
            _ => Err(unsupported(op, &left, &right)),
        },

        Less | Greater | LessEqual | GreaterEqual => {
            let ordering = match (&left, &right) {
                (Value::Int(l), Value::Int(r)) => l.cmp(r),
                (Value::String(l), Value::String(r)) => l.cmp(r),
                _ => {
                    let (l, r) = numeric_pair(op, &left, &right)?;
                    l.partial_cmp(&r)
                        .ok_or_else(|| LangError::runtime("cannot order NaN"))?
                }
            };
            Ok(Value::Boolean(match op {
                Less => ordering.is_lt(),
                Greater => ordering.is_gt(),
                LessEqual => ordering.is_le(),
                GreaterEqual => ordering.is_ge(),
                _ => unreachable!(),
            }))
        }

        Equal | NotEqual => {
            let equal = match (&left, &right) {
                (Value::Int(l), Value::Int(r)) => l == r,
                (Value::String(l), Value::String(r)) => l == r,
                (Value::Boolean(l), Value::Boolean(r)) => l == r,
                _ => {
                    let (l, r) = numeric_pair(op, &left, &right)?;
                    l == r
                }
            };
            Ok(Value::Boolean(if op == Equal { equal } else { !equal }))
        }

        And | Or => unreachable!("short-circuited before reaching apply_binary"),
    }
}

fn apply_unary(op: UnaryOperator, value: Value) -> Result<Value, LangError> {
    match (op, value) {
        (UnaryOperator::Negate, Value::Int(value)) => Ok(Value::Int(value.wrapping_neg())),
        (UnaryOperator::Negate, Value::Real(value)) => Ok(Value::Real(-value)),
        (UnaryOperator::Not, Value::Boolean(value)) => Ok(Value::Boolean(!value)),
        (UnaryOperator::Negate, value) => Err(LangError::runtime(format!(
            "cannot negate a value of type {}", value.value_type().name()))),
        (UnaryOperator::Not, value) => Err(LangError::runtime(format!(
            "'not' expects a boolean, got {}", value.value_type().name()))),
    }
}
