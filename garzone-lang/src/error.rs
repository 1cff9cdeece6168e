// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

/// Everything that can go wrong between source text and finished run.
///
/// Lexer failures surface as parse errors: the parser aborts on the first
/// error token it meets and carries its position along.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LangError {
    Parse {
        message: String,
        line: usize,
        column: usize,
    },
    Runtime {
        message: String,
    },
}

impl LangError {
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse { message: message.into(), line, column }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime { message: message.into() }
    }
}

impl std::fmt::Display for LangError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { message, line, column } => {
                write!(f, "Parse error at line {line}, column {column}: {message}")
            }
            Self::Runtime { message } => write!(f, "Runtime error: {message}"),
        }
    }
}

impl std::error::Error for LangError {}
