// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use phf::phf_map;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    // Keywords. Some of these are merely reserved: the grammar has no
    // statement for them yet, but the lexer claims them anyway.
    Program, Int, String, If, Else, While, Do, For, Read, Write,
    Case, Of, End, Step, Until, Continue, Break, Goto,
    Boolean, Real, True, False, And, Or, Not,

    // Operators and punctuation
    Plus, Minus, Multiply, Divide, Modulo,
    Less, Greater, LessEqual, GreaterEqual, Equal, NotEqual,
    Assign, Semicolon, Comma, Colon,
    LeftParen, RightParen, LeftBrace, RightBrace,

    // Literals and identifiers
    Identifier, Integer, RealNumber, StringLiteral, EnvVar,

    // Special tokens
    EndOfFile, Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The lexeme: literal text for most tokens, the decoded contents for
    /// string literals, the diagnostic message for error tokens.
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map!(
    "program" => TokenKind::Program,
    "int" => TokenKind::Int,
    "string" => TokenKind::String,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "do" => TokenKind::Do,
    "for" => TokenKind::For,
    "read" => TokenKind::Read,
    "write" => TokenKind::Write,
    "case" => TokenKind::Case,
    "of" => TokenKind::Of,
    "end" => TokenKind::End,
    "step" => TokenKind::Step,
    "until" => TokenKind::Until,
    "continue" => TokenKind::Continue,
    "break" => TokenKind::Break,
    "goto" => TokenKind::Goto,
    "boolean" => TokenKind::Boolean,
    "real" => TokenKind::Real,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "and" => TokenKind::And,
    "or" => TokenKind::Or,
    "not" => TokenKind::Not,
);

/// Single-pass tokenizer with one character of lookahead.
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn lookahead(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(c) if c.is_ascii_whitespace()) {
            self.advance();
        }
    }

    /// Skips a `/* ... */` comment. Not nestable: the comment ends at the
    /// first `*/`.
    fn skip_comment(&mut self) {
        if self.current() != Some('/') || self.lookahead() != Some('*') {
            return;
        }

        self.advance();
        self.advance();

        while let Some(c) = self.current() {
            if c == '*' && self.lookahead() == Some('/') {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }
    }

    fn token(&self, kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Token {
        Token { kind, text: text.into(), line, column }
    }

    fn read_digits(&mut self, into: &mut String) {
        while let Some(c) = self.current() {
            if !c.is_ascii_digit() {
                break;
            }
            into.push(c);
            self.advance();
        }
    }

    fn read_sign(&mut self, into: &mut String) {
        if let Some(sign @ ('+' | '-')) = self.current() {
            into.push(sign);
            self.advance();
        }
    }

    fn read_number(&mut self) -> Token {
        let line = self.line;
        let column = self.column;
        let mut number = String::new();
        let mut is_real = false;

        self.read_sign(&mut number);
        self.read_digits(&mut number);

        if self.current() == Some('.') {
            is_real = true;
            number.push('.');
            self.advance();
            self.read_digits(&mut number);
        }

        if let Some(exponent @ ('e' | 'E')) = self.current() {
            is_real = true;
            number.push(exponent);
            self.advance();
            self.read_sign(&mut number);
            self.read_digits(&mut number);
        }

        let kind = if is_real { TokenKind::RealNumber } else { TokenKind::Integer };
        self.token(kind, number, line, column)
    }

    fn read_string(&mut self) -> Token {
        let line = self.line;
        let column = self.column;
        let mut contents = String::new();

        self.advance();

        loop {
            match self.current() {
                None => return self.token(TokenKind::Error, "Unterminated string", line, column),
                Some('"') => break,
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        Some('n') => contents.push('\n'),
                        Some('t') => contents.push('\t'),
                        Some('"') => contents.push('"'),
                        Some('\\') => contents.push('\\'),
                        // Unknown escapes pass through with their backslash.
                        Some(other) => {
                            contents.push('\\');
                            contents.push(other);
                        }
                        None => return self.token(TokenKind::Error, "Unterminated string", line, column),
                    }
                    self.advance();
                }
                Some(c) => {
                    contents.push(c);
                    self.advance();
                }
            }
        }

        self.advance();
        self.token(TokenKind::StringLiteral, contents, line, column)
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.current() {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            self.advance();
        }
        name
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let line = self.line;
        let column = self.column;

        let identifier = self.read_name();
        let kind = KEYWORDS.get(identifier.as_str()).copied().unwrap_or(TokenKind::Identifier);
        self.token(kind, identifier, line, column)
    }

    fn read_environment_variable(&mut self) -> Token {
        let line = self.line;
        let column = self.column;

        self.advance();
        let name = self.read_name();

        if name.is_empty() {
            return self.token(TokenKind::Error, "Invalid environment variable name", line, column);
        }

        self.token(TokenKind::EnvVar, name, line, column)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.skip_comment();
        self.skip_whitespace();

        let line = self.line;
        let column = self.column;

        let Some(c) = self.current() else {
            return self.token(TokenKind::EndOfFile, "", line, column);
        };

        // A sign adheres to a number only when a digit follows directly.
        if c.is_ascii_digit()
                || ((c == '+' || c == '-') && matches!(self.lookahead(), Some(d) if d.is_ascii_digit())) {
            return self.read_number();
        }

        if c == '"' {
            return self.read_string();
        }

        if c == '$' {
            return self.read_environment_variable();
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return self.read_identifier_or_keyword();
        }

        let simple = |lexer: &Self, kind: TokenKind, text: &str| lexer.token(kind, text, line, column);

        match c {
            '+' => { self.advance(); simple(self, TokenKind::Plus, "+") }
            '-' => { self.advance(); simple(self, TokenKind::Minus, "-") }
            '*' => { self.advance(); simple(self, TokenKind::Multiply, "*") }
            '/' => { self.advance(); simple(self, TokenKind::Divide, "/") }
            '%' => { self.advance(); simple(self, TokenKind::Modulo, "%") }
            '=' => {
                self.advance();
                if self.current() == Some('=') {
                    self.advance();
                    simple(self, TokenKind::Equal, "==")
                } else {
                    simple(self, TokenKind::Assign, "=")
                }
            }
            '<' => {
                self.advance();
                if self.current() == Some('=') {
                    self.advance();
                    simple(self, TokenKind::LessEqual, "<=")
                } else {
                    simple(self, TokenKind::Less, "<")
                }
            }
            '>' => {
                self.advance();
                if self.current() == Some('=') {
                    self.advance();
                    simple(self, TokenKind::GreaterEqual, ">=")
                } else {
                    simple(self, TokenKind::Greater, ">")
                }
            }
            '!' => {
                self.advance();
                if self.current() == Some('=') {
                    self.advance();
                    simple(self, TokenKind::NotEqual, "!=")
                } else {
                    simple(self, TokenKind::Error, "Unexpected character '!'")
                }
            }
            ';' => { self.advance(); simple(self, TokenKind::Semicolon, ";") }
            ',' => { self.advance(); simple(self, TokenKind::Comma, ",") }
            ':' => { self.advance(); simple(self, TokenKind::Colon, ":") }
            '(' => { self.advance(); simple(self, TokenKind::LeftParen, "(") }
            ')' => { self.advance(); simple(self, TokenKind::RightParen, ")") }
            '{' => { self.advance(); simple(self, TokenKind::LeftBrace, "{") }
            '}' => { self.advance(); simple(self, TokenKind::RightBrace, "}") }
            other => {
                self.advance();
                self.token(TokenKind::Error, format!("Unexpected character '{other}'"), line, column)
            }
        }
    }

    /// Returns the next token without consuming it, by saving and restoring
    /// the cursor state.
    pub fn peek_token(&mut self) -> Token {
        let saved_position = self.position;
        let saved_line = self.line;
        let saved_column = self.column;

        let token = self.next_token();

        self.position = saved_position;
        self.line = saved_line;
        self.column = saved_column;

        token
    }
}
