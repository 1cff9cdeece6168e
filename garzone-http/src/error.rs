// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::io;

/// Errors that can occur whilst parsing an HTTP/1.x message off the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpParseError {
    BodyTooLarge,
    HeaderTooLarge,
    InvalidContentLength,
    InvalidHttpVersion,
    InvalidRequestLine,
    InvalidRequestTarget,
    RequestLineTooLarge,
    UnknownMethod,
}

impl AsRef<str> for HttpParseError {
    fn as_ref(&self) -> &str {
        match self {
            Self::BodyTooLarge => "message body is too large",
            Self::HeaderTooLarge => "header line is too large",
            Self::InvalidContentLength => "Content-Length is not a valid number",
            Self::InvalidHttpVersion => "invalid HTTP version",
            Self::InvalidRequestLine => "request line does not contain method, target and version",
            Self::InvalidRequestTarget => "invalid request target",
            Self::RequestLineTooLarge => "request line is too large",
            Self::UnknownMethod => "unknown request method",
        }
    }
}

impl std::fmt::Display for HttpParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// The wire layer either fails because the peer sent something we cannot
/// parse, or because the transport itself failed.
#[derive(Debug)]
pub enum Error {
    ParseError(HttpParseError),
    Other(io::Error),
}

impl From<HttpParseError> for Error {
    fn from(value: HttpParseError) -> Self {
        Self::ParseError(value)
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Other(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseError(error) => write!(f, "parse error: {}", error),
            Self::Other(error) => write!(f, "i/o error: {}", error),
        }
    }
}

impl std::error::Error for Error {}
