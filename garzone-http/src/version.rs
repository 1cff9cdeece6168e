// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::HttpParseError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpVersion {
    Http10,
    Http11,
}

impl HttpVersion {
    /// Formats the [`HttpVersion`] to a HTTP-Version, as specified by RFC 9112.
    pub fn to_http_version(&self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
        }
    }
}

impl TryFrom<&str> for HttpVersion {
    type Error = HttpParseError;

    fn try_from(value: &str) -> Result<Self, HttpParseError> {
        match value {
            "HTTP/1.0" => Ok(Self::Http10),
            "HTTP/1.1" => Ok(Self::Http11),
            _ => Err(HttpParseError::InvalidHttpVersion),
        }
    }
}
