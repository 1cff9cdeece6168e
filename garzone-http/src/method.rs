// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use phf::phf_map;

use crate::HttpParseError;

/// The request methods this server implements. Anything else on the wire is
/// rejected with [`HttpParseError::UnknownMethod`], which the session turns
/// into `501 Not implemented`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    Get,
    Head,
}

impl Method {
    /// Get the method in string form.
    ///
    /// Method tokens are case-sensitive, as per
    /// [RFC 9110 - Section 9.1](https://www.rfc-editor.org/rfc/rfc9110.html#section-9.1-5).
    pub fn as_string(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
        }
    }
}

static METHOD_MAP: phf::Map<&'static str, Method> = phf_map!(
    "GET" => Method::Get,
    "HEAD" => Method::Head,
);

impl TryFrom<&str> for Method {
    type Error = HttpParseError;

    fn try_from(value: &str) -> Result<Self, HttpParseError> {
        METHOD_MAP.get(value).copied().ok_or(HttpParseError::UnknownMethod)
    }
}
