// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use phf::phf_map;

/// The header fields this server reads or writes, plus `Other` for anything
/// a client sends that we merely carry along.
///
/// Keys are kept case-sensitive as received: only the canonical spellings
/// below map to a known variant, everything else round-trips verbatim
/// through [`HeaderName::Other`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderName {
    Other(String),

    Allow,
    Connection,
    ContentLength,
    ContentType,
    Date,
    Host,
    LastModified,
    Referer,
    Server,
    UserAgent,
}

static STRING_TO_HEADER_NAME_MAP: phf::Map<&'static str, HeaderName> = phf_map!(
    "Allow" => HeaderName::Allow,
    "Connection" => HeaderName::Connection,
    "Content-Length" => HeaderName::ContentLength,
    "Content-Type" => HeaderName::ContentType,
    "Date" => HeaderName::Date,
    "Host" => HeaderName::Host,
    "Last-Modified" => HeaderName::LastModified,
    "Referer" => HeaderName::Referer,
    "Server" => HeaderName::Server,
    "User-Agent" => HeaderName::UserAgent,
);

impl HeaderName {
    /// Get the header name as it is spelled in an HTTP/1.x message.
    #[must_use]
    pub fn to_string_h1(&self) -> &str {
        match self {
            Self::Other(name) => name,
            Self::Allow => "Allow",
            Self::Connection => "Connection",
            Self::ContentLength => "Content-Length",
            Self::ContentType => "Content-Type",
            Self::Date => "Date",
            Self::Host => "Host",
            Self::LastModified => "Last-Modified",
            Self::Referer => "Referer",
            Self::Server => "Server",
            Self::UserAgent => "User-Agent",
        }
    }
}

impl From<String> for HeaderName {
    fn from(value: String) -> Self {
        match STRING_TO_HEADER_NAME_MAP.get(value.as_str()) {
            Some(name) => name.clone(),
            None => HeaderName::Other(value),
        }
    }
}

impl From<&str> for HeaderName {
    fn from(value: &str) -> Self {
        match STRING_TO_HEADER_NAME_MAP.get(value) {
            Some(name) => name.clone(),
            None => HeaderName::Other(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[test]
    fn test_to_and_from_string() {
        for (spelling, name) in STRING_TO_HEADER_NAME_MAP.entries() {
            assert_eq!(*spelling, name.to_string_h1());
        }
    }

    #[rstest]
    #[case("Content-Type", HeaderName::ContentType)]
    #[case("content-type", HeaderName::Other(String::from("content-type")))]
    #[case("CONTENT-TYPE", HeaderName::Other(String::from("CONTENT-TYPE")))]
    #[case("X-Powered-By", HeaderName::Other(String::from("X-Powered-By")))]
    fn test_case_sensitivity(#[case] input: &str, #[case] expected: HeaderName) {
        assert_eq!(HeaderName::from(input), expected);
    }
}
