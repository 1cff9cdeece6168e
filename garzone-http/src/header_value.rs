// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::fmt::Write;
use std::time::SystemTime;

/// Represents a value of a header.
///
/// Non-string variants avoid round-tripping through text until the message
/// is serialized: sizes stay numbers, dates stay [`SystemTime`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderValue {
    StaticString(&'static str),
    String(String),
    DateTime(SystemTime),
    Size(usize),
}

impl HeaderValue {
    /// Returns the value as a string, but does not convert it to a string if
    /// it is some other non-convertible type.
    #[must_use]
    pub fn as_str_no_convert(&self) -> Option<&str> {
        match self {
            HeaderValue::StaticString(string) => Some(string),
            HeaderValue::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn append_to_message(&self, message_text: &mut String) {
        match self {
            HeaderValue::StaticString(string) => message_text.push_str(string),
            HeaderValue::String(string) => message_text.push_str(string),
            HeaderValue::DateTime(date_time) => {
                _ = write!(message_text, "{}", httpdate::HttpDate::from(*date_time));
            }
            HeaderValue::Size(size) => _ = write!(message_text, "{size}"),
        }
    }

    /// Get the header value in string form.
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> String {
        let mut result = String::new();
        self.append_to_message(&mut result);
        result
    }

    /// Parses the value as a number.
    #[must_use]
    pub fn parse_number(&self) -> Option<usize> {
        match self {
            HeaderValue::StaticString(string) => string.parse().ok(),
            HeaderValue::String(string) => string.parse().ok(),
            HeaderValue::Size(size) => Some(*size),
            HeaderValue::DateTime(_) => None,
        }
    }
}

impl From<&'static str> for HeaderValue {
    fn from(value: &'static str) -> Self {
        Self::StaticString(value)
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<SystemTime> for HeaderValue {
    fn from(value: SystemTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<usize> for HeaderValue {
    fn from(value: usize) -> Self {
        Self::Size(value)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_date_time_formatting() {
        let epoch = HeaderValue::DateTime(SystemTime::UNIX_EPOCH);
        assert_eq!(epoch.to_string(), "Thu, 01 Jan 1970 00:00:00 GMT");

        let later = HeaderValue::DateTime(SystemTime::UNIX_EPOCH + Duration::from_secs(86400));
        assert_eq!(later.to_string(), "Fri, 02 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(HeaderValue::Size(42).parse_number(), Some(42));
        assert_eq!(HeaderValue::String("17".into()).parse_number(), Some(17));
        assert_eq!(HeaderValue::StaticString("bogus").parse_number(), None);
        assert_eq!(HeaderValue::DateTime(SystemTime::UNIX_EPOCH).parse_number(), None);
    }
}
