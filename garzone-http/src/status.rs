// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

/// The status codes this server can answer with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum StatusCode {
    Ok = 200,

    BadRequest = 400,
    Forbidden = 403,
    NotFound = 404,

    InternalServerError = 500,
    NotImplemented = 501,
    ServiceUnavailable = 503,
}

impl StatusCode {
    #[must_use]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// The default comment attached to the status-line when the handler does
    /// not supply one of its own.
    #[must_use]
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad request",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::InternalServerError => "Internal error",
            Self::NotImplemented => "Not implemented",
            Self::ServiceUnavailable => "Unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest]
    #[case(StatusCode::Ok, 200, "OK")]
    #[case(StatusCode::BadRequest, 400, "Bad request")]
    #[case(StatusCode::Forbidden, 403, "Forbidden")]
    #[case(StatusCode::NotFound, 404, "Not found")]
    #[case(StatusCode::InternalServerError, 500, "Internal error")]
    #[case(StatusCode::NotImplemented, 501, "Not implemented")]
    #[case(StatusCode::ServiceUnavailable, 503, "Unavailable")]
    fn test_code_and_reason(#[case] status: StatusCode, #[case] code: u16, #[case] reason: &str) {
        assert_eq!(status.code(), code);
        assert_eq!(status.reason_phrase(), reason);
    }
}
