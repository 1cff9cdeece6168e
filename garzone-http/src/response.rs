// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::borrow::Cow;

use crate::{
    BodyKind,
    HeaderMap,
    HttpVersion,
    StatusCode,
};

#[derive(Debug)]
pub struct Response {
    pub version: HttpVersion,
    pub status: StatusCode,
    pub comment: String,
    pub headers: HeaderMap,
    pub body: Option<BodyKind>,

    /// A raw response bypasses the header machinery entirely: serialization
    /// emits the body verbatim. Used when a CGI child already produced a
    /// complete HTTP response on its stdout.
    raw: bool,
}

impl Response {
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            version: HttpVersion::Http10,
            status,
            comment: status.reason_phrase().to_string(),
            headers: HeaderMap::new(),
            body: None,
            raw: false,
        }
    }

    pub fn with_status_and_comment(status: StatusCode, comment: impl Into<String>) -> Self {
        let mut response = Self::with_status(status);
        response.comment = comment.into();
        response
    }

    pub fn with_status_and_string_body(status: StatusCode, body: impl Into<Cow<'static, str>>) -> Self {
        let mut response = Self::with_status(status);
        response.body = match body.into() {
            Cow::Owned(body) => Some(BodyKind::String(body)),
            Cow::Borrowed(body) => Some(BodyKind::StaticString(body)),
        };
        response
    }

    /// Wrap bytes that already form a complete HTTP response.
    pub fn from_raw_bytes(bytes: Vec<u8>) -> Self {
        let mut response = Self::with_status(StatusCode::Ok);
        response.body = Some(BodyKind::Bytes(bytes));
        response.raw = true;
        response
    }

    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, BodyKind::len)
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        self.comment = status.reason_phrase().to_string();
    }

    /// The derived status-line, `"<version> <code> <comment>"`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {} {}",
            self.version.to_http_version(),
            self.status.code(),
            self.comment)
    }

    /// Serialize the response: the status-line, each header field, a blank
    /// line, then the body. Raw responses are emitted verbatim.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        if self.raw {
            return self.body.as_ref().map_or(Vec::new(), |body| body.as_bytes().to_vec());
        }

        let mut text = self.title();
        text.push('\n');

        for (name, value) in self.headers.iter() {
            text.push_str(name.to_string_h1());
            text.push_str(": ");
            value.append_to_message(&mut text);
            text.push('\n');
        }

        text.push('\n');

        let mut bytes = text.into_bytes();
        if let Some(body) = &self.body {
            bytes.extend_from_slice(body.as_bytes());
        }
        bytes
    }
}
