// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use crate::{
    BodyKind,
    HeaderMap,
    HttpVersion,
    Method,
    RequestTarget,
};

#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub target: RequestTarget,
    pub version: HttpVersion,
    pub headers: HeaderMap,
    pub body: Option<BodyKind>,
}

impl Request {
    /// The derived request-line, `"<method> <target> <version>"`. It is
    /// computed on demand so it can never go stale after a mutation.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {} {}",
            self.method.as_string(),
            self.target.to_target_string(),
            self.version.to_http_version())
    }

    /// Serialize the request back into message form: the request-line, each
    /// header field, a blank line, then the body.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
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

#[cfg(test)]
mod tests {
    use crate::HeaderName;
    use super::*;

    #[test]
    fn test_title_is_derived() {
        let mut request = Request {
            method: Method::Get,
            target: RequestTarget::parse("/index.html").unwrap(),
            version: HttpVersion::Http10,
            headers: HeaderMap::new(),
            body: None,
        };
        assert_eq!(request.title(), "GET /index.html HTTP/1.0");

        request.method = Method::Head;
        request.target = RequestTarget::parse("/image.jpg").unwrap();
        assert_eq!(request.title(), "HEAD /image.jpg HTTP/1.0");
    }

    #[test]
    fn test_serialize() {
        let mut headers = HeaderMap::new();
        headers.append_or_override(HeaderName::Host, "localhost".into());
        headers.append_or_override(HeaderName::Other("X-Custom".into()), "yes".into());

        let request = Request {
            method: Method::Get,
            target: RequestTarget::parse("/").unwrap(),
            version: HttpVersion::Http11,
            headers,
            body: Some(BodyKind::StaticString("payload")),
        };

        let text = String::from_utf8(request.serialize()).unwrap();
        assert_eq!(text, "GET / HTTP/1.1\nHost: localhost\nX-Custom: yes\n\npayload");
    }
}
