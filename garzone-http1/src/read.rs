// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use garzone_http::{
    BodyKind,
    Error,
    HeaderMap,
    HeaderName,
    HeaderValue,
    HttpParseError,
    HttpVersion,
    Method,
    Request,
    RequestTarget,
};

use tokio::io::{
    AsyncBufRead,
    AsyncReadExt,
};

/// Indicates the maximum length of a certain HTTP entity.
pub(crate) struct MaximumLength(pub usize);

impl MaximumLength {
    /// The maximum length of a request-line, including method, target and
    /// version.
    pub const REQUEST_LINE: MaximumLength = MaximumLength(1024 + 32);

    /// The maximum length of a full HTTP header (name + value), excluding the
    /// line terminator.
    pub const HEADER: MaximumLength = MaximumLength(4096);

    /// The maximum length of a request body we are willing to buffer.
    pub const BODY: MaximumLength = MaximumLength(1024 * 1024);
}

/// Reads a line terminated by LF, up to the maximum length. A CR directly
/// before the LF is stripped, so both CRLF and bare-LF peers parse.
pub(crate) async fn read_line<R>(stream: &mut R, maximum_length: MaximumLength, length_error: HttpParseError) -> Result<String, Error>
        where R: AsyncBufRead + Unpin {
    let mut string = String::new();

    while string.len() <= maximum_length.0 {
        let byte = stream.read_u8().await?;
        if byte == b'\n' {
            if string.ends_with('\r') {
                string.pop();
            }
            return Ok(string);
        }

        string.push(byte as char);
    }

    Err(Error::ParseError(length_error))
}

/// Reads the headers from the stream.
///
/// A line is split on its first `:`; name and value are trimmed. Lines
/// without a colon are silently skipped, matching what lenient clients get
/// away with elsewhere.
pub(crate) async fn read_headers<R>(stream: &mut R) -> Result<HeaderMap, Error>
        where R: AsyncBufRead + Unpin {
    let mut header_map = HeaderMap::new();

    loop {
        let line = read_line(stream, MaximumLength::HEADER, HttpParseError::HeaderTooLarge).await?;
        if line.is_empty() {
            return Ok(header_map);
        }

        let Some((name, value)) = line.split_once(':') else {
            continue;
        };

        header_map.append_or_override(
            HeaderName::from(name.trim().to_string()),
            HeaderValue::from(value.trim().to_string()));
    }
}

/// Read the request-line from the stream and re-tokenize it into method,
/// target and version.
pub(crate) async fn read_request_line<R>(stream: &mut R) -> Result<(Method, RequestTarget, HttpVersion), Error>
        where R: AsyncBufRead + Unpin {
    let line = read_line(stream, MaximumLength::REQUEST_LINE, HttpParseError::RequestLineTooLarge).await?;

    let mut pieces = line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
            (pieces.next(), pieces.next(), pieces.next(), pieces.next()) else {
        return Err(Error::ParseError(HttpParseError::InvalidRequestLine));
    };

    let method = Method::try_from(method)?;
    let target = RequestTarget::parse(target).ok_or(HttpParseError::InvalidRequestTarget)?;
    let version = HttpVersion::try_from(version)?;

    Ok((method, target, version))
}

/// Read one full request off the stream. Completeness is decided by HTTP
/// framing: the blank line after the headers, then `Content-Length` bytes of
/// body if the client announced one.
pub(crate) async fn read_request<R>(stream: &mut R) -> Result<Request, Error>
        where R: AsyncBufRead + Unpin {
    let (method, target, version) = read_request_line(stream).await?;
    let headers = read_headers(stream).await?;

    let body = match headers.get(&HeaderName::ContentLength) {
        None => None,
        Some(value) => {
            let content_length = value.parse_number()
                .ok_or(HttpParseError::InvalidContentLength)?;
            if content_length > MaximumLength::BODY.0 {
                return Err(Error::ParseError(HttpParseError::BodyTooLarge));
            }

            let mut body = vec![0u8; content_length];
            stream.read_exact(&mut body).await?;
            Some(BodyKind::Bytes(body))
        }
    };

    Ok(Request { method, target, version, headers, body })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[tokio::test]
    async fn read_request_line_normal() {
        let mut stream = std::io::Cursor::new(b"GET / HTTP/1.0\r\n");
        let request_line = super::read_request_line(&mut stream).await.unwrap();
        assert_eq!(request_line.0, Method::Get);
        assert_eq!(request_line.1, RequestTarget::parse("/").unwrap());
        assert_eq!(request_line.2, HttpVersion::Http10);
    }

    #[rstest]
    #[case(b"GET / HTTP/1.0\r\n".as_slice(), Method::Get)]
    #[case(b"GET / HTTP/1.0\n".as_slice(), Method::Get)]
    #[case(b"HEAD /image.jpg HTTP/1.1\r\n".as_slice(), Method::Head)]
    #[tokio::test]
    async fn read_request_line_accepts_both_line_endings(#[case] input: &[u8], #[case] expected: Method) {
        let mut stream = std::io::Cursor::new(input.to_vec());
        let request_line = super::read_request_line(&mut stream).await.unwrap();
        assert_eq!(request_line.0, expected);
    }

    #[rstest]
    #[case(b"POST /x HTTP/1.0\r\n".as_slice(), HttpParseError::UnknownMethod)]
    #[case(b"get / HTTP/1.0\r\n".as_slice(), HttpParseError::UnknownMethod)]
    #[case(b"GET /\r\n".as_slice(), HttpParseError::InvalidRequestLine)]
    #[case(b"GET / HTTP/1.0 extra\r\n".as_slice(), HttpParseError::InvalidRequestLine)]
    #[case(b"GET nope HTTP/1.0\r\n".as_slice(), HttpParseError::InvalidRequestTarget)]
    #[case(b"GET / HTTP/2.0\r\n".as_slice(), HttpParseError::InvalidHttpVersion)]
    #[tokio::test]
    async fn read_request_line_errors(#[case] input: &[u8], #[case] expected: HttpParseError) {
        let mut stream = std::io::Cursor::new(input.to_vec());
        let error = super::read_request_line(&mut stream).await.unwrap_err();
        assert!(matches!(error, Error::ParseError(e) if e == expected));
    }

    #[tokio::test]
    async fn read_headers_splits_on_first_colon_and_trims() {
        let mut stream = std::io::Cursor::new(b"Host: localhost:8080\r\nUser-Agent:  spaced  value \r\n\r\n".to_vec());
        let headers = super::read_headers(&mut stream).await.unwrap();
        assert_eq!(headers.get(&HeaderName::Host), Some(&HeaderValue::from("localhost:8080".to_string())));
        assert_eq!(headers.get(&HeaderName::UserAgent), Some(&HeaderValue::from("spaced  value".to_string())));
    }

    #[tokio::test]
    async fn read_headers_ignores_lines_without_colon() {
        let mut stream = std::io::Cursor::new(b"garbage line\nHost: localhost\n\n".to_vec());
        let headers = super::read_headers(&mut stream).await.unwrap();
        assert_eq!(headers.len(), 1);
    }

    #[tokio::test]
    async fn read_request_round_trip() {
        const RAW: &[u8] = b"GET /index?a=1&flag HTTP/1.0\r\nHost: localhost\r\nX-Custom: yes\r\nContent-Length: 4\r\n\r\nbody";

        let mut stream = std::io::Cursor::new(RAW.to_vec());
        let request = super::read_request(&mut stream).await.unwrap();

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.target.path, "/index");
        assert_eq!(request.target.parameters.get("a").map(String::as_str), Some("1"));
        assert_eq!(request.target.parameters.get("flag").map(String::as_str), Some(""));
        assert_eq!(request.version, HttpVersion::Http10);
        assert_eq!(request.body, Some(BodyKind::Bytes(b"body".to_vec())));

        // Re-serializing preserves method, path, parameters, version, every
        // header and the body.
        let serialized = String::from_utf8(request.serialize()).unwrap();
        assert!(serialized.starts_with("GET /index?"));
        assert!(serialized.contains("a=1"));
        assert!(serialized.contains("flag"));
        assert!(serialized.contains(" HTTP/1.0\n"));
        assert!(serialized.contains("Host: localhost\n"));
        assert!(serialized.contains("X-Custom: yes\n"));
        assert!(serialized.ends_with("\n\nbody"));
    }

    #[tokio::test]
    async fn read_request_with_bad_content_length() {
        let mut stream = std::io::Cursor::new(b"GET / HTTP/1.0\r\nContent-Length: banana\r\n\r\n".to_vec());
        let error = super::read_request(&mut stream).await.unwrap_err();
        assert!(matches!(error, Error::ParseError(HttpParseError::InvalidContentLength)));
    }

    #[tokio::test]
    async fn read_line_too_long() {
        let mut data = vec![b'a'; MaximumLength::HEADER.0 + 10];
        data.push(b'\n');
        let mut stream = std::io::Cursor::new(data);
        let error = super::read_line(&mut stream, MaximumLength::HEADER, HttpParseError::HeaderTooLarge).await.unwrap_err();
        assert!(matches!(error, Error::ParseError(HttpParseError::HeaderTooLarge)));
    }
}
