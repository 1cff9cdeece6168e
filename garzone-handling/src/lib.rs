// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Request dispatch for the Garzone webserver: static file serving, CGI
//! invocation, and the final response decoration every exchange gets.

pub mod cgi;
pub mod config;
pub mod media_type;
pub mod static_files;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use garzone_http::{
    HeaderName,
    HeaderValue,
    Request,
    Response,
    StatusCode,
};

pub use config::{
    DEFAULT_PORT,
    GarzoneConfig,
    GarzoneSettings,
};

pub use media_type::MediaType;

/// The identifier sent in the `Server` response header and the
/// `SERVER_SOFTWARE` CGI variable.
pub const SERVER_SOFTWARE: &str = "garzone";

/// Resolves the request path against the document root.
///
/// The path is URL-decoded first. Anything that escapes the root, including
/// a `..` component in encoded form, is refused outright; handlers only ever
/// see paths inside the tree they serve.
pub fn find_request_path_in_document_root(root: &Path, request_path: &str) -> Result<PathBuf, Response> {
    let Ok(url_decoded) = urlencoding::decode(&request_path[1..]) else {
        return Err(Response::with_status(StatusCode::BadRequest));
    };

    let path = root.join(url_decoded.into_owned());
    if !path.starts_with(root) {
        return Err(Response::with_status(StatusCode::Forbidden));
    }

    for component in path.components() {
        if let std::path::Component::ParentDir = component {
            return Err(Response::with_status(StatusCode::Forbidden));
        }
    }

    Ok(path)
}

/// Dispatches a request: URIs under `/cgi-bin` are executed, everything else
/// is served from the document root.
pub async fn handle_request(request: &Request, settings: &GarzoneSettings, peer: SocketAddr) -> Response {
    if request.target.path.starts_with("/cgi-bin") {
        return cgi::handle_cgi_request(request, settings, peer).await;
    }

    static_files::serve_file(request, settings).await
}

/// Decorates a response with the headers every exchange carries: `Date`,
/// `Server`, `Content-Length` and a `Content-Type` fallback.
///
/// Raw responses are left untouched; their bytes already form a complete
/// HTTP message.
pub fn finish_response(response: &mut Response) {
    if response.is_raw() {
        return;
    }

    response.headers.append_or_override(HeaderName::Date, HeaderValue::DateTime(SystemTime::now()));
    response.headers.append_or_override(HeaderName::Server, HeaderValue::StaticString(SERVER_SOFTWARE));

    // The static handler already set the real length for HEAD responses.
    if !response.headers.contains(&HeaderName::ContentLength) {
        response.headers.set_content_length(response.body_len());
    }

    response.headers.append(HeaderName::ContentType, (&MediaType::PLAIN_TEXT).into());
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest]
    #[case("/index.html", Some("index.html"))]
    #[case("/a/b/c.txt", Some("a/b/c.txt"))]
    #[case("/with%20space.txt", Some("with space.txt"))]
    #[case("/../etc/passwd", None)]
    #[case("/a/../../etc/passwd", None)]
    #[case("/%2e%2e/etc/passwd", None)]
    #[case("/a/%2E%2E/b", None)]
    fn test_find_request_path(#[case] request_path: &str, #[case] expected_suffix: Option<&str>) {
        let root = Path::new("/srv/doc-root");
        let result = find_request_path_in_document_root(root, request_path);
        match expected_suffix {
            Some(suffix) => assert_eq!(result.unwrap(), root.join(suffix)),
            None => assert_eq!(result.unwrap_err().status, StatusCode::Forbidden),
        }
    }

    #[test]
    fn test_finish_response_sets_required_headers() {
        let mut response = Response::with_status_and_string_body(StatusCode::Ok, "hello");
        finish_response(&mut response);

        assert!(response.headers.contains(&HeaderName::Date));
        assert_eq!(response.headers.get(&HeaderName::Server), Some(&HeaderValue::StaticString(SERVER_SOFTWARE)));
        assert_eq!(response.headers.get(&HeaderName::ContentLength), Some(&HeaderValue::Size(5)));
        assert_eq!(response.headers.get(&HeaderName::ContentType), Some(&HeaderValue::StaticString("text/plain")));
    }

    #[test]
    fn test_finish_response_keeps_existing_headers() {
        let mut response = Response::with_status(StatusCode::Ok);
        response.headers.append_or_override(HeaderName::ContentType, (&MediaType::HTML).into());
        response.headers.set_content_length(42);
        finish_response(&mut response);

        assert_eq!(response.headers.get(&HeaderName::ContentType), Some(&HeaderValue::StaticString("text/html")));
        assert_eq!(response.headers.get(&HeaderName::ContentLength), Some(&HeaderValue::Size(42)));
    }

    #[test]
    fn test_finish_response_leaves_raw_responses_alone() {
        let mut response = Response::from_raw_bytes(b"HTTP/1.1 200 OK\r\n\r\nok".to_vec());
        finish_response(&mut response);
        assert!(response.headers.is_empty());
        assert_eq!(response.serialize(), b"HTTP/1.1 200 OK\r\n\r\nok".to_vec());
    }
}
