// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! **Common Gateway Interface** support: requests under `/cgi-bin` are
//! answered by executing the script and relaying its standard output.
//!
//! The child receives the CGI/1.1 metadata exclusively through its spawn-time
//! environment; the server's own environment is never mutated and never
//! leaks into the child.
//!
//! # References
//! * Robinson, D. and K. Coar, "The Common Gateway Interface (CGI) Version 1.1",
//!   RFC 3875, DOI 10.17487/RFC3875, October 2004, <https://www.rfc-editor.org/info/rfc3875>.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use std::process::Stdio;

use tokio::time::timeout;

use garzone_http::{
    HeaderName,
    Request,
    Response,
    StatusCode,
};

use crate::{
    GarzoneSettings,
    SERVER_SOFTWARE,
    find_request_path_in_document_root,
};

fn optional_header(request: &Request, name: &HeaderName) -> String {
    request.headers.get(name)
        .map(|value| value.to_string())
        .unwrap_or_default()
}

/// The CGI/1.1 metadata variables handed to the child.
fn build_environment(request: &Request, settings: &GarzoneSettings, peer: SocketAddr, script_path: &Path) -> Vec<(String, String)> {
    vec![
        ("SCRIPT_NAME".into(), request.target.path.clone()),
        ("DOCUMENT_ROOT".into(), settings.document_root.to_string_lossy().into_owned()),
        ("SCRIPT_FILENAME".into(), script_path.to_string_lossy().into_owned()),
        ("CONTENT_TYPE".into(), "text/plain".into()),
        ("GATEWAY_INTERFACE".into(), "CGI/1.1".into()),
        ("SERVER_PORT".into(), settings.port.to_string()),
        ("SERVER_PROTOCOL".into(), "HTTP/1.0".into()),
        ("SERVER_SOFTWARE".into(), SERVER_SOFTWARE.into()),
        ("SERVER_NAME".into(), "localhost".into()),
        ("HTTP_REFERER".into(), optional_header(request, &HeaderName::Referer)),
        ("HTTP_USER_AGENT".into(), optional_header(request, &HeaderName::UserAgent)),
        ("REMOTE_ADDR".into(), peer.ip().to_string()),
        ("REMOTE_PORT".into(), peer.port().to_string()),
    ]
}

/// Executes the CGI script named by the request URI and wraps its stdout as
/// a raw-mode response. The script is expected to emit a complete HTTP
/// response itself.
pub async fn handle_cgi_request(request: &Request, settings: &GarzoneSettings, peer: SocketAddr) -> Response {
    let script_path = match find_request_path_in_document_root(&settings.document_root, request.target.as_str()) {
        Ok(path) => path,
        Err(response) => return response,
    };

    if !script_path.is_file() {
        return Response::with_status_and_comment(StatusCode::NotFound, "CGI script not found");
    }

    let mut command = tokio::process::Command::new(&script_path);
    command
        .env_clear()
        .envs(build_environment(request, settings, peer, &script_path))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(error) => return match error.kind() {
            ErrorKind::NotFound => Response::with_status(StatusCode::NotFound),
            ErrorKind::WouldBlock | ErrorKind::OutOfMemory => {
                Response::with_status(StatusCode::ServiceUnavailable)
            }
            _ => Response::with_status_and_string_body(
                StatusCode::InternalServerError,
                format!("exec('{}') failed: {}", script_path.display(), error)),
        },
    };

    // Stdout is drained concurrently with waiting for the exit; a script may
    // produce more than a pipe buffer of output.
    match timeout(settings.cgi_timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Response::from_raw_bytes(output.stdout),
        Ok(Err(error)) => Response::with_status_and_string_body(
            StatusCode::InternalServerError,
            format!("waiting for '{}' failed: {}", script_path.display(), error)),
        // Dropping the timed-out future kills the child.
        Err(_) => Response::with_status_and_string_body(
            StatusCode::InternalServerError,
            format!("'{}' did not finish in time", script_path.display())),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use garzone_http::{HeaderMap, HeaderValue, HttpVersion, Method, RequestTarget};

    use super::*;

    fn settings_with_root(root: &Path) -> GarzoneSettings {
        GarzoneSettings {
            port: 8080,
            document_root: root.to_path_buf(),
            read_headers_timeout: Duration::from_secs(10),
            cgi_timeout: Duration::from_secs(2),
        }
    }

    fn cgi_request(target: &str) -> Request {
        let mut headers = HeaderMap::new();
        headers.append_or_override(HeaderName::UserAgent, HeaderValue::from("Mozilla/5.0"));
        Request {
            method: Method::Get,
            target: RequestTarget::parse(target).unwrap(),
            version: HttpVersion::Http10,
            headers,
            body: None,
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:49152".parse().unwrap()
    }

    #[test]
    fn test_environment_variables() {
        let settings = settings_with_root(Path::new("/srv/doc-root"));
        let request = cgi_request("/cgi-bin/demo?name=world");
        let script = Path::new("/srv/doc-root/cgi-bin/demo");

        let environment = build_environment(&request, &settings, peer(), script);
        let get = |key: &str| environment.iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str());

        assert_eq!(get("SCRIPT_NAME"), Some("/cgi-bin/demo"));
        assert_eq!(get("DOCUMENT_ROOT"), Some("/srv/doc-root"));
        assert_eq!(get("SCRIPT_FILENAME"), Some("/srv/doc-root/cgi-bin/demo"));
        assert_eq!(get("CONTENT_TYPE"), Some("text/plain"));
        assert_eq!(get("GATEWAY_INTERFACE"), Some("CGI/1.1"));
        assert_eq!(get("SERVER_PORT"), Some("8080"));
        assert_eq!(get("SERVER_PROTOCOL"), Some("HTTP/1.0"));
        assert_eq!(get("SERVER_SOFTWARE"), Some(SERVER_SOFTWARE));
        assert_eq!(get("SERVER_NAME"), Some("localhost"));
        assert_eq!(get("HTTP_REFERER"), Some(""));
        assert_eq!(get("HTTP_USER_AGENT"), Some("Mozilla/5.0"));
        assert_eq!(get("REMOTE_ADDR"), Some("127.0.0.1"));
        assert_eq!(get("REMOTE_PORT"), Some("49152"));
    }

    #[tokio::test]
    async fn test_missing_script_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("cgi-bin")).unwrap();
        let settings = settings_with_root(root.path());

        let response = handle_cgi_request(&cgi_request("/cgi-bin/nope"), &settings, peer()).await;
        assert_eq!(response.status, StatusCode::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_output_becomes_raw_response() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let cgi_bin = root.path().join("cgi-bin");
        std::fs::create_dir(&cgi_bin).unwrap();

        let script = cgi_bin.join("hello");
        std::fs::write(&script, "#!/bin/sh\nprintf 'HTTP/1.1 200 OK\\r\\n\\r\\nagent=%s' \"$HTTP_USER_AGENT\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let settings = settings_with_root(root.path());
        let response = handle_cgi_request(&cgi_request("/cgi-bin/hello"), &settings, peer()).await;

        assert!(response.is_raw());
        assert_eq!(response.serialize(), b"HTTP/1.1 200 OK\r\n\r\nagent=Mozilla/5.0".to_vec());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unexecutable_script_is_internal_error() {
        let root = tempfile::tempdir().unwrap();
        let cgi_bin = root.path().join("cgi-bin");
        std::fs::create_dir(&cgi_bin).unwrap();
        std::fs::write(cgi_bin.join("broken"), "not a program").unwrap();

        let settings = settings_with_root(root.path());
        let response = handle_cgi_request(&cgi_request("/cgi-bin/broken"), &settings, peer()).await;
        assert_eq!(response.status, StatusCode::InternalServerError);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wedged_script_is_killed() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let cgi_bin = root.path().join("cgi-bin");
        std::fs::create_dir(&cgi_bin).unwrap();

        let script = cgi_bin.join("sleeper");
        std::fs::write(&script, "#!/bin/sh\nsleep 60\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut settings = settings_with_root(root.path());
        settings.cgi_timeout = Duration::from_millis(100);

        let response = handle_cgi_request(&cgi_request("/cgi-bin/sleeper"), &settings, peer()).await;
        assert_eq!(response.status, StatusCode::InternalServerError);
    }
}
