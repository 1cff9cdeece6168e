// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Glue for running a script as a CGI program: capture the interpreter's
//! output and wrap it (or the error page) in a complete HTTP response, the
//! form the webserver relays verbatim.

use hashbrown::HashMap;

use crate::{Interpreter, LangError};

/// Escapes text for embedding in HTML.
pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Drops a leading `#!` interpreter line, so a script can name this binary
/// and still be fed back to it.
pub fn strip_shebang(source: &str) -> &str {
    if !source.starts_with("#!") {
        return source;
    }

    match source.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    }
}

fn error_page(error: &LangError) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html>\n",
            "<head>\n",
            "    <meta charset=\"utf-8\">\n",
            "    <title>Error</title>\n",
            "</head>\n",
            "<body>\n",
            "    <h1>Error</h1>\n",
            "    <pre>{}</pre>\n",
            "</body>\n",
            "</html>"),
        html_escape(&error.to_string()))
}

fn wrap_http_response(status_line: &str, content: &str) -> String {
    format!(
        "{status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n{content}",
        content.len())
}

/// Runs `script` against the given environment snapshot and returns the
/// complete HTTP response to print on stdout.
///
/// A failing script gets an HTML error page under a 500 status; the page
/// carries the HTML-escaped failure description.
pub fn handle_request(script: &str, environment: HashMap<String, String>) -> String {
    let mut output = String::new();
    let result = Interpreter::with_environment(environment, |text: &str| output.push_str(text))
        .interpret(script);

    match result {
        Ok(()) => wrap_http_response("HTTP/1.1 200 OK", &output),
        Err(error) => wrap_http_response("HTTP/1.1 500 Internal Server Error", &error_page(&error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a < b & c > \"d\" 'e'"), "a &lt; b &amp; c &gt; &quot;d&quot; &apos;e&apos;");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_strip_shebang() {
        assert_eq!(strip_shebang("#!/usr/bin/lang\nprogram write(1);"), "program write(1);");
        assert_eq!(strip_shebang("program write(1);"), "program write(1);");
        assert_eq!(strip_shebang("#!/usr/bin/lang"), "");
    }

    #[test]
    fn test_successful_script_wraps_output() {
        let response = handle_request("program write(\"<b>hi</b>\");", HashMap::new());
        assert_eq!(response,
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 9\r\n\r\n<b>hi</b>");
    }

    #[test]
    fn test_content_length_matches_body() {
        for script in ["program write(1, 2, 3);", "program broken", "program write(1/0);"] {
            let response = handle_request(script, HashMap::new());
            let (head, body) = response.split_once("\r\n\r\n").unwrap();
            let content_length: usize = head.lines()
                .find_map(|line| line.strip_prefix("Content-Length: "))
                .unwrap()
                .parse()
                .unwrap();
            assert_eq!(content_length, body.len(), "script {script:?}");
        }
    }

    #[test]
    fn test_environment_flows_into_script() {
        let mut environment = HashMap::new();
        environment.insert("QUERY_STRING".to_string(), "a=1".to_string());
        let response = handle_request("program write($QUERY_STRING);", environment);
        assert!(response.ends_with("\r\n\r\na=1"));
    }

    #[test]
    fn test_failing_script_becomes_escaped_error_page() {
        let response = handle_request("program write(1 / 0);", HashMap::new());

        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"), "{response}");
        assert!(response.contains("<pre>Runtime error: division by zero</pre>"), "{response}");
    }

    #[test]
    fn test_parse_error_page_is_escaped() {
        let response = handle_request("program write(\"unterminated);", HashMap::new());
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"), "{response}");
        assert!(response.contains("Unterminated string"), "{response}");
        // The raw quote from the source must not survive unescaped markup.
        assert!(!response.contains("<pre></pre>"));
    }
}
