// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The HTTP/1.0 wire layer: per-connection session loop and the accept loop
//! feeding it.

mod read;

pub(crate) use read::*;

use std::io;
use std::net::SocketAddr;

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter},
    net::{TcpListener, TcpStream},
    sync::watch,
    task::JoinSet,
    time::timeout,
};

use garzone_http::{
    Error,
    HttpParseError,
    Response,
    StatusCode,
};

use garzone_handling::{
    GarzoneConfig,
    GarzoneSettings,
    finish_response,
    handle_request,
};

#[cfg(unix)]
const ERRNO_EMFILE: i32 = 24;

#[derive(Debug)]
pub enum ExchangeError {
    /// The peer closed the connection before sending another request. The
    /// normal end of a session.
    ConnectionClosed,
    MalformedData,
    TimedOut,
    Io(io::Error),
}

impl From<io::Error> for ExchangeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Reads a single request, handles it and sends the response back to the
/// client.
pub async fn handle_exchange<R, W>(reader: &mut R, writer: &mut W, settings: &GarzoneSettings, peer: SocketAddr) -> Result<(), ExchangeError>
        where R: AsyncBufRead + Unpin,
              W: AsyncWrite + Unpin {
    // An empty read at a request boundary is the client hanging up.
    if reader.fill_buf().await?.is_empty() {
        return Err(ExchangeError::ConnectionClosed);
    }

    let request = match timeout(settings.read_headers_timeout, read_request(reader)).await {
        Ok(request) => request,
        Err(_) => return Err(ExchangeError::TimedOut),
    };

    // A parse failure still gets an answer, but the connection cannot be
    // trusted for framing afterwards, so the session ends with it.
    let (mut response, parse_failure) = match request {
        Ok(request) => (handle_request(&request, settings, peer).await, false),
        Err(Error::ParseError(HttpParseError::UnknownMethod)) => {
            (Response::with_status(StatusCode::NotImplemented), true)
        }
        Err(Error::ParseError(error)) => {
            #[cfg(debug_assertions)]
            println!("[http1] malformed request from {}: {}", peer, error);

            #[cfg(not(debug_assertions))]
            { _ = error }

            (Response::with_status(StatusCode::BadRequest), true)
        }
        Err(Error::Other(error)) => return Err(error.into()),
    };

    finish_response(&mut response);
    send_response(writer, &response).await?;

    if parse_failure {
        return Err(ExchangeError::MalformedData);
    }

    Ok(())
}

/// Send the response to the client.
pub async fn send_response<W>(stream: &mut W, response: &Response) -> Result<(), io::Error>
        where W: AsyncWrite + Unpin {
    stream.write_all(&response.serialize()).await?;
    stream.flush().await?;
    Ok(())
}

/// Process a single socket connection: exchanges repeat until the client
/// hangs up or breaks the protocol.
async fn process_socket(stream: TcpStream, settings: GarzoneSettings) {
    let Ok(peer) = stream.peer_addr() else {
        return;
    };

    let (reader, writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(writer);

    loop {
        match handle_exchange(&mut reader, &mut writer, &settings, peer).await {
            Ok(()) => continue,
            Err(ExchangeError::ConnectionClosed) => return,
            Err(error) => {
                #[cfg(debug_assertions)]
                println!("[http1] session with {} ended: {:?}", peer, error);

                #[cfg(not(debug_assertions))]
                { _ = error }
                return;
            }
        }
    }
}

/// Start the HTTP/1.0 server on the given address.
///
/// Every accepted connection gets its own worker task; the set of live
/// workers is tracked so a shutdown signal can cancel them all before the
/// listener is dropped.
pub async fn start(address: &str, config: GarzoneConfig, mut shutdown: watch::Receiver<()>) -> io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    println!("[http1] listening on {}", address);

    let mut workers = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,

            accepted = listener.accept() => {
                let (stream, _) = match accepted {
                    Ok((stream, addr)) => (stream, addr),
                    Err(e) => {
                        #[cfg(unix)]
                        if e.raw_os_error() == Some(ERRNO_EMFILE) {
                            tokio::task::yield_now().await;
                            continue;
                        }

                        eprintln!("[FATAL] error accepting connection: {}", e);
                        continue;
                    }
                };

                let settings = config.settings.clone();
                workers.spawn(process_socket(stream, settings));
            }

            // Reap finished workers so the set only holds live sessions.
            Some(_) = workers.join_next() => {}
        }
    }

    println!("[http1] shutting down, cancelling {} live session(s)", workers.len());
    workers.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    fn test_settings() -> GarzoneSettings {
        GarzoneSettings {
            port: 8080,
            document_root: PathBuf::from("/nonexistent"),
            read_headers_timeout: Duration::from_secs(5),
            cgi_timeout: Duration::from_secs(5),
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn exchange(input: &[u8]) -> (Result<(), ExchangeError>, String) {
        let mut reader = std::io::Cursor::new(input.to_vec());
        let mut writer = Vec::new();
        let result = handle_exchange(&mut reader, &mut writer, &test_settings(), peer()).await;
        (result, String::from_utf8_lossy(&writer).into_owned())
    }

    #[tokio::test]
    async fn test_unknown_method_is_501() {
        let (result, response) = exchange(b"POST /x HTTP/1.0\r\n\r\n").await;
        assert!(matches!(result, Err(ExchangeError::MalformedData)));
        assert!(response.starts_with("HTTP/1.0 501 Not implemented\n"), "{response}");
    }

    #[tokio::test]
    async fn test_garbage_is_400() {
        let (result, response) = exchange(b"GARBAGE\r\n\r\n").await;
        assert!(matches!(result, Err(ExchangeError::MalformedData)));
        assert!(response.starts_with("HTTP/1.0 400 Bad request\n"), "{response}");
    }

    #[tokio::test]
    async fn test_missing_file_is_404_with_required_headers() {
        let (result, response) = exchange(b"GET /nope HTTP/1.0\r\n\r\n").await;
        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.0 404 Not found\n"), "{response}");
        for header in ["Date: ", "Server: garzone", "Content-Length: 0", "Content-Type: text/plain"] {
            assert!(response.contains(header), "missing {header:?} in {response}");
        }
    }

    #[tokio::test]
    async fn test_empty_connection_closes_quietly() {
        let (result, response) = exchange(b"").await;
        assert!(matches!(result, Err(ExchangeError::ConnectionClosed)));
        assert!(response.is_empty());
    }
}
