// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::env::current_dir;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// The port the server listens on when nothing else is configured.
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct GarzoneConfig {
    pub settings: GarzoneSettings,
}

impl GarzoneConfig {
    pub fn new(settings: GarzoneSettings) -> Self {
        Self { settings }
    }
}

#[derive(Clone, Debug)]
pub struct GarzoneSettings {
    /// The port the listener is bound to; advertised to CGI children as
    /// `SERVER_PORT`.
    pub port: u16,

    /// Static files and `/cgi-bin` scripts are resolved against this
    /// directory.
    pub document_root: PathBuf,

    /// If the client doesn't transmit the full request-line and headers
    /// within this time, the connection is dropped.
    pub read_headers_timeout: Duration,

    /// A CGI child that has not exited within this time is killed and the
    /// request answered with an internal error.
    pub cgi_timeout: Duration,
}

impl GarzoneSettings {
    /// Settings with the document root at the process's current working
    /// directory.
    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self {
            port: DEFAULT_PORT,
            document_root: current_dir()?,
            read_headers_timeout: Duration::from_secs(10),
            cgi_timeout: Duration::from_secs(10),
        })
    }
}
