// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! The `garzone` server binary: an HTTP/1.0 origin server serving static
//! files from the current working directory and executing CGI scripts under
//! `/cgi-bin`.
//!
//! The supervisor here only wires things together: shutdown signals, the
//! "ENTER to quit" affordance on stdin, and the accept loop in
//! `garzone-http1`.

use anyhow::Context;

use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tokio::task;

use garzone_handling::{GarzoneConfig, GarzoneSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = GarzoneSettings::from_current_dir()
        .context("failed to resolve the document root")?;
    let address = format!("0.0.0.0:{}", settings.port);
    let config = GarzoneConfig::new(settings);

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    spawn_shutdown_watchers(shutdown_tx);

    println!("[server] press ENTER to quit");
    garzone_http1::start(&address, config, shutdown_rx).await
        .context("server terminated abnormally")?;

    println!("[server] stopped");
    Ok(())
}

/// Arms every way the server can be told to stop. Whichever fires first
/// flips the shutdown channel; the accept loop then cancels the live
/// sessions and exits.
fn spawn_shutdown_watchers(shutdown: watch::Sender<()>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        for kind in [
            SignalKind::interrupt(),
            SignalKind::quit(),
            SignalKind::terminate(),
            SignalKind::user_defined1(),
        ] {
            let shutdown = shutdown.clone();
            task::spawn(async move {
                let Ok(mut stream) = signal(kind) else {
                    return;
                };
                stream.recv().await;
                _ = shutdown.send(());
            });
        }
    }

    #[cfg(not(unix))]
    {
        let shutdown = shutdown.clone();
        task::spawn(async move {
            _ = tokio::signal::ctrl_c().await;
            _ = shutdown.send(());
        });
    }

    // Close the server on ENTER. Faster than Ctrl-C.
    task::spawn(async move {
        let mut byte = [0u8; 1];
        _ = tokio::io::stdin().read(&mut byte).await;
        _ = shutdown.send(());
    });
}
