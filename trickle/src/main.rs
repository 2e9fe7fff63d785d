//! trickle: a small HTTP/1.1 server whose handlers stream response bodies
//! as they are produced.
//!
//! ```text
//! trickle --listen 127.0.0.1:9001 --hijack
//! curl -N http://127.0.0.1:9001/live/public_response
//! ```

mod app;
mod auth;
mod config;
mod controllers;
mod error;
mod exchange;
mod router;
mod session;

use std::sync::Arc;

use clap::Parser;
use tokio::{
    io::{BufReader, BufWriter},
    net::TcpListener,
};
use tracing::{Instrument, info, info_span, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    app::App,
    config::{Config, DEFAULT_LOG_FILTER},
    error::SessionError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::parse();
    let app = Arc::new(App::new(&config));

    let listener = TcpListener::bind(config.listen).await?;
    info!(
        listen = %config.listen,
        hijack = config.hijack,
        pause_ms = config.pause_ms,
        "trickle listening"
    );

    loop {
        let (stream, remote) = listener.accept().await?;
        info!(%remote, "accepted connection");

        let (rx, tx) = stream.into_split();
        let reader = BufReader::with_capacity(4096, rx);
        let writer = BufWriter::with_capacity(4096, tx);
        let app = app.clone();

        tokio::spawn(
            async move {
                match session::serve(reader, writer, app).await {
                    Ok(()) => {}
                    Err(SessionError::FrontendError(e)) => {
                        info!(error = %e, "session ended by client error");
                    }
                    Err(e) => warn!(error = %e, "session failed"),
                }
            }
            .instrument(info_span!("session", %remote)),
        );
    }
}
