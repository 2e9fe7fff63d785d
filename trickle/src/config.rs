use std::{net::SocketAddr, time::Duration};

use clap::Parser;

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,trickle=debug,trickle_stream=debug";

#[derive(Debug, Clone, Parser)]
#[command(name = "trickle", about = "Streams HTTP/1.1 response bodies as they are produced")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:9001")]
    pub listen: SocketAddr,

    /// Let streamed responses take the client connection over instead of
    /// writing through the chunked live stream.
    #[arg(long)]
    pub hijack: bool,

    /// Bearer token required by the `private_response` actions.
    #[arg(long, default_value = "secret")]
    pub token: String,

    /// Pause between generated lines, in milliseconds.
    #[arg(long, default_value = "1000")]
    pub pause_ms: u64,

    /// Longest request head accepted, in bytes.
    #[arg(long, default_value = "8192")]
    pub max_head_length: usize,
}

impl Config {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}
