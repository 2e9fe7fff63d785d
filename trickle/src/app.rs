use tokio::io::AsyncWrite;
use tracing::info;
use trickle_http_message::message::Request;
use trickle_stream::{DeliveryOptions, ResponseHandle, StreamingSupport};
use trickle_util::debug::AsciiDebug;

use crate::{
    auth::authorized,
    config::Config,
    controllers::{ChunkedController, LiveController},
    error::SessionResult,
    exchange::Exchange,
    router::{Controller, Route},
};

/// Everything a session needs to answer requests.
#[derive(Debug, Clone)]
pub struct App {
    token: String,
    hijack: bool,
    max_head_length: usize,
    chunked: ChunkedController,
    live: LiveController,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let pause = config.pause();
        let support = StreamingSupport::new(DeliveryOptions::default());
        Self {
            token: config.token.clone(),
            hijack: config.hijack,
            max_head_length: config.max_head_length,
            chunked: ChunkedController::new(pause),
            live: LiveController::new(pause, support),
        }
    }

    pub fn hijack(&self) -> bool {
        self.hijack
    }

    pub fn max_head_length(&self) -> usize {
        self.max_head_length
    }

    /// Answer `req` on `ex`.
    pub async fn handle<W>(&self, req: &Request, ex: &mut Exchange<W>) -> SessionResult<()>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let route = Route::resolve(req.method(), req.path());
        info!(
            method = ?AsciiDebug(req.method()),
            path = ?AsciiDebug(req.path()),
            version = %req.version(),
            ?route,
            "request",
        );

        let (controller, action) = match route {
            Route::Action(controller, action) => (controller, action),
            Route::NotFound => return plain(ex, 404, &[], b"not found\n").await,
            Route::MethodNotAllowed => {
                return plain(ex, 405, &[("Allow", "GET")], b"method not allowed\n").await;
            }
        };

        if action.requires_auth() && !authorized(req, &self.token) {
            info!(?action, "rejecting unauthenticated request");
            return plain(
                ex,
                401,
                &[("WWW-Authenticate", "Bearer")],
                b"unauthorized\n",
            )
            .await;
        }

        match controller {
            Controller::Chunked => self.chunked.serve(ex).await,
            Controller::Live => self.live.serve(ex).await,
        }
    }
}

/// A short buffered text response.
async fn plain<W>(
    ex: &mut Exchange<W>,
    code: u16,
    headers: &[(&str, &str)],
    body: &[u8],
) -> SessionResult<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut handle = ResponseHandle::new();
    handle.set_status(code)?;
    handle.set_header("Content-Type", "text/plain; charset=utf-8")?;
    for (name, value) in headers {
        handle.set_header(name, value)?;
    }
    ex.respond(&handle, body).await
}
