//! One request/response exchange on a client connection.

use tokio::io::{self, AsyncWrite};
use trickle_frontend::FrontendWriter;
use trickle_http_message::version::HttpVersion;
use trickle_stream::{Host, LiveStream, ResponseHandle, TakeoverRejected};

use crate::error::{SessionError, SessionResult};

/// The connection's write side while a single request is being answered.
///
/// A request is answered either with a buffered response through
/// [`Exchange::respond`], after which the writer is available again for the
/// next request, or through one of the [`Host`] primitives, after which the
/// connection belongs to the streamed response.
#[derive(Debug)]
pub struct Exchange<W> {
    writer: Option<FrontendWriter<W>>,
    version: HttpVersion,
    hijack: bool,
}

impl<W: AsyncWrite + Unpin + Send + 'static> Exchange<W> {
    pub fn new(writer: FrontendWriter<W>, version: HttpVersion, hijack: bool) -> Self {
        Self {
            writer: Some(writer),
            version,
            hijack,
        }
    }

    /// Whether the connection has been handed to a streamed response.
    pub fn is_detached(&self) -> bool {
        self.writer.is_none()
    }

    /// Send `body` in one go with a `content-length`.
    pub async fn respond(&mut self, handle: &ResponseHandle, body: &[u8]) -> SessionResult<()> {
        let writer = self.writer.take().ok_or(SessionError::ResponseSent)?;
        let res = handle.to_response(self.version);

        let mut body_writer = writer
            .send_sized(&res, body.len() as u64)
            .await?;
        body_writer.write(body).await?;
        self.writer = Some(body_writer.finish().await?);

        Ok(())
    }

    /// The writer for the next request, unless a streamed response took it.
    pub fn into_writer(self) -> Option<FrontendWriter<W>> {
        let Self { writer, .. } = self;
        writer
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> Host for Exchange<W> {
    type Raw = W;
    type Live = LiveStream<W>;

    fn can_hijack(&self) -> bool {
        self.hijack
    }

    fn takeover(&mut self) -> Result<W, TakeoverRejected> {
        if !self.hijack {
            return Err(TakeoverRejected::Disabled);
        }
        if !self.version.supports_takeover() {
            return Err(TakeoverRejected::UnsupportedVersion(self.version));
        }
        self.writer
            .take()
            .map(FrontendWriter::into_inner)
            .ok_or(TakeoverRejected::AlreadyTaken)
    }

    async fn commit(&mut self, handle: &ResponseHandle) -> io::Result<LiveStream<W>> {
        if self.version != HttpVersion::Http11 {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("chunked responses need HTTP/1.1, client speaks {}", self.version),
            ));
        }
        let writer = self
            .writer
            .take()
            .ok_or_else(|| io::Error::other(SessionError::ResponseSent))?;

        let body = writer
            .send_chunked(&handle.to_response(self.version))
            .await
            .map_err(io::Error::other)?;
        Ok(LiveStream::new(body))
    }
}
