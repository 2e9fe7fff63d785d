use tokio::{
    io::{self, AsyncWrite, AsyncWriteExt},
    task::JoinHandle,
};
use tracing::{Instrument, Span};
use trickle_frontend::{FrontendBodyWriter, FrontendError};

use crate::{
    error::{StreamError, StreamResult},
    handle::ResponseHandle,
    host::Host,
    raw::{RawStreamWriter, ResponseStream},
    recover::{Outcome, ProducerFuture, recover},
};

/// A host live stream backed by a chunked frontend body writer: every write
/// becomes one chunk.
#[derive(Debug)]
pub struct LiveStream<W> {
    body: FrontendBodyWriter<W>,
}

impl<W> LiveStream<W> {
    pub fn new(body: FrontendBodyWriter<W>) -> Self {
        Self { body }
    }
}

fn into_io(e: FrontendError) -> io::Error {
    match e {
        FrontendError::Write(e) => e,
        other => io::Error::other(other),
    }
}

impl<W: AsyncWrite + Unpin + Send> RawStreamWriter for LiveStream<W> {
    async fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.body.write(buf).await.map_err(into_io)
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.body.flush().await.map_err(into_io)
    }

    async fn close(self) -> io::Result<()> {
        let Self { body } = self;
        let mut io = body.finish().await.map_err(into_io)?.into_inner();
        io.shutdown().await
    }

    async fn abort(self) -> io::Result<()> {
        let Self { body } = self;
        let mut io = body.abandon();
        let flushed = io.flush().await;
        let shutdown = io.shutdown().await;
        flushed.and(shutdown)
    }
}

/// Delivery through the host's live stream. The producer runs on its own
/// task so the request handler can return while the body is still being
/// produced.
#[derive(Debug)]
pub struct ThreadedLiveDelivery<L> {
    stream: L,
    span: Span,
}

impl<L: RawStreamWriter + 'static> ThreadedLiveDelivery<L> {
    /// Have the host commit the response head. A failure here is returned to
    /// the caller and no task is started.
    pub async fn commit<H: Host<Live = L>>(
        host: &mut H,
        handle: &mut ResponseHandle,
    ) -> StreamResult<Self> {
        let stream = host
            .commit(handle)
            .await
            .map_err(StreamError::CommitFailed)?;
        handle.commit();
        Ok(Self {
            stream,
            span: Span::current(),
        })
    }

    /// Spawn the task that runs the producer and closes the stream. The task
    /// owns everything it needs: the producer, the stream, and the span of
    /// the request that started it.
    pub fn run<R, F>(self, producer: F) -> JoinHandle<Outcome>
    where
        R: AsyncWrite + Unpin + Send + 'static,
        F: for<'s> FnOnce(&'s mut ResponseStream<R, L>) -> ProducerFuture<'s> + Send + 'static,
    {
        let Self { stream, span } = self;
        tokio::spawn(recover(ResponseStream::Live(stream), producer).instrument(span))
    }
}
