use std::future::Future;

use tokio::io::{self, AsyncWrite, AsyncWriteExt};

/// The write side of a connection carrying a single response body.
///
/// `close` and `abort` consume the writer, so a connection can only be closed
/// once.
pub trait RawStreamWriter: Send {
    /// Write all of `buf`.
    fn write(&mut self, buf: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    fn flush(&mut self) -> impl Future<Output = io::Result<()>> + Send;

    /// Complete the body and close the connection.
    fn close(self) -> impl Future<Output = io::Result<()>> + Send
    where
        Self: Sized;

    /// Close the connection without completing the body, so the client can
    /// tell the body was cut short. For writers without body framing this is
    /// the same as `close`.
    fn abort(self) -> impl Future<Output = io::Result<()>> + Send
    where
        Self: Sized,
    {
        self.close()
    }
}

/// A connection taken over from the host. Bytes go to the client exactly as
/// written.
#[derive(Debug)]
pub struct RawConnection<W> {
    io: W,
}

impl<W> RawConnection<W> {
    pub fn new(io: W) -> Self {
        Self { io }
    }
}

impl<W: AsyncWrite + Unpin + Send> RawStreamWriter for RawConnection<W> {
    async fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.io.write_all(buf).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.io.flush().await
    }

    async fn close(mut self) -> io::Result<()> {
        // shut down even if the flush fails; the connection is ours to close.
        let flushed = self.io.flush().await;
        let shutdown = self.io.shutdown().await;
        flushed.and(shutdown)
    }
}

/// The stream a producer writes the response body to. Every write is flushed
/// before it returns, so each one reaches the client as soon as the transport
/// allows.
#[derive(Debug)]
pub enum ResponseStream<R, L> {
    Hijacked(RawConnection<R>),
    Live(L),
}

impl<R, L> RawStreamWriter for ResponseStream<R, L>
where
    R: AsyncWrite + Unpin + Send,
    L: RawStreamWriter,
{
    async fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Self::Hijacked(raw) => {
                raw.write(buf).await?;
                raw.flush().await
            }
            Self::Live(live) => {
                live.write(buf).await?;
                live.flush().await
            }
        }
    }

    async fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Hijacked(raw) => raw.flush().await,
            Self::Live(live) => live.flush().await,
        }
    }

    async fn close(self) -> io::Result<()> {
        match self {
            Self::Hijacked(raw) => raw.close().await,
            Self::Live(live) => live.close().await,
        }
    }

    async fn abort(self) -> io::Result<()> {
        match self {
            Self::Hijacked(raw) => raw.abort().await,
            Self::Live(live) => live.abort().await,
        }
    }
}
