//! In-memory connections and hosts for exercising deliveries.

use std::{
    io,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use tokio::io::AsyncWrite;
use trickle_frontend::FrontendWriter;
use trickle_http_message::version::HttpVersion;

use crate::{error::TakeoverRejected, handle::ResponseHandle, host::Host, live::LiveStream};

/// Everything that happened to a [`MockIo`].
#[derive(Debug, Clone, Default)]
pub struct Wire {
    pub bytes: Vec<u8>,
    /// `bytes.len()` at each flush.
    pub flushed_at: Vec<usize>,
    pub shutdowns: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockIo {
    wire: Arc<Mutex<Wire>>,
    fail_writes: bool,
}

impl MockIo {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn wire(&self) -> Wire {
        self.wire.lock().unwrap().clone()
    }
}

impl AsyncWrite for MockIo {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.fail_writes {
            return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
        }
        self.wire.lock().unwrap().bytes.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut wire = self.wire.lock().unwrap();
        let len = wire.bytes.len();
        wire.flushed_at.push(len);
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.wire.lock().unwrap().shutdowns += 1;
        Poll::Ready(Ok(()))
    }
}

/// A host whose raw connection and live stream write to separate wires, so
/// tests can tell which one a delivery used.
pub struct MockHost {
    hijack: bool,
    version: HttpVersion,
    raw: Option<MockIo>,
    raw_wire: MockIo,
    live: MockIo,
    fail_commit: bool,
}

impl MockHost {
    fn new(hijack: bool) -> Self {
        let raw = MockIo::default();
        Self {
            hijack,
            version: HttpVersion::Http11,
            raw: Some(raw.clone()),
            raw_wire: raw,
            live: MockIo::default(),
            fail_commit: false,
        }
    }

    pub fn hijackable() -> Self {
        Self::new(true)
    }

    pub fn live_only() -> Self {
        Self::new(false)
    }

    pub fn with_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    pub fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn raw_wire(&self) -> Wire {
        self.raw_wire.wire()
    }

    pub fn live_wire(&self) -> Wire {
        self.live.wire()
    }
}

impl Host for MockHost {
    type Raw = MockIo;
    type Live = LiveStream<MockIo>;

    fn can_hijack(&self) -> bool {
        self.hijack
    }

    fn takeover(&mut self) -> Result<MockIo, TakeoverRejected> {
        if !self.hijack {
            return Err(TakeoverRejected::Disabled);
        }
        if !self.version.supports_takeover() {
            return Err(TakeoverRejected::UnsupportedVersion(self.version));
        }
        self.raw.take().ok_or(TakeoverRejected::AlreadyTaken)
    }

    async fn commit(&mut self, handle: &ResponseHandle) -> io::Result<LiveStream<MockIo>> {
        if self.fail_commit {
            return Err(io::Error::other("commit failed"));
        }
        let res = handle.to_response(self.version);
        let body = FrontendWriter::new(self.live.clone())
            .send_chunked(&res)
            .await
            .map_err(io::Error::other)?;
        Ok(LiveStream::new(body))
    }
}
