//! Writing response heads and bodies to a client connection.
//!
//! ```rust
//! use trickle_frontend::FrontendWriter;
//! use trickle_http_message::message::ResponseBuilder;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let res = ResponseBuilder::new(1)
//!         .with_header("Cache-Control", b"no-cache")
//!         .build();
//!
//!     let mut body = FrontendWriter::new(Vec::new())
//!         .send_chunked(&res)
//!         .await
//!         .unwrap();
//!     body.write(b"line 0\n").await.unwrap();
//!     body.write(b"line 1\n").await.unwrap();
//!     let wire = body.finish().await.unwrap().into_inner();
//!
//!     assert_eq!(
//!         &b"\
//!             HTTP/1.1 200 OK\r\n\
//!             Cache-Control: no-cache\r\n\
//!             transfer-encoding: chunked\r\n\
//!             \r\n\
//!             7\r\nline 0\n\r\n\
//!             7\r\nline 1\n\r\n\
//!             0\r\n\r\n"[..],
//!         &wire[..],
//!     );
//! }
//! ```

use tokio::io::{AsyncWrite, AsyncWriteExt};
use trickle_body::BodyFraming;
use trickle_http_message::{framing::HeadFraming, message::Response};

use crate::error::{FrontendError, FrontendResult};

/// The write side of a client connection, between responses.
#[derive(Debug)]
pub struct FrontendWriter<I> {
    io: I,
}

impl<I: AsyncWrite + Unpin> FrontendWriter<I> {
    pub fn new(io: I) -> Self {
        Self { io }
    }

    /// Send the head of `response` with a chunked body to follow.
    pub async fn send_chunked(self, response: &Response) -> FrontendResult<FrontendBodyWriter<I>> {
        self.start(response, HeadFraming::Chunked, BodyFraming::chunked())
            .await
    }

    /// Send the head of `response` with a body of exactly `len` bytes to
    /// follow.
    pub async fn send_sized(
        self,
        response: &Response,
        len: u64,
    ) -> FrontendResult<FrontendBodyWriter<I>> {
        self.start(response, HeadFraming::Length(len), BodyFraming::sized(len))
            .await
    }

    /// The head is flushed on its own so the client sees the status before
    /// the first body byte exists.
    async fn start(
        self,
        response: &Response,
        head: HeadFraming,
        body: BodyFraming,
    ) -> FrontendResult<FrontendBodyWriter<I>> {
        let Self { mut io } = self;
        io.write_all(&response.encode_head(head))
            .await
            .map_err(FrontendError::Write)?;
        io.flush().await.map_err(FrontendError::Write)?;

        Ok(FrontendBodyWriter { io, body })
    }

    /// Give up the connection. Whoever takes it writes everything from here
    /// on, the response head included.
    pub fn into_inner(self) -> I {
        self.io
    }
}

/// The body of the response currently being written.
#[derive(Debug)]
pub struct FrontendBodyWriter<I> {
    io: I,
    body: BodyFraming,
}

impl<I: AsyncWrite + Unpin> FrontendBodyWriter<I> {
    pub async fn write(&mut self, buf: &[u8]) -> FrontendResult<()> {
        Ok(self.body.write(&mut self.io, buf).await?)
    }

    pub async fn flush(&mut self) -> FrontendResult<()> {
        self.io.flush().await.map_err(FrontendError::Write)
    }

    /// End the body and hand the connection back for the next response.
    pub async fn finish(self) -> FrontendResult<FrontendWriter<I>> {
        let Self { mut io, body } = self;
        body.finish(&mut io).await?;
        Ok(FrontendWriter { io })
    }

    /// Stop without ending the body. Once the returned connection is closed
    /// the client sees a truncated body.
    pub fn abandon(self) -> I {
        self.io
    }
}
