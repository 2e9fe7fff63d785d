//! Tools for reading request heads from an HTTP/1.x frontend.
//!
//! ```rust
//! use trickle_frontend::FrontendReader;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // a buffer with two pipelined requests
//!     let buf = b"\
//!         GET /chunked/public_response HTTP/1.1\r\n\
//!         Host: localhost\r\n\
//!         \r\n\
//!         GET /live/public_response HTTP/1.1\r\n\
//!         Host: localhost\r\n\
//!         \r\n";
//!
//!     let mut frontend_reader = FrontendReader::new(&buf[..], 8192);
//!     let first = frontend_reader.read().await.expect("invalid request");
//!     assert_eq!(b"/chunked/public_response", first.path().as_ref());
//!
//!     let second = frontend_reader.read().await.expect("invalid request");
//!     assert_eq!(b"/live/public_response", second.path().as_ref());
//! }
//! ```

use trickle_http_message::{framing::HeadFraming, message::Request};
use trickle_util::buffer::Buffer;
use tokio::io::AsyncReadExt;

use crate::error::{FrontendError, FrontendResult};

/// Reads request heads from a frontend. Bytes read past the end of one head
/// are kept for the next call to [`FrontendReader::read`].
pub struct FrontendReader<I> {
    io: I,
    max_head_length: usize,
    buffer: Buffer,
}

impl<I: AsyncReadExt + Unpin> FrontendReader<I> {
    const MAX_HEADERS: usize = 256;

    /// Create a new [`FrontendReader`].
    pub fn new(io: I, max_head_length: usize) -> Self {
        Self {
            io,
            max_head_length,
            buffer: Buffer::default(),
        }
    }

    /// Wait for the full frontend head to be available
    async fn head(&mut self) -> FrontendResult<Request> {
        loop {
            if let Some(req) = Request::parse(&mut self.buffer, Self::MAX_HEADERS)
                .map_err(FrontendError::Malformed)?
            {
                return Ok(req);
            } else if self.buffer.len() >= self.max_head_length {
                return Err(FrontendError::HeadTooLong {
                    len: self.buffer.len(),
                    max: self.max_head_length,
                });
            }

            let first_read = self.buffer.is_empty();

            let target_read_len = self.max_head_length.saturating_sub(self.buffer.len());
            let len = self
                .buffer
                .read_from(&mut self.io, target_read_len)
                .await
                .map_err(FrontendError::Read)?;
            if 0 == len {
                return if first_read {
                    // EOF before any byte of a new request means the frontend
                    // has gone away between requests.
                    Err(FrontendError::Closed)
                } else {
                    Err(FrontendError::TruncatedHead)
                };
            }
        }
    }

    /// Read the next request head from the frontend. Requests that declare a
    /// body are rejected; nothing served here consumes one.
    pub async fn read(&mut self) -> FrontendResult<Request> {
        let req = self.head().await?;
        match req.framing()? {
            HeadFraming::NoFraming | HeadFraming::Length(0) => Ok(req),
            HeadFraming::Length(_) | HeadFraming::Chunked => {
                Err(FrontendError::RequestBody)
            }
        }
    }

    pub fn into_inner(self) -> I {
        let Self { io, .. } = self;
        io
    }
}
