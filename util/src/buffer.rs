use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::AsyncReadExt;

/// Accumulates bytes read from a connection until a full message head can be
/// parsed out of the front of it. Bytes past the head stay buffered for the
/// next message in the pipeline.
#[derive(Debug, Default)]
pub struct Buffer(BytesMut);

impl std::ops::Deref for Buffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Buffer {
    pub fn new(buffer: BytesMut) -> Self {
        Self(buffer)
    }

    /// Remove the first `len` bytes from the buffer and return them as an
    /// immutable [`Bytes`].
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the number of buffered bytes.
    #[inline]
    pub fn take_front(&mut self, len: usize) -> Bytes {
        self.0.split_to(len).freeze()
    }

    /// Read some data from `io`, reading at most `limit` new bytes. Returns
    /// the number of bytes read; zero means `io` reached EOF.
    pub async fn read_from<I: AsyncReadExt + Unpin>(
        &mut self,
        mut io: I,
        limit: usize,
    ) -> io::Result<usize> {
        // `read_buf` on a bare `BytesMut` will happily grow past any limit,
        // so read into a bounded window and append it.
        self.0.reserve(limit);
        let mut window = (&mut io).take(limit as u64);
        window.read_buf(&mut self.0).await
    }
}
