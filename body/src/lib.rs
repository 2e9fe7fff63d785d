//! Response body framing: a body of declared size, or a chunked body whose
//! every write becomes one chunk on the wire.

use tokio::io::{self, AsyncWrite, AsyncWriteExt};

#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("Body is limited to {limit} bytes")]
    Overflow { limit: u64 },
    #[error("Body write failed: {0}")]
    Io(#[from] io::Error),
    #[error("Body declared {expected} bytes but ended after {written}")]
    Short { expected: u64, written: u64 },
}

pub type BodyResult<T> = Result<T, BodyError>;

/// The framing of a body in progress.
#[derive(Debug)]
pub enum BodyFraming {
    Sized(SizedBody),
    Chunked(ChunkedBody),
}

impl BodyFraming {
    pub fn sized(length: u64) -> Self {
        Self::Sized(SizedBody::new(length))
    }

    pub fn chunked() -> Self {
        Self::Chunked(ChunkedBody)
    }

    pub async fn write<W: AsyncWrite + Unpin>(&mut self, io: &mut W, buf: &[u8]) -> BodyResult<()> {
        match self {
            Self::Sized(body) => body.write(io, buf).await,
            Self::Chunked(body) => body.write(io, buf).await,
        }
    }

    /// Write whatever ends the body, then flush `io`. Dropping the framing
    /// instead leaves the body visibly unfinished.
    pub async fn finish<W: AsyncWrite + Unpin>(self, io: &mut W) -> BodyResult<()> {
        match self {
            Self::Sized(body) => body.finish()?,
            Self::Chunked(body) => body.finish(io).await?,
        }
        io.flush().await?;
        Ok(())
    }
}

/// A body announced with `content-length`.
#[derive(Debug)]
pub struct SizedBody {
    expected: u64,
    written: u64,
}

impl SizedBody {
    pub fn new(expected: u64) -> Self {
        Self {
            expected,
            written: 0,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.expected - self.written
    }

    async fn write<W: AsyncWrite + Unpin>(&mut self, io: &mut W, buf: &[u8]) -> BodyResult<()> {
        let len = buf.len() as u64;
        if len > self.remaining() {
            return Err(BodyError::Overflow {
                limit: self.expected,
            });
        }

        io.write_all(buf).await?;
        self.written += len;
        Ok(())
    }

    fn finish(self) -> BodyResult<()> {
        match self.remaining() {
            0 => Ok(()),
            _ => Err(BodyError::Short {
                expected: self.expected,
                written: self.written,
            }),
        }
    }
}

/// A `transfer-encoding: chunked` body.
#[derive(Debug, Default)]
pub struct ChunkedBody;

impl ChunkedBody {
    const LAST_CHUNK: &'static [u8] = b"0\r\n\r\n";

    async fn write<W: AsyncWrite + Unpin>(&mut self, io: &mut W, buf: &[u8]) -> BodyResult<()> {
        // an empty chunk would end the body early
        if buf.is_empty() {
            return Ok(());
        }

        let size_line = format!("{:x}\r\n", buf.len());
        io.write_all(size_line.as_bytes()).await?;
        io.write_all(buf).await?;
        io.write_all(b"\r\n").await?;
        Ok(())
    }

    async fn finish<W: AsyncWrite + Unpin>(self, io: &mut W) -> BodyResult<()> {
        io.write_all(Self::LAST_CHUNK).await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use trickle_util::debug::AsciiDebug;

    use crate::{BodyError, BodyFraming};

    #[tokio::test]
    async fn chunk_per_write() {
        let mut wire = Vec::new();
        let mut body = BodyFraming::chunked();
        body.write(&mut wire, b"big chunked line 0\n\n").await.unwrap();
        body.write(&mut wire, b"").await.unwrap();
        body.write(&mut wire, b"ok").await.unwrap();
        body.finish(&mut wire).await.unwrap();

        let expected = b"\
            14\r\n\
            big chunked line 0\n\n\r\n\
            2\r\n\
            ok\r\n\
            0\r\n\
            \r\n\
        ";
        assert_eq!(AsciiDebug(expected), AsciiDebug(&wire));
    }

    #[tokio::test]
    async fn dropped_chunked_body_has_no_last_chunk() {
        let mut wire = Vec::new();
        let mut body = BodyFraming::chunked();
        body.write(&mut wire, b"partial").await.unwrap();
        drop(body);

        assert_eq!(AsciiDebug(b"7\r\npartial\r\n"), AsciiDebug(&wire));
    }

    #[tokio::test]
    async fn sized_body_rejects_extra_bytes() {
        let mut wire = Vec::new();
        let mut body = BodyFraming::sized(4);
        body.write(&mut wire, b"abc").await.unwrap();

        assert!(matches!(
            body.write(&mut wire, b"de").await,
            Err(BodyError::Overflow { limit: 4 })
        ));
        body.write(&mut wire, b"d").await.unwrap();
        body.finish(&mut wire).await.unwrap();
        assert_eq!(b"abcd", &wire[..]);
    }

    #[tokio::test]
    async fn sized_body_must_be_complete() {
        let mut wire = Vec::new();
        let mut body = BodyFraming::sized(4);
        body.write(&mut wire, b"ab").await.unwrap();

        assert!(matches!(
            body.finish(&mut wire).await,
            Err(BodyError::Short {
                expected: 4,
                written: 2
            })
        ));
    }
}
