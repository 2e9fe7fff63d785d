use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncWrite;
use tracing::{debug, info, warn};
use trickle_stream::{Delivery, RawStreamWriter, ResponseHandle, StreamingSupport};

use crate::{error::SessionResult, exchange::Exchange};

/// Number of lines the controllers generate.
pub const LINES: usize = 3;

/// Line `i` of the generated body. Each one is large enough that browsers
/// render it as it arrives.
pub fn line(i: usize) -> String {
    let mut line = format!("big chunked line {i}").repeat(100);
    line.push_str("\n\n");
    line
}

/// Headers both controllers set before doing anything else.
fn plain_text_handle() -> SessionResult<ResponseHandle> {
    let mut handle = ResponseHandle::new();
    handle.set_header("Cache-Control", "no-cache")?;
    handle.set_header("Content-Type", "text/plain; charset=utf-8")?;
    Ok(handle)
}

/// Generates the body in full, then hands it to the host's default response
/// cycle. The client sees nothing until the last line exists.
#[derive(Debug, Clone)]
pub struct ChunkedController {
    pause: Duration,
}

impl ChunkedController {
    pub fn new(pause: Duration) -> Self {
        Self { pause }
    }

    pub async fn serve<W>(&self, ex: &mut Exchange<W>) -> SessionResult<()>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let handle = plain_text_handle()?;

        let mut body = Vec::new();
        for i in 0..LINES {
            body.extend_from_slice(line(i).as_bytes());
            tokio::time::sleep(self.pause).await;
        }

        ex.respond(&handle, &body).await
    }
}

async fn stream_lines_then_fail<S: RawStreamWriter>(
    stream: &mut S,
    pause: Duration,
) -> anyhow::Result<()> {
    for i in 0..LINES {
        stream
            .write(line(i).as_bytes())
            .await
            .with_context(|| format!("writing line {i}"))?;
        tokio::time::sleep(pause).await;
    }
    anyhow::bail!("Simulated error")
}

/// Streams each line as soon as it is generated, then fails. The failure is
/// contained by the streaming support: it is logged and the client sees a
/// body that stops short.
#[derive(Debug, Clone)]
pub struct LiveController {
    pause: Duration,
    support: StreamingSupport,
}

impl LiveController {
    pub fn new(pause: Duration, support: StreamingSupport) -> Self {
        Self { pause, support }
    }

    pub async fn serve<W>(&self, ex: &mut Exchange<W>) -> SessionResult<()>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut handle = plain_text_handle()?;
        let pause = self.pause;

        let delivery = self
            .support
            .chunked(ex, &mut handle, self.support.defaults(), move |stream| {
                Box::pin(stream_lines_then_fail(stream, pause))
            })
            .await;

        match delivery {
            Ok(Delivery::Completed(outcome)) => {
                debug!(?outcome, "streamed response finished");
                Ok(())
            }
            Ok(Delivery::Spawned(_)) => {
                info!("streaming response from a background task");
                Ok(())
            }
            // the connection was never handed over, so the client can still
            // get a plain answer.
            Err(e) if !ex.is_detached() => {
                warn!(error = %e, "cannot stream to this client");
                let mut handle = ResponseHandle::new();
                handle.set_status(505)?;
                handle.set_header("Content-Type", "text/plain; charset=utf-8")?;
                ex.respond(&handle, b"streaming needs HTTP/1.1\n").await
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::line;

    #[test]
    fn line_shape() {
        let l = line(2);
        assert_eq!(18 * 100 + 2, l.len());
        assert!(l.starts_with("big chunked line 2big chunked line 2"));
        assert!(l.ends_with("big chunked line 2\n\n"));
    }
}
