//! Writes the response head at the start of a taken-over connection.

use tokio::io::{self, AsyncWrite, AsyncWriteExt};
use trickle_http_message::{framing::HeadFraming, version::HttpVersion};

use crate::handle::ResponseHandle;

/// Commit `handle` and write its head to `io` as an HTTP/1.1 status line and
/// header block, headers in insertion order, then flush.
///
/// No framing header is added: a body on a taken-over connection runs until
/// the connection closes, unless the handle's own headers say otherwise.
pub async fn write_head<W: AsyncWrite + Unpin>(
    handle: &mut ResponseHandle,
    io: &mut W,
) -> io::Result<()> {
    handle.commit();
    let head = handle
        .to_response(HttpVersion::Http11)
        .encode_head(HeadFraming::NoFraming);

    io.write_all(&head).await?;
    io.flush().await
}
