use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};
use trickle_frontend::{FrontendError, FrontendReader, FrontendWriter};
use trickle_http_message::{message::Request, version::HttpVersion};
use trickle_stream::ResponseHandle;

use crate::{app::App, error::SessionResult, exchange::Exchange};

/// Whether the client asked for the connection to end after this response.
fn wants_close(req: &Request) -> bool {
    let connection = req.get_header("connection");
    match req.version() {
        HttpVersion::Http10 => !connection.is_some_and(|v| v.eq_ignore_ascii_case(b"keep-alive")),
        HttpVersion::Http11 => connection.is_some_and(|v| v.eq_ignore_ascii_case(b"close")),
    }
}

/// The status to answer a malformed request with, if it deserves an answer.
fn rejection(e: &FrontendError) -> Option<(u16, &'static [u8])> {
    match e {
        FrontendError::Malformed(_) | FrontendError::Framing(_) => Some((400, b"bad request\n")),
        FrontendError::HeadTooLong { .. } => Some((431, b"request head too large\n")),
        FrontendError::RequestBody => Some((413, b"request bodies are not accepted\n")),
        _ => None,
    }
}

/// Serve requests from one client connection until it closes, a request asks
/// for it to close, or a streamed response takes it over.
pub async fn serve<R, W>(reader: R, writer: W, app: Arc<App>) -> SessionResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut reader = FrontendReader::new(reader, app.max_head_length());
    let mut writer = FrontendWriter::new(writer);

    loop {
        let req = match reader.read().await {
            Ok(req) => req,
            Err(FrontendError::Closed) => {
                debug!("client closed the connection");
                return Ok(());
            }
            Err(e) => {
                if let Some((code, body)) = rejection(&e) {
                    info!(error = %e, code, "rejecting malformed request");
                    let mut handle = ResponseHandle::new();
                    handle.set_status(code)?;
                    let mut ex = Exchange::new(writer, HttpVersion::Http11, false);
                    ex.respond(&handle, body).await?;
                    if let Some(writer) = ex.into_writer() {
                        shutdown(writer).await?;
                    }
                }
                return Err(e.into());
            }
        };

        let close = wants_close(&req);
        let mut ex = Exchange::new(writer, req.version(), app.hijack());
        app.handle(&req, &mut ex).await?;

        writer = match ex.into_writer() {
            Some(writer) if !close => writer,
            Some(writer) => return shutdown(writer).await,
            None => {
                debug!("connection handed over to a streamed response");
                return Ok(());
            }
        };
    }
}

async fn shutdown<W: AsyncWrite + Unpin>(writer: FrontendWriter<W>) -> SessionResult<()> {
    let mut io = writer.into_inner();
    io.shutdown().await.map_err(FrontendError::Write)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use clap::Parser;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use trickle_util::debug::AsciiDebug;

    use crate::{
        app::App,
        config::Config,
        controllers::{LINES, line},
        error::SessionError,
        session::serve,
    };

    fn app(args: &[&str]) -> App {
        let mut argv = vec!["trickle", "--pause-ms", "0"];
        argv.extend_from_slice(args);
        App::new(&Config::parse_from(argv))
    }

    /// Send `request` on a fresh connection, close the client's write side,
    /// and collect everything the server sends until it closes.
    async fn converse(app: App, request: &[u8]) -> (Vec<u8>, Result<(), SessionError>) {
        let (mut client, server) = tokio::io::duplex(1024);
        let (rx, tx) = tokio::io::split(server);
        let session = tokio::spawn(serve(rx, tx, Arc::new(app)));

        client.write_all(request).await.unwrap();
        client.shutdown().await.unwrap();

        let mut out = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), client.read_to_end(&mut out))
            .await
            .expect("server closed the connection")
            .unwrap();

        (out, session.await.unwrap())
    }

    fn all_lines() -> String {
        (0..LINES).map(line).collect()
    }

    #[tokio::test]
    async fn chunked_public_response() {
        let (out, result) =
            converse(app(&[]), b"GET /chunked/public_response HTTP/1.1\r\nHost: x\r\n\r\n").await;
        result.expect("session ends cleanly");

        let body = all_lines();
        let expected = format!(
            "HTTP/1.1 200 OK\r\n\
             Cache-Control: no-cache\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             content-length: {}\r\n\
             \r\n\
             {body}",
            body.len()
        );
        assert_eq!(AsciiDebug(expected.as_bytes()), AsciiDebug(&out));
    }

    #[tokio::test]
    async fn keep_alive_across_buffered_responses() {
        let (out, result) = converse(
            app(&[]),
            b"\
                GET /nowhere HTTP/1.1\r\n\
                Host: x\r\n\
                \r\n\
                POST /chunked/public_response HTTP/1.1\r\n\
                Host: x\r\n\
                Connection: close\r\n\
                \r\n\
                GET /chunked/public_response HTTP/1.1\r\n\
                Host: x\r\n\
                \r\n",
        )
        .await;
        result.expect("session ends cleanly");

        let expected = b"\
            HTTP/1.1 404 Not Found\r\n\
            Content-Type: text/plain; charset=utf-8\r\n\
            content-length: 10\r\n\
            \r\n\
            not found\n\
            HTTP/1.1 405 Method Not Allowed\r\n\
            Content-Type: text/plain; charset=utf-8\r\n\
            Allow: GET\r\n\
            content-length: 19\r\n\
            \r\n\
            method not allowed\n\
        ";
        // the third request is never answered
        assert_eq!(AsciiDebug(expected), AsciiDebug(&out));
    }

    #[tokio::test]
    async fn private_response_needs_token() {
        let (out, _) = converse(
            app(&[]),
            b"GET /live/private_response HTTP/1.1\r\nAuthorization: Bearer nope\r\n\r\n",
        )
        .await;
        assert!(out.starts_with(b"HTTP/1.1 401 Unauthorized\r\n"));
        assert!(out.windows(26).any(|w| w == b"WWW-Authenticate: Bearer\r\n"));

        let (out, _) = converse(
            app(&["--token", "t0k"]),
            b"GET /chunked/private_response HTTP/1.1\r\nAuthorization: Bearer t0k\r\n\r\n",
        )
        .await;
        assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
        assert!(out.ends_with(all_lines().as_bytes()));
    }

    #[tokio::test]
    async fn live_response_without_hijack() {
        let (out, result) =
            converse(app(&[]), b"GET /live/public_response HTTP/1.1\r\nHost: x\r\n\r\n").await;
        result.expect("session hands the connection over");

        let mut expected = b"\
            HTTP/1.1 200 OK\r\n\
            Cache-Control: no-cache\r\n\
            Content-Type: text/plain; charset=utf-8\r\n\
            transfer-encoding: chunked\r\n\
            \r\n\
        "
        .to_vec();
        for i in 0..LINES {
            let l = line(i);
            expected.extend_from_slice(format!("{:x}\r\n{l}\r\n", l.len()).as_bytes());
        }
        // the producer failed, so the body has no terminating chunk
        assert_eq!(AsciiDebug(&expected), AsciiDebug(&out));
    }

    #[tokio::test]
    async fn live_response_with_hijack() {
        let (out, result) = converse(
            app(&["--hijack"]),
            b"GET /live/public_response HTTP/1.1\r\nHost: x\r\n\r\n",
        )
        .await;
        result.expect("session hands the connection over");

        let expected = format!(
            "HTTP/1.1 200 OK\r\n\
             Cache-Control: no-cache\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             {}",
            all_lines()
        );
        assert_eq!(AsciiDebug(expected.as_bytes()), AsciiDebug(&out));
    }

    #[tokio::test]
    async fn live_response_to_http10() {
        for args in [&[][..], &["--hijack"][..]] {
            let (out, result) =
                converse(app(args), b"GET /live/public_response HTTP/1.0\r\n\r\n").await;
            result.expect("session ends cleanly");
            assert!(out.starts_with(b"HTTP/1.0 505 HTTP Version Not Supported\r\n"));
            assert!(out.ends_with(b"streaming needs HTTP/1.1\n"));
        }
    }

    #[tokio::test]
    async fn malformed_request() {
        let (out, result) = converse(app(&[]), b"GET / HTTP/1.1\r\nbad header\r\n\r\n").await;
        assert!(matches!(result, Err(SessionError::FrontendError(_))));
        assert!(out.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
    }
}
