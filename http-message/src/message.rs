use bytes::Bytes;
use trickle_util::buffer::Buffer;

use crate::{
    framing::{HeadFraming, is_framing_header},
    header::{HeaderError, Headers},
    span::{BufBuilder, Span},
    status::reason_phrase,
    version::HttpVersion,
};

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Malformed message head: {0}")]
    Parse(#[from] httparse::Error),
    #[error("Unsupported HTTP minor version: 1.{0}")]
    UnsupportedVersion(u8),
}

#[derive(Debug)]
struct RequestInner {
    method: Bytes,
    path: Bytes,
    version: HttpVersion,

    headers: Headers,
}

/// A parsed request head. The method, path, and headers all share the
/// buffer the head was read into.
#[derive(Debug)]
pub struct Request {
    inner: Box<RequestInner>,
}

impl Request {
    /// Try to parse a request head from the front of `buf`. Returns `None`
    /// when more bytes are needed. On success the head is removed from `buf`
    /// and anything after it is left in place.
    pub fn parse(buf: &mut Buffer, max_headers: usize) -> Result<Option<Self>, MessageError> {
        let mut parse_headers = vec![httparse::EMPTY_HEADER; max_headers];
        let mut req = httparse::Request::new(&mut parse_headers);

        let raw: &[u8] = &**buf;
        let head_len = match req.parse(raw)? {
            httparse::Status::Partial => return Ok(None),
            httparse::Status::Complete(head_len) => head_len,
        };

        let version = HttpVersion::try_from(req.version.unwrap_or_default())
            .map_err(MessageError::UnsupportedVersion)?;
        let span_of = |sub: &[u8]| Span::new(raw, sub).unwrap_or_default();
        let method = span_of(req.method.unwrap_or_default().as_bytes());
        let path = span_of(req.path.unwrap_or_default().as_bytes());
        let header_spans: Vec<(Span, Span)> = req
            .headers
            .iter()
            .map(|h| (span_of(h.name.as_bytes()), span_of(h.value)))
            .collect();

        let head = buf.take_front(head_len);
        let mut headers = Headers::with_capacity(header_spans.len());
        for (name, value) in header_spans {
            headers.push(name.slice_from(&head), value.slice_from(&head));
        }

        Ok(Some(Request {
            inner: Box::new(RequestInner {
                method: method.slice_from(&head),
                path: path.slice_from(&head),
                version,
                headers,
            }),
        }))
    }

    pub fn method(&self) -> &Bytes {
        &self.inner.method
    }

    pub fn path(&self) -> &Bytes {
        &self.inner.path
    }

    pub fn version(&self) -> HttpVersion {
        self.inner.version
    }

    pub fn headers(&self) -> &Headers {
        &self.inner.headers
    }

    pub fn get_header(&self, needle: &str) -> Option<&Bytes> {
        self.inner.headers.get_header(needle)
    }

    pub fn framing(&self) -> Result<HeadFraming, HeaderError> {
        self.inner.headers.framing()
    }
}

#[derive(Debug)]
struct ResponseInner {
    version: HttpVersion,
    code: u16,
    reason: Bytes,

    headers: Headers,
}

/// A response head ready to be written to a client.
#[derive(Debug)]
pub struct Response {
    inner: Box<ResponseInner>,
}

impl Response {
    pub fn new(version: HttpVersion, code: u16, reason: impl Into<Bytes>, headers: Headers) -> Self {
        Self {
            inner: Box::new(ResponseInner {
                version,
                code,
                reason: reason.into(),
                headers,
            }),
        }
    }

    pub fn version(&self) -> HttpVersion {
        self.inner.version
    }

    pub fn code(&self) -> u16 {
        self.inner.code
    }

    pub fn reason(&self) -> &Bytes {
        &self.inner.reason
    }

    pub fn headers(&self) -> &Headers {
        &self.inner.headers
    }

    pub fn get_header(&self, needle: &str) -> Option<&Bytes> {
        self.inner.headers.get_header(needle)
    }

    /// Encode the status line and header block into a single buffer.
    ///
    /// With [`HeadFraming::NoFraming`] the headers are emitted exactly as they
    /// are, in order. Otherwise any framing headers already present are
    /// dropped and replaced with the one matching `framing`.
    pub fn encode_head(&self, framing: HeadFraming) -> Bytes {
        let code = self.code().to_string();
        let mut b = BufBuilder::with_capacity(128);

        b.push(self.version().to_static().as_bytes())
            .push_space()
            .push(code.as_bytes())
            .push_space()
            .push(self.reason())
            .push_crlf();

        let headers = self
            .headers()
            .iter()
            .filter(|(n, _)| framing.is_no_framing() || !is_framing_header(n));
        for (n, v) in headers {
            b.push(n).push_field_sep().push(v).push_crlf();
        }

        match framing {
            HeadFraming::NoFraming => {}
            HeadFraming::Length(l) => {
                b.push(format!("content-length: {l}\r\n").as_bytes());
            }
            HeadFraming::Chunked => {
                b.push(b"transfer-encoding: chunked\r\n");
            }
        }

        b.push_crlf();
        b.finish()
    }
}

#[derive(Debug, Default)]
pub struct ResponseBuilder<'s> {
    version: Option<HttpVersion>,
    code: Option<u16>,
    headers: Vec<(&'s str, &'s [u8])>,
}

impl<'s> ResponseBuilder<'s> {
    pub fn new(initial_header_capacity: usize) -> Self {
        Self {
            version: None,
            code: None,
            headers: Vec::with_capacity(initial_header_capacity),
        }
    }

    pub fn with_version(&mut self, version: HttpVersion) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn with_code(&mut self, code: u16) -> &mut Self {
        self.code = Some(code);
        self
    }

    pub fn with_header(&mut self, name: &'s str, value: &'s [u8]) -> &mut Self {
        self.headers.push((name, value));
        self
    }

    /// Build the response. Missing fields default to HTTP/1.1, `200`, and the
    /// canonical reason phrase for the code.
    pub fn build(&self) -> Response {
        let version = self.version.unwrap_or_default();
        let code = self.code.unwrap_or(200);
        let reason = reason_phrase(code);

        let mut headers = Headers::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            headers.push(
                Bytes::copy_from_slice(name.as_bytes()),
                Bytes::copy_from_slice(value),
            );
        }

        Response::new(version, code, Bytes::copy_from_slice(reason.as_bytes()), headers)
    }
}
