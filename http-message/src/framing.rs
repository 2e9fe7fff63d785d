/// Represents the three different ways an HTTP message can be framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadFraming {
    /// The message body has a defined length specified by the `content-length:
    /// <len>` header
    Length(u64),
    /// The message body is of indeterminate length specified by the
    /// `transfer-encoding: chunked` header
    Chunked,
    /// The message does not contain either of `content-length` or
    /// `transfer-encoding: chunked`. A response framed this way is delimited
    /// by the connection closing.
    NoFraming,
}

impl HeadFraming {
    pub fn is_no_framing(&self) -> bool {
        matches!(self, Self::NoFraming)
    }
}

const FRAMING_HEADERS: &[&[u8]] = &[b"content-length", b"transfer-encoding"];

/// Whether `name` is one of the headers that determine how a body is framed.
pub fn is_framing_header(name: &[u8]) -> bool {
    FRAMING_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}
