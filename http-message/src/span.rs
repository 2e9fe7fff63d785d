use bytes::{Bytes, BytesMut};

/// The position of a sub-slice within the buffer it was parsed from. Lets us
/// parse against a borrowed buffer and later slice the same region out of the
/// frozen head without copying.
#[derive(Debug, Clone, Copy, Default)]
pub struct Span {
    offset: usize,
    len: usize,
}

impl Span {
    /// The span of `inner` within `outer`, or `None` if `inner` is not fully
    /// contained by `outer`.
    pub fn new(outer: &[u8], inner: &[u8]) -> Option<Self> {
        let len = inner.len();
        let outer = outer.as_ptr_range();
        let inner = inner.as_ptr_range();
        if outer.start <= inner.start && inner.end <= outer.end {
            let offset = inner.start as usize - outer.start as usize;
            Some(Self { offset, len })
        } else {
            None
        }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Slice the span out of `buf`, which must be the buffer (or an identical
    /// copy of the buffer) the span was derived from.
    ///
    /// # Panics
    ///
    /// Panics if the span falls outside of `buf`.
    pub fn slice_from(&self, buf: &Bytes) -> Bytes {
        buf.slice(self.range())
    }
}

/// Builds a message head in one contiguous buffer so it can be handed to the
/// connection with a single write.
pub struct BufBuilder {
    buf: BytesMut,
}

impl BufBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, slice: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(slice);
        self
    }

    pub fn push_space(&mut self) -> &mut Self {
        self.push(b" ")
    }

    pub fn push_field_sep(&mut self) -> &mut Self {
        self.push(b": ")
    }

    pub fn push_crlf(&mut self) -> &mut Self {
        self.push(b"\r\n")
    }

    pub fn finish(self) -> Bytes {
        let Self { buf } = self;
        buf.freeze()
    }
}
