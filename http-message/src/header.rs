use bytes::Bytes;

use crate::framing::HeadFraming;

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("Invalid content length: {0}")]
    InvalidContentLength(String),
    #[error("Found at least two content-length headers with values: {0}, {1}")]
    MultipleContentLength(u64, u64),
    #[error("Multiple transfer-encoding headers")]
    MultipleTransferEncodingHeaders,
    #[error("Unsupported transfer-encoding value: {0}")]
    UnsupportedTransferEncoding(String),
    #[error("Both transfer-encoding and content-length headers present")]
    BothTeAndCl,
}

/// An ordered list of header fields. Insertion order is preserved on the
/// wire; name lookups ignore ASCII case.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: Vec<(Bytes, Bytes)>,
}

impl Headers {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            headers: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Set `name` to `value`. If a header with the same name (ignoring case)
    /// already exists, its value is replaced where it stands and any later
    /// duplicates are dropped. Otherwise the header is appended.
    pub fn set(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        let name = name.into();
        let value = value.into();

        let Some(first) = self
            .headers
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(&name))
        else {
            self.headers.push((name, value));
            return;
        };

        self.headers[first].1 = value;
        let mut idx = 0;
        self.headers.retain(|(n, _)| {
            let keep = idx <= first || !n.eq_ignore_ascii_case(&name);
            idx += 1;
            keep
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (Bytes, Bytes)> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn get_header(&self, needle: &str) -> Option<&Bytes> {
        let needle = needle.as_bytes();
        self.iter()
            .find(|(name, _)| needle.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn framing(&self) -> Result<HeadFraming, HeaderError> {
        let mut cl = None;
        let mut te = false;

        for (name, value) in self.iter() {
            if name.eq_ignore_ascii_case(b"content-length") {
                let value = value.trim_ascii();
                let cl_str = std::str::from_utf8(value).map_err(|_| {
                    HeaderError::InvalidContentLength(String::from_utf8_lossy(value).to_string())
                })?;
                let cl_val = cl_str
                    .parse::<u64>()
                    .map_err(|_| HeaderError::InvalidContentLength(cl_str.to_string()))?;
                if let Some(old_cl_val) = cl.replace(cl_val) {
                    return Err(HeaderError::MultipleContentLength(old_cl_val, cl_val));
                }
            } else if name.eq_ignore_ascii_case(b"transfer-encoding") {
                let te_value = value.trim_ascii();
                if !te_value.eq_ignore_ascii_case(b"chunked") {
                    return Err(HeaderError::UnsupportedTransferEncoding(
                        String::from_utf8_lossy(te_value).to_string(),
                    ));
                }
                if te {
                    return Err(HeaderError::MultipleTransferEncodingHeaders);
                }
                te = true;
            }
        }

        match (cl, te) {
            (None, true) => Ok(HeadFraming::Chunked),
            (None, false) => Ok(HeadFraming::NoFraming),
            (Some(_), true) => Err(HeaderError::BothTeAndCl),
            (Some(cl), false) => Ok(HeadFraming::Length(cl)),
        }
    }
}

impl<'h> IntoIterator for &'h Headers {
    type Item = &'h (Bytes, Bytes);
    type IntoIter = std::slice::Iter<'h, (Bytes, Bytes)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use crate::{framing::HeadFraming, header::Headers};

    /// Requests with both CL and TE headers must be rejected to prevent HTTP
    /// Request Smuggling attacks (RFC 7230 3.3.3).
    #[test]
    fn reject_message_with_both_cl_and_te_headers() {
        let mut headers = Headers::with_capacity(2);
        headers.push(b"content-length".as_slice(), b"6".as_slice());
        headers.push(b"transfer-encoding".as_slice(), b"chunked".as_slice());

        assert!(headers.framing().is_err());
    }

    #[test]
    fn reject_message_with_multiple_cl_headers() {
        let mut headers = Headers::with_capacity(2);
        headers.push(b"content-length".as_slice(), b"6".as_slice());
        headers.push(b"content-length".as_slice(), b"5".as_slice());

        assert!(headers.framing().is_err());
    }

    #[test]
    fn no_framing_headers_means_no_body() {
        let mut headers = Headers::with_capacity(1);
        headers.push(b"host".as_slice(), b"localhost".as_slice());

        assert_eq!(HeadFraming::NoFraming, headers.framing().unwrap());
    }

    #[test]
    fn lookup_ignores_case() {
        let mut headers = Headers::default();
        headers.push("Content-Type", "text/plain");

        assert_eq!(
            b"text/plain".as_slice(),
            headers.get_header("content-type").unwrap().as_ref()
        );
        assert!(headers.get_header("content-length").is_none());
    }

    #[test]
    fn set_replaces_in_place_and_keeps_order() {
        let mut headers = Headers::default();
        headers.push("Cache-Control", "max-age=60");
        headers.push("X-Other", "1");
        headers.push("cache-control", "private");

        headers.set("CACHE-CONTROL", "no-cache");
        headers.set("Content-Type", "text/plain");

        let names: Vec<_> = headers.iter().map(|(n, v)| (n.clone(), v.clone())).collect();
        assert_eq!(3, names.len());
        assert_eq!(b"Cache-Control".as_slice(), names[0].0.as_ref());
        assert_eq!(b"no-cache".as_slice(), names[0].1.as_ref());
        assert_eq!(b"X-Other".as_slice(), names[1].0.as_ref());
        assert_eq!(b"Content-Type".as_slice(), names[2].0.as_ref());
    }
}
