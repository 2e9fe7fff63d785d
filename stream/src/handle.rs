use bytes::Bytes;
use trickle_http_message::{
    header::Headers, message::Response, status::reason_phrase, version::HttpVersion,
};

use crate::error::ResponseError;

/// The head of the response currently being served: status and headers, and
/// whether they have been committed to the wire. Once committed the head is
/// frozen.
#[derive(Debug, Clone)]
pub struct ResponseHandle {
    code: u16,
    headers: Headers,
    committed: bool,
}

impl Default for ResponseHandle {
    fn default() -> Self {
        Self {
            code: 200,
            headers: Headers::default(),
            committed: false,
        }
    }
}

impl ResponseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> u16 {
        self.code
    }

    pub fn set_status(&mut self, code: u16) -> Result<(), ResponseError> {
        self.ensure_uncommitted()?;
        self.code = code;
        Ok(())
    }

    /// Set a header, replacing any header of the same name (ignoring case)
    /// where it stands.
    pub fn set_header(&mut self, name: &str, value: impl AsRef<[u8]>) -> Result<(), ResponseError> {
        self.ensure_uncommitted()?;
        self.headers.set(
            Bytes::copy_from_slice(name.as_bytes()),
            Bytes::copy_from_slice(value.as_ref()),
        );
        Ok(())
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub(crate) fn commit(&mut self) {
        self.committed = true;
    }

    /// The response head as it should be written for a client speaking
    /// `version`.
    pub fn to_response(&self, version: HttpVersion) -> Response {
        Response::new(
            version,
            self.code,
            reason_phrase(self.code),
            self.headers.clone(),
        )
    }

    fn ensure_uncommitted(&self) -> Result<(), ResponseError> {
        if self.committed {
            Err(ResponseError::AlreadyCommitted)
        } else {
            Ok(())
        }
    }
}
