use tokio::io;
use trickle_body::BodyError;
use trickle_http_message::{header::HeaderError, message::MessageError};

/// Errors from talking to a client connection.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    #[error("Writing to the client failed: {0}")]
    Write(io::Error),
    #[error("Writing the response body failed: {0}")]
    Body(#[from] BodyError),
    #[error("Reading from the client failed: {0}")]
    Read(io::Error),
    #[error("Client closed the connection between requests")]
    Closed,
    #[error("Client closed the connection in the middle of a request head")]
    TruncatedHead,
    #[error("Malformed request: {0}")]
    Malformed(#[from] MessageError),
    #[error("Bad framing header: {0}")]
    Framing(#[from] HeaderError),
    #[error("Request head reached {len} bytes, the limit is {max}")]
    HeadTooLong { len: usize, max: usize },
    #[error("Request bodies are not accepted")]
    RequestBody,
}

pub type FrontendResult<T> = Result<T, FrontendError>;
