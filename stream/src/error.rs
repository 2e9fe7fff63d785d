use tokio::io;
use trickle_http_message::version::HttpVersion;

/// Why a host refused to hand over its connection.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TakeoverRejected {
    #[error("connection takeover is not enabled")]
    Disabled,
    #[error("connection was already taken over")]
    AlreadyTaken,
    #[error("{0} connections cannot be taken over")]
    UnsupportedVersion(HttpVersion),
}

/// Errors visible to the caller of [`crate::StreamingSupport::chunked`].
/// Producer failures never show up here.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(#[from] TakeoverRejected),
    #[error("Failed to commit response head: {0}")]
    CommitFailed(io::Error),
}

pub type StreamResult<T> = Result<T, StreamError>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Response head was already committed")]
    AlreadyCommitted,
}
