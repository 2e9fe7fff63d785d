use trickle_frontend::FrontendError;
use trickle_stream::{ResponseError, StreamError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Frontend error: {0}")]
    FrontendError(#[from] FrontendError),
    #[error("Stream error: {0}")]
    StreamError(#[from] StreamError),
    #[error("Response error: {0}")]
    ResponseError(#[from] ResponseError),
    #[error("A response was already sent for this request")]
    ResponseSent,
}

pub type SessionResult<T> = Result<T, SessionError>;
