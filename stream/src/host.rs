use std::future::Future;

use tokio::io::{self, AsyncWrite};

use crate::{
    error::TakeoverRejected,
    handle::ResponseHandle,
    raw::{RawStreamWriter, ResponseStream},
};

/// The request-handling side of a connection, as seen by a streamed
/// response.
///
/// A host offers two primitives: giving up its raw connection entirely
/// ([`Host::takeover`]) or writing the response head itself and handing out a
/// live stream for the body ([`Host::commit`]). Whether takeover is offered
/// is a property of the deployment and does not change between requests.
pub trait Host {
    /// The raw connection handed out by a takeover.
    type Raw: AsyncWrite + Unpin + Send + 'static;
    /// The host's live body stream.
    type Live: RawStreamWriter + 'static;

    fn can_hijack(&self) -> bool;

    /// Detach the connection from the host. After this succeeds the host
    /// must not write to or close the connection again. A rejection leaves
    /// the host untouched.
    fn takeover(&mut self) -> Result<Self::Raw, TakeoverRejected>;

    /// Write and flush the head described by `handle` and return a stream
    /// that sends each write to the client as it happens.
    fn commit(
        &mut self,
        handle: &ResponseHandle,
    ) -> impl Future<Output = io::Result<Self::Live>> + Send;
}

/// The stream type producers receive from a given host.
pub type HostStream<H> = ResponseStream<<H as Host>::Raw, <H as Host>::Live>;
