//! Streamed HTTP/1.1 response bodies for hosts whose normal cycle writes a
//! response in one go.
//!
//! A handler holds a [`StreamingSupport`] and calls
//! [`StreamingSupport::chunked`] with a producer closure. Depending on what
//! the [`Host`] connection supports, the producer either runs on the calling
//! task against the raw, taken-over connection ([`HijackDelivery`]) or on a
//! freshly spawned task against the host's live chunked stream
//! ([`ThreadedLiveDelivery`]). Either way the producer's failures are logged
//! and contained, and the connection is closed exactly once.

pub mod emit;
pub mod error;
pub mod handle;
pub mod hijack;
pub mod host;
pub mod live;
pub mod options;
pub mod raw;
pub mod recover;
pub mod select;
pub mod support;

#[cfg(test)]
mod testing;

pub use error::{ResponseError, StreamError, StreamResult, TakeoverRejected};
pub use handle::ResponseHandle;
pub use hijack::HijackDelivery;
pub use host::{Host, HostStream};
pub use live::{LiveStream, ThreadedLiveDelivery};
pub use options::DeliveryOptions;
pub use raw::{RawConnection, RawStreamWriter, ResponseStream};
pub use recover::{Diagnostic, FailureKind, Outcome, ProducerFuture};
pub use select::Strategy;
pub use support::{Delivery, StreamingSupport};
