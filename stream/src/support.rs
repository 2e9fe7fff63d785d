use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
    error::{StreamError, StreamResult},
    handle::ResponseHandle,
    hijack::HijackDelivery,
    host::{Host, HostStream},
    live::ThreadedLiveDelivery,
    options::DeliveryOptions,
    recover::{FailureKind, Outcome, ProducerFuture},
    select::Strategy,
};

/// What [`StreamingSupport::chunked`] did with the producer.
#[derive(Debug)]
pub enum Delivery {
    /// The producer ran on the calling task over a taken-over connection and
    /// has already finished.
    Completed(Outcome),
    /// The producer is running on its own task against the host's live
    /// stream.
    Spawned(JoinHandle<Outcome>),
}

impl Delivery {
    /// Wait for the producer to finish, wherever it runs.
    pub async fn finished(self) -> Outcome {
        match self {
            Delivery::Completed(outcome) => outcome,
            Delivery::Spawned(task) => match task.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => Outcome::Failed(FailureKind::Panic),
                Err(_) => Outcome::Failed(FailureKind::Cancelled),
            },
        }
    }
}

/// Streaming capability for request handlers. A handler that wants to send
/// a response body piece by piece holds one of these and calls
/// [`StreamingSupport::chunked`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingSupport {
    defaults: DeliveryOptions,
}

impl StreamingSupport {
    pub fn new(defaults: DeliveryOptions) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> DeliveryOptions {
        self.defaults
    }

    /// Stream the body of the response described by `handle` from
    /// `producer`.
    ///
    /// Hosts that allow it have their connection taken over, and the producer
    /// runs to completion before this returns. Otherwise the host commits the
    /// head and the producer is spawned onto its own task. Only failing to
    /// obtain the connection or to commit the head is reported as an error;
    /// whatever the producer does is contained.
    pub async fn chunked<H, F>(
        &self,
        host: &mut H,
        handle: &mut ResponseHandle,
        options: DeliveryOptions,
        producer: F,
    ) -> StreamResult<Delivery>
    where
        H: Host,
        F: for<'s> FnOnce(&'s mut HostStream<H>) -> ProducerFuture<'s> + Send + 'static,
    {
        let strategy = Strategy::for_host(&*host);
        debug!(?strategy, status = handle.status(), "streaming response");

        match strategy {
            Strategy::Hijack => {
                let mut delivery = HijackDelivery::acquire(host)?;
                if let Err(e) = delivery.emit_headers_if_needed(handle, &options).await {
                    if let Err(close_err) = delivery.close().await {
                        debug!(error = %close_err, "closing connection after failed head write");
                    }
                    return Err(StreamError::CommitFailed(e));
                }
                let outcome = delivery.run::<H::Live, _>(producer).await;
                Ok(Delivery::Completed(outcome))
            }
            Strategy::ThreadedLive => {
                let delivery = ThreadedLiveDelivery::commit(host, handle).await?;
                Ok(Delivery::Spawned(delivery.run::<H::Raw, _>(producer)))
            }
        }
    }

    /// [`StreamingSupport::chunked`] with this capability's default options.
    pub async fn chunked_default<H, F>(
        &self,
        host: &mut H,
        handle: &mut ResponseHandle,
        producer: F,
    ) -> StreamResult<Delivery>
    where
        H: Host,
        F: for<'s> FnOnce(&'s mut HostStream<H>) -> ProducerFuture<'s> + Send + 'static,
    {
        self.chunked(host, handle, self.defaults, producer).await
    }
}
