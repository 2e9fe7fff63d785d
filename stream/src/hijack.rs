use tokio::io::{self, AsyncWrite};

use crate::{
    emit::write_head,
    error::StreamResult,
    handle::ResponseHandle,
    host::Host,
    options::DeliveryOptions,
    raw::{RawConnection, RawStreamWriter, ResponseStream},
    recover::{Outcome, ProducerFuture, recover},
};

/// Delivery over a connection taken over from the host. The producer runs on
/// the calling task; nothing else touches the connection until it is closed.
#[derive(Debug)]
pub struct HijackDelivery<R> {
    io: R,
}

impl<R: AsyncWrite + Unpin + Send + 'static> HijackDelivery<R> {
    /// Take the connection over from `host`. On rejection nothing has been
    /// written and the host still owns its connection.
    pub fn acquire<H: Host<Raw = R>>(host: &mut H) -> StreamResult<Self> {
        let io = host.takeover()?;
        Ok(Self { io })
    }

    /// Write and flush the response head, unless the caller asked to write
    /// it from the producer instead.
    pub async fn emit_headers_if_needed(
        &mut self,
        handle: &mut ResponseHandle,
        options: &DeliveryOptions,
    ) -> io::Result<()> {
        if options.delay_headers {
            return Ok(());
        }
        write_head(handle, &mut self.io).await
    }

    /// Run the producer to completion on this task, then close the
    /// connection.
    pub async fn run<L, F>(self, producer: F) -> Outcome
    where
        L: RawStreamWriter,
        F: for<'s> FnOnce(&'s mut ResponseStream<R, L>) -> ProducerFuture<'s>,
    {
        let Self { io } = self;
        recover(ResponseStream::Hijacked(RawConnection::new(io)), producer).await
    }

    /// Close the connection without running a producer.
    pub async fn close(self) -> io::Result<()> {
        let Self { io } = self;
        RawConnection::new(io).close().await
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::{StreamError, TakeoverRejected},
        handle::ResponseHandle,
        hijack::HijackDelivery,
        options::DeliveryOptions,
        testing::MockHost,
    };

    #[test]
    fn acquire_disabled() {
        let mut host = MockHost::live_only();
        assert!(matches!(
            HijackDelivery::acquire(&mut host),
            Err(StreamError::ConnectionUnavailable(TakeoverRejected::Disabled))
        ));
    }

    #[test]
    fn acquire_only_once() {
        let mut host = MockHost::hijackable();
        let _first = HijackDelivery::acquire(&mut host).expect("first takeover");
        assert!(matches!(
            HijackDelivery::acquire(&mut host),
            Err(StreamError::ConnectionUnavailable(
                TakeoverRejected::AlreadyTaken
            ))
        ));
    }

    #[tokio::test]
    async fn delayed_headers_write_nothing() {
        let mut host = MockHost::hijackable();
        let mut handle = ResponseHandle::new();
        let mut delivery = HijackDelivery::acquire(&mut host).unwrap();
        delivery
            .emit_headers_if_needed(&mut handle, &DeliveryOptions::default().delay_headers(true))
            .await
            .unwrap();

        assert!(host.raw_wire().bytes.is_empty());
        assert!(!handle.is_committed());

        delivery.close().await.unwrap();
        assert_eq!(1, host.raw_wire().shutdowns);
    }
}
