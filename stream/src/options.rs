/// Per-call knobs for [`crate::StreamingSupport::chunked`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryOptions {
    /// Skip writing the response head on a taken-over connection. The
    /// producer then owns the whole wire, status line included. Has no effect
    /// when the host's live stream is used, since the host always writes the
    /// head itself.
    pub delay_headers: bool,
}

impl DeliveryOptions {
    pub const fn delay_headers(mut self, delay: bool) -> Self {
        self.delay_headers = delay;
        self
    }
}
