use crate::host::Host;

/// The two ways a response body can be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Take the raw connection over and write to it from the calling task.
    Hijack,
    /// Write through the host's live stream from a spawned task.
    ThreadedLive,
}

impl Strategy {
    pub fn select(can_hijack: bool) -> Self {
        if can_hijack {
            Self::Hijack
        } else {
            Self::ThreadedLive
        }
    }

    /// The strategy for the connection `host` is currently serving.
    pub fn for_host<H: Host>(host: &H) -> Self {
        Self::select(host.can_hijack())
    }
}
