//! Runs a producer so that nothing it does can escape the response it is
//! producing.
//!
//! Whatever the producer does (return, return an error, panic) the stream is
//! closed exactly once afterwards. Failures are logged as a single
//! `error`-level event and reported back as an [`Outcome`] instead of being
//! propagated.

use std::{
    any::Any,
    backtrace::{Backtrace, BacktraceStatus},
    cell::RefCell,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Once,
};

use futures_util::{FutureExt, future::BoxFuture};
use tokio::io;
use tracing::{debug, error};

use crate::raw::RawStreamWriter;

/// The future a producer returns. It may borrow the stream it writes to.
pub type ProducerFuture<'s> = BoxFuture<'s, anyhow::Result<()>>;

const PRODUCER_FAILED: &str = "streaming producer failed";

thread_local! {
    /// Where the last panic on this thread happened, recorded by the hook
    /// from [`record_panic_sites`] while the panicking frames still exist.
    static PANIC_SITE: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a panic hook that records the panic location and call stack for
/// [`Diagnostic::from_panic`]. The previous hook still runs.
fn record_panic_sites() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let mut trace = Vec::new();
            if let Some(location) = info.location() {
                trace.push(format!("panicked at {location}"));
            }
            trace.extend(trace_lines(&Backtrace::force_capture()));
            PANIC_SITE.with(|site| *site.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The producer returned an error of its own.
    Application,
    /// The producer gave up because writing to the stream failed, usually
    /// because the client went away.
    Stream,
    /// The producer panicked.
    Panic,
    /// The task running the producer was cancelled by the runtime.
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Application => "application",
            FailureKind::Stream => "stream",
            FailureKind::Panic => "panic",
            FailureKind::Cancelled => "cancelled",
        })
    }
}

/// How a producer run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed(FailureKind),
}

/// A structured report of one producer failure.
#[derive(Debug)]
pub struct Diagnostic {
    pub message: &'static str,
    pub kind: FailureKind,
    pub detail: String,
    pub trace: Vec<String>,
}

impl Diagnostic {
    pub fn from_error(err: &anyhow::Error) -> Self {
        let kind = if err.chain().any(|cause| cause.is::<io::Error>()) {
            FailureKind::Stream
        } else {
            FailureKind::Application
        };

        Self {
            message: PRODUCER_FAILED,
            kind,
            detail: format!("{err:#}"),
            trace: match err.backtrace().status() {
                BacktraceStatus::Captured => trace_lines(err.backtrace()),
                _ => trace_lines(&Backtrace::force_capture()),
            },
        }
    }

    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        // unwinding happens on the panicking thread, so the hook's record is
        // this panic's. Without it there is no trace worth reporting.
        let trace = PANIC_SITE
            .with(|site| site.borrow_mut().take())
            .unwrap_or_else(|| vec!["panic site not recorded".to_string()]);

        Self {
            message: PRODUCER_FAILED,
            kind: FailureKind::Panic,
            detail,
            trace,
        }
    }

    pub fn log(&self) {
        error!(
            kind = %self.kind,
            error = %self.detail,
            backtrace = %self.trace.join("\n"),
            "{}",
            self.message,
        );
    }
}

fn trace_lines(backtrace: &Backtrace) -> Vec<String> {
    backtrace.to_string().lines().map(str::to_owned).collect()
}

/// Run `producer` against `stream`, then close the stream.
///
/// A clean return closes the stream normally. An error or panic is logged
/// and the stream is aborted, leaving the body visibly incomplete.
pub async fn recover<S, F>(mut stream: S, producer: F) -> Outcome
where
    S: RawStreamWriter,
    F: for<'s> FnOnce(&'s mut S) -> ProducerFuture<'s>,
{
    record_panic_sites();

    let result = AssertUnwindSafe(async { producer(&mut stream).await })
        .catch_unwind()
        .await;

    let outcome = match result {
        Ok(Ok(())) => Outcome::Completed,
        Ok(Err(err)) => {
            let diagnostic = Diagnostic::from_error(&err);
            diagnostic.log();
            Outcome::Failed(diagnostic.kind)
        }
        Err(payload) => {
            let diagnostic = Diagnostic::from_panic(payload.as_ref());
            diagnostic.log();
            Outcome::Failed(diagnostic.kind)
        }
    };

    let closed = match outcome {
        Outcome::Completed => stream.close().await,
        Outcome::Failed(_) => stream.abort().await,
    };
    if let Err(e) = closed {
        debug!(error = %e, "closing response stream failed");
    }

    outcome
}
