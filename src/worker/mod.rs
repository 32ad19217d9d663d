use std::{any::Any, fmt, future::Future, panic::AssertUnwindSafe};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::logger::{Logger, SupervisorEvent};

#[cfg(feature = "anyhow")]
pub type WorkerError = anyhow::Error;
#[cfg(not(feature = "anyhow"))]
pub type WorkerError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type WorkerResult = Result<(), WorkerError>;

/// Long-running logic kept alive by the supervisor.
///
/// # Cancellation
///
/// The supervisor never aborts a running invocation. `run` must watch the
/// token it is given and return once it fires, otherwise the supervising
/// task stays blocked inside that invocation forever.
///
/// # Clone and restart semantics
///
/// The supervisor keeps the **original** value and runs a fresh clone on
/// every invocation. Whatever a crashed run did to `&mut self` is dropped
/// with it. Put state that must survive restarts behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use std::sync::{
///     atomic::{AtomicUsize, Ordering},
///     Arc,
/// };
/// use restart_supervisor::{Worker, WorkerResult};
/// use tokio_util::sync::CancellationToken;
///
/// #[derive(Clone)]
/// struct Poller {
///     polls: Arc<AtomicUsize>,
/// }
///
/// impl Worker for Poller {
///     async fn run(&mut self, token: CancellationToken) -> WorkerResult {
///         while !token.is_cancelled() {
///             self.polls.fetch_add(1, Ordering::Relaxed);
///             tokio::select! {
///                 _ = token.cancelled() => {}
///                 _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Worker: Clone + Send + 'static {
    /// Runs one invocation. Returning `Err` or panicking counts as a crash.
    fn run(&mut self, token: CancellationToken) -> impl Future<Output = WorkerResult> + Send;
}

/// Adapts a closure `Fn(CancellationToken) -> Fut` into a [`Worker`].
///
/// Each invocation calls the closure again, producing a new future.
#[derive(Debug, Clone)]
pub struct WorkerFn<F>(F);

impl<F> WorkerFn<F> {
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn(CancellationToken) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = WorkerResult> + Send,
{
    fn run(&mut self, token: CancellationToken) -> impl Future<Output = WorkerResult> + Send {
        (self.0)(token)
    }
}

/// The value a worker panicked with.
pub struct PanicPayload(Box<dyn Any + Send + 'static>);

impl PanicPayload {
    pub(crate) fn new(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self(payload)
    }

    /// The panic message, if the payload was a string.
    pub fn message(&self) -> Option<&str> {
        if let Some(message) = self.0.downcast_ref::<&'static str>() {
            Some(*message)
        } else {
            self.0.downcast_ref::<String>().map(String::as_str)
        }
    }

    pub fn into_inner(self) -> Box<dyn Any + Send + 'static> {
        self.0
    }
}

impl fmt::Debug for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PanicPayload").field(&self.to_string()).finish()
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().unwrap_or("<non-string panic payload>"))
    }
}

/// An abnormal termination of one invocation.
#[derive(Debug)]
pub enum Crash {
    Panicked(PanicPayload),
    Errored(WorkerError),
}

impl Crash {
    pub fn is_panic(&self) -> bool {
        matches!(self, Crash::Panicked(_))
    }
}

impl fmt::Display for Crash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Panicked(payload) => write!(f, "panicked: {payload}"),
            Self::Errored(err) => write!(f, "returned error: {err}"),
        }
    }
}

/// How a single invocation ended.
#[derive(Debug)]
pub enum Outcome {
    Completed,
    Crashed(Crash),
}

impl Outcome {
    pub fn is_crashed(&self) -> bool {
        matches!(self, Outcome::Crashed(_))
    }
}

/// Runs `worker` once, catching any panic raised while its future is built
/// or polled.
///
/// Control always comes back to the caller: a panic becomes
/// [`Outcome::Crashed`] and is reported to `logger` instead of unwinding.
pub async fn invoke<W: Worker>(
    mut worker: W,
    token: CancellationToken,
    logger: &dyn Logger,
) -> Outcome {
    let run = async move { worker.run(token).await };
    let outcome = match AssertUnwindSafe(run).catch_unwind().await {
        Ok(Ok(())) => Outcome::Completed,
        Ok(Err(err)) => Outcome::Crashed(Crash::Errored(err)),
        Err(payload) => Outcome::Crashed(Crash::Panicked(PanicPayload::new(payload))),
    };
    if let Outcome::Crashed(crash) = &outcome {
        logger.log(&SupervisorEvent::Crashed { crash });
    }
    outcome
}
