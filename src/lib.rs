//! # restart-supervisor
//!
//! `restart-supervisor` keeps one long-running Tokio worker alive.
//! It invokes the worker, catches panics and errors so they never reach the
//! caller, and invokes it again after an exponential back-off, until the
//! `CancellationToken` it was started with fires.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use restart_supervisor::{start, SupervisorConfig, WorkerError};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let token = CancellationToken::new();
//!     let config = SupervisorConfig {
//!         min_backoff: Duration::from_millis(100),
//!         max_backoff: Duration::from_secs(5),
//!         ..Default::default()
//!     };
//!
//!     let handle = start(token.clone(), config, |token: CancellationToken| async move {
//!         tokio::select! {
//!             _ = token.cancelled() => Ok::<(), WorkerError>(()),
//!             _ = tokio::time::sleep(Duration::from_secs(2)) => {
//!                 Err(std::io::Error::other("lost connection").into())
//!             }
//!         }
//!     });
//!
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!     token.cancel();
//!     let _ = handle.wait().await;
//! }
//! ```
//!
//! ## Behaviour
//!
//! * **Crash isolation**: a panic or an `Err` from the worker is logged and
//!   followed by a restart. The supervising task itself never fails.
//! * **Back-off**: delays go `min, 2·min, 4·min, …` and stay at `max` once
//!   reached. No jitter.
//! * **Cooperative cancellation**: the worker gets the token and must return
//!   when it fires. The supervisor checks it before every invocation.
//!
//! | Option         | Default                        |
//! | -------------- | ------------------------------ |
//! | `min_backoff`  | 1s                             |
//! | `max_backoff`  | 30s                            |
//! | `logger`       | `TracingLogger` (or stderr)    |
//! | `backoff_wait` | `BackoffWait::Uninterruptible` |

pub use backoff::{next_delay, Backoff};
pub use logger::{
    default_logger, Logger, NoopLogger, SharedLogger, StderrLogger, SupervisorEvent,
};
#[cfg(feature = "with_tracing")]
pub use logger::TracingLogger;
pub use supervisor::{
    builder::{
        BackoffWait, ResolvedConfig, SupervisorBuilder, SupervisorConfig, DEFAULT_MAX_BACKOFF,
        DEFAULT_MIN_BACKOFF,
    },
    handle::{Phase, SupervisorError, SupervisorHandle, SupervisorStatus},
    start, Supervisor,
};
pub use worker::{
    invoke, Crash, Outcome, PanicPayload, Worker, WorkerError, WorkerFn, WorkerResult,
};

mod backoff;
mod logger;
mod supervisor;
mod worker;
