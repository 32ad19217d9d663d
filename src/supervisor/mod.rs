pub(crate) mod builder;
pub(crate) mod handle;

use std::{future::Future, time::Duration};

use builder::{BackoffWait, ResolvedConfig, SupervisorConfig};
use handle::{Phase, SupervisorHandle, SupervisorStatus};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    backoff::Backoff,
    logger::SupervisorEvent,
    worker::{invoke, Worker, WorkerFn, WorkerResult},
};

/// Keeps one worker alive until a cancellation token fires.
///
/// Every invocation runs behind a panic boundary. Whatever the outcome, the
/// supervisor logs the next delay, sleeps, and invokes the worker again. The
/// delay starts at the minimum back-off and doubles after each invocation up
/// to the maximum.
pub struct Supervisor<W: Worker> {
    worker: W,
    config: ResolvedConfig,
}

impl<W: Worker> Supervisor<W> {
    pub fn new(config: SupervisorConfig, worker: W) -> Self {
        Self {
            worker,
            config: config.resolve(),
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Spawns the supervision loop and returns immediately.
    ///
    /// The loop only reads `token`; it stops at the first cycle that finds it
    /// cancelled.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn run(self, token: CancellationToken) -> SupervisorHandle {
        let (status_tx, status_rx) = watch::channel(SupervisorStatus::new(self.config.min_backoff));
        tokio::spawn(async move {
            self.supervise(token, status_tx).await;
        });
        SupervisorHandle::new(status_rx)
    }

    /// Main loop: check cancellation, invoke, log the delay, wait, double it.
    async fn supervise(self, token: CancellationToken, status: watch::Sender<SupervisorStatus>) {
        let Self { worker, config } = self;
        let mut backoff = Backoff::new(config.min_backoff, config.max_backoff);

        loop {
            if token.is_cancelled() {
                config.logger.log(&SupervisorEvent::Stopped);
                status.send_modify(|current| current.phase = Phase::Stopped);
                return;
            }

            status.send_modify(|current| {
                current.phase = Phase::Running;
                current.invocations += 1;
            });
            let outcome = invoke(worker.clone(), token.clone(), config.logger.as_ref()).await;

            let delay = backoff.current();
            config.logger.log(&SupervisorEvent::Restarting { delay });
            status.send_modify(|current| {
                current.phase = Phase::Waiting;
                current.current_backoff = delay;
                if outcome.is_crashed() {
                    current.crashes += 1;
                }
            });
            Self::wait(config.backoff_wait, delay, &token).await;

            backoff.advance();
        }
    }

    async fn wait(mode: BackoffWait, delay: Duration, token: &CancellationToken) {
        match mode {
            BackoffWait::Uninterruptible => tokio::time::sleep(delay).await,
            BackoffWait::Cancellable => {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

/// Starts supervising `worker` in the background and returns at once.
///
/// Shorthand for `Supervisor::new(config, WorkerFn::new(worker)).run(token)`.
/// The only way to stop it is to cancel `token`; the returned handle can be
/// dropped.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn start<F, Fut>(
    token: CancellationToken,
    config: SupervisorConfig,
    worker: F,
) -> SupervisorHandle
where
    F: Fn(CancellationToken) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = WorkerResult> + Send + 'static,
{
    Supervisor::new(config, WorkerFn::new(worker)).run(token)
}
