use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("supervising task ended without observing cancellation")]
    Aborted,
}

/// Where the supervision loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// An invocation is in progress, or about to start.
    Running,
    /// Sleeping before the next invocation.
    Waiting,
    /// Cancellation was observed. Terminal.
    Stopped,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Waiting => write!(f, "waiting"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Snapshot of one supervising task, published by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorStatus {
    pub phase: Phase,
    /// Invocations started so far.
    pub invocations: u64,
    /// Invocations that ended in a crash.
    pub crashes: u64,
    /// Delay used for the latest wait, or the initial delay before any wait.
    pub current_backoff: Duration,
}

impl SupervisorStatus {
    pub(crate) const fn new(initial_backoff: Duration) -> Self {
        Self {
            phase: Phase::Running,
            invocations: 0,
            crashes: 0,
            current_backoff: initial_backoff,
        }
    }
}

/// Read-only view of a running supervisor.
///
/// Dropping every handle does not stop supervision: only the cancellation
/// token passed at start does.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    status: watch::Receiver<SupervisorStatus>,
}

impl SupervisorHandle {
    pub(crate) const fn new(status: watch::Receiver<SupervisorStatus>) -> Self {
        Self { status }
    }

    /// Returns the latest published status.
    pub fn status(&self) -> SupervisorStatus {
        *self.status.borrow()
    }

    pub fn is_stopped(&self) -> bool {
        self.status().phase == Phase::Stopped
    }

    /// Waits until the supervisor has observed cancellation and stopped.
    ///
    /// Can be awaited any number of times, from any clone.
    pub async fn wait(&self) -> Result<(), SupervisorError> {
        let mut status = self.status.clone();
        status
            .wait_for(|current| current.phase == Phase::Stopped)
            .await
            .map_err(|_| SupervisorError::Aborted)?;
        Ok(())
    }
}
