use std::{fmt, time::Duration};

use crate::{
    logger::{default_logger, SharedLogger},
    worker::Worker,
    Supervisor,
};

pub const DEFAULT_MIN_BACKOFF: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How the supervising task sleeps between two invocations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BackoffWait {
    /// Sleep for the full delay. A cancellation arriving meanwhile is seen at
    /// the start of the next cycle, so shutdown may lag by up to one delay.
    #[default]
    Uninterruptible,
    /// Wake up as soon as the cancellation token fires.
    Cancellable,
}

/// Partially specified supervisor settings.
///
/// Zero durations and a missing logger mean "use the default".
#[derive(Clone, Default)]
pub struct SupervisorConfig {
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    pub logger: Option<SharedLogger>,
    pub backoff_wait: BackoffWait,
}

impl fmt::Debug for SupervisorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupervisorConfig")
            .field("min_backoff", &self.min_backoff)
            .field("max_backoff", &self.max_backoff)
            .field("logger", &self.logger.as_ref().map(|_| "<custom>"))
            .field("backoff_wait", &self.backoff_wait)
            .finish()
    }
}

/// Fully resolved settings, owned by one supervising task.
#[derive(Clone)]
pub struct ResolvedConfig {
    pub min_backoff: Duration,
    pub max_backoff: Duration,
    pub logger: SharedLogger,
    pub backoff_wait: BackoffWait,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("min_backoff", &self.min_backoff)
            .field("max_backoff", &self.max_backoff)
            .field("backoff_wait", &self.backoff_wait)
            .finish_non_exhaustive()
    }
}

impl SupervisorConfig {
    /// Fills in defaults. Never fails.
    ///
    /// A `min_backoff` greater than `max_backoff` is lowered to
    /// `max_backoff`, so the delay never exceeds the ceiling.
    pub fn resolve(self) -> ResolvedConfig {
        let max_backoff = if self.max_backoff.is_zero() {
            DEFAULT_MAX_BACKOFF
        } else {
            self.max_backoff
        };
        let min_backoff = if self.min_backoff.is_zero() {
            DEFAULT_MIN_BACKOFF
        } else {
            self.min_backoff
        };
        ResolvedConfig {
            min_backoff: min_backoff.min(max_backoff),
            max_backoff,
            logger: self.logger.unwrap_or_else(default_logger),
            backoff_wait: self.backoff_wait,
        }
    }
}

/// Builds a `Supervisor` with configurable back-off and logging.
#[derive(Debug, Default)]
pub struct SupervisorBuilder {
    config: SupervisorConfig,
}

impl SupervisorBuilder {
    /// Creates a new builder with every setting left to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first, and smallest, delay between two invocations.
    pub fn with_min_backoff(mut self, delay: Duration) -> Self {
        self.config.min_backoff = delay;
        self
    }

    /// Sets the ceiling the delay stops doubling at.
    pub fn with_max_backoff(mut self, delay: Duration) -> Self {
        self.config.max_backoff = delay;
        self
    }

    /// Sets the sink for lifecycle and crash diagnostics.
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.config.logger = Some(logger);
        self
    }

    /// Lets cancellation cut a back-off wait short.
    pub fn with_cancellable_backoff(mut self, cancellable: bool) -> Self {
        self.config.backoff_wait = if cancellable {
            BackoffWait::Cancellable
        } else {
            BackoffWait::Uninterruptible
        };
        self
    }

    /// Constructs the `Supervisor` for `worker` with the configured settings.
    pub fn build<W: Worker>(self, worker: W) -> Supervisor<W> {
        Supervisor::new(self.config, worker)
    }
}
