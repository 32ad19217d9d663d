use std::{fmt, sync::Arc, time::Duration};

use crate::worker::Crash;

/// A lifecycle event emitted by a supervising task.
///
/// The `Display` implementation is the formatted log line.
#[derive(Debug)]
pub enum SupervisorEvent<'a> {
    /// The cancellation token fired; no further invocations will happen.
    Stopped,
    /// An invocation terminated abnormally.
    Crashed { crash: &'a Crash },
    /// The next invocation starts after `delay`.
    Restarting { delay: Duration },
}

impl fmt::Display for SupervisorEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "supervisor stopped: cancellation requested"),
            Self::Crashed { crash } => write!(f, "worker crashed: {crash}"),
            Self::Restarting { delay } => write!(f, "restarting worker in {delay:?}"),
        }
    }
}

/// Sink for supervisor diagnostics.
///
/// A single logger may be shared by several supervising tasks, so
/// implementations must tolerate concurrent calls.
pub trait Logger: Send + Sync + 'static {
    fn log(&self, event: &SupervisorEvent<'_>);
}

pub type SharedLogger = Arc<dyn Logger>;

/// Forwards events to `tracing`.
#[cfg(feature = "with_tracing")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

#[cfg(feature = "with_tracing")]
impl Logger for TracingLogger {
    fn log(&self, event: &SupervisorEvent<'_>) {
        match event {
            SupervisorEvent::Stopped => tracing::info!("{event}"),
            SupervisorEvent::Crashed { crash } => {
                tracing::warn!(panicked = crash.is_panic(), "{event}")
            }
            SupervisorEvent::Restarting { delay } => {
                tracing::info!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "{event}"
                )
            }
        }
    }
}

/// Writes one line per event to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger;

impl Logger for StderrLogger {
    fn log(&self, event: &SupervisorEvent<'_>) {
        eprintln!("[restart-supervisor] {event}");
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _event: &SupervisorEvent<'_>) {}
}

/// The logger used when the configuration does not name one.
pub fn default_logger() -> SharedLogger {
    #[cfg(feature = "with_tracing")]
    {
        Arc::new(TracingLogger)
    }
    #[cfg(not(feature = "with_tracing"))]
    {
        Arc::new(StderrLogger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_lines() {
        assert_eq!(
            SupervisorEvent::Stopped.to_string(),
            "supervisor stopped: cancellation requested"
        );
        assert_eq!(
            SupervisorEvent::Restarting {
                delay: Duration::from_millis(20)
            }
            .to_string(),
            "restarting worker in 20ms"
        );
    }
}
