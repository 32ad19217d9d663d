use std::time::Duration;

/// Doubles `current`, clamped to `max`.
///
/// Uses saturating `Duration` arithmetic so very large delays never lose
/// precision or overflow.
pub fn next_delay(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

/// Restart delay state for one supervision session.
///
/// Starts at the minimum delay and doubles after every invocation until it
/// reaches the ceiling, where it stays. No jitter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    /// Creates a fresh session. A `min` above `max` is clamped to `max`.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            current: min.min(max),
            max,
        }
    }

    /// Delay to wait before the next invocation.
    pub const fn current(&self) -> Duration {
        self.current
    }

    /// Moves to the next delay and returns it.
    pub fn advance(&mut self) -> Duration {
        self.current = next_delay(self.current, self.max);
        self.current
    }
}
