use std::time::Duration;

/// Fixed-count, fixed-delay retry policy.
///
/// `max_attempts` counts the first try, so `1` means "no retries".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    /// Returns `None` when `max_attempts` is zero.
    pub fn new(max_attempts: u32, delay: Duration) -> Option<Self> {
        (max_attempts > 0).then_some(Self {
            max_attempts,
            delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Longest a full run can take when every attempt uses up `per_attempt`.
    ///
    /// `None` on overflow.
    pub fn worst_case(&self, per_attempt: Duration) -> Option<Duration> {
        let attempts = per_attempt.checked_mul(self.max_attempts)?;
        let waits = self.delay.checked_mul(self.max_attempts - 1)?;
        attempts.checked_add(waits)
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            delay: Self::DEFAULT_DELAY,
        }
    }
}
