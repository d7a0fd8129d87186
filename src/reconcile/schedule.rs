//! Poll Schedule
//!
//! How many times to re-read the sheet after a write, and how long to wait
//! between reads.

use std::time::Duration;

// == Poll Schedule ==
#[derive(Debug, Clone, PartialEq)]
pub struct PollSchedule {
    /// Total number of reads, at least 1
    pub max_attempts: u32,
    /// Wait before the second read
    pub interval: Duration,
    /// Factor applied to the wait after each further read; 1.0 keeps it fixed
    pub backoff: f64,
    /// Upper bound for a single wait
    pub max_interval: Duration,
}

impl PollSchedule {
    /// Creates a schedule, clamping attempts to at least 1, backoff to at
    /// least 1.0 and the cap to at least `interval`.
    pub fn new(max_attempts: u32, interval: Duration, backoff: f64, max_interval: Duration) -> Self {
        let backoff = if backoff.is_finite() { backoff.max(1.0) } else { 1.0 };
        Self {
            max_attempts: max_attempts.max(1),
            interval,
            backoff,
            max_interval: max_interval.max(interval),
        }
    }

    /// Fixed-interval schedule.
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self::new(max_attempts, interval, 1.0, interval)
    }

    /// Wait before read number `attempt` (1-based). The first read happens
    /// immediately.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 2).unwrap_or(i32::MAX);
        let scaled = self.interval.as_nanos() as f64 * self.backoff.powi(exponent);
        let capped = scaled.min(self.max_interval.as_nanos() as f64);
        Duration::from_nanos(capped.round() as u64)
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(1500), 1.0, Duration::from_secs(10))
    }
}
