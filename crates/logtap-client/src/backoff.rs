//! Exponential backoff policies for the retrying query and the tail
//! reconnect loop.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff with an attempt budget.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Cap on the delay for any single attempt.
    pub max_delay: Duration,
    /// Multiplier applied per attempt.
    pub multiplier: f64,
    /// Jitter fraction in `[0.0, 1.0)`; zero disables jitter.
    pub jitter: f64,
    /// Total attempt budget.
    pub max_attempts: u32,
}

impl BackoffPolicy {
    /// Policy for the retrying range query: base 200 ms, factor 2.0,
    /// ±10% jitter, capped at 10 s, 5 attempts.
    #[must_use]
    pub const fn range_retry() -> Self {
        Self {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.1,
            max_attempts: 5,
        }
    }

    /// Policy for the tail reconnect loop: min 1 s, max 10 s, 5 attempts.
    #[must_use]
    pub const fn tail_reconnect() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.0,
            max_attempts: 5,
        }
    }

    /// Calculates the delay for the given attempt number (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let mut delay_millis = self.initial_delay.as_millis() as f64 * factor;

        if self.jitter > 0.0 {
            let spread = rand::thread_rng().gen_range(-self.jitter..self.jitter);
            delay_millis *= 1.0 + spread;
        }

        Duration::from_millis(delay_millis as u64).min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempt` failures.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
