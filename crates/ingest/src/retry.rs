//! Retry-with-backoff for the download step.

use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::wait::WaitPolicy;

/// Exponential backoff with a hard cap and ±10 % jitter.
///
/// Attempt n (1-indexed) failing waits `base * factor^(n-1)`, capped at
/// `max_wait`, before attempt n+1. With the defaults the sequence is
/// 5 s, 15 s, 45 s, ...
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub retries: u32,
    pub base: Duration,
    pub factor: f64,
    pub max_wait: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base: Duration::from_secs(5),
            factor: 3.0,
            max_wait: Duration::from_secs(90),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-indexed).
    fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exp = self.base.as_secs_f64() * self.factor.powi(attempt.saturating_sub(1) as i32);
        let mut wait = exp.min(self.max_wait.as_secs_f64());
        if self.jitter && wait > 0.0 {
            let spread = wait * 0.1;
            wait += rand::rng().random_range(-spread..=spread);
        }
        Duration::from_secs_f64(wait.max(0.0))
    }

    /// Run `op` until it succeeds or attempts are exhausted; the final
    /// attempt's error is returned as-is.
    pub fn run<T, E, F>(&self, waits: &WaitPolicy, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
        E: std::fmt::Display,
    {
        let attempts = self.retries.max(1);
        for attempt in 1..attempts {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let delay = self.delay_after_attempt(attempt);
                    warn!(
                        attempt,
                        max = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after failed attempt"
                    );
                    waits.sleep(delay);
                }
            }
        }
        op(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            base: Duration::from_millis(1),
            factor: 3.0,
            max_wait: Duration::from_millis(4),
            jitter: false,
        }
    }

    #[test]
    fn returns_first_success() {
        let mut calls = 0u32;
        let result: Result<u32, String> = policy(3).run(&WaitPolicy::disabled(), |attempt| {
            calls += 1;
            if attempt < 2 {
                Err("transient".to_string())
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(result.ok(), Some(2));
        assert_eq!(calls, 2);
    }

    #[test]
    fn exhausted_attempts_return_last_error() {
        let mut calls = 0u32;
        let result: Result<(), String> = policy(3).run(&WaitPolicy::disabled(), |attempt| {
            calls += 1;
            Err(format!("attempt {attempt}"))
        });
        assert_eq!(result.err().as_deref(), Some("attempt 3"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn delays_grow_and_cap() {
        let policy = policy(5);
        assert_eq!(policy.delay_after_attempt(1), Duration::from_millis(1));
        assert_eq!(policy.delay_after_attempt(2), Duration::from_millis(3));
        // base * 9 exceeds the cap
        assert_eq!(policy.delay_after_attempt(3), Duration::from_millis(4));
    }
}
