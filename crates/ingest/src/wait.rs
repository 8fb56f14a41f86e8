//! Human-like waits between network-facing operations.

use std::time::Duration;

use rand::Rng;
use tracing::trace;

/// Environment variable that disables all waits (tests, CI).
pub const SKIP_WAITS_ENV: &str = "REELSYNC_SKIP_WAITS";

#[derive(Debug, Clone)]
pub struct WaitPolicy {
    pub min: Duration,
    pub max: Duration,
    pub skip: bool,
}

impl WaitPolicy {
    /// Policy with the given bounds, skipping entirely when
    /// [`SKIP_WAITS_ENV`] is set to a truthy value.
    pub fn from_env(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            skip: env_truthy(SKIP_WAITS_ENV),
        }
    }

    /// Policy that never sleeps.
    pub fn disabled() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
            skip: true,
        }
    }

    /// Sleep for a random duration within the configured bounds.
    pub fn random_wait(&self) {
        if self.skip || self.max.is_zero() {
            return;
        }
        let min = self.min.as_secs_f64().min(self.max.as_secs_f64());
        let wait = rand::rng().random_range(min..=self.max.as_secs_f64());
        trace!(wait_secs = wait, "waiting before next operation");
        std::thread::sleep(Duration::from_secs_f64(wait));
    }

    /// Sleep for an explicit duration unless waits are skipped.
    pub fn sleep(&self, duration: Duration) {
        if self.skip || duration.is_zero() {
            return;
        }
        std::thread::sleep(duration);
    }
}

fn env_truthy(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_policy_never_sleeps() {
        let policy = WaitPolicy::disabled();
        let start = std::time::Instant::now();
        policy.random_wait();
        policy.sleep(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
