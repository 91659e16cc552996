use retry::delay::Fibonacci;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
pub const MAX_RETRIES: usize = 6;

/// Backoff applied to the relay loop after a transient chain failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackoffConfig {
    pub initial_ms: u64,
    pub max_ms: u64,
    pub max_retries: usize,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: INITIAL_RETRY_DELAY.as_millis() as u64,
            max_ms: MAX_RETRY_DELAY.as_millis() as u64,
            max_retries: MAX_RETRIES,
        }
    }
}

impl BackoffConfig {
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        relay_backoff(
            Duration::from_millis(self.initial_ms),
            Duration::from_millis(self.max_ms),
            self.max_retries,
        )
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Clamped<S> {
    pub strategy: S,
    pub max_delay: Duration,
    pub max_retries: usize,
}

impl<S> Clamped<S> {
    pub const fn new(strategy: S, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            strategy,
            max_delay,
            max_retries,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Duration>
    where
        S: Iterator<Item = Duration>,
    {
        let Self {
            strategy,
            max_delay,
            max_retries,
        } = self;

        strategy
            .take(max_retries)
            .map(move |delay| delay.min(max_delay))
    }
}

/// Fibonacci growth from `initial`, capped at `max_delay`, ending after `max_retries` delays.
pub fn relay_backoff(
    initial: Duration,
    max_delay: Duration,
    max_retries: usize,
) -> impl Iterator<Item = Duration> {
    Clamped::new(Fibonacci::from(initial), max_delay, max_retries).iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fibonacci_backoff_is_clamped() {
        let delays =
            relay_backoff(Duration::from_millis(500), Duration::from_secs(2), 6).collect::<Vec<_>>();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(1500),
                Duration::from_millis(2000),
                Duration::from_millis(2000),
            ]
        );
    }

    #[test]
    fn zero_retries_means_no_backoff() {
        let config = BackoffConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert_eq!(config.delays().count(), 0);
        assert_eq!(BackoffConfig::default().delays().count(), MAX_RETRIES);
    }
}
