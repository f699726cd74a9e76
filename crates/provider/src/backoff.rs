//! Exponential-backoff parameters for provider call retries.

use std::time::Duration;

use rand::Rng;

/// Tunable parameters for the retry strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempt budget, including the first try.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`RetryConfig::max_delay`].
pub fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Apply +/-50% jitter so concurrent callers do not retry in lockstep.
pub fn with_jitter(delay: Duration) -> Duration {
    let ms = delay.as_millis() as u64;
    if ms == 0 {
        return delay;
    }
    let jittered = rand::rng().random_range((ms / 2)..=(ms + ms / 2));
    Duration::from_millis(jittered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_delay_doubles() {
        let config = RetryConfig::default();
        let d = next_delay(Duration::from_millis(500), &config);
        assert_eq!(d, Duration::from_secs(1));
    }

    #[test]
    fn next_delay_clamps_at_max() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(4),
            ..Default::default()
        };
        let d = next_delay(Duration::from_secs(3), &config);
        assert_eq!(d, Duration::from_secs(4));
    }

    #[test]
    fn full_backoff_sequence() {
        let config = RetryConfig::default();
        let mut delay = config.initial_delay;
        let expected_ms = [500, 1000, 2000, 4000, 8000, 10000, 10000];

        for &expected in &expected_ms {
            assert_eq!(delay.as_millis() as u64, expected);
            delay = next_delay(delay, &config);
        }
    }

    #[test]
    fn jitter_stays_within_half_delay_either_side() {
        let base = Duration::from_millis(1000);
        for _ in 0..100 {
            let d = with_jitter(base);
            assert!(d >= Duration::from_millis(500));
            assert!(d <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn jitter_on_zero_is_zero() {
        assert_eq!(with_jitter(Duration::ZERO), Duration::ZERO);
    }
}
