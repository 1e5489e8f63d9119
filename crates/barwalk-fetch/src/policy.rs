//! Per-request timeout and retry policy.

use std::time::Duration;

/// Timeout and retry settings applied to every window request.
#[derive(Debug, Clone)]
pub struct RequestPolicy {
    /// Upper bound on a single provider call.
    pub timeout: Duration,
    /// Retry attempts after the first call for retryable failures.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl RequestPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            timeout,
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Calculates the delay before retry `attempt` (1-based): exponential
    /// backoff capped at `max_delay_ms`, with deterministic jitter within ±25%.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self.base_delay_ms.saturating_mul(1u64 << attempt.min(10));
        let capped = exp_delay.min(self.max_delay_ms);

        let jitter_range = capped / 4;
        let jitter = if jitter_range > 0 {
            let offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            offset as i64 - jitter_range as i64
        } else {
            0
        };

        Duration::from_millis((capped as i64 + jitter).max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_default() {
        let policy = RequestPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(60));
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay_ms, 500);
        assert_eq!(policy.max_delay_ms, 30_000);
    }

    #[test]
    fn test_backoff_delay_calculation() {
        let policy = RequestPolicy::default();

        // First retry: base_delay * 2 = 1000ms (plus jitter)
        let delay1 = policy.backoff_delay(1);
        assert!(delay1.as_millis() >= 750 && delay1.as_millis() <= 1250);

        // Second retry: base_delay * 4 = 2000ms (plus jitter)
        let delay2 = policy.backoff_delay(2);
        assert!(delay2.as_millis() >= 1500 && delay2.as_millis() <= 2500);

        // High attempts are capped at max_delay
        let delay_high = policy.backoff_delay(20);
        assert!(delay_high.as_millis() <= 37_500);
    }

    #[test]
    fn test_no_retry() {
        let policy = RequestPolicy::no_retry(Duration::from_secs(5));
        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.timeout, Duration::from_secs(5));
    }
}
