//! Retry budget and capped exponential backoff for extraction calls.

use std::time::Duration;

use crate::utils::{
    BACKOFF_BASE_MS, BACKOFF_CAP_MS, COMBINED_EXTRACTION_ATTEMPTS, COOKIE_DERIVATION_ATTEMPTS,
    SINGLE_EXTRACTION_ATTEMPTS,
};

use super::extractor::ExtractionKind;

/// Wait before retry attempt `attempt` (0-based): `min(2^k * 1000, 4000)` ms.
///
/// Attempt 0 is the first send and never waits; callers only sleep for k > 0.
#[must_use]
pub fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(factor).min(BACKOFF_CAP_MS))
}

/// How many times an extraction call may be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Budget for each call site.
    #[must_use]
    pub fn for_kind(kind: ExtractionKind) -> Self {
        match kind {
            ExtractionKind::Single(_) => Self::new(SINGLE_EXTRACTION_ATTEMPTS),
            ExtractionKind::Combined => Self::new(COMBINED_EXTRACTION_ATTEMPTS),
            ExtractionKind::CookieFromPrivacy => Self::new(COOKIE_DERIVATION_ATTEMPTS),
        }
    }

    /// Delay before `attempt`, or `None` for the first attempt.
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        (attempt > 0).then(|| backoff_delay(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::DocumentKind;

    #[test]
    fn test_backoff_schedule() {
        for k in 1..=4u32 {
            let expected = (2u64.pow(k) * 1000).min(4000);
            assert_eq!(backoff_delay(k), Duration::from_millis(expected), "k={k}");
        }
        assert_eq!(backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_backoff_saturates() {
        assert_eq!(backoff_delay(64), Duration::from_millis(BACKOFF_CAP_MS));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_millis(BACKOFF_CAP_MS));
    }

    #[test]
    fn test_budgets_per_call_site() {
        assert_eq!(
            RetryPolicy::for_kind(ExtractionKind::Single(DocumentKind::Terms)).max_attempts,
            3
        );
        assert_eq!(RetryPolicy::for_kind(ExtractionKind::Combined).max_attempts, 4);
        assert_eq!(
            RetryPolicy::for_kind(ExtractionKind::CookieFromPrivacy).max_attempts,
            2
        );
        assert_eq!(RetryPolicy::new(0).max_attempts, 1);
        assert_eq!(RetryPolicy::new(3).delay_before(0), None);
    }
}
