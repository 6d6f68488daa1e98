use serde::{Deserialize, Serialize};
use std::time::Duration;

/// High-level classification of an error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/transfer).
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Any other non-2xx HTTP status.
    Http(u32),
    /// Local disk failure; retrying the network does not help.
    Storage,
    /// Other transport error.
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// How the inter-attempt delay evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// delay * 2^(attempt-1), capped at `max_delay`.
    Exponential,
}

/// Retry budget for one resource.
///
/// The CDN answers every non-2xx the same way for a given index, so any
/// network-side failure is retried; only local storage errors are not.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before a retry (base delay for exponential backoff).
    pub delay: Duration,
    pub backoff: Backoff,
    /// Upper bound on exponential backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            backoff: Backoff::Fixed,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps; used for tests and previews.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
            backoff: Backoff::Fixed,
            max_delay: Duration::ZERO,
        }
    }

    /// Decide whether to retry after `attempt` failed with `kind`.
    ///
    /// `attempt` is 1-based (1 = first attempt).
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Storage => RetryDecision::NoRetry,
            ErrorKind::Timeout
            | ErrorKind::Throttled
            | ErrorKind::Connection
            | ErrorKind::Http(_)
            | ErrorKind::Other => RetryDecision::RetryAfter(self.delay_for(attempt)),
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let exp = 1u32 << attempt.saturating_sub(1).min(16);
                self.delay.saturating_mul(exp).min(self.max_delay)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_retry_for_storage() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Storage), RetryDecision::NoRetry);
    }

    #[test]
    fn fixed_delay_does_not_grow() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, ErrorKind::Http(404)),
            RetryDecision::RetryAfter(Duration::from_secs(1))
        );
        assert_eq!(
            p.decide(2, ErrorKind::Connection),
            RetryDecision::RetryAfter(Duration::from_secs(1))
        );
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let p = RetryPolicy {
            max_attempts: 20,
            delay: Duration::from_millis(500),
            backoff: Backoff::Exponential,
            max_delay: Duration::from_secs(4),
        };
        let d = |attempt| match p.decide(attempt, ErrorKind::Timeout) {
            RetryDecision::RetryAfter(d) => d,
            RetryDecision::NoRetry => panic!("expected retry"),
        };
        assert_eq!(d(1), Duration::from_millis(500));
        assert_eq!(d(2), Duration::from_secs(1));
        assert_eq!(d(3), Duration::from_secs(2));
        assert_eq!(d(10), Duration::from_secs(4));
    }

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy::default();
        assert!(matches!(
            p.decide(1, ErrorKind::Throttled),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(2, ErrorKind::Throttled),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::Throttled), RetryDecision::NoRetry);
    }
}
