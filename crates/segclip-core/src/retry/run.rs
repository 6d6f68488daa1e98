//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the policy delay then tries again.
///
/// Network-side failures that run out of attempts come back as
/// `FetchError::Exhausted`; non-retryable errors are returned unchanged.
pub fn run_with_retry<F>(policy: &RetryPolicy, mut f: F) -> Result<(), FetchError>
where
    F: FnMut() -> Result<(), FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(()) => return Ok(()),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => {
                        if matches!(e, FetchError::Storage(_)) {
                            return Err(e);
                        }
                        return Err(FetchError::Exhausted {
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, error = %e, "fetch failed, retrying in {:?}", d);
                        if !d.is_zero() {
                            std::thread::sleep(d);
                        }
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let res = run_with_retry(&RetryPolicy::immediate(3), || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(FetchError::Http { status: 500 })
            } else {
                Ok(())
            }
        });
        assert!(res.is_ok());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhausts_budget_and_keeps_last_status() {
        let calls = Cell::new(0u32);
        let err = run_with_retry(&RetryPolicy::immediate(3), || {
            calls.set(calls.get() + 1);
            let status = if calls.get() == 3 { 404 } else { 500 };
            Err(FetchError::Http { status })
        })
        .unwrap_err();
        assert_eq!(calls.get(), 3);
        match err {
            FetchError::Exhausted { attempts, ref last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(**last, FetchError::Http { status: 404 }));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[test]
    fn storage_error_is_not_retried() {
        let calls = Cell::new(0);
        let err = run_with_retry(&RetryPolicy::immediate(5), || {
            calls.set(calls.get() + 1);
            Err(FetchError::Storage(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        })
        .unwrap_err();
        assert_eq!(calls.get(), 1);
        assert!(matches!(err, FetchError::Storage(_)));
    }
}
