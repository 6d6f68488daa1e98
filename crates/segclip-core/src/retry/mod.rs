//! Retry and backoff policy.
//!
//! This module encapsulates error classification (HTTP status, transport,
//! local storage) and inter-attempt delay decisions so that the fetcher and
//! the coordinator share one consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{Backoff, ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
