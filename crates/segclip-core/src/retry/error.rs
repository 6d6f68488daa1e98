//! Fetch error type for retry classification and user-facing messaging.

/// Error returned by a single resource fetch (transport failure, HTTP error,
/// or local storage failure), and the terminal form after the retry budget
/// is spent.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u32 },
    /// Creating, writing or renaming the destination file failed. Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// Every attempt failed; carries the last observed failure.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Last HTTP status seen, looking through `Exhausted`.
    pub fn http_status(&self) -> Option<u32> {
        match self {
            FetchError::Http { status } => Some(*status),
            FetchError::Exhausted { last, .. } => last.http_status(),
            FetchError::Transport(_) | FetchError::Storage(_) => None,
        }
    }

    /// The underlying failure, unwrapping `Exhausted`.
    pub fn last_failure(&self) -> &FetchError {
        match self {
            FetchError::Exhausted { last, .. } => last.last_failure(),
            other => other,
        }
    }
}
