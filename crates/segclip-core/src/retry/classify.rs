//! Classify HTTP status and curl errors into retry policy error kinds.

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        _ => ErrorKind::Http(code),
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a fetch error into an ErrorKind.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Transport(ce) => classify_curl_error(ce),
        FetchError::Http { status } => classify_http_status(*status),
        FetchError::Storage(_) => ErrorKind::Storage,
        FetchError::Exhausted { last, .. } => classify(last),
    }
}
