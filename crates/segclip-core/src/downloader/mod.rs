//! Single-resource fetcher.
//!
//! The coordinator only depends on the `SegmentSource` trait; `CurlSource`
//! is the production implementation (one libcurl easy handle per attempt,
//! body streamed to `<dest>.part` and renamed on success).

mod segment;

use std::path::Path;
use std::time::Duration;

use crate::config::ClipConfig;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};

/// Something that can GET a URL into a local file, once.
///
/// Implementations must leave nothing under `dest` unless the whole body
/// arrived with a 2xx status. Retry is the caller's job.
pub trait SegmentSource: Send + Sync {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// Per-transfer curl options (from config).
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Whole-transfer cap; segments are a few hundred KiB.
    pub transfer_timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            transfer_timeout: Duration::from_secs(120),
        }
    }
}

impl CurlOptions {
    pub fn from_config(cfg: &ClipConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            transfer_timeout: cfg.transfer_timeout(),
        }
    }
}

/// libcurl-backed `SegmentSource`.
#[derive(Debug, Clone, Default)]
pub struct CurlSource {
    opts: CurlOptions,
}

impl CurlSource {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }
}

impl SegmentSource for CurlSource {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        segment::download_one(url, dest, self.opts)
    }
}

/// Fetch with the retry budget applied. Returns the terminal error on exhaustion.
pub fn fetch_with_retry(
    source: &dyn SegmentSource,
    policy: &RetryPolicy,
    url: &str,
    dest: &Path,
) -> Result<(), FetchError> {
    run_with_retry(policy, || source.fetch(url, dest))
}
