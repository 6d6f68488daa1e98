//! Job-level errors and their user-facing classification.

use std::io;
use std::path::PathBuf;

use crate::assembly::AssemblyError;
use crate::retry::FetchError;
use crate::url_model::{SegmentSlot, TrackKind};

/// A request that cannot be run as given. Raised before any network activity.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    #[error("channel {channel} has an invalid URL prefix: {reason}")]
    InvalidPrefix { channel: String, reason: String },
    #[error("end time {end} must be after start time {start}")]
    InvalidTimeRange { start: i64, end: i64 },
    #[error("no usable workspace root: {0}")]
    WorkspaceRoot(String),
}

/// Terminal failure of a clip job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Config(#[from] ConfigurationError),
    #[error("failed to download {track} segment {slot}: {source}")]
    Fetch {
        track: TrackKind,
        slot: SegmentSlot,
        #[source]
        source: FetchError,
    },
    #[error("job was cancelled before all segments were downloaded")]
    Cancelled,
    #[error("{0} download worker(s) panicked")]
    WorkerPanicked(usize),
    #[error("failed to create job workspace: {0}")]
    Workspace(#[source] io::Error),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error("failed to deliver clip to {path}: {source}")]
    Delivery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse cause of a failed job, for choosing what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The CDN refused the content for this location (HTTP 403).
    GeoRestricted,
    /// Requested window lies outside what the CDN still keeps (HTTP 404).
    OutsideRetention,
    Other,
}

impl JobError {
    /// HTTP status of the fetch failure that ended the job, if any.
    pub fn http_status(&self) -> Option<u32> {
        match self {
            JobError::Fetch { source, .. } => source.http_status(),
            _ => None,
        }
    }

    pub fn failure_class(&self) -> FailureClass {
        match self.http_status() {
            Some(403) => FailureClass::GeoRestricted,
            Some(404) => FailureClass::OutsideRetention,
            _ => FailureClass::Other,
        }
    }

    /// One-line explanation for an end user.
    pub fn user_message(&self) -> String {
        match self {
            JobError::Config(e) => e.to_string(),
            _ => self.failure_class().user_message().to_string(),
        }
    }
}

impl FailureClass {
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureClass::GeoRestricted => {
                "Couldn't download. This channel is geo-blocked and can't be accessed from your location."
            }
            FailureClass::OutsideRetention => {
                "Couldn't download. You can only grab from the past, as far back as 14 days."
            }
            FailureClass::Other => "Couldn't download. Check the log for more information.",
        }
    }
}
