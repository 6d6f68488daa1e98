use std::fmt;
use std::io;

use crate::url_model::TrackKind;

/// Which media tool invocation of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStep {
    /// Byte-level concatenation of one track's init + segments.
    Concat(TrackKind),
    /// Joining the two intermediate tracks into the clip.
    Mux,
}

impl fmt::Display for AssemblyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyStep::Concat(track) => write!(f, "{} concat", track),
            AssemblyStep::Mux => f.write_str("mux"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("could not run media tool for {step}: {source}")]
    ToolSpawn {
        step: AssemblyStep,
        #[source]
        source: io::Error,
    },
    #[error("media tool failed during {step} (exit code {code:?}): {stderr}")]
    ToolFailed {
        step: AssemblyStep,
        code: Option<i32>,
        stderr: String,
    },
    #[error("{} {track} segment(s) missing from workspace: {indices:?}", .indices.len())]
    MissingSegments { track: TrackKind, indices: Vec<i64> },
}
