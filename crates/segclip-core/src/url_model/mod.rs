//! CDN URL layout and workspace/output file naming.
//!
//! The path segments below are the upstream CDN's wire contract and are
//! reproduced verbatim; only the channel prefix varies.

mod sanitize;

pub use sanitize::{clip_file_name, sanitize_filename_for_linux, strip_bracketed};

use std::fmt;

/// Video representation path under the channel prefix.
const VIDEO_PATH: &str = "v=pv14/b=5070016/";
/// Audio representation path under the channel prefix.
const AUDIO_PATH: &str = "a=pa3/al=en-GB/ap=main/b=96000/";
/// Timescale component present on indexed segments only.
const SEGMENT_TIMESCALE: &str = "t=3840/";

/// One of the two elementary streams of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    pub const ALL: [TrackKind; 2] = [TrackKind::Video, TrackKind::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
        }
    }

    fn representation_path(&self) -> &'static str {
        match self {
            TrackKind::Video => VIDEO_PATH,
            TrackKind::Audio => AUDIO_PATH,
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which resource of a track: the initialization header or an indexed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentSlot {
    Init,
    Index(i64),
}

impl fmt::Display for SegmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentSlot::Init => f.write_str("init"),
            SegmentSlot::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Full URL of a resource. `prefix` is the catalog entry and ends with `/`.
///
/// - video init: `<prefix>v=pv14/b=5070016/segment.init`
/// - video 42: `<prefix>t=3840/v=pv14/b=5070016/42.m4s`
pub fn segment_url(prefix: &str, track: TrackKind, slot: SegmentSlot) -> String {
    match slot {
        SegmentSlot::Init => format!("{}{}segment.init", prefix, track.representation_path()),
        SegmentSlot::Index(i) => format!(
            "{}{}{}{}.m4s",
            prefix,
            SEGMENT_TIMESCALE,
            track.representation_path(),
            i
        ),
    }
}

/// Deterministic workspace file name, e.g. `video_init.m4s`, `audio_42.m4s`.
pub fn segment_file_name(track: TrackKind, slot: SegmentSlot) -> String {
    format!("{}_{}.m4s", track.as_str(), slot)
}

/// Intermediate single-track container produced by concatenation.
pub fn intermediate_file_name(track: TrackKind) -> String {
    format!("{}_full.mp4", track.as_str())
}
