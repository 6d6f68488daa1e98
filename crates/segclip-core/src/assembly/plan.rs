//! Concat lists and media tool argument vectors.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::scheduler::TrackInitPaths;
use crate::segmenter::SegmentIndexRange;
use crate::url_model::{intermediate_file_name, segment_file_name, SegmentSlot, TrackKind};

/// Ordered inputs for one track: init resource first, then every segment file
/// present in the workspace by ascending index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatList {
    pub track: TrackKind,
    entries: Vec<PathBuf>,
    omitted: Vec<i64>,
}

impl ConcatList {
    /// Indices whose file is absent are left out and recorded in `omitted`.
    pub fn build(dir: &Path, track: TrackKind, init: &Path, range: &SegmentIndexRange) -> Self {
        let mut entries = Vec::with_capacity(1 + range.len());
        let mut omitted = Vec::new();
        entries.push(init.to_path_buf());
        for index in range.indices() {
            let path = dir.join(segment_file_name(track, SegmentSlot::Index(index)));
            if path.is_file() {
                entries.push(path);
            } else {
                omitted.push(index);
            }
        }
        Self {
            track,
            entries,
            omitted,
        }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn omitted(&self) -> &[i64] {
        &self.omitted
    }

    /// `concat:<init>|<seg>|<seg>...` input specifier.
    pub fn to_arg(&self) -> OsString {
        let mut arg = OsString::from("concat:");
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                arg.push("|");
            }
            arg.push(entry.as_os_str());
        }
        arg
    }
}

/// Everything the assembly pipeline will read and write for one job.
#[derive(Debug, Clone)]
pub struct AssemblyPlan {
    pub video: ConcatList,
    pub audio: ConcatList,
    pub video_intermediate: PathBuf,
    pub audio_intermediate: PathBuf,
    pub output: PathBuf,
}

impl AssemblyPlan {
    pub fn build(dir: &Path, range: &SegmentIndexRange, init: &TrackInitPaths, output: &Path) -> Self {
        Self {
            video: ConcatList::build(dir, TrackKind::Video, &init.video, range),
            audio: ConcatList::build(dir, TrackKind::Audio, &init.audio, range),
            video_intermediate: dir.join(intermediate_file_name(TrackKind::Video)),
            audio_intermediate: dir.join(intermediate_file_name(TrackKind::Audio)),
            output: output.to_path_buf(),
        }
    }

    pub fn list(&self, track: TrackKind) -> &ConcatList {
        match track {
            TrackKind::Video => &self.video,
            TrackKind::Audio => &self.audio,
        }
    }

    pub fn intermediate(&self, track: TrackKind) -> &Path {
        match track {
            TrackKind::Video => &self.video_intermediate,
            TrackKind::Audio => &self.audio_intermediate,
        }
    }

    /// `-loglevel quiet -i concat:... -c copy <track>_full.mp4`
    pub fn concat_args(&self, track: TrackKind) -> Vec<OsString> {
        vec![
            "-loglevel".into(),
            "quiet".into(),
            "-i".into(),
            self.list(track).to_arg(),
            "-c".into(),
            "copy".into(),
            self.intermediate(track).as_os_str().to_owned(),
        ]
    }

    /// `-loglevel quiet -i video_full.mp4 -i audio_full.mp4 -c:v copy|libx264 -c:a copy <out>`
    pub fn mux_args(&self, re_encode: bool) -> Vec<OsString> {
        let video_codec = if re_encode { "libx264" } else { "copy" };
        vec![
            "-loglevel".into(),
            "quiet".into(),
            "-i".into(),
            self.video_intermediate.as_os_str().to_owned(),
            "-i".into(),
            self.audio_intermediate.as_os_str().to_owned(),
            "-c:v".into(),
            video_codec.into(),
            "-c:a".into(),
            "copy".into(),
            self.output.as_os_str().to_owned(),
        ]
    }
}
