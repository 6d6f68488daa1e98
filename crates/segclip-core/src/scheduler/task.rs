//! Fetch tasks and their forward-only state machine.

use std::path::{Path, PathBuf};

use crate::segmenter::SegmentIndexRange;
use crate::url_model::{segment_file_name, segment_url, SegmentSlot, TrackKind};

/// Lifecycle of one fetch task. Only moves forward:
/// `Pending -> InFlight -> Succeeded | FailedExhausted`, or `Pending -> Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InFlight,
    Succeeded,
    FailedExhausted,
    /// The job had already failed when this task came up; no request was made.
    Skipped,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::FailedExhausted | TaskState::Skipped
        )
    }

    fn can_advance_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Pending, TaskState::InFlight)
                | (TaskState::Pending, TaskState::Skipped)
                | (TaskState::InFlight, TaskState::Succeeded)
                | (TaskState::InFlight, TaskState::FailedExhausted)
        )
    }
}

/// One resource to fetch into the workspace.
#[derive(Debug, Clone)]
pub(crate) struct FetchTask {
    pub(crate) track: TrackKind,
    pub(crate) slot: SegmentSlot,
    pub(crate) url: String,
    pub(crate) dest: PathBuf,
    state: TaskState,
}

impl FetchTask {
    pub(crate) fn new(prefix: &str, dir: &Path, track: TrackKind, slot: SegmentSlot) -> Self {
        Self {
            track,
            slot,
            url: segment_url(prefix, track, slot),
            dest: dir.join(segment_file_name(track, slot)),
            state: TaskState::Pending,
        }
    }

    pub(crate) fn state(&self) -> TaskState {
        self.state
    }

    /// Move to `next`; a backwards or sideways transition is refused and logged.
    pub(crate) fn advance(&mut self, next: TaskState) -> bool {
        if !self.state.can_advance_to(next) {
            tracing::error!(
                track = %self.track,
                slot = %self.slot,
                "refused task transition {:?} -> {:?}",
                self.state,
                next
            );
            return false;
        }
        self.state = next;
        true
    }
}

/// Both init resources (video first), then `video_i, audio_i` for each index ascending.
pub(crate) fn build_tasks(prefix: &str, dir: &Path, range: &SegmentIndexRange) -> Vec<FetchTask> {
    let mut tasks = Vec::with_capacity(2 + 2 * range.len());
    for track in TrackKind::ALL {
        tasks.push(FetchTask::new(prefix, dir, track, SegmentSlot::Init));
    }
    for index in range.indices() {
        for track in TrackKind::ALL {
            tasks.push(FetchTask::new(prefix, dir, track, SegmentSlot::Index(index)));
        }
    }
    tasks
}

/// Read-only view of a task after (or during) a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub track: TrackKind,
    pub slot: SegmentSlot,
    pub state: TaskState,
}

/// Count of tasks per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub pending: usize,
    pub in_flight: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl TaskSummary {
    pub(crate) fn of(states: impl Iterator<Item = TaskState>) -> Self {
        let mut s = TaskSummary::default();
        for state in states {
            match state {
                TaskState::Pending => s.pending += 1,
                TaskState::InFlight => s.in_flight += 1,
                TaskState::Succeeded => s.succeeded += 1,
                TaskState::FailedExhausted => s.failed += 1,
                TaskState::Skipped => s.skipped += 1,
            }
        }
        s
    }

    pub fn total(&self) -> usize {
        self.pending + self.in_flight + self.succeeded + self.failed + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_are_init_first_then_interleaved() {
        let range = SegmentIndexRange {
            first_index: 5,
            last_index: 6,
        };
        let tasks = build_tasks("http://h/p/", Path::new("/ws"), &range);
        let order: Vec<_> = tasks.iter().map(|t| (t.track, t.slot)).collect();
        assert_eq!(
            order,
            vec![
                (TrackKind::Video, SegmentSlot::Init),
                (TrackKind::Audio, SegmentSlot::Init),
                (TrackKind::Video, SegmentSlot::Index(5)),
                (TrackKind::Audio, SegmentSlot::Index(5)),
                (TrackKind::Video, SegmentSlot::Index(6)),
                (TrackKind::Audio, SegmentSlot::Index(6)),
            ]
        );
        assert_eq!(tasks[2].dest, Path::new("/ws/video_5.m4s"));
        assert_eq!(tasks[3].url, "http://h/p/t=3840/a=pa3/al=en-GB/ap=main/b=96000/5.m4s");
        assert!(tasks.iter().all(|t| t.state() == TaskState::Pending));
    }

    #[test]
    fn transitions_only_move_forward() {
        let mut t = FetchTask::new("http://h/", Path::new("/ws"), TrackKind::Video, SegmentSlot::Index(1));
        assert!(t.advance(TaskState::InFlight));
        assert!(!t.advance(TaskState::Pending));
        assert!(!t.advance(TaskState::Skipped));
        assert!(t.advance(TaskState::Succeeded));
        assert!(!t.advance(TaskState::FailedExhausted));
        assert_eq!(t.state(), TaskState::Succeeded);
    }

    #[test]
    fn skip_only_from_pending() {
        let mut t = FetchTask::new("http://h/", Path::new("/ws"), TrackKind::Audio, SegmentSlot::Index(1));
        assert!(t.advance(TaskState::Skipped));
        assert!(t.state().is_terminal());
        assert!(!t.advance(TaskState::InFlight));
    }

    #[test]
    fn summary_counts() {
        let s = TaskSummary::of(
            [
                TaskState::Succeeded,
                TaskState::Succeeded,
                TaskState::Skipped,
                TaskState::FailedExhausted,
            ]
            .into_iter(),
        );
        assert_eq!(s.succeeded, 2);
        assert_eq!(s.skipped, 1);
        assert_eq!(s.failed, 1);
        assert_eq!(s.total(), 4);
    }
}
