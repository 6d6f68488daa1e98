//! Download coordination for one clip job.
//!
//! Expands an index range into fetch tasks for both tracks, fetches the two
//! init resources first, then schedules segments either on a bounded worker
//! pool or strictly in order. The first task to exhaust its retries trips the
//! job's `FailFlag`; tasks not yet started are skipped, tasks in flight finish.

mod progress;
mod run;
mod task;

pub use task::{TaskSnapshot, TaskState, TaskSummary};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ConcurrencyMode;
use crate::downloader::SegmentSource;
use crate::job::{JobContext, JobError};
use crate::retry::{FetchError, RetryPolicy};
use crate::segmenter::SegmentIndexRange;
use crate::status::StatusSink;
use crate::url_model::{SegmentSlot, TrackKind};

use self::progress::ProgressCounter;
use self::run::{run_parallel, run_sequential, TaskEvent, WorkItem};
use self::task::{build_tasks, FetchTask};

/// Emit a "Downloading segment" status line every this many indices.
const STATUS_EVERY: i64 = 5;

/// Default worker pool width.
pub const DEFAULT_WIDTH: usize = 10;

/// Init resources of a successful run. Segment files sit next to them as
/// `<track>_<index>.m4s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInitPaths {
    pub video: PathBuf,
    pub audio: PathBuf,
}

impl TrackInitPaths {
    pub fn get(&self, track: TrackKind) -> &Path {
        match track {
            TrackKind::Video => &self.video,
            TrackKind::Audio => &self.audio,
        }
    }
}

/// Fetches every resource a clip needs into the job workspace.
pub struct DownloadCoordinator {
    source: Arc<dyn SegmentSource>,
    policy: RetryPolicy,
    mode: ConcurrencyMode,
    width: usize,
    tasks: Vec<FetchTask>,
}

impl DownloadCoordinator {
    pub fn new(
        source: Arc<dyn SegmentSource>,
        policy: RetryPolicy,
        mode: ConcurrencyMode,
        width: usize,
    ) -> Self {
        Self {
            source,
            policy,
            mode,
            width: width.max(1),
            tasks: Vec::new(),
        }
    }

    /// Fetch init resources, then every segment in `range` for both tracks.
    ///
    /// Returns no partial result: if any task exhausted its retries (or the
    /// job's flag was tripped from outside) the whole run fails.
    pub fn run(
        &mut self,
        prefix: &str,
        ctx: &JobContext,
        range: &SegmentIndexRange,
        sink: &dyn StatusSink,
    ) -> Result<TrackInitPaths, JobError> {
        let flag = ctx.fail_flag().clone();
        self.tasks = build_tasks(prefix, ctx.workspace().path(), range);
        let mut handler = EventHandler {
            tasks: &mut self.tasks,
            progress: ProgressCounter::new(2 * range.len()),
            sink,
            failure: None,
        };

        tracing::info!(
            job_id = ctx.job_id(),
            first = range.first_index,
            last = range.last_index,
            mode = ?self.mode,
            "fetching init resources"
        );
        let init_items: Vec<WorkItem> = handler.tasks[..2].iter().enumerate().map(work_item).collect();
        for item in init_items {
            run_sequential(vec![item], self.source.as_ref(), &self.policy, &flag, &mut |ev| {
                handler.handle(ev)
            });
            if let Some(err) = handler.take_failure() {
                return Err(err);
            }
            if flag.is_tripped() {
                return Err(JobError::Cancelled);
            }
        }

        sink.status("Downloading segments...");
        sink.progress(handler.progress.percent());
        let items: Vec<WorkItem> = handler
            .tasks
            .iter()
            .enumerate()
            .skip(2)
            .map(work_item)
            .collect();
        let panicked = match self.mode {
            ConcurrencyMode::Sequential => {
                run_sequential(items, self.source.as_ref(), &self.policy, &flag, &mut |ev| {
                    handler.handle(ev)
                });
                0
            }
            ConcurrencyMode::Parallel => run_parallel(
                items,
                Arc::clone(&self.source),
                self.policy,
                flag.clone(),
                self.width,
                &mut |ev| handler.handle(ev),
            ),
        };

        if let Some(err) = handler.take_failure() {
            return Err(err);
        }
        if panicked > 0 {
            flag.trip();
            return Err(JobError::WorkerPanicked(panicked));
        }
        if flag.is_tripped() {
            return Err(JobError::Cancelled);
        }

        tracing::info!(job_id = ctx.job_id(), summary = ?self.summary(), "all segments fetched");
        Ok(TrackInitPaths {
            video: self.tasks[0].dest.clone(),
            audio: self.tasks[1].dest.clone(),
        })
    }

    /// State of every task of the last run, init resources first.
    pub fn task_states(&self) -> Vec<TaskSnapshot> {
        self.tasks
            .iter()
            .map(|t| TaskSnapshot {
                track: t.track,
                slot: t.slot,
                state: t.state(),
            })
            .collect()
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary::of(self.tasks.iter().map(FetchTask::state))
    }
}

fn work_item((id, task): (usize, &FetchTask)) -> WorkItem {
    WorkItem {
        id,
        url: task.url.clone(),
        dest: task.dest.clone(),
    }
}

/// Applies task events on the coordinating thread.
struct EventHandler<'a> {
    tasks: &'a mut Vec<FetchTask>,
    progress: ProgressCounter,
    sink: &'a dyn StatusSink,
    /// Task id and error of the failure to report for this job.
    failure: Option<(usize, FetchError)>,
}

impl EventHandler<'_> {
    fn handle(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Started(id) => {
                self.tasks[id].advance(TaskState::InFlight);
            }
            TaskEvent::Succeeded(id) => {
                let task = &mut self.tasks[id];
                task.advance(TaskState::Succeeded);
                match task.slot {
                    SegmentSlot::Init => tracing::debug!(track = %task.track, "init resource fetched"),
                    SegmentSlot::Index(index) => {
                        let track = task.track;
                        let pct = self.progress.complete_one();
                        self.sink.progress(pct);
                        if track == TrackKind::Video && index % STATUS_EVERY == 0 {
                            self.sink.status(&format!("Downloading segment {}...", index));
                        }
                    }
                }
            }
            TaskEvent::Failed { id, error, tripped } => {
                let task = &mut self.tasks[id];
                task.advance(TaskState::FailedExhausted);
                tracing::warn!(
                    track = %task.track,
                    slot = %task.slot,
                    url = %task.url,
                    "fetch failed: {}",
                    error
                );
                // The task that tripped the flag is the one reported.
                if tripped || self.failure.is_none() {
                    self.failure = Some((id, error));
                }
            }
            TaskEvent::Skipped(id) => {
                let task = &mut self.tasks[id];
                task.advance(TaskState::Skipped);
                tracing::debug!(track = %task.track, slot = %task.slot, "skipped after job failure");
            }
        }
    }

    fn take_failure(&mut self) -> Option<JobError> {
        self.failure.take().map(|(id, source)| JobError::Fetch {
            track: self.tasks[id].track,
            slot: self.tasks[id].slot,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{ChannelSink, StatusEvent};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Writes the URL into the destination file; fails forever on chosen URLs.
    #[derive(Default)]
    struct FakeSource {
        fail_suffixes: Vec<(String, u32)>,
        calls: AtomicUsize,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn failing(suffix: &str, status: u32) -> Self {
            Self {
                fail_suffixes: vec![(suffix.to_string(), status)],
                ..Self::default()
            }
        }
    }

    impl SegmentSource for FakeSource {
        fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for (suffix, status) in &self.fail_suffixes {
                if url.ends_with(suffix.as_str()) {
                    return Err(FetchError::Http { status: *status });
                }
            }
            std::fs::write(dest, url.as_bytes()).map_err(FetchError::Storage)?;
            self.fetched.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    const PREFIX: &str = "http://cdn.test/live/";

    fn range(first: i64, last: i64) -> SegmentIndexRange {
        SegmentIndexRange {
            first_index: first,
            last_index: last,
        }
    }

    fn coordinator(source: Arc<FakeSource>, mode: ConcurrencyMode, width: usize) -> DownloadCoordinator {
        DownloadCoordinator::new(source, RetryPolicy::immediate(3), mode, width)
    }

    #[test]
    fn parallel_clean_run_reaches_100() {
        let root = tempfile::tempdir().unwrap();
        let ctx = JobContext::with_id(root.path(), "clean").unwrap();
        let source = Arc::new(FakeSource::default());
        let mut c = coordinator(Arc::clone(&source), ConcurrencyMode::Parallel, 10);
        let (sink, rx) = ChannelSink::new();

        let init = c.run(PREFIX, &ctx, &range(100, 104), &sink).unwrap();
        drop(sink);

        assert_eq!(init.video, ctx.workspace().file("video_init.m4s"));
        assert_eq!(init.audio, ctx.workspace().file("audio_init.m4s"));
        let summary = c.summary();
        assert_eq!(summary.succeeded, 12);
        assert_eq!(summary.pending + summary.in_flight + summary.skipped + summary.failed, 0);
        assert_eq!(source.calls.load(Ordering::SeqCst), 12);

        let progress: Vec<u8> = rx
            .iter()
            .filter_map(|e| match e {
                StatusEvent::Progress(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        for i in 100..=104 {
            assert!(ctx.workspace().file(&format!("video_{}.m4s", i)).exists());
            assert!(ctx.workspace().file(&format!("audio_{}.m4s", i)).exists());
        }
    }

    #[test]
    fn sequential_fetches_in_index_order() {
        let root = tempfile::tempdir().unwrap();
        let ctx = JobContext::with_id(root.path(), "seq").unwrap();
        let source = Arc::new(FakeSource::default());
        let mut c = coordinator(Arc::clone(&source), ConcurrencyMode::Sequential, 10);
        c.run(PREFIX, &ctx, &range(7, 8), &crate::status::TracingSink).unwrap();

        let fetched = source.fetched.lock().unwrap().clone();
        let tail: Vec<&str> = fetched.iter().map(|u| u.rsplit('/').next().unwrap()).collect();
        assert_eq!(tail, vec!["segment.init", "segment.init", "7.m4s", "7.m4s", "8.m4s", "8.m4s"]);
        assert!(fetched[2].contains("/v=pv14/"));
        assert!(fetched[3].contains("/a=pa3/"));
    }

    #[test]
    fn sequential_failure_skips_everything_after() {
        let root = tempfile::tempdir().unwrap();
        let ctx = JobContext::with_id(root.path(), "fail-seq").unwrap();
        let source = Arc::new(FakeSource::failing("b=5070016/11.m4s", 404));
        let mut c = coordinator(Arc::clone(&source), ConcurrencyMode::Sequential, 1);

        let err = c.run(PREFIX, &ctx, &range(10, 13), &crate::status::TracingSink).unwrap_err();
        match &err {
            JobError::Fetch { track, slot, source } => {
                assert_eq!(*track, TrackKind::Video);
                assert_eq!(*slot, SegmentSlot::Index(11));
                assert_eq!(source.http_status(), Some(404));
            }
            other => panic!("expected Fetch error, got {:?}", other),
        }
        assert!(ctx.fail_flag().is_tripped());

        let states = c.task_states();
        let after_failure: Vec<_> = states
            .iter()
            .skip_while(|s| !(s.track == TrackKind::Video && s.slot == SegmentSlot::Index(11)))
            .skip(1)
            .collect();
        assert_eq!(after_failure.len(), 5);
        assert!(after_failure.iter().all(|s| s.state == TaskState::Skipped));
        // init x2 + index 10 x2 + three attempts at video 11.
        assert_eq!(source.calls.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn parallel_failure_trips_flag_and_skips_pending() {
        let root = tempfile::tempdir().unwrap();
        let ctx = JobContext::with_id(root.path(), "fail-par").unwrap();
        // The very first segment fails; with one worker everything queued behind it is skipped.
        let source = Arc::new(FakeSource::failing("b=96000/20.m4s", 403));
        let mut c = coordinator(Arc::clone(&source), ConcurrencyMode::Parallel, 1);

        let err = c.run(PREFIX, &ctx, &range(20, 29), &crate::status::TracingSink).unwrap_err();
        assert_eq!(err.http_status(), Some(403));
        let summary = c.summary();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.skipped, 18);
        assert_eq!(summary.pending + summary.in_flight, 0);
    }

    #[test]
    fn wide_pool_failure_leaves_no_task_unfinished() {
        let root = tempfile::tempdir().unwrap();
        let ctx = JobContext::with_id(root.path(), "fail-wide").unwrap();
        let source = Arc::new(FakeSource::failing("/33.m4s", 404));
        let mut c = coordinator(Arc::clone(&source), ConcurrencyMode::Parallel, 4);

        assert!(c.run(PREFIX, &ctx, &range(30, 60), &crate::status::TracingSink).is_err());
        let summary = c.summary();
        assert!(summary.failed >= 1);
        assert_eq!(summary.pending + summary.in_flight, 0);
        assert_eq!(summary.total(), 2 + 2 * 31);
    }

    #[test]
    fn init_failure_attempts_no_segments() {
        let root = tempfile::tempdir().unwrap();
        let ctx = JobContext::with_id(root.path(), "init").unwrap();
        let source = Arc::new(FakeSource::failing("a=pa3/al=en-GB/ap=main/b=96000/segment.init", 404));
        let mut c = coordinator(Arc::clone(&source), ConcurrencyMode::Parallel, 10);

        let err = c.run(PREFIX, &ctx, &range(1, 5), &crate::status::TracingSink).unwrap_err();
        assert!(matches!(
            err,
            JobError::Fetch {
                track: TrackKind::Audio,
                slot: SegmentSlot::Init,
                ..
            }
        ));
        // video init once, audio init three times, nothing else.
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        let states = c.task_states();
        assert!(states[2..].iter().all(|s| s.state == TaskState::Pending));
    }

    #[test]
    fn externally_tripped_flag_cancels_before_any_fetch() {
        let root = tempfile::tempdir().unwrap();
        let ctx = JobContext::with_id(root.path(), "cancel").unwrap();
        ctx.fail_flag().trip();
        let source = Arc::new(FakeSource::default());
        let mut c = coordinator(Arc::clone(&source), ConcurrencyMode::Parallel, 10);

        let err = c.run(PREFIX, &ctx, &range(1, 2), &crate::status::TracingSink).unwrap_err();
        assert!(matches!(err, JobError::Cancelled));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn status_line_every_fifth_index() {
        let root = tempfile::tempdir().unwrap();
        let ctx = JobContext::with_id(root.path(), "status").unwrap();
        let source = Arc::new(FakeSource::default());
        let mut c = coordinator(source, ConcurrencyMode::Sequential, 1);
        let (sink, rx) = ChannelSink::new();
        c.run(PREFIX, &ctx, &range(9, 16), &sink).unwrap();
        drop(sink);
        let lines: HashSet<String> = rx
            .iter()
            .filter_map(|e| match e {
                StatusEvent::Status(s) if s.starts_with("Downloading segment ") => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(
            lines,
            ["Downloading segment 10...", "Downloading segment 15..."]
                .iter()
                .map(|s| s.to_string())
                .collect()
        );
    }
}
