//! Task execution: bounded worker pool or strictly ordered single thread.
//!
//! Both modes report to the coordinating thread through `TaskEvent`s; only
//! that thread touches task state, progress and the status sink.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::control::FailFlag;
use crate::downloader::{fetch_with_retry, SegmentSource};
use crate::retry::{FetchError, RetryPolicy};

/// What a worker needs to run one task.
#[derive(Debug, Clone)]
pub(super) struct WorkItem {
    pub(super) id: usize,
    pub(super) url: String,
    pub(super) dest: PathBuf,
}

#[derive(Debug)]
pub(super) enum TaskEvent {
    Started(usize),
    Succeeded(usize),
    /// Retry budget spent. `tripped` is true for the task that set the job flag.
    Failed {
        id: usize,
        error: FetchError,
        tripped: bool,
    },
    Skipped(usize),
}

/// Runs one item: skip if the job already failed, else fetch with retry and
/// trip the flag on exhaustion.
fn execute(
    item: &WorkItem,
    source: &dyn SegmentSource,
    policy: &RetryPolicy,
    flag: &FailFlag,
    emit: &mut dyn FnMut(TaskEvent),
) {
    if flag.is_tripped() {
        emit(TaskEvent::Skipped(item.id));
        return;
    }
    emit(TaskEvent::Started(item.id));
    match fetch_with_retry(source, policy, &item.url, &item.dest) {
        Ok(()) => emit(TaskEvent::Succeeded(item.id)),
        Err(error) => {
            let tripped = flag.trip();
            emit(TaskEvent::Failed {
                id: item.id,
                error,
                tripped,
            });
        }
    }
}

/// Process items one at a time, in order.
pub(super) fn run_sequential(
    items: Vec<WorkItem>,
    source: &dyn SegmentSource,
    policy: &RetryPolicy,
    flag: &FailFlag,
    on_event: &mut dyn FnMut(TaskEvent),
) {
    for item in &items {
        execute(item, source, policy, flag, on_event);
    }
}

/// Process items on `width` worker threads pulling from a shared queue.
/// Events are handed to `on_event` on the calling thread as they arrive.
/// Returns the number of workers that panicked.
pub(super) fn run_parallel(
    items: Vec<WorkItem>,
    source: Arc<dyn SegmentSource>,
    policy: RetryPolicy,
    flag: FailFlag,
    width: usize,
    on_event: &mut dyn FnMut(TaskEvent),
) -> usize {
    let count = items.len();
    if count == 0 {
        return 0;
    }
    let work: Arc<Mutex<VecDeque<WorkItem>>> = Arc::new(Mutex::new(items.into_iter().collect()));
    let (tx, rx) = mpsc::channel();
    let num_workers = width.max(1).min(count);
    let mut handles = Vec::with_capacity(num_workers);
    for worker in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let source = Arc::clone(&source);
        let flag = flag.clone();
        handles.push(std::thread::spawn(move || {
            tracing::trace!(worker, "fetch worker started");
            loop {
                let item = match work
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .pop_front()
                {
                    Some(item) => item,
                    None => break,
                };
                execute(&item, source.as_ref(), &policy, &flag, &mut |event| {
                    let _ = tx.send(event);
                });
            }
        }));
    }
    drop(tx);

    // Ends once every worker has exited and dropped its sender.
    for event in rx {
        on_event(event);
    }

    let mut panicked = 0;
    for h in handles {
        if let Err(e) = h.join() {
            tracing::error!("fetch worker panicked: {:?}", e);
            panicked += 1;
        }
    }
    panicked
}
