//! Terminal rendering of job status events.

use segclip_core::status::{StatusEvent, StatusSink};
use std::cell::Cell;
use std::io::{self, Write};
use std::sync::mpsc::Receiver;

const BAR_WIDTH: usize = 30;

/// Prints status lines to stdout and a progress bar to stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    last_percent: Cell<Option<u8>>,
}

impl ConsoleSink {
    fn end_bar(&self) {
        if self.last_percent.take().is_some() {
            eprintln!();
        }
    }
}

pub(crate) fn progress_bar(percent: u8) -> String {
    let filled = BAR_WIDTH * usize::from(percent.min(100)) / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

impl StatusSink for ConsoleSink {
    fn status(&self, text: &str) {
        self.end_bar();
        println!("{}", text);
    }

    fn progress(&self, percent: u8) {
        if self.last_percent.get() == Some(percent) {
            return;
        }
        self.last_percent.set(Some(percent));
        let mut err = io::stderr().lock();
        let _ = write!(err, "\r{}", progress_bar(percent));
        let _ = err.flush();
    }

    fn error(&self, message: &str) {
        self.end_bar();
        tracing::debug!("job error reported: {}", message);
    }
}

/// Replay events into `sink` until every sender is gone.
pub fn forward(rx: Receiver<StatusEvent>, sink: &dyn StatusSink) {
    for event in rx {
        match event {
            StatusEvent::Status(text) => sink.status(&text),
            StatusEvent::Progress(p) => sink.progress(p),
            StatusEvent::Error(message) => sink.error(&message),
        }
    }
}
