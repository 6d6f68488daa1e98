//! Status notifications towards whoever drives a clip job.
//!
//! The core never assumes how these are shown. A caller can implement
//! `StatusSink` directly, or use `ChannelSink` and drain `StatusEvent`s
//! from another thread.

use std::sync::mpsc;

/// Receives human-readable phase text, progress (0–100) and the single
/// terminal error of a job.
pub trait StatusSink {
    fn status(&self, text: &str);
    fn progress(&self, percent: u8);
    fn error(&self, message: &str);
}

/// One notification, as sent by `ChannelSink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Status(String),
    Progress(u8),
    Error(String),
}

/// Forwards notifications over an mpsc channel. Sends to a dropped receiver
/// are ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<StatusEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::Receiver<StatusEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl StatusSink for ChannelSink {
    fn status(&self, text: &str) {
        let _ = self.tx.send(StatusEvent::Status(text.to_string()));
    }

    fn progress(&self, percent: u8) {
        let _ = self.tx.send(StatusEvent::Progress(percent));
    }

    fn error(&self, message: &str) {
        let _ = self.tx.send(StatusEvent::Error(message.to_string()));
    }
}

/// Sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn status(&self, text: &str) {
        tracing::info!("{}", text);
    }

    fn progress(&self, percent: u8) {
        tracing::debug!(percent, "progress");
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}
