pub mod config;
pub mod logging;

pub mod assembly;
pub mod catalog;
pub mod checksum;
pub mod control;
pub mod downloader;
pub mod job;
pub mod retry;
pub mod scheduler;
pub mod segmenter;
pub mod status;
pub mod storage;
pub mod url_model;
pub mod workspace;

pub use job::{ClipJob, ClipRequest, FailureClass, JobError};
