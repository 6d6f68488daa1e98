//! `segclip clip` – download, assemble and save one clip.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use segclip_core::checksum;
use segclip_core::config::{ClipConfig, ConcurrencyMode};
use segclip_core::status::ChannelSink;
use segclip_core::{ClipJob, ClipRequest};
use std::path::PathBuf;

use crate::cli::console::{forward, ConsoleSink};

#[derive(Debug, Clone)]
pub struct ClipOptions {
    pub channel: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub output_dir: PathBuf,
    pub re_encode: bool,
    pub sequential: bool,
}

impl ClipOptions {
    pub fn to_request(&self, cfg: &ClipConfig) -> ClipRequest {
        let concurrency_mode = if self.sequential {
            ConcurrencyMode::Sequential
        } else {
            cfg.concurrency_mode
        };
        ClipRequest {
            channel: self.channel.clone(),
            start_time: self.start,
            end_time: self.end,
            output_dir: self.output_dir.clone(),
            re_encode: self.re_encode,
            concurrency_mode,
        }
    }
}

pub async fn run_clip(cfg: &ClipConfig, opts: ClipOptions) -> Result<()> {
    let request = opts.to_request(cfg);
    let (sink, rx) = ChannelSink::new();
    let printer = tokio::task::spawn_blocking(move || forward(rx, &ConsoleSink::default()));

    let outcome = tokio::task::spawn_blocking({
        let cfg = cfg.clone();
        move || -> Result<_> {
            let job = ClipJob::from_config(&cfg)?;
            Ok(job.run(&request, &sink))
        }
    })
    .await
    .context("clip task join")??;
    printer.await.context("console task join")?;

    match outcome {
        Ok(path) => {
            let digest = checksum::sha256_file(&path)?;
            println!("Saved {}", path.display());
            println!("sha256 {}", digest);
            Ok(())
        }
        Err(e) => {
            let message = e.user_message();
            Err(anyhow::Error::new(e).context(message))
        }
    }
}
