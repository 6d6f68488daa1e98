//! CLI for the segclip clip downloader.

mod commands;
mod console;
mod window;

use anyhow::Result;
use clap::{Parser, Subcommand};
use segclip_core::config;
use std::path::PathBuf;

use commands::{run_channels, run_clip, run_range, ClipOptions};
pub use window::WindowArgs;

/// Top-level CLI for segclip.
#[derive(Debug, Parser)]
#[command(name = "segclip")]
#[command(about = "segclip: cut clips out of live segmented TV streams", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a time window of a channel and save it as one MP4.
    Clip {
        /// Channel name as listed by `segclip channels`.
        #[arg(long, short = 'c')]
        channel: String,

        #[command(flatten)]
        window: WindowArgs,

        /// Directory to save the clip in (created if missing).
        #[arg(long, short = 'o', default_value = ".", value_name = "DIR")]
        output_dir: PathBuf,

        /// Re-encode video with libx264 instead of copying the stream.
        #[arg(long)]
        re_encode: bool,

        /// Fetch one segment at a time, in order.
        #[arg(long)]
        sequential: bool,
    },

    /// List the known channels.
    Channels {
        /// Also print each channel's URL prefix.
        #[arg(long)]
        urls: bool,
    },

    /// Show which segment indices a time window maps to.
    Range {
        #[command(flatten)]
        window: WindowArgs,

        /// Print the first and last segment URLs for this channel.
        #[arg(long, short = 'c')]
        channel: Option<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Clip {
                channel,
                window,
                output_dir,
                re_encode,
                sequential,
            } => {
                let (start, end) = window.resolve()?;
                let opts = ClipOptions {
                    channel,
                    start,
                    end,
                    output_dir,
                    re_encode,
                    sequential,
                };
                run_clip(&cfg, opts).await?;
            }
            CliCommand::Channels { urls } => run_channels(&cfg, urls)?,
            CliCommand::Range { window, channel } => {
                let (start, end) = window.resolve()?;
                run_range(&cfg, start, end, channel.as_deref())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
