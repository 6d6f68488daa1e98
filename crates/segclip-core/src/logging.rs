//! Tracing setup: append to a log file in the XDG state dir, or stderr.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,segclip=debug,segclip_core=debug";

/// `RUST_LOG` if set and valid, otherwise the default directive.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `$XDG_STATE_HOME/segclip/segclip.log` (parent created on demand).
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segclip")?;
    xdg_dirs
        .place_state_file("segclip.log")
        .context("create log directory")
}

/// Hands each event a clone of the log file handle. A failed clone drops the
/// line to stderr instead of losing it.
struct LogFile(File);

enum LineWriter {
    File(File),
    Stderr(io::Stderr),
}

impl io::Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LineWriter::File(f) => f.write(buf),
            LineWriter::Stderr(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LineWriter::File(f) => f.flush(),
            LineWriter::Stderr(e) => e.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match self.0.try_clone() {
            Ok(f) => LineWriter::File(f),
            Err(_) => LineWriter::Stderr(io::stderr()),
        }
    }
}

/// Install the global subscriber writing to [`log_path`]. Errors leave no
/// subscriber installed so the caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(LogFile(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {}", e))?;

    tracing::info!("segclip logging to {}", path.display());
    Ok(())
}

/// Log to stderr only.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
