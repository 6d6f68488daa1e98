use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::{Backoff, RetryPolicy};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per resource (including the first).
    pub max_attempts: u32,
    /// Delay in seconds between attempts (base delay when backoff is exponential).
    pub delay_secs: f64,
    /// "fixed" (same delay every time) or "exponential".
    #[serde(default)]
    pub backoff: Backoff,
    /// Cap for exponential backoff, in seconds.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

fn default_max_delay_secs() -> u64 {
    30
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 1.0,
            backoff: Backoff::Fixed,
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            delay: Duration::from_secs_f64(self.delay_secs.max(0.0)),
            backoff: self.backoff,
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// How segment fetches are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    /// Bounded pool of worker threads.
    #[default]
    Parallel,
    /// One fetch at a time, video then audio per index.
    Sequential,
}

/// What assembly does when a segment file is absent from the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingSegmentPolicy {
    /// Leave the segment out of the concat list and warn.
    #[default]
    Skip,
    /// Fail the assembly.
    Fail,
}

/// Global configuration loaded from `~/.config/segclip/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Worker pool width in parallel mode.
    pub max_concurrent_fetches: usize,
    /// Default scheduling mode when the caller does not pick one.
    #[serde(default)]
    pub concurrency_mode: ConcurrencyMode,
    /// External media tool executable.
    pub ffmpeg_path: PathBuf,
    /// Parent directory for per-job workspaces (None = XDG cache dir).
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
    #[serde(default)]
    pub missing_segments: MissingSegmentPolicy,
    pub connect_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Extra or overriding channel name -> URL prefix entries.
    #[serde(default)]
    pub channels: BTreeMap<String, String>,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 10,
            concurrency_mode: ConcurrencyMode::Parallel,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            workspace_root: None,
            missing_segments: MissingSegmentPolicy::Skip,
            connect_timeout_secs: 30,
            transfer_timeout_secs: 120,
            retry: None,
            channels: BTreeMap::new(),
        }
    }
}

impl ClipConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }

    /// Directory under which job workspaces are created.
    pub fn workspace_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.workspace_root {
            return Ok(root.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("segclip")?;
        Ok(xdg_dirs.get_cache_home().join("jobs"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segclip")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ClipConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ClipConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: ClipConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
