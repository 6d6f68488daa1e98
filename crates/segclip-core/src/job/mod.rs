//! One clip job end to end: validate, fetch, assemble, deliver, clean up.

mod error;

pub use error::{ConfigurationError, FailureClass, JobError};

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::assembly::{AssemblyPipeline, Ffmpeg, MediaTool};
use crate::catalog::{SourceCatalog, StaticCatalog};
use crate::config::{ClipConfig, ConcurrencyMode, MissingSegmentPolicy};
use crate::control::FailFlag;
use crate::downloader::{CurlOptions, CurlSource, SegmentSource};
use crate::retry::RetryPolicy;
use crate::scheduler::{DownloadCoordinator, DEFAULT_WIDTH};
use crate::segmenter::compute_range;
use crate::status::StatusSink;
use crate::url_model::clip_file_name;
use crate::workspace::JobWorkspace;

/// What the caller wants clipped.
#[derive(Debug, Clone)]
pub struct ClipRequest {
    /// Catalog name, e.g. `BBC News (United Kingdom)`.
    pub channel: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Directory the finished clip is copied into (created if missing).
    pub output_dir: PathBuf,
    /// Re-encode video instead of stream copy.
    pub re_encode: bool,
    pub concurrency_mode: ConcurrencyMode,
}

impl ClipRequest {
    /// `end_time` must be strictly after `start_time`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.end_time <= self.start_time {
            return Err(ConfigurationError::InvalidTimeRange {
                start: self.start_unix(),
                end: self.end_unix(),
            });
        }
        Ok(())
    }

    pub fn start_unix(&self) -> i64 {
        self.start_time.timestamp()
    }

    pub fn end_unix(&self) -> i64 {
        self.end_time.timestamp()
    }

    /// `<channel>_<start>_<end>.mp4`
    pub fn output_file_name(&self) -> String {
        clip_file_name(&self.channel, self.start_unix(), self.end_unix())
    }
}

/// Per-job state: id, scratch directory and the shared failure flag.
#[derive(Debug)]
pub struct JobContext {
    job_id: String,
    workspace: JobWorkspace,
    failed: FailFlag,
}

impl JobContext {
    /// New job with a random UUID v4 id under `root`.
    pub fn create(root: &Path) -> io::Result<Self> {
        Self::with_id(root, &uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(root: &Path, job_id: &str) -> io::Result<Self> {
        Ok(Self {
            job_id: job_id.to_string(),
            workspace: JobWorkspace::create(root, job_id)?,
            failed: FailFlag::new(),
        })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn workspace(&self) -> &JobWorkspace {
        &self.workspace
    }

    pub fn fail_flag(&self) -> &FailFlag {
        &self.failed
    }

    /// Give up the context, keeping only the workspace (for explicit teardown).
    pub fn into_workspace(self) -> JobWorkspace {
        self.workspace
    }
}

/// Runs clip jobs. Holds everything that outlives a single job.
pub struct ClipJob {
    catalog: Box<dyn SourceCatalog + Send + Sync>,
    source: Arc<dyn SegmentSource>,
    assembler: AssemblyPipeline,
    policy: RetryPolicy,
    width: usize,
    workspace_root: PathBuf,
}

impl ClipJob {
    pub fn new(
        catalog: Box<dyn SourceCatalog + Send + Sync>,
        source: Arc<dyn SegmentSource>,
        tool: Arc<dyn MediaTool>,
        workspace_root: PathBuf,
    ) -> Self {
        Self {
            catalog,
            source,
            assembler: AssemblyPipeline::new(tool, MissingSegmentPolicy::default()),
            policy: RetryPolicy::default(),
            width: DEFAULT_WIDTH,
            workspace_root,
        }
    }

    /// Production wiring: built-in catalog plus config channels, curl, ffmpeg.
    pub fn from_config(cfg: &ClipConfig) -> Result<Self, ConfigurationError> {
        let root = cfg
            .workspace_root()
            .map_err(|e| ConfigurationError::WorkspaceRoot(e.to_string()))?;
        let tool: Arc<dyn MediaTool> = Arc::new(Ffmpeg::new(cfg.ffmpeg_path.clone()));
        Ok(Self::new(
            Box::new(StaticCatalog::with_overrides(&cfg.channels)),
            Arc::new(CurlSource::new(CurlOptions::from_config(cfg))),
            Arc::clone(&tool),
            root,
        )
        .with_retry_policy(cfg.retry_policy())
        .with_width(cfg.max_concurrent_fetches)
        .with_assembler(AssemblyPipeline::new(tool, cfg.missing_segments)))
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    pub fn with_assembler(mut self, assembler: AssemblyPipeline) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn catalog(&self) -> &dyn SourceCatalog {
        self.catalog.as_ref()
    }

    /// Run one job and return the delivered clip's path.
    ///
    /// On failure exactly one `error` notification reaches `sink`. The job
    /// workspace is removed on every path.
    pub fn run(&self, request: &ClipRequest, sink: &dyn StatusSink) -> Result<PathBuf, JobError> {
        let result = self.run_inner(request, sink);
        if let Err(e) = &result {
            tracing::error!(channel = %request.channel, "clip job failed: {}", e);
            sink.error(&e.to_string());
        }
        result
    }

    fn run_inner(&self, request: &ClipRequest, sink: &dyn StatusSink) -> Result<PathBuf, JobError> {
        sink.status("Starting download...");
        request.validate()?;
        let prefix = self
            .catalog
            .prefix(&request.channel)
            .ok_or_else(|| ConfigurationError::UnknownChannel(request.channel.clone()))?;
        url::Url::parse(prefix).map_err(|e| ConfigurationError::InvalidPrefix {
            channel: request.channel.clone(),
            reason: e.to_string(),
        })?;

        let range = compute_range(request.start_unix(), request.end_unix());
        let ctx = JobContext::create(&self.workspace_root).map_err(JobError::Workspace)?;
        tracing::info!(
            job_id = ctx.job_id(),
            channel = %request.channel,
            first = range.first_index,
            last = range.last_index,
            segments = range.len(),
            "starting clip job"
        );

        let mut coordinator = DownloadCoordinator::new(
            Arc::clone(&self.source),
            self.policy,
            request.concurrency_mode,
            self.width,
        );
        let init = coordinator.run(prefix, &ctx, &range, sink)?;

        let built = ctx.workspace().file(&request.output_file_name());
        let built = self
            .assembler
            .assemble(&ctx, &range, &init, &built, request.re_encode, sink)?;

        sink.status("Cleaning up...");
        let delivered = deliver(&built, &request.output_dir)?;
        sink.status("Finished :)");
        tracing::info!(job_id = ctx.job_id(), output = %delivered.display(), "clip delivered");

        // Delivered already; teardown problems are logged only.
        if let Err(e) = ctx.into_workspace().destroy() {
            tracing::warn!("workspace cleanup incomplete: {}", e);
        }
        Ok(delivered)
    }
}

/// Copy `built` into `output_dir` under the same file name, replacing any
/// existing file.
fn deliver(built: &Path, output_dir: &Path) -> Result<PathBuf, JobError> {
    let delivery_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| JobError::Delivery { path, source }
    };
    std::fs::create_dir_all(output_dir).map_err(delivery_err(output_dir))?;
    let name = built.file_name().ok_or_else(|| JobError::Delivery {
        path: built.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "output has no file name"),
    })?;
    let dest = output_dir.join(name);
    std::fs::copy(built, &dest).map_err(delivery_err(&dest))?;
    Ok(dest)
}
