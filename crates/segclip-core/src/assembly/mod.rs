//! Turns fetched segments into a single clip with an external media tool.
//!
//! Two concat passes (one per track, stream copy) followed by one mux pass.
//! The media tool is behind `MediaTool` so tests can substitute it.

mod error;
mod plan;
mod tool;

pub use error::{AssemblyError, AssemblyStep};
pub use plan::{AssemblyPlan, ConcatList};
pub use tool::{Ffmpeg, MediaTool, ToolOutput};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::MissingSegmentPolicy;
use crate::job::JobContext;
use crate::scheduler::TrackInitPaths;
use crate::segmenter::SegmentIndexRange;
use crate::status::StatusSink;
use crate::url_model::TrackKind;
use crate::workspace::ProcessTracker;

/// Concat + mux driver.
#[derive(Clone)]
pub struct AssemblyPipeline {
    tool: Arc<dyn MediaTool>,
    missing: MissingSegmentPolicy,
}

impl AssemblyPipeline {
    pub fn new(tool: Arc<dyn MediaTool>, missing: MissingSegmentPolicy) -> Self {
        Self { tool, missing }
    }

    /// Build `output_path` from the workspace contents.
    ///
    /// Segment files absent from the workspace are left out (with a warning)
    /// or fail the assembly, depending on the missing-segment policy. Running
    /// twice over the same workspace yields the same output.
    pub fn assemble(
        &self,
        ctx: &JobContext,
        range: &SegmentIndexRange,
        init: &TrackInitPaths,
        output_path: &Path,
        re_encode: bool,
        sink: &dyn StatusSink,
    ) -> Result<PathBuf, AssemblyError> {
        sink.status("Combining segments...");
        let plan = AssemblyPlan::build(ctx.workspace().path(), range, init, output_path);
        let processes = ctx.workspace().processes();

        for track in TrackKind::ALL {
            let omitted = plan.list(track).omitted();
            if omitted.is_empty() {
                continue;
            }
            match self.missing {
                MissingSegmentPolicy::Fail => {
                    return Err(AssemblyError::MissingSegments {
                        track,
                        indices: omitted.to_vec(),
                    });
                }
                MissingSegmentPolicy::Skip => {
                    tracing::warn!(%track, ?omitted, "segments missing, clip will have gaps");
                    sink.status(&format!(
                        "Warning: {} {} segment(s) missing, the clip will skip them",
                        omitted.len(),
                        track
                    ));
                }
            }
        }

        for track in TrackKind::ALL {
            let step = AssemblyStep::Concat(track);
            let out = self.run_step(step, &plan.concat_args(track), processes)?;
            if !out.success {
                return Err(AssemblyError::ToolFailed {
                    step,
                    code: out.code,
                    stderr: out.stderr_text(),
                });
            }
        }

        sink.status("Joining video and audio...");
        if re_encode {
            sink.status("Encoding... This may take a while!!");
        }
        let out = self.run_step(AssemblyStep::Mux, &plan.mux_args(re_encode), processes)?;
        // Output is silenced, so anything on stderr means the mux went wrong.
        let stderr = out.stderr_text();
        if !out.success || !stderr.is_empty() {
            return Err(AssemblyError::ToolFailed {
                step: AssemblyStep::Mux,
                code: out.code,
                stderr,
            });
        }
        tracing::info!(output = %plan.output.display(), re_encode, "clip assembled");
        Ok(plan.output)
    }

    fn run_step(
        &self,
        step: AssemblyStep,
        args: &[OsString],
        processes: &ProcessTracker,
    ) -> Result<ToolOutput, AssemblyError> {
        tracing::debug!(%step, "media tool step");
        self.tool
            .run(args, processes)
            .map_err(|source| AssemblyError::ToolSpawn { step, source })
    }
}
