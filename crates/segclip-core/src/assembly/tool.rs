//! External media tool invocation.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use crate::workspace::ProcessTracker;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Captured result of one tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl From<Output> for ToolOutput {
    fn from(out: Output) -> Self {
        Self {
            success: out.status.success(),
            code: out.status.code(),
            stdout: out.stdout,
            stderr: out.stderr,
        }
    }
}

impl ToolOutput {
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// A media tool that can be run to completion with an argument vector.
///
/// Implementations must register any child process with `processes` while it
/// runs, so job teardown can kill it.
pub trait MediaTool: Send + Sync {
    fn run(&self, args: &[OsString], processes: &ProcessTracker) -> io::Result<ToolOutput>;
}

/// ffmpeg (or a compatible binary) found at `program`.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl MediaTool for Ffmpeg {
    fn run(&self, args: &[OsString], processes: &ProcessTracker) -> io::Result<ToolOutput> {
        let mut cmd = command(self.program.as_os_str());
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        tracing::debug!(program = %self.program.display(), ?args, "running media tool");
        let child = TrackedChild::spawn(&mut cmd, processes)?;
        child.wait_with_output().map(ToolOutput::from)
    }
}

fn command(program: &OsStr) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    cmd
}

/// A spawned child registered with the job's tracker. If dropped before it
/// was waited on (panic while running), the child is killed and reaped.
struct TrackedChild<'a> {
    child: Option<Child>,
    pid: u32,
    tracker: &'a ProcessTracker,
}

impl<'a> TrackedChild<'a> {
    fn spawn(cmd: &mut Command, tracker: &'a ProcessTracker) -> io::Result<Self> {
        let child = cmd.spawn()?;
        let pid = child.id();
        tracker.register(pid);
        Ok(Self {
            child: Some(child),
            pid,
            tracker,
        })
    }

    fn wait_with_output(mut self) -> io::Result<Output> {
        match self.child.take() {
            Some(child) => child.wait_with_output(),
            None => Err(io::Error::new(io::ErrorKind::Other, "child already reaped")),
        }
    }
}

impl Drop for TrackedChild<'_> {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.tracker.unregister(self.pid);
    }
}
