//! Job-scoped scratch directory with guaranteed teardown.
//!
//! `JobWorkspace` owns `<root>/<job id>` and every file in it. Dropping it
//! (normal return, `?`, or unwinding panic) kills media tool processes the job
//! still has running and removes the directory. Cleanup failures are logged,
//! never escalated: the clip may already have been delivered.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Failure while tearing a workspace down.
#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    #[error("failed to remove workspace {path}: {source}")]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to kill media tool process {pid}: {source}")]
    Kill {
        pid: u32,
        #[source]
        source: io::Error,
    },
}

/// PIDs of external tool processes spawned for one job and not yet reaped.
#[derive(Debug, Clone, Default)]
pub struct ProcessTracker {
    pids: Arc<Mutex<HashSet<u32>>>,
}

impl ProcessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, pid: u32) {
        self.lock().insert(pid);
    }

    /// Call once the child has been waited on.
    pub fn unregister(&self, pid: u32) {
        self.lock().remove(&pid);
    }

    pub fn running(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = self.lock().iter().copied().collect();
        pids.sort_unstable();
        pids
    }

    /// Best-effort kill of every tracked process. Returns the ones that failed.
    pub fn kill_all(&self) -> Vec<CleanupError> {
        let pids: Vec<u32> = self.lock().drain().collect();
        let mut errors = Vec::new();
        for pid in pids {
            tracing::warn!(pid, "killing media tool process left running");
            if let Err(source) = kill_pid(pid) {
                errors.push(CleanupError::Kill { pid, source });
            }
        }
        errors
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<u32>> {
        self.pids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(unix)]
fn kill_pid(pid: u32) -> io::Result<()> {
    let r = unsafe { libc::kill(pid as libc::pid_t, libc::SIGKILL) };
    if r == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    // Already exited.
    if err.raw_os_error() == Some(libc::ESRCH) {
        return Ok(());
    }
    Err(err)
}

#[cfg(not(unix))]
fn kill_pid(pid: u32) -> io::Result<()> {
    let status = std::process::Command::new("taskkill")
        .arg("/F")
        .arg("/PID")
        .arg(pid.to_string())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::Other,
            format!("taskkill exited with {:?}", status.code()),
        ))
    }
}

/// Scratch directory for one clip job.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: PathBuf,
    processes: ProcessTracker,
    released: bool,
}

impl JobWorkspace {
    /// Create `<root>/<job_id>` (and `root` if needed). Idempotent.
    pub fn create(root: &Path, job_id: &str) -> io::Result<Self> {
        let dir = root.join(job_id);
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(path = %dir.display(), "workspace created");
        Ok(JobWorkspace {
            dir,
            processes: ProcessTracker::new(),
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Path of a file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn processes(&self) -> &ProcessTracker {
        &self.processes
    }

    /// Tear down now and report the first failure. Dropping does the same
    /// but only logs.
    pub fn destroy(mut self) -> Result<(), CleanupError> {
        self.released = true;
        self.teardown()
    }

    fn teardown(&mut self) -> Result<(), CleanupError> {
        let mut first_error = None;
        for e in self.processes.kill_all() {
            tracing::warn!("{}", e);
            first_error.get_or_insert(e);
        }
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => tracing::debug!(path = %self.dir.display(), "workspace removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                let e = CleanupError::RemoveDir {
                    path: self.dir.clone(),
                    source,
                };
                tracing::warn!("{}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            let _ = self.teardown();
        }
    }
}
