//! Segment file lifecycle in the job workspace.
//!
//! A fetched body is streamed into `<dest>.part` and renamed onto `<dest>`
//! only after the transfer completed with a 2xx, so assembly never sees a
//! half-written segment under its final name.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `video_7.m4s` → `video_7.m4s.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for one in-progress download.
pub struct PartFile {
    file: File,
    temp_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create (or truncate) the `.part` file for `final_path`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(PartFile {
            file,
            temp_path,
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush and rename onto `final_path`. Consumes the writer and closes the file.
    pub fn finalize(mut self, final_path: &Path) -> io::Result<()> {
        self.file.flush()?;
        let temp_path = std::mem::take(&mut self.temp_path);
        drop(self.file);
        std::fs::rename(&temp_path, final_path)
    }

    /// Drop the partial download.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), "could not remove partial file: {}", e);
        }
    }
}
