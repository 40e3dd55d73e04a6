//! Staged writer for a destination file.

use crate::error::{MirrorError, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A `.part` file that becomes the destination on `finalize`.
///
/// Dropping a stage that was never finalized removes the `.part` file.
pub struct StagedFile {
    file: Option<File>,
    temp_path: PathBuf,
}

impl StagedFile {
    /// Create (or truncate) the `.part` sibling of `final_path`.
    pub fn create(final_path: &Path) -> Result<Self> {
        let temp_path = super::temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| MirrorError::io(&temp_path, e))?;
        Ok(StagedFile {
            file: Some(file),
            temp_path,
        })
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync file data to disk.
    pub fn sync(&self) -> Result<()> {
        if let Some(f) = &self.file {
            f.sync_all().map_err(|e| MirrorError::io(&self.temp_path, e))?;
        }
        Ok(())
    }

    /// Sync, close, and atomically rename the temp file to `final_path`.
    /// Fails if `final_path` is on a different filesystem.
    pub fn finalize(mut self, final_path: &Path) -> Result<()> {
        self.sync()?;
        drop(self.file.take());
        std::fs::rename(&self.temp_path, final_path)
            .map_err(|e| MirrorError::io(final_path, e))?;
        self.temp_path = PathBuf::new();
        Ok(())
    }

    fn file_mut(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "staged file already closed"))
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file_mut()?.flush()
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.temp_path.as_os_str().is_empty() {
            return;
        }
        drop(self.file.take());
        match std::fs::remove_file(&self.temp_path) {
            Ok(()) => tracing::debug!(path = %self.temp_path.display(), "discarded staged file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.temp_path.display(), "could not remove staged file: {}", e),
        }
    }
}
