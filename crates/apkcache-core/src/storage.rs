//! Staged package files.
//!
//! A download is written to `<target>.part`, preallocated to the announced
//! size, and renamed onto the target only once it is complete. The `.part`
//! suffix keeps staged files out of the cache glob.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `x.apk` → `x.apk.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for one staged download.
///
/// Dropping a `StagedFile` that was never finalized removes the temp file.
#[derive(Debug)]
pub struct StagedFile {
    file: Option<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
    committed: bool,
}

/// Whether a failed `posix_fallocate` may fall back to `set_len`. ENOSPC may not.
#[cfg(unix)]
fn fallocate_may_fall_back(errno: i32) -> bool {
    errno != libc::ENOSPC
}

impl StagedFile {
    /// Create `<final_path>.part`, truncating any leftover from an earlier run.
    pub fn create(final_path: &Path) -> Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        Ok(StagedFile {
            file: Some(file),
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
            committed: false,
        })
    }

    fn handle(&mut self) -> Result<&mut File> {
        self.file
            .as_mut()
            .with_context(|| format!("staged file already closed: {}", self.temp_path.display()))
    }

    /// Preallocate `size` bytes. On Unix tries `posix_fallocate` and reports
    /// ENOSPC as an error; other failures (and non-Unix) fall back to `set_len`.
    pub fn preallocate(&mut self, size: u64) -> Result<()> {
        let file = self.handle()?;
        #[cfg(unix)]
        {
            let fd = file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            if !fallocate_may_fall_back(r) {
                return Err(std::io::Error::from_raw_os_error(r))
                    .with_context(|| format!("no space for {} bytes", size));
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        file.set_len(size).context("failed to preallocate file")?;
        Ok(())
    }

    /// Append one chunk at the current end of the written region.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        let path = self.temp_path.display().to_string();
        self.handle()?
            .write_all(data)
            .with_context(|| format!("write {}", path))?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync, then atomically rename the temp file onto the final path, replacing
    /// whatever was there. The length is trimmed to what was actually written.
    /// On error the temp file is removed when `self` drops.
    pub fn finalize(mut self) -> Result<PathBuf> {
        let written = self.written;
        let file = self.handle()?;
        file.set_len(written).context("failed to trim staged file")?;
        file.sync_all().context("storage sync failed")?;
        drop(self.file.take());

        std::fs::rename(&self.temp_path, &self.final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                self.temp_path.display(),
                self.final_path.display()
            )
        })?;
        self.committed = true;
        Ok(self.final_path.clone())
    }

    /// Give up on this download and remove the temp file.
    pub fn discard(self) {
        drop(self);
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        drop(self.file.take());
        if let Err(e) = std::fs::remove_file(&self.temp_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.temp_path.display(), "failed to remove staged file: {}", e);
            }
        }
    }
}
