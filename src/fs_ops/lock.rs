//! Advisory run lock.
//! Holds an exclusive `fs2` lock on `.annotation_reorg.lock` at the FTP root so two
//! reorganization runs never mutate the same tree at once.
//!
//! Notes:
//! - Acquisition never blocks: a held lock is reported as `ReorgError::RunLocked`.
//! - The lock is released when the guard is dropped; the lock file stays in place
//!   so every run locks the same inode.

use anyhow::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

use super::helpers::io_error_with_help;
use crate::errors::ReorgError;

pub const LOCK_FILE_NAME: &str = ".annotation_reorg.lock";

/// RAII guard held for the duration of a run.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Try to take the lock for `root` without waiting.
    pub fn acquire(root: &Path) -> Result<RunLock> {
        let path = root.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(io_error_with_help("open run lock", &path))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                trace!(path = %path.display(), "run lock acquired");
                Ok(RunLock { file, path })
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock || e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Err(ReorgError::RunLocked(path).into())
            }
            Err(e) => Err(io_error_with_help("lock", &path)(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
