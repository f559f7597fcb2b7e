//! Recursive tree copy used by copy-then-purge and the cross-device move fallback.
//! - Directories are created, regular files copied, symlinks recreated verbatim
//!   (the recorded destination text is kept; links are never followed).
//! - Modification times are carried over best-effort with `filetime`.
//! - Existing files at the destination are overwritten (merge semantics).

use anyhow::Result;
use filetime::{set_file_mtime, set_symlink_file_times, FileTime};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};
use walkdir::WalkDir;

use super::helpers::io_error_with_help;
use super::util::entry_exists;
use crate::platform::create_symlink;
use crate::shutdown;
use crate::errors::ReorgError;

/// Counters for a finished copy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub dirs: u64,
    pub files: u64,
    pub links: u64,
    pub bytes: u64,
}

/// Copy the tree rooted at `src` so that it lives at `dst` (`dst` itself is created).
/// A non-directory `src` is copied to `dst` as a single entry.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<CopyStats> {
    let mut stats = CopyStats::default();

    for entry in WalkDir::new(src).follow_links(false) {
        if shutdown::is_requested() {
            return Err(ReorgError::Interrupted.into());
        }
        let entry = entry.map_err(|e| anyhow::anyhow!("walk {}: {}", src.display(), e))?;
        let rel = entry.path().strip_prefix(src)?;
        let out = if rel.as_os_str().is_empty() { dst.to_path_buf() } else { dst.join(rel) };
        let ftype = entry.file_type();

        if ftype.is_dir() {
            fs::create_dir_all(&out).map_err(io_error_with_help("create directory", &out))?;
            stats.dirs += 1;
        } else if ftype.is_symlink() {
            let recorded = fs::read_link(entry.path())
                .map_err(io_error_with_help("read symlink", entry.path()))?;
            if entry_exists(&out) {
                fs::remove_file(&out).map_err(io_error_with_help("remove existing entry", &out))?;
            }
            create_symlink(&recorded, &out).map_err(io_error_with_help("create symlink", &out))?;
            if let Ok(meta) = entry.metadata() {
                let mt = FileTime::from_last_modification_time(&meta);
                let _ = set_symlink_file_times(&out, FileTime::from_last_access_time(&meta), mt);
            }
            stats.links += 1;
        } else {
            let bytes = fs::copy(entry.path(), &out).map_err(io_error_with_help("copy file", &out))?;
            stats.bytes += bytes;
            stats.files += 1;
            if let Ok(meta) = entry.metadata() {
                if let Err(e) = set_file_mtime(&out, FileTime::from_last_modification_time(&meta)) {
                    warn!(path = %out.display(), error = %e, "failed to carry over mtime");
                }
            }
        }
        trace!(src = %entry.path().display(), dst = %out.display(), "copied entry");
    }

    // Directory mtimes change while children are written; set them last.
    for entry in WalkDir::new(src).follow_links(false).contents_first(true) {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_dir() {
            continue;
        }
        if let (Ok(rel), Ok(meta)) = (entry.path().strip_prefix(src), entry.metadata()) {
            let _ = set_file_mtime(dst.join(rel), FileTime::from_last_modification_time(&meta));
        }
    }

    Ok(stats)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn copies_files_dirs_and_links_verbatim() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("genome");
        src.child("a.fa").write_str("ACGT").unwrap();
        src.child("sub/b.txt").write_str("b").unwrap();
        std::os::unix::fs::symlink("../geneset/x.gz", src.child("link").path()).unwrap();

        let dst = temp.child("out/genome");
        let stats = copy_tree(src.path(), dst.path()).unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.links, 1);
        assert_eq!(fs::read_to_string(dst.child("a.fa").path()).unwrap(), "ACGT");
        assert_eq!(fs::read_to_string(dst.child("sub/b.txt").path()).unwrap(), "b");
        assert_eq!(
            fs::read_link(dst.child("link").path()).unwrap(),
            Path::new("../geneset/x.gz")
        );
    }

    #[test]
    fn preserves_file_mtime() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("s");
        let f = src.child("old.txt");
        f.write_str("x").unwrap();
        let old = FileTime::from_unix_time(1_600_000_000, 0);
        set_file_mtime(f.path(), old).unwrap();

        let dst = temp.child("d");
        copy_tree(src.path(), dst.path()).unwrap();
        let meta = fs::metadata(dst.child("old.txt").path()).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), old);
    }
}
