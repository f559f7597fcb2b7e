//! Windows implementations of platform helpers (best-effort).
//!
//! Notes:
//! - No POSIX modes; log files are opened with default ACLs.
//! - Symlinks need a file/dir hint on Windows; it is taken from the destination
//!   when it resolves and defaults to a file link otherwise.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

pub fn create_symlink(destination: &Path, link: &Path) -> io::Result<()> {
    let resolved = link.parent().map(|d| d.join(destination));
    if resolved.as_deref().map(Path::is_dir).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(destination, link)
    } else {
        std::os::windows::fs::symlink_file(destination, link)
    }
}
