//! I/O helper utilities.
//!
//! Small adapters that enrich io::Error with the operation, the path and an
//! actionable hint, for use with `map_err` in anyhow and io code paths alike.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create dir", dir))?;
//!   fs::rename(a, b).map_err(relocation_error("rename", a))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

use crate::errors::ReorgError;

/// Hint keyed on the raw OS error code.
#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        libc::EACCES | libc::EPERM => "permission denied; check ownership of the release tree",
        libc::EXDEV => "cross-filesystem; rename not possible, a copy is required",
        libc::EBUSY => "resource busy; is another process using the tree?",
        libc::ENOENT => "path not found; verify it exists",
        libc::EEXIST => "already exists",
        libc::ENOTEMPTY => "directory not empty",
        libc::ENOSPC => "insufficient space on device",
        libc::EROFS => "read-only filesystem; cannot write here",
        libc::ELOOP => "too many symbolic link levels (ELOOP); possible symlink cycle",
        libc::ENAMETOOLONG => "filename or path too long",
        libc::EMFILE => "process file descriptor limit reached",
        libc::ENFILE => "system-wide file table overflow",
        _ => return None,
    };
    Some(hint)
}

#[cfg(not(unix))]
fn os_hint(_code: i32) -> Option<&'static str> {
    None
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership of the release tree"),
        io::ErrorKind::NotFound => Some("path not found; verify it exists"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Some("busy/timed out; retry later"),
        _ => None,
    }
}

/// `"<op> '<path>': <error> — <hint> [os code: N]"`
pub(crate) fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    match e.raw_os_error() {
        Some(code) => {
            if let Some(h) = os_hint(code) {
                msg.push_str(" — ");
                msg.push_str(h);
            }
            msg.push_str(&format!(" [os code: {}]", code));
        }
        None => {
            if let Some(h) = kind_hint(e.kind()) {
                msg.push_str(" — ");
                msg.push_str(h);
            }
        }
    }
    msg
}

/// Adapter for anyhow::Result code.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}

/// Adapter for io::Result code; keeps the original ErrorKind.
pub fn io_error_with_help_io<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}

/// Adapter producing a typed [`ReorgError::Relocation`].
pub fn relocation_error<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> ReorgError + 'a {
    move |e: io::Error| ReorgError::Relocation {
        op,
        path: path.to_path_buf(),
        message: build_message(op, path, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relocation_error_carries_op_and_path() {
        let p = Path::new("/ftp/species/x");
        let err = relocation_error("rename", p)(io::Error::from(io::ErrorKind::NotFound));
        match err {
            ReorgError::Relocation { op, path, message } => {
                assert_eq!(op, "rename");
                assert_eq!(path, p);
                assert!(message.contains("path not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
