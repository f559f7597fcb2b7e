//! Atomic rename helper.
//! - Renames with a context-rich error.
//! - Best-effort fsync of the destination's parent afterwards (Unix).

use std::fs;
use std::io;
use std::path::Path;

use super::helpers::io_error_with_help_io;
use super::util::fsync_dir;

pub(crate) fn rename_durable(src: &Path, dst: &Path) -> io::Result<()> {
    fs::rename(src, dst).map_err(io_error_with_help_io("rename", src))?;
    if let Some(parent) = dst.parent() {
        // best-effort
        let _ = fsync_dir(parent);
    }
    Ok(())
}
