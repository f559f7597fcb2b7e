//! Unix implementations of platform helpers.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

/// Open log file for appending; 0600 applies only when the file is created so
/// administrator adjustments on an existing log are kept.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new().create(true).append(true).mode(0o600).open(path)?;
    if !existed {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

/// Create `link` pointing at the literal `destination` text.
pub fn create_symlink(destination: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(destination, link)
}
