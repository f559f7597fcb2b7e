//! Platform-specific helpers.
//! Hides OS differences behind a small uniform API so the rest of the crate
//! stays platform-agnostic.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{create_symlink, open_log_file_secure_append};

#[cfg(not(unix))]
pub use windows::{create_symlink, open_log_file_secure_append};
