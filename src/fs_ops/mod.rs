//! Filesystem operations: relocation primitives and the helpers they share.

mod atomic;
mod helpers;
mod lock;
mod relocate;
mod tree_copy;
mod util;

pub use helpers::{io_error_with_help, io_error_with_help_io, relocation_error};
pub use lock::{RunLock, LOCK_FILE_NAME};
pub use relocate::{copy_then_purge, move_into, ExistingTarget, RelocationOutcome, Relocator, Strategy};
pub use tree_copy::{copy_tree, CopyStats};

pub(crate) use atomic::rename_durable;
pub(crate) use util::{entry_exists, unique_temp_path};
