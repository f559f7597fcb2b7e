//! Symlink repair after relocation.

mod rewrite;
mod walker;

pub use rewrite::{corrected_destination, nesting_delta};
pub use walker::{repair_tree, RepairReport, RepairWalker, RepairedLink, SymlinkEntry, UnresolvedLink};
