//! Directory relocation.
//! Moves a data-type directory so it becomes a child of its annotation-source
//! directory, either by rename (with a cross-device copy fallback) or by an
//! explicit copy-then-purge into an existing target.
//!
//! Both strategies treat an absent source as a finished job, so re-running over a
//! tree that was already relocated is a no-op.

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::helpers::relocation_error;
use super::tree_copy::{copy_tree, CopyStats};
use super::util::{entry_exists, is_cross_device};
use crate::errors::ReorgError;
use crate::plan::RelocationPlan;

/// How a data-type tree gets to its new home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Rename; falls back to copy + remove across filesystems.
    #[default]
    Move,
    /// Copy into an existing target, then delete the source.
    Copy,
}

/// What to do when `<target>/<data_type>` already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExistingTarget {
    /// Move entries in one by one; colliding files abort the merge.
    #[default]
    Merge,
    /// Remove the existing tree first.
    Overwrite,
    /// Refuse and report the species as failed.
    Fail,
}

/// Result of relocating one tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelocationOutcome {
    /// Nothing at the source: never existed or already relocated.
    SourceAbsent,
    Renamed { dest: PathBuf },
    Merged { dest: PathBuf },
    Copied { dest: PathBuf, files: u64, links: u64, bytes: u64 },
    /// Dry-run: what would have happened.
    Planned { dest: PathBuf },
}

impl RelocationOutcome {
    pub fn relocated(&self) -> bool {
        matches!(
            self,
            RelocationOutcome::Renamed { .. } | RelocationOutcome::Merged { .. } | RelocationOutcome::Copied { .. }
        )
    }

    fn copied(dest: PathBuf, stats: CopyStats) -> Self {
        RelocationOutcome::Copied {
            dest,
            files: stats.files,
            links: stats.links,
            bytes: stats.bytes,
        }
    }
}

/// Relocation settings applied to every plan of a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relocator {
    pub strategy: Strategy,
    pub existing: ExistingTarget,
    pub dry_run: bool,
}

impl Relocator {
    pub fn relocate(&self, plan: &RelocationPlan) -> Result<RelocationOutcome> {
        debug!(area = %plan.area, src = %plan.source.display(), target = %plan.target.display(), strategy = ?self.strategy, "relocate");
        match self.strategy {
            Strategy::Move => move_into(&plan.source, &plan.target, self.existing, self.dry_run),
            Strategy::Copy => copy_then_purge(&plan.source, &plan.target, self.dry_run),
        }
    }
}

/// Destination of `source` once it lives under `target`.
fn child_destination(source: &Path, target: &Path) -> Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| ReorgError::Relocation {
        op: "plan",
        path: source.to_path_buf(),
        message: "source has no final path segment".into(),
    })?;
    Ok(target.join(name))
}

/// Refuse layouts where the move would put a tree inside itself.
fn ensure_not_in_place(source: &Path, target: &Path) -> Result<()> {
    if target == source || target.starts_with(source) {
        return Err(ReorgError::Relocation {
            op: "plan",
            path: source.to_path_buf(),
            message: format!("target '{}' lies inside the source tree", target.display()),
        }
        .into());
    }
    Ok(())
}

fn ensure_real_dir(source: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(source).map_err(relocation_error("stat source", source))?;
    if !meta.file_type().is_dir() {
        return Err(ReorgError::Relocation {
            op: "stat source",
            path: source.to_path_buf(),
            message: "source is not a directory (symlinks are never relocated)".into(),
        }
        .into());
    }
    Ok(())
}

/// Move `source` so it becomes `target/<source name>`, creating `target` if needed.
pub fn move_into(source: &Path, target: &Path, existing: ExistingTarget, dry_run: bool) -> Result<RelocationOutcome> {
    if !entry_exists(source) {
        debug!(src = %source.display(), "source absent; nothing to move");
        return Ok(RelocationOutcome::SourceAbsent);
    }
    ensure_real_dir(source)?;
    ensure_not_in_place(source, target)?;
    let dest = child_destination(source, target)?;

    if dry_run {
        info!(src = %source.display(), dest = %dest.display(), "dry-run: would move directory");
        return Ok(RelocationOutcome::Planned { dest });
    }

    fs::create_dir_all(target).map_err(relocation_error("create target", target))?;

    if entry_exists(&dest) {
        match existing {
            ExistingTarget::Fail => return Err(ReorgError::TargetExists(dest).into()),
            ExistingTarget::Overwrite => {
                warn!(dest = %dest.display(), "removing existing tree before move");
                remove_any(&dest).map_err(relocation_error("remove existing target", &dest))?;
            }
            ExistingTarget::Merge => {
                merge_dir(source, &dest)?;
                info!(src = %source.display(), dest = %dest.display(), "Merged directory into existing target");
                return Ok(RelocationOutcome::Merged { dest });
            }
        }
    }

    match fs::rename(source, &dest) {
        Ok(()) => {
            info!(src = %source.display(), dest = %dest.display(), "Renamed directory atomically");
            Ok(RelocationOutcome::Renamed { dest })
        }
        Err(e) if is_cross_device(&e) => {
            warn!(src = %source.display(), dest = %dest.display(), "cross-device move; copying then removing source");
            let stats = copy_then_remove(source, &dest)?;
            Ok(RelocationOutcome::copied(dest, stats))
        }
        Err(e) => Err(relocation_error("rename", source)(e).into()),
    }
}

/// Copy `source` into the existing `target`, then delete `source`.
/// The source is left untouched when the copy fails.
pub fn copy_then_purge(source: &Path, target: &Path, dry_run: bool) -> Result<RelocationOutcome> {
    if !entry_exists(source) {
        debug!(src = %source.display(), "source absent; nothing to copy");
        return Ok(RelocationOutcome::SourceAbsent);
    }
    if !target.is_dir() {
        return Err(ReorgError::NoTargetDirectory(target.to_path_buf()).into());
    }
    ensure_real_dir(source)?;
    ensure_not_in_place(source, target)?;
    let dest = child_destination(source, target)?;

    if dry_run {
        info!(src = %source.display(), dest = %dest.display(), "dry-run: would copy directory and purge source");
        return Ok(RelocationOutcome::Planned { dest });
    }

    let stats = copy_tree(source, &dest).map_err(|e| ReorgError::Relocation {
        op: "copy",
        path: source.to_path_buf(),
        message: format!("{e:#}"),
    })?;
    fs::remove_dir_all(source).map_err(relocation_error("purge source", source))?;
    info!(src = %source.display(), dest = %dest.display(), files = stats.files, links = stats.links, "Copied directory and purged source");
    Ok(RelocationOutcome::copied(dest, stats))
}

/// Cross-device fallback. A partial destination is removed on failure so the
/// source stays the single authoritative copy.
fn copy_then_remove(source: &Path, dest: &Path) -> Result<CopyStats> {
    let stats = match copy_tree(source, dest) {
        Ok(s) => s,
        Err(e) => {
            let _ = fs::remove_dir_all(dest);
            return Err(ReorgError::Relocation {
                op: "copy",
                path: source.to_path_buf(),
                message: format!("{e:#}"),
            }
            .into());
        }
    };
    fs::remove_dir_all(source).map_err(relocation_error("remove source", source))?;
    Ok(stats)
}

/// Move every entry of `src` into the existing directory `dst`, recursing into
/// directories present on both sides. `src` is removed once empty.
fn merge_dir(src: &Path, dst: &Path) -> Result<()> {
    let entries = fs::read_dir(src).map_err(relocation_error("read directory", src))?;
    for entry in entries {
        let entry = entry.map_err(relocation_error("read directory", src))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if !entry_exists(&to) {
            match fs::rename(&from, &to) {
                Ok(()) => {}
                Err(e) if is_cross_device(&e) => {
                    if fs::symlink_metadata(&from).map(|m| m.is_dir()).unwrap_or(false) {
                        copy_then_remove(&from, &to)?;
                    } else {
                        copy_tree(&from, &to)?;
                        fs::remove_file(&from).map_err(relocation_error("remove source", &from))?;
                    }
                }
                Err(e) => return Err(relocation_error("rename", &from)(e).into()),
            }
            continue;
        }

        let both_dirs = is_real_dir(&from) && is_real_dir(&to);
        if both_dirs {
            merge_dir(&from, &to)?;
        } else {
            return Err(ReorgError::TargetExists(to).into());
        }
    }
    fs::remove_dir(src).map_err(relocation_error("remove merged source", src))?;
    Ok(())
}

fn is_real_dir(p: &Path) -> bool {
    fs::symlink_metadata(p).map(|m| m.is_dir()).unwrap_or(false)
}

fn remove_any(p: &Path) -> std::io::Result<()> {
    if is_real_dir(p) {
        fs::remove_dir_all(p)
    } else {
        fs::remove_file(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn in_place_layouts_are_refused() {
        let src = Path::new("/ftp/species/A_b/GCA_1/genome");
        assert!(ensure_not_in_place(src, src).is_err());
        assert!(ensure_not_in_place(src, &src.join("genome")).is_err());
        assert!(ensure_not_in_place(src, Path::new("/ftp/species/A_b/GCA_1/ensembl")).is_ok());
    }

    #[test]
    fn merge_moves_new_entries_and_refuses_collisions() {
        let temp = assert_fs::TempDir::new().unwrap();
        let src = temp.child("genome");
        src.child("new.txt").write_str("n").unwrap();
        src.child("shared/inner.txt").write_str("i").unwrap();
        let dst = temp.child("ensembl/genome");
        dst.child("shared/other.txt").write_str("o").unwrap();

        merge_dir(src.path(), dst.path()).unwrap();
        assert!(dst.child("new.txt").path().exists());
        assert!(dst.child("shared/inner.txt").path().exists());
        assert!(dst.child("shared/other.txt").path().exists());
        assert!(!src.path().exists());

        let src2 = temp.child("genome2");
        src2.child("shared/other.txt").write_str("clash").unwrap();
        let err = merge_dir(src2.path(), dst.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<ReorgError>(), Some(ReorgError::TargetExists(_))));
        assert!(src2.child("shared/other.txt").path().exists());
    }
}
