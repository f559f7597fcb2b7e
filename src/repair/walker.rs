//! Symlink repair walk.
//! Depth-first over a relocated annotation-source tree; symlinks are inspected but
//! never followed. Every destination is resolved by joining it onto the link's
//! containing directory, so the process working directory is never touched.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::rewrite::{corrected_destination, nesting_delta};
use crate::errors::ReorgError;
use crate::fs_ops::{rename_durable, unique_temp_path};
use crate::platform::create_symlink;
use crate::shutdown;

/// A symlink observed during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkEntry {
    pub containing_dir: PathBuf,
    pub link_name: PathBuf,
    pub recorded_destination: PathBuf,
}

impl SymlinkEntry {
    pub fn link_path(&self) -> PathBuf {
        self.containing_dir.join(&self.link_name)
    }

    /// Whether `destination` exists when resolved from the link's directory.
    pub fn resolves(&self, destination: &Path) -> bool {
        fs::metadata(self.containing_dir.join(destination)).is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairedLink {
    pub link: PathBuf,
    pub old_destination: PathBuf,
    pub new_destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedLink {
    pub link: PathBuf,
    pub recorded_destination: PathBuf,
    pub candidate: PathBuf,
}

/// What one walk saw and did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub links_seen: u64,
    pub healthy: u64,
    /// Broken links whose destination has no data-type segment to rewrite.
    pub not_applicable: u64,
    pub repaired: Vec<RepairedLink>,
    pub unresolved: Vec<UnresolvedLink>,
    /// Entries the walk could not read or links it could not replace.
    pub errors: Vec<String>,
}

impl RepairReport {
    pub fn merge(&mut self, other: RepairReport) {
        self.links_seen += other.links_seen;
        self.healthy += other.healthy;
        self.not_applicable += other.not_applicable;
        self.repaired.extend(other.repaired);
        self.unresolved.extend(other.unresolved);
        self.errors.extend(other.errors);
    }
}

/// Substitution parameters for one walk.
#[derive(Debug, Clone, Copy)]
pub struct RepairWalker<'a> {
    pub data_type: &'a str,
    pub annotation_source: &'a str,
    pub dry_run: bool,
}

impl<'a> RepairWalker<'a> {
    pub fn new(data_type: &'a str, annotation_source: &'a str) -> Self {
        Self {
            data_type,
            annotation_source,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Walk `root` and mend broken links. A missing root is an empty walk.
    pub fn repair_tree(&self, root: &Path) -> Result<RepairReport> {
        let mut report = RepairReport::default();
        if !root.is_dir() {
            debug!(root = %root.display(), "repair root absent; nothing to walk");
            return Ok(report);
        }

        // Collect first: replacing links while a directory is being listed could
        // surface the temporary siblings in the listing.
        let mut links = Vec::new();
        for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                    report.errors.push(e.to_string());
                    continue;
                }
            };
            if !entry.path_is_symlink() {
                continue;
            }
            let (Some(dir), Some(name)) = (entry.path().parent(), entry.path().file_name()) else {
                continue;
            };
            match fs::read_link(entry.path()) {
                Ok(recorded) => links.push(SymlinkEntry {
                    containing_dir: dir.to_path_buf(),
                    link_name: PathBuf::from(name),
                    recorded_destination: recorded,
                }),
                Err(e) => {
                    warn!(link = %entry.path().display(), error = %e, "cannot read symlink");
                    report.errors.push(format!("read {}: {}", entry.path().display(), e));
                }
            }
        }

        for link in &links {
            if shutdown::is_requested() {
                return Err(ReorgError::Interrupted.into());
            }
            report.links_seen += 1;
            self.visit(root, link, &mut report);
        }

        if !report.repaired.is_empty() || !report.unresolved.is_empty() {
            info!(
                root = %root.display(),
                data_type = self.data_type,
                repaired = report.repaired.len(),
                unresolved = report.unresolved.len(),
                "symlink repair finished"
            );
        }
        Ok(report)
    }

    fn visit(&self, root: &Path, link: &SymlinkEntry, report: &mut RepairReport) {
        if link.resolves(&link.recorded_destination) {
            report.healthy += 1;
            return;
        }

        let extra_hops = nesting_delta(root, &link.containing_dir);
        let Some(candidate) =
            corrected_destination(&link.recorded_destination, self.data_type, self.annotation_source, extra_hops)
        else {
            debug!(link = %link.link_path().display(), dest = %link.recorded_destination.display(), "broken link has no data-type segment; left as is");
            report.not_applicable += 1;
            return;
        };

        let link_path = link.link_path();
        if !link.resolves(&candidate) {
            let err = ReorgError::RepairFailure {
                link: link_path.clone(),
                candidate: candidate.clone(),
            };
            warn!(code = err.code(), kind = err.kind(), recorded = %link.recorded_destination.display(), "{err}");
            report.unresolved.push(UnresolvedLink {
                link: link_path,
                recorded_destination: link.recorded_destination.clone(),
                candidate,
            });
            return;
        }

        if self.dry_run {
            info!(link = %link_path.display(), from = %link.recorded_destination.display(), to = %candidate.display(), "dry-run: would repair symlink");
        } else if let Err(e) = replace_link(link, &candidate) {
            warn!(link = %link_path.display(), error = %e, "failed to replace symlink");
            report.errors.push(format!("{e:#}"));
            return;
        } else {
            info!(link = %link_path.display(), from = %link.recorded_destination.display(), to = %candidate.display(), "Repaired symlink");
        }
        report.repaired.push(RepairedLink {
            link: link_path,
            old_destination: link.recorded_destination.clone(),
            new_destination: candidate,
        });
    }
}

/// Swap the link for one pointing at `destination`: the new link is created at a
/// temporary sibling and renamed over the old one.
fn replace_link(link: &SymlinkEntry, destination: &Path) -> Result<()> {
    let tmp = unique_temp_path(&link.containing_dir, "link");
    create_symlink(destination, &tmp)
        .map_err(|e| anyhow::anyhow!("create symlink {}: {}", tmp.display(), e))?;
    if let Err(e) = rename_durable(&tmp, &link.link_path()) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Convenience wrapper used by the orchestrator.
pub fn repair_tree(root: &Path, data_type: &str, annotation_source: &str, dry_run: bool) -> Result<RepairReport> {
    RepairWalker::new(data_type, annotation_source)
        .dry_run(dry_run)
        .repair_tree(root)
}
