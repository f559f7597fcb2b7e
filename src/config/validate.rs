//! Config validation logic.
//! Verifies the release FTP root layout and the settings a run cannot do without.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use super::types::Config;
use crate::errors::ReorgError;
use crate::plan::{area_root, Area};

impl Config {
    /// Check the FTP root holds `species/` and `timestamped/species/`, and that the
    /// release selection is usable.
    pub fn validate(&self) -> Result<()> {
        let root = &self.ftp_path;
        if root.as_os_str().is_empty() {
            return Err(ReorgError::Precondition("no ftp path configured".into()).into());
        }
        ensure_dir(root, "ftp_path")?;
        for area in [Area::Primary, Area::Timestamped] {
            let dir = area_root(root, area);
            if !dir.is_dir() {
                error!(ftp_path = %root.display(), missing = %dir.display(), "No species or timestamped/species dir found in provided ftp path");
                return Err(ReorgError::Precondition(format!(
                    "no {} directory found under ftp path {}",
                    dir.strip_prefix(root).unwrap_or(&dir).display(),
                    root.display()
                ))
                .into());
            }
        }
        fs::read_dir(root).map_err(|e| {
            ReorgError::Precondition(format!("cannot read ftp path '{}': {}", root.display(), e))
        })?;
        debug!(ftp_path = %root.display(), "ftp layout present");

        if self.release_versions.is_empty() || self.rapid_versions.is_empty() {
            return Err(ReorgError::Precondition(
                "at least one release version and one rapid release version are required".into(),
            )
            .into());
        }
        if self.data_types.is_empty() {
            return Err(ReorgError::Precondition("no data types selected".into()).into());
        }

        info!(
            ftp_path = %root.display(),
            release = ?self.release_versions,
            rapid = ?self.rapid_versions,
            data_types = ?self.data_types,
            "Config validated"
        );
        Ok(())
    }
}

fn ensure_dir(path: &Path, name: &str) -> Result<()> {
    if !path.is_dir() {
        error!("{name} is not a directory: {}", path.display());
        return Err(ReorgError::Precondition(format!("{name} is not a directory: {}", path.display())).into());
    }
    Ok(())
}
