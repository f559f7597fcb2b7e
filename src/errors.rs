//! Typed error definitions for annotation_reorg.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReorgError {
    /// Metadata query failed or could not be read.
    #[error("Metadata resolver failed: {0}")]
    Resolver(String),

    /// No species matched the release / rapid-release filters.
    #[error("No species found for release {release:?} / rapid release {rapid:?}; check the version filters")]
    NoSpeciesMatched { release: Vec<u32>, rapid: Vec<u32> },

    /// A move or copy of a directory subtree failed.
    #[error("Relocation failed ({op}) on {path}: {message}")]
    Relocation {
        op: &'static str,
        path: PathBuf,
        message: String,
    },

    /// Copy-then-purge found no pre-existing target.
    #[error("No target directory to copy into: {0}")]
    NoTargetDirectory(PathBuf),

    /// The relocated tree already exists under the target and the policy forbids touching it.
    #[error("Target already holds {0}; refusing to replace it")]
    TargetExists(PathBuf),

    /// A broken link whose corrected destination does not exist either.
    #[error("Cannot repair symlink {link}: corrected destination {candidate} does not exist")]
    RepairFailure { link: PathBuf, candidate: PathBuf },

    /// Startup check on the FTP root failed.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Another run holds the lock on this FTP root.
    #[error("Another reorganization run holds the lock at {0}")]
    RunLocked(PathBuf),

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl ReorgError {
    /// Stable numeric code for structured logs.
    pub fn code(&self) -> u16 {
        match self {
            ReorgError::Resolver(_) => 10,
            ReorgError::NoSpeciesMatched { .. } => 11,
            ReorgError::Relocation { .. } => 20,
            ReorgError::NoTargetDirectory(_) => 21,
            ReorgError::TargetExists(_) => 22,
            ReorgError::RepairFailure { .. } => 30,
            ReorgError::Precondition(_) => 40,
            ReorgError::RunLocked(_) => 41,
            ReorgError::Interrupted => 130,
        }
    }

    /// Short machine-friendly kind used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ReorgError::Resolver(_) => "resolver",
            ReorgError::NoSpeciesMatched { .. } => "no_species_matched",
            ReorgError::Relocation { .. } => "relocation",
            ReorgError::NoTargetDirectory(_) => "no_target_directory",
            ReorgError::TargetExists(_) => "target_exists",
            ReorgError::RepairFailure { .. } => "repair_failure",
            ReorgError::Precondition(_) => "precondition",
            ReorgError::RunLocked(_) => "run_locked",
            ReorgError::Interrupted => "interrupted",
        }
    }
}
