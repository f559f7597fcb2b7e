//! Core configuration types.
//! - Config holds everything a reorganization run needs.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::METADATA_DBNAME_DEFAULT;
use crate::fs_ops::{ExistingTarget, Strategy};
use crate::metadata::MetadataFilter;
use crate::species::DataType;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for one reorganization run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Release FTP root holding `species/` and `timestamped/species/`
    pub ftp_path: PathBuf,
    /// Location of the metadata database export
    pub metadata_url: Option<String>,
    pub metadata_dbname: String,
    /// Location of the core database exports (annotation source lookup)
    pub coredb_url: Option<String>,
    pub release_versions: Vec<u32>,
    pub rapid_versions: Vec<u32>,
    pub species_names: Vec<String>,
    pub database_names: Vec<String>,
    /// Data types to relocate, in processing order
    pub data_types: Vec<DataType>,
    pub strategy: Strategy,
    pub existing_target: ExistingTarget,
    /// Skip work recorded in the ledger and record finished work
    pub ledger: bool,
    /// Ledger location; defaults to a file under `ftp_path`
    pub ledger_path: Option<PathBuf>,
    /// If true, log and report actions but do not modify the tree
    pub dry_run: bool,
    /// Exit non-zero when the filters match no species
    pub fail_on_empty: bool,
    /// Where to write the JSON batch report
    pub report_path: Option<PathBuf>,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ftp_path: PathBuf::new(),
            metadata_url: None,
            metadata_dbname: METADATA_DBNAME_DEFAULT.to_string(),
            coredb_url: None,
            release_versions: Vec::new(),
            rapid_versions: Vec::new(),
            species_names: Vec::new(),
            database_names: Vec::new(),
            data_types: DataType::ALL.to_vec(),
            strategy: Strategy::default(),
            existing_target: ExistingTarget::default(),
            ledger: true,
            ledger_path: None,
            dry_run: false,
            fail_on_empty: false,
            report_path: None,
            log_level: LogLevel::Normal,
            log_file: None,
        }
    }
}

impl Config {
    /// Construct a Config for a root and release selection; other fields use defaults.
    pub fn new(ftp_path: impl Into<PathBuf>, release_versions: Vec<u32>, rapid_versions: Vec<u32>) -> Self {
        Self {
            ftp_path: ftp_path.into(),
            release_versions,
            rapid_versions,
            ..Default::default()
        }
    }

    pub fn metadata_filter(&self) -> MetadataFilter {
        MetadataFilter {
            release_versions: self.release_versions.clone(),
            rapid_versions: self.rapid_versions.clone(),
            species_names: self.species_names.clone(),
            database_names: self.database_names.clone(),
        }
    }

    /// Ledger file in effect, if the ledger is enabled.
    pub fn effective_ledger_path(&self) -> Option<PathBuf> {
        if !self.ledger {
            return None;
        }
        Some(
            self.ledger_path
                .clone()
                .unwrap_or_else(|| crate::ledger::Ledger::default_path(&self.ftp_path)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_data_types_in_order() {
        let cfg = Config::default();
        assert_eq!(cfg.data_types, DataType::ALL.to_vec());
        assert_eq!(cfg.metadata_dbname, "ensembl_metadata_qrp");
        assert!(cfg.ledger);
    }

    #[test]
    fn ledger_path_follows_root_unless_disabled() {
        let mut cfg = Config::new("/ftp", vec![110], vec![60]);
        assert_eq!(
            cfg.effective_ledger_path(),
            Some(PathBuf::from("/ftp/.annotation_reorg.ledger.jsonl"))
        );
        cfg.ledger = false;
        assert_eq!(cfg.effective_ledger_path(), None);
    }
}
