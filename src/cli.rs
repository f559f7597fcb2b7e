//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - Settings from the XML config are applied first; flags given here win.
//! - --debug and --verbose are shorthands for --log-level debug / info.

use clap::{ArgAction, Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::fs_ops::{ExistingTarget, Strategy};
use crate::species::DataType;

/// Regroup species dumps of a release FTP tree under their annotation source.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Regroup release FTP species dumps under their annotation source and repair broken symlinks"
)]
pub struct Args {
    /// Release numbers, e.g. `-e 110 111`
    #[arg(short = 'e', long = "release-version", visible_alias = "release_version", num_args = 1.., action = ArgAction::Append, required = true)]
    pub release_version: Vec<u32>,

    /// Rapid release numbers, e.g. `-r 60 61`
    #[arg(short = 'r', long = "rapid-version", visible_alias = "rapid_version", num_args = 1.., action = ArgAction::Append, required = true)]
    pub rapid_version: Vec<u32>,

    /// Release FTP root holding `species/` and `timestamped/species/`
    #[arg(short = 'f', long = "ftp-path", visible_alias = "ftp_path", value_hint = ValueHint::DirPath)]
    pub ftp_path: Option<PathBuf>,

    /// Metadata database location (directory or file:// URL of the JSON export)
    #[arg(short = 'm', long = "metadata-url", visible_alias = "metadata_url")]
    pub metadata_url: Option<String>,

    /// Metadata database name
    #[arg(short = 'd', long = "metadata-dbname", visible_alias = "metadata_dbname")]
    pub metadata_dbname: Option<String>,

    /// Core databases location; without it every species uses the default annotation source
    #[arg(short = 'c', long = "coredb-url", visible_alias = "coredb_url")]
    pub coredb_url: Option<String>,

    /// Only process these species (production names)
    #[arg(short = 's', long = "species-names", visible_alias = "species_names", num_args = 1.., action = ArgAction::Append)]
    pub species_names: Vec<String>,

    /// Only process these core databases
    #[arg(short = 'n', long = "database-names", visible_alias = "database_names", num_args = 1.., action = ArgAction::Append)]
    pub database_names: Vec<String>,

    /// Data types to relocate (default: all, in order geneset genome rnaseq variation statistics)
    #[arg(short = 't', long = "data-type", visible_alias = "data_type", value_enum, num_args = 1.., action = ArgAction::Append)]
    pub data_type: Vec<DataType>,

    /// How a data-type tree reaches its new location
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// What to do when the target already holds the data-type tree
    #[arg(long, value_enum)]
    pub existing_target: Option<ExistingTarget>,

    /// Do not read or write the resume ledger
    #[arg(long)]
    pub no_ledger: bool,

    /// Ledger location (default: <ftp_path>/.annotation_reorg.ledger.jsonl)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub ledger_path: Option<PathBuf>,

    /// Dry-run: log actions but do not modify the filesystem.
    #[arg(long, help = "Show what would be done, but do not modify files/directories")]
    pub dry_run: bool,

    /// Exit non-zero when the filters match no species
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Write the batch report as JSON to this file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub report: Option<PathBuf>,

    /// Verbose output (equivalent to `--log-level info`).
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Also append logs to this file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > --verbose > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        if let Some(level) = self.log_level.as_deref().and_then(LogLevel::parse) {
            return Some(level);
        }
        self.verbose.then_some(LogLevel::Info)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        cfg.release_versions = self.release_version.clone();
        cfg.rapid_versions = self.rapid_version.clone();
        if let Some(p) = &self.ftp_path {
            cfg.ftp_path = p.clone();
        }
        if let Some(url) = &self.metadata_url {
            cfg.metadata_url = Some(url.clone());
        }
        if let Some(db) = &self.metadata_dbname {
            cfg.metadata_dbname = db.clone();
        }
        if let Some(url) = &self.coredb_url {
            cfg.coredb_url = Some(url.clone());
        }
        if !self.species_names.is_empty() {
            cfg.species_names = self.species_names.clone();
        }
        if !self.database_names.is_empty() {
            cfg.database_names = self.database_names.clone();
        }
        if !self.data_type.is_empty() {
            let mut types = Vec::new();
            for dt in &self.data_type {
                if !types.contains(dt) {
                    types.push(*dt);
                }
            }
            cfg.data_types = types;
        }
        if let Some(s) = self.strategy {
            cfg.strategy = s;
        }
        if let Some(e) = self.existing_target {
            cfg.existing_target = e;
        }
        if self.no_ledger {
            cfg.ledger = false;
        }
        if let Some(p) = &self.ledger_path {
            cfg.ledger_path = Some(p.clone());
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.fail_on_empty {
            cfg.fail_on_empty = true;
        }
        if let Some(p) = &self.report {
            cfg.report_path = Some(p.clone());
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
