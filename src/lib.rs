//! Core library for `annotation_reorg`.
//!
//! Regroups release FTP species dumps under their annotation source:
//! `species/{short}/{accession}/{data_type}` moves to
//! `species/{short}/{accession}/{annotation_source}/{data_type}` (and likewise
//! under `timestamped/species`), then symlinks broken by the extra nesting level
//! are rewritten.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod ledger;
pub mod metadata;
pub mod orchestrator;
pub mod output;
pub mod plan;
pub mod platform;
pub mod repair;
pub mod report;
pub mod shutdown;
pub mod species;

pub use config::{
    default_config_path, default_log_path, path_has_symlink_ancestor, Config, LogLevel, CONFIG_ENV_VAR,
    METADATA_DBNAME_DEFAULT,
};
pub use errors::ReorgError;
pub use fs_ops::{copy_then_purge, move_into, ExistingTarget, RelocationOutcome, Relocator, RunLock, Strategy};
pub use ledger::{Ledger, LedgerKey};
pub use metadata::{
    AnnotationLookup, DefaultAnnotationLookup, JsonCoreMetaStore, JsonMetadataStore, MetadataFilter,
    MetadataResolver,
};
pub use orchestrator::Reorganizer;
pub use plan::{plan, Area, RelocationPlan, SpeciesPlan};
pub use repair::{corrected_destination, repair_tree, RepairReport, RepairWalker};
pub use report::{BatchReport, DataTypeOutcome, SpeciesFailure, SpeciesOutcome};
pub use species::{short_name, AnnotationInfo, DataType, SpeciesRecord};
