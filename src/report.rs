//! Batch outcome report.
//! Every species yields a `SpeciesOutcome`; the run aggregates them so failures
//! stay per species and can be audited after the fact.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::errors::ReorgError;
use crate::fs_ops::RelocationOutcome;
use crate::repair::RepairReport;
use crate::species::DataType;

#[derive(Debug, Clone, Serialize)]
pub struct DataTypeOutcome {
    pub data_type: DataType,
    /// Already done in an earlier run according to the ledger
    pub skipped_by_ledger: bool,
    pub primary: RelocationOutcome,
    pub timestamped: RelocationOutcome,
    pub repair: RepairReport,
}

impl DataTypeOutcome {
    /// Relocation skipped by the ledger; the repair walk still ran.
    pub fn skipped(data_type: DataType, repair: RepairReport) -> Self {
        Self {
            data_type,
            skipped_by_ledger: true,
            primary: RelocationOutcome::SourceAbsent,
            timestamped: RelocationOutcome::SourceAbsent,
            repair,
        }
    }
}

/// Why a species failed, flattened for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesFailure {
    pub code: Option<u16>,
    pub kind: String,
    pub message: String,
}

impl SpeciesFailure {
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ReorgError>() {
            Some(re) => Self {
                code: Some(re.code()),
                kind: re.kind().to_string(),
                message: format!("{err:#}"),
            },
            None => Self {
                code: None,
                kind: "unexpected".to_string(),
                message: format!("{err:#}"),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeciesOutcome {
    pub name: String,
    pub dbname: String,
    pub accession: String,
    pub short_name: String,
    pub annotation_source: Option<String>,
    pub genebuild_initial: Option<String>,
    pub genebuild_update: Option<String>,
    pub data_types: Vec<DataTypeOutcome>,
    pub error: Option<SpeciesFailure>,
}

impl SpeciesOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub species: Vec<SpeciesOutcome>,
    /// Records the resolver could not turn into species
    pub resolver_errors: Vec<String>,
    pub no_species_matched: bool,
    pub interrupted: bool,
}

impl BatchReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            species: Vec::new(),
            resolver_errors: Vec::new(),
            no_species_matched: false,
            interrupted: false,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn processed(&self) -> usize {
        self.species.len()
    }

    pub fn failed(&self) -> usize {
        self.species.iter().filter(|s| !s.succeeded()).count()
    }

    fn data_type_outcomes(&self) -> impl Iterator<Item = &DataTypeOutcome> {
        self.species.iter().flat_map(|s| s.data_types.iter())
    }

    pub fn relocated_trees(&self) -> usize {
        self.data_type_outcomes()
            .map(|d| usize::from(d.primary.relocated()) + usize::from(d.timestamped.relocated()))
            .sum()
    }

    pub fn repaired_links(&self) -> usize {
        self.data_type_outcomes().map(|d| d.repair.repaired.len()).sum()
    }

    pub fn unresolved_links(&self) -> usize {
        self.data_type_outcomes().map(|d| d.repair.unresolved.len()).sum()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{}species: {} processed, {} failed; trees relocated: {}; links repaired: {}, unresolved: {}{}",
            if self.dry_run { "dry-run " } else { "" },
            self.processed(),
            self.failed(),
            self.relocated_trees(),
            self.repaired_links(),
            self.unresolved_links(),
            if self.interrupted { " (interrupted)" } else { "" },
        )
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("create report dir {}", parent.display()))?;
            }
        }
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body).with_context(|| format!("write report {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn outcome(error: Option<SpeciesFailure>) -> SpeciesOutcome {
        SpeciesOutcome {
            name: "homo_sapiens".into(),
            dbname: "homo_sapiens_core".into(),
            accession: "GCA_1".into(),
            short_name: "Homo_sapiens".into(),
            annotation_source: Some("ensembl".into()),
            genebuild_initial: None,
            genebuild_update: None,
            data_types: vec![DataTypeOutcome {
                data_type: DataType::Genome,
                skipped_by_ledger: false,
                primary: RelocationOutcome::Renamed { dest: PathBuf::from("/x") },
                timestamped: RelocationOutcome::SourceAbsent,
                repair: RepairReport::default(),
            }],
            error,
        }
    }

    #[test]
    fn counters_and_summary() {
        let mut report = BatchReport::new(false);
        report.species.push(outcome(None));
        report.species.push(outcome(Some(SpeciesFailure::from_error(&anyhow::anyhow!("boom")))));
        assert_eq!(report.processed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.relocated_trees(), 2);
        assert!(report.summary_line().contains("2 processed, 1 failed"));
    }

    #[test]
    fn typed_failures_keep_their_code() {
        let err: anyhow::Error = ReorgError::NoTargetDirectory(PathBuf::from("/t")).into();
        let f = SpeciesFailure::from_error(&err);
        assert_eq!(f.code, Some(21));
        assert_eq!(f.kind, "no_target_directory");
    }
}
