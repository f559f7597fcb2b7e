//! Reorganization orchestrator.
//! For each species: look up the annotation source, then per data type plan the
//! paths, relocate the primary and timestamped trees and mend the links under the
//! new primary target. Errors stop only the species they happened in.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::errors::ReorgError;
use crate::fs_ops::{entry_exists, Relocator};
use crate::ledger::{Ledger, LedgerKey};
use crate::metadata::AnnotationLookup;
use crate::plan::plan;
use crate::repair::repair_tree;
use crate::report::{BatchReport, DataTypeOutcome, SpeciesFailure, SpeciesOutcome};
use crate::shutdown;
use crate::species::{DataType, SpeciesRecord};

pub struct Reorganizer<'a> {
    root: PathBuf,
    data_types: Vec<DataType>,
    relocator: Relocator,
    lookup: &'a dyn AnnotationLookup,
    ledger: Option<Ledger>,
    dry_run: bool,
}

impl<'a> Reorganizer<'a> {
    pub fn new(root: impl Into<PathBuf>, data_types: Vec<DataType>, relocator: Relocator, lookup: &'a dyn AnnotationLookup) -> Self {
        Self {
            root: root.into(),
            data_types,
            dry_run: relocator.dry_run,
            relocator,
            lookup,
            ledger: None,
        }
    }

    /// Build from a validated config, opening the ledger when enabled.
    pub fn from_config(cfg: &Config, lookup: &'a dyn AnnotationLookup) -> Result<Self> {
        let relocator = Relocator {
            strategy: cfg.strategy,
            existing: cfg.existing_target,
            dry_run: cfg.dry_run,
        };
        let mut this = Self::new(cfg.ftp_path.clone(), cfg.data_types.clone(), relocator, lookup);
        if let Some(path) = cfg.effective_ledger_path() {
            this = this.with_ledger(Ledger::open(&path)?);
        }
        Ok(this)
    }

    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Process every species; never fails as a whole.
    pub fn run<I>(&mut self, species: I) -> BatchReport
    where
        I: IntoIterator<Item = Result<SpeciesRecord>>,
    {
        let mut report = BatchReport::new(self.dry_run);
        let mut seen_any = false;

        for item in species {
            if shutdown::is_requested() {
                warn!("shutdown requested; stopping before the next species");
                report.interrupted = true;
                break;
            }
            seen_any = true;
            let record = match item {
                Ok(r) => r,
                Err(e) => {
                    error!(error = %format!("{e:#}"), "metadata resolver yielded an unusable record");
                    report.resolver_errors.push(format!("{e:#}"));
                    continue;
                }
            };
            let outcome = self.process_species(&record);
            let interrupted = matches!(
                outcome.error.as_ref().map(|f| f.kind.as_str()),
                Some("interrupted")
            );
            report.species.push(outcome);
            if interrupted {
                report.interrupted = true;
                break;
            }
        }

        if !seen_any && !report.interrupted {
            report.no_species_matched = true;
        }
        report.finish();
        report
    }

    /// Process one species, turning any error into a failed outcome.
    pub fn process_species(&mut self, species: &SpeciesRecord) -> SpeciesOutcome {
        info!(species = %species.name, dbname = %species.dbname, "Processing species");
        let mut outcome = SpeciesOutcome {
            name: species.name.clone(),
            dbname: species.dbname.clone(),
            accession: species.assembly_accession.clone(),
            short_name: species.short_name(),
            annotation_source: None,
            genebuild_initial: species.genebuild_initial_segment(),
            genebuild_update: species.genebuild_update_segment(),
            data_types: Vec::new(),
            error: None,
        };

        if let Err(e) = self.relocate_species(species, &mut outcome) {
            let failure = SpeciesFailure::from_error(&e);
            error!(
                species = %species.name,
                code = failure.code,
                kind = %failure.kind,
                "Failed to process species: {}",
                failure.message
            );
            outcome.error = Some(failure);
        } else {
            info!(
                species = %species.name,
                annotation_source = outcome.annotation_source.as_deref().unwrap_or_default(),
                data_types = outcome.data_types.len(),
                "Sub directories regrouped"
            );
        }
        outcome
    }

    fn relocate_species(&mut self, species: &SpeciesRecord, outcome: &mut SpeciesOutcome) -> Result<()> {
        if species.short_name().is_empty() || species.assembly_accession.trim().is_empty() {
            return Err(ReorgError::Resolver(format!(
                "species {} has an empty display name or accession",
                species.name
            ))
            .into());
        }

        debug!(dbname = %species.dbname, "fetching annotation source");
        let info = self.lookup.lookup(&species.dbname)?;
        let source = info.annotation_source().to_string();
        outcome.annotation_source = Some(source.clone());
        if outcome.genebuild_initial.is_none() {
            outcome.genebuild_initial = info.initial_release_date();
        }
        if outcome.genebuild_update.is_none() {
            outcome.genebuild_update = info.last_geneset_update();
        }

        for &data_type in &self.data_types.clone() {
            if shutdown::is_requested() {
                return Err(ReorgError::Interrupted.into());
            }
            let dt_outcome = self.relocate_data_type(species, data_type, &source)?;
            outcome.data_types.push(dt_outcome);
        }
        Ok(())
    }

    fn relocate_data_type(&mut self, species: &SpeciesRecord, data_type: DataType, source: &str) -> Result<DataTypeOutcome> {
        let key = LedgerKey {
            species: species.name.clone(),
            accession: species.assembly_accession.clone(),
            data_type,
        };
        let p = plan(&self.root, species, data_type, source);

        if self.ledger.as_ref().is_some_and(|l| l.contains(&key)) {
            debug!(species = %species.name, %data_type, "already recorded in ledger; skipping relocation");
            let repair = repair_tree(&p.primary.target, data_type.as_str(), source, self.dry_run)?;
            return Ok(DataTypeOutcome::skipped(data_type, repair));
        }

        let primary = self.relocator.relocate(&p.primary)?;
        let timestamped = self.relocator.relocate(&p.timestamped)?;
        let repair = repair_tree(&p.primary.target, data_type.as_str(), source, self.dry_run)?;

        // Only a tree that now lives under the annotation source counts as done.
        let completed = entry_exists(&p.primary.target.join(data_type.as_str()))
            && !entry_exists(&p.primary.source)
            && !entry_exists(&p.timestamped.source);
        if !self.dry_run && completed {
            if let Some(ledger) = self.ledger.as_mut() {
                ledger.record(key, source)?;
            }
        }

        Ok(DataTypeOutcome {
            data_type,
            skipped_by_ledger: false,
            primary,
            timestamped,
            repair,
        })
    }
}
