//! File-backed metadata stores.
//!
//! Connection strings name a directory (plain path or `file://` URL); the
//! database name is joined onto it, mirroring `<host url>/<dbname>`:
//! - metadata: `<metadata_url>/<metadata_dbname>.json`, an array of genome rows
//! - core meta: `<coredb_url>/<dbname>.json`, either an object of key -> value or
//!   an array of `{ "meta_key": .., "meta_value": .. }` rows

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{AnnotationLookup, MetadataFilter, MetadataResolver, SpeciesIter};
use crate::errors::ReorgError;
use crate::species::{AnnotationInfo, SpeciesRecord};

/// Turn a connection string into a local directory.
pub fn resolve_location(url: &str) -> Result<PathBuf, ReorgError> {
    let trimmed = url.trim();
    if let Some(rest) = trimmed.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if let Some((scheme, _)) = trimmed.split_once("://") {
        return Err(ReorgError::Resolver(format!(
            "unsupported connection scheme '{scheme}://'; export the database to JSON and pass its directory"
        )));
    }
    if trimmed.is_empty() {
        return Err(ReorgError::Resolver("empty connection string".into()));
    }
    Ok(PathBuf::from(trimmed))
}

fn database_file(url: &str, dbname: &str) -> Result<PathBuf, ReorgError> {
    Ok(resolve_location(url)?.join(format!("{dbname}.json")))
}

/// One row of the metadata genome query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenomeRow {
    pub assembly_accession: String,
    #[serde(default)]
    pub assembly_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub species_taxonomy_id: Option<u64>,
    #[serde(default)]
    pub strain: Option<String>,
    #[serde(default)]
    pub genebuild: Option<String>,
    pub dbname: String,
    #[serde(default, rename = "type")]
    pub db_type: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub ensembl_version: Option<u32>,
    #[serde(default)]
    pub ensembl_genomes_version: Option<u32>,
    #[serde(default)]
    pub genebuild_initial_date: Option<String>,
    #[serde(default)]
    pub genebuild_update_date: Option<String>,
}

impl GenomeRow {
    fn into_record(self) -> Result<SpeciesRecord, ReorgError> {
        let display_name = self
            .display_name
            .or(self.scientific_name)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ReorgError::Resolver(format!("genome {} has no display name", self.dbname)))?;
        Ok(SpeciesRecord {
            name: self.name.unwrap_or_else(|| self.dbname.clone()),
            display_name,
            assembly_accession: self.assembly_accession,
            dbname: self.dbname,
            genebuild_initial_date: self.genebuild_initial_date,
            genebuild_update_date: self.genebuild_update_date,
        })
    }
}

/// Metadata database exported to `<dir>/<dbname>.json`.
#[derive(Debug, Clone)]
pub struct JsonMetadataStore {
    path: PathBuf,
}

impl JsonMetadataStore {
    pub fn new(metadata_url: &str, metadata_dbname: &str) -> Result<Self, ReorgError> {
        Ok(Self {
            path: database_file(metadata_url, metadata_dbname)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_rows(&self) -> Result<Vec<GenomeRow>> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| ReorgError::Resolver(format!("read {}: {}", self.path.display(), e)))?;
        let rows: Vec<GenomeRow> = serde_json::from_str(&raw)
            .map_err(|e| ReorgError::Resolver(format!("parse {}: {}", self.path.display(), e)))?;
        Ok(rows)
    }
}

impl MetadataResolver for JsonMetadataStore {
    fn species<'a>(&'a self, filter: &'a MetadataFilter) -> Result<SpeciesIter<'a>> {
        let rows = self.load_rows()?;
        debug!(path = %self.path.display(), rows = rows.len(), "metadata rows loaded");
        let iter = rows
            .into_iter()
            .filter(move |r| filter.admits_versions(r.ensembl_version, r.ensembl_genomes_version))
            .filter(move |r| filter.admits_names(r.name.as_deref().unwrap_or_default(), &r.dbname))
            .map(|r| r.into_record().map_err(anyhow::Error::from));
        Ok(Box::new(iter))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CoreMeta {
    Map(BTreeMap<String, String>),
    Rows(Vec<MetaRow>),
}

#[derive(Deserialize)]
struct MetaRow {
    meta_key: String,
    meta_value: String,
}

/// Core databases exported to `<dir>/<dbname>.json`.
#[derive(Debug, Clone)]
pub struct JsonCoreMetaStore {
    dir: PathBuf,
}

impl JsonCoreMetaStore {
    pub fn new(coredb_url: &str) -> Result<Self, ReorgError> {
        Ok(Self {
            dir: resolve_location(coredb_url)?,
        })
    }
}

impl AnnotationLookup for JsonCoreMetaStore {
    fn lookup(&self, dbname: &str) -> Result<AnnotationInfo> {
        let path = self.dir.join(format!("{dbname}.json"));
        if !path.exists() {
            debug!(path = %path.display(), "no core meta export; using defaults");
            return Ok(AnnotationInfo::default());
        }
        let raw = fs::read_to_string(&path).with_context(|| format!("read core meta {}", path.display()))?;
        let parsed: CoreMeta =
            serde_json::from_str(&raw).with_context(|| format!("parse core meta {}", path.display()))?;
        Ok(match parsed {
            CoreMeta::Map(m) => AnnotationInfo::from_pairs(m),
            CoreMeta::Rows(rows) => AnnotationInfo::from_pairs(rows.into_iter().map(|r| (r.meta_key, r.meta_value))),
        })
    }
}

/// Used when no core database location is configured: every species falls back
/// to the default annotation source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAnnotationLookup;

impl AnnotationLookup for DefaultAnnotationLookup {
    fn lookup(&self, _dbname: &str) -> Result<AnnotationInfo> {
        Ok(AnnotationInfo::default())
    }
}
