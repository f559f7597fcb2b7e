//! Metadata collaborators.
//! - MetadataResolver: yields the species in scope for a release.
//! - AnnotationLookup: reads the annotation meta keys of one species' core database.
//!
//! The engine only depends on the traits; `json_store` provides the file-backed
//! implementations used by the binary.

mod json_store;

use anyhow::Result;

use crate::errors::ReorgError;
use crate::species::{AnnotationInfo, SpeciesRecord};

pub use json_store::{resolve_location, DefaultAnnotationLookup, GenomeRow, JsonCoreMetaStore, JsonMetadataStore};

/// Lazily produced species records.
pub type SpeciesIter<'a> = Box<dyn Iterator<Item = Result<SpeciesRecord>> + 'a>;

/// Release selection and optional allow-lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub release_versions: Vec<u32>,
    pub rapid_versions: Vec<u32>,
    pub species_names: Vec<String>,
    pub database_names: Vec<String>,
}

impl MetadataFilter {
    /// Empty allow-lists admit everything.
    pub fn admits_names(&self, name: &str, dbname: &str) -> bool {
        (self.species_names.is_empty() || self.species_names.iter().any(|n| n == name))
            && (self.database_names.is_empty() || self.database_names.iter().any(|d| d == dbname))
    }

    pub fn admits_versions(&self, release: Option<u32>, rapid: Option<u32>) -> bool {
        matches!(release, Some(r) if self.release_versions.contains(&r))
            && matches!(rapid, Some(r) if self.rapid_versions.contains(&r))
    }

    pub fn no_match_error(&self) -> ReorgError {
        ReorgError::NoSpeciesMatched {
            release: self.release_versions.clone(),
            rapid: self.rapid_versions.clone(),
        }
    }
}

pub trait MetadataResolver {
    fn species<'a>(&'a self, filter: &'a MetadataFilter) -> Result<SpeciesIter<'a>>;
}

pub trait AnnotationLookup {
    fn lookup(&self, dbname: &str) -> Result<AnnotationInfo>;
}

impl<T: MetadataResolver + ?Sized> MetadataResolver for Box<T> {
    fn species<'a>(&'a self, filter: &'a MetadataFilter) -> Result<SpeciesIter<'a>> {
        (**self).species(filter)
    }
}

impl<T: AnnotationLookup + ?Sized> AnnotationLookup for Box<T> {
    fn lookup(&self, dbname: &str) -> Result<AnnotationInfo> {
        (**self).lookup(dbname)
    }
}

/// Fixed records; handy for callers that already hold the species list.
impl MetadataResolver for Vec<SpeciesRecord> {
    fn species<'a>(&'a self, filter: &'a MetadataFilter) -> Result<SpeciesIter<'a>> {
        Ok(Box::new(
            self.iter()
                .filter(move |s| filter.admits_names(&s.name, &s.dbname))
                .cloned()
                .map(Ok),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_lists_admit_everything() {
        let f = MetadataFilter::default();
        assert!(f.admits_names("homo_sapiens", "homo_sapiens_core_110_1"));

        let f = MetadataFilter {
            species_names: vec!["mus_musculus".into()],
            ..Default::default()
        };
        assert!(!f.admits_names("homo_sapiens", "x"));
        assert!(f.admits_names("mus_musculus", "x"));
    }

    #[test]
    fn versions_must_match_both_lists() {
        let f = MetadataFilter {
            release_versions: vec![110, 111],
            rapid_versions: vec![60],
            ..Default::default()
        };
        assert!(f.admits_versions(Some(111), Some(60)));
        assert!(!f.admits_versions(Some(111), Some(61)));
        assert!(!f.admits_versions(None, Some(60)));
    }
}
