//! Species-level domain types consumed by the reorganization engine.
//! - SpeciesRecord: one row from the metadata resolver.
//! - AnnotationInfo: the handful of core `meta` keys we care about.
//! - DataType: the closed set of dump sub-directories.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const ANNOTATION_SOURCE_KEY: &str = "species.annotation_source";
pub const LAST_GENESET_UPDATE_KEY: &str = "genebuild.last_geneset_update";
pub const INITIAL_RELEASE_DATE_KEY: &str = "genebuild.initial_release_date";

/// The only meta keys ever read from a core database.
pub const ANNOTATION_META_KEYS: [&str; 3] = [
    ANNOTATION_SOURCE_KEY,
    LAST_GENESET_UPDATE_KEY,
    INITIAL_RELEASE_DATE_KEY,
];

/// Annotation source used when the core database does not name one.
pub const DEFAULT_ANNOTATION_SOURCE: &str = "ensembl";

/// One species in scope for the run, as produced by the metadata resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub name: String,
    pub display_name: String,
    pub assembly_accession: String,
    pub dbname: String,
    #[serde(default)]
    pub genebuild_initial_date: Option<String>,
    #[serde(default)]
    pub genebuild_update_date: Option<String>,
}

impl SpeciesRecord {
    /// `Homo sapiens (Human)` -> `Homo_sapiens`.
    pub fn short_name(&self) -> String {
        short_name(&self.display_name)
    }

    pub fn genebuild_initial_segment(&self) -> Option<String> {
        self.genebuild_initial_date.as_deref().and_then(normalize_date)
    }

    pub fn genebuild_update_segment(&self) -> Option<String> {
        self.genebuild_update_date.as_deref().and_then(normalize_date)
    }
}

/// First two whitespace-separated tokens of a display name joined with `_`.
/// No escaping is applied.
pub fn short_name(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join("_")
}

/// `2023-01-15` -> `2023_01_15`; blank input yields None.
pub fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.replace('-', "_"))
    }
}

/// Annotation metadata for one species, restricted to [`ANNOTATION_META_KEYS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationInfo {
    values: BTreeMap<String, String>,
}

impl AnnotationInfo {
    /// Build from arbitrary key/value pairs, keeping only the known keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| ANNOTATION_META_KEYS.contains(&k.as_str()))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The annotation source label; `ensembl` when absent or empty.
    pub fn annotation_source(&self) -> &str {
        match self.get(ANNOTATION_SOURCE_KEY) {
            Some(v) if !v.is_empty() => v,
            _ => DEFAULT_ANNOTATION_SOURCE,
        }
    }

    pub fn last_geneset_update(&self) -> Option<String> {
        self.get(LAST_GENESET_UPDATE_KEY).and_then(normalize_date)
    }

    pub fn initial_release_date(&self) -> Option<String> {
        self.get(INITIAL_RELEASE_DATE_KEY).and_then(normalize_date)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Data-type directories found under an assembly in the FTP area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Geneset,
    Genome,
    Rnaseq,
    Variation,
    Statistics,
}

impl DataType {
    pub const ALL: [DataType; 5] = [
        DataType::Geneset,
        DataType::Genome,
        DataType::Rnaseq,
        DataType::Variation,
        DataType::Statistics,
    ];

    /// The literal path segment for this data type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Geneset => "geneset",
            DataType::Genome => "genome",
            DataType::Rnaseq => "rnaseq",
            DataType::Variation => "variation",
            DataType::Statistics => "statistics",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid data type: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_uses_first_two_tokens() {
        assert_eq!(short_name("Homo sapiens (Human)"), "Homo_sapiens");
        assert_eq!(short_name("Mus musculus"), "Mus_musculus");
        assert_eq!(short_name("Canis  lupus familiaris"), "Canis_lupus");
    }

    #[test]
    fn annotation_source_defaults_when_blank() {
        let info = AnnotationInfo::default();
        assert_eq!(info.annotation_source(), "ensembl");

        let info = AnnotationInfo::from_pairs([(ANNOTATION_SOURCE_KEY, "")]);
        assert_eq!(info.annotation_source(), "ensembl");

        let info = AnnotationInfo::from_pairs([(ANNOTATION_SOURCE_KEY, "refseq")]);
        assert_eq!(info.annotation_source(), "refseq");
    }

    #[test]
    fn unknown_meta_keys_are_dropped() {
        let info = AnnotationInfo::from_pairs([("assembly.name", "GRCh38"), (LAST_GENESET_UPDATE_KEY, "2023-01-15")]);
        assert!(info.get("assembly.name").is_none());
        assert_eq!(info.last_geneset_update().as_deref(), Some("2023_01_15"));
        assert_eq!(info.initial_release_date(), None);
    }

    #[test]
    fn data_type_parses_case_insensitively() {
        assert_eq!("GeneSet".parse::<DataType>().unwrap(), DataType::Geneset);
        assert!("proteins".parse::<DataType>().is_err());
        assert_eq!(DataType::Statistics.to_string(), "statistics");
    }
}
