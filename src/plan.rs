//! Path planning.
//! Maps a species + data type onto the source/target directories of the
//! primary `species/` area and its `timestamped/species/` mirror. Never touches disk.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::species::{DataType, SpeciesRecord};

pub const SPECIES_DIR: &str = "species";
pub const TIMESTAMPED_DIR: &str = "timestamped";

/// Which of the two mirrored trees a plan applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Primary,
    Timestamped,
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Area::Primary => f.write_str("primary"),
            Area::Timestamped => f.write_str("timestamped"),
        }
    }
}

/// Source/target pair for one (species, data type, area).
/// `target` is always `source` with the data-type segment replaced by the annotation source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationPlan {
    pub area: Area,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Plans for both areas of one (species, data type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesPlan {
    pub data_type: DataType,
    pub annotation_source: String,
    pub primary: RelocationPlan,
    pub timestamped: RelocationPlan,
}

/// Root of an area: `<root>/species` or `<root>/timestamped/species`.
pub fn area_root(release_root: &Path, area: Area) -> PathBuf {
    match area {
        Area::Primary => release_root.join(SPECIES_DIR),
        Area::Timestamped => release_root.join(TIMESTAMPED_DIR).join(SPECIES_DIR),
    }
}

/// `<area root>/<short_name>/<accession>`
pub fn assembly_dir(release_root: &Path, area: Area, species: &SpeciesRecord) -> PathBuf {
    area_root(release_root, area)
        .join(species.short_name())
        .join(&species.assembly_accession)
}

pub fn plan_area(
    release_root: &Path,
    area: Area,
    species: &SpeciesRecord,
    data_type: DataType,
    annotation_source: &str,
) -> RelocationPlan {
    let base = assembly_dir(release_root, area, species);
    RelocationPlan {
        area,
        source: base.join(data_type.as_str()),
        target: base.join(annotation_source),
    }
}

/// Compute the four paths for one species and data type.
pub fn plan(
    release_root: &Path,
    species: &SpeciesRecord,
    data_type: DataType,
    annotation_source: &str,
) -> SpeciesPlan {
    SpeciesPlan {
        data_type,
        annotation_source: annotation_source.to_string(),
        primary: plan_area(release_root, Area::Primary, species, data_type, annotation_source),
        timestamped: plan_area(release_root, Area::Timestamped, species, data_type, annotation_source),
    }
}
