//! Segment-level rewrite of a recorded symlink destination.
//!
//! A destination is split into its leading `..` hops and the remaining segments.
//! The data-type segment is located by exact match, the annotation-source segment
//! is spliced in front of it, and the hop count grows by the depth the link's own
//! directory gained when its tree was nested one level deeper.
//!
//! `../geneset/foo.gz` (geneset, ensembl, +1) -> `../../ensembl/geneset/foo.gz`

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Compute the corrected destination, or None when the rewrite does not apply:
/// - no segment equals `data_type`
/// - the data-type segment already sits under `annotation_source`
pub fn corrected_destination(
    recorded: &Path,
    data_type: &str,
    annotation_source: &str,
    extra_hops: usize,
) -> Option<PathBuf> {
    let mut anchor = PathBuf::new();
    let mut hops = 0usize;
    let mut rest: Vec<Component<'_>> = Vec::new();

    for comp in recorded.components() {
        match comp {
            Component::Prefix(_) | Component::RootDir => anchor.push(comp.as_os_str()),
            Component::CurDir if rest.is_empty() => {}
            Component::ParentDir if rest.is_empty() => hops += 1,
            other => rest.push(other),
        }
    }

    let target = OsStr::new(data_type);
    let idx = rest
        .iter()
        .position(|c| matches!(c, Component::Normal(s) if *s == target))?;

    if idx > 0 && matches!(rest[idx - 1], Component::Normal(s) if s == OsStr::new(annotation_source)) {
        return None;
    }

    let mut out = anchor;
    // Absolute destinations name the tree directly; only relative ones climb.
    let climb = if out.as_os_str().is_empty() { hops + extra_hops } else { hops };
    for _ in 0..climb {
        out.push("..");
    }
    for c in &rest[..idx] {
        out.push(c.as_os_str());
    }
    out.push(annotation_source);
    for c in &rest[idx..] {
        out.push(c.as_os_str());
    }
    Some(out)
}

/// Number of extra directory levels `dir` has compared with where it lived
/// before relocation. `relocated_root` is the annotation-source directory; the
/// pre-relocation location of anything below it is the same relative path
/// below the root's parent.
pub fn nesting_delta(relocated_root: &Path, dir: &Path) -> usize {
    let Ok(rel) = dir.strip_prefix(relocated_root) else {
        return 0;
    };
    let Some(assembly_dir) = relocated_root.parent() else {
        return 0;
    };
    let before = assembly_dir.join(rel).components().count();
    let after = dir.components().count();
    after.saturating_sub(before)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(recorded: &str, dt: &str, src: &str) -> Option<PathBuf> {
        corrected_destination(Path::new(recorded), dt, src, 1)
    }

    #[test]
    fn inserts_source_and_one_hop() {
        assert_eq!(fix("../geneset/foo.gz", "geneset", "ensembl"), Some(PathBuf::from("../../ensembl/geneset/foo.gz")));
        assert_eq!(
            fix("../../GCA_1/genome/x.fa", "genome", "refseq"),
            Some(PathBuf::from("../../../GCA_1/refseq/genome/x.fa"))
        );
    }

    #[test]
    fn no_match_is_left_alone() {
        assert_eq!(fix("../other/thing", "genome", "ensembl"), None);
        // partial segment matches do not count
        assert_eq!(fix("../genomes/thing", "genome", "ensembl"), None);
        assert_eq!(fix("../x/genome.fa", "genome", "ensembl"), None);
    }

    #[test]
    fn already_corrected_is_not_rewritten_twice() {
        assert_eq!(fix("../../ensembl/geneset/foo.gz", "geneset", "ensembl"), None);
    }

    #[test]
    fn only_first_data_type_segment_is_spliced() {
        assert_eq!(
            fix("../geneset/geneset/a", "geneset", "ensembl"),
            Some(PathBuf::from("../../ensembl/geneset/geneset/a"))
        );
    }

    #[test]
    fn absolute_destinations_get_no_extra_hops() {
        assert_eq!(
            fix("/ftp/species/H_s/GCA_1/geneset/a.gz", "geneset", "ensembl"),
            Some(PathBuf::from("/ftp/species/H_s/GCA_1/ensembl/geneset/a.gz"))
        );
    }

    #[test]
    fn leading_curdir_is_ignored() {
        assert_eq!(fix("./geneset/a", "geneset", "ensembl"), Some(PathBuf::from("../ensembl/geneset/a")));
    }

    #[test]
    fn nesting_delta_is_one_for_annotation_dirs() {
        let root = Path::new("/ftp/species/H_s/GCA_1/ensembl");
        assert_eq!(nesting_delta(root, &root.join("genome")), 1);
        assert_eq!(nesting_delta(root, &root.join("genome/sub/deeper")), 1);
        assert_eq!(nesting_delta(root, Path::new("/elsewhere")), 0);
    }
}
