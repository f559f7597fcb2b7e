use std::fs;

use anyhow::Result;
use tempfile::tempdir;

use annotation_reorg::{shutdown, DataType, DefaultAnnotationLookup, Relocator, Reorganizer, SpeciesRecord};

// Own test binary: the shutdown flag is process-wide.
#[test]
fn requested_shutdown_stops_before_the_next_species() {
    let td = tempdir().unwrap();
    let root = td.path();
    let genome = root.join("species/Homo_sapiens/GCA_1/genome");
    fs::create_dir_all(&genome).unwrap();
    fs::create_dir_all(root.join("timestamped/species")).unwrap();

    let record = SpeciesRecord {
        name: "homo_sapiens".into(),
        display_name: "Homo sapiens".into(),
        assembly_accession: "GCA_1".into(),
        dbname: "homo_sapiens_core".into(),
        ..Default::default()
    };
    let lookup = DefaultAnnotationLookup;
    let mut reorg = Reorganizer::new(root, DataType::ALL.to_vec(), Relocator::default(), &lookup);

    shutdown::request();
    let species: Vec<Result<SpeciesRecord>> = vec![Ok(record)];
    let report = reorg.run(species);
    shutdown::reset();

    assert!(report.interrupted);
    assert!(!report.no_species_matched);
    assert_eq!(report.processed(), 0);
    assert!(genome.is_dir());
}
