use std::fs;

use assert_fs::prelude::*;
use assert_fs::TempDir;

use annotation_reorg::{AnnotationLookup, JsonCoreMetaStore, JsonMetadataStore, MetadataFilter, MetadataResolver, ReorgError};

fn rows() -> serde_json::Value {
    serde_json::json!([
        {"assembly_accession": "GCA_H", "name": "homo_sapiens", "display_name": "Homo sapiens (Human)",
         "dbname": "homo_sapiens_core_110_38", "ensembl_version": 110, "ensembl_genomes_version": 60,
         "genebuild_initial_date": "2014-01"},
        {"assembly_accession": "GCA_M", "name": "mus_musculus", "scientific_name": "Mus musculus",
         "dbname": "mus_musculus_core_110_39", "ensembl_version": 110, "ensembl_genomes_version": 60},
        {"assembly_accession": "GCA_R", "name": "rattus_norvegicus", "display_name": "Rattus norvegicus",
         "dbname": "rattus_norvegicus_core_111_7", "ensembl_version": 111, "ensembl_genomes_version": 61}
    ])
}

fn store(tmp: &TempDir) -> JsonMetadataStore {
    tmp.child("meta/ensembl_metadata_qrp.json").write_str(&rows().to_string()).unwrap();
    JsonMetadataStore::new(tmp.path().join("meta").to_str().unwrap(), "ensembl_metadata_qrp").unwrap()
}

fn filter(release: u32, rapid: u32) -> MetadataFilter {
    MetadataFilter {
        release_versions: vec![release],
        rapid_versions: vec![rapid],
        ..Default::default()
    }
}

#[test]
fn versions_select_rows() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);
    let f = filter(110, 60);
    let species: Vec<_> = store.species(&f).unwrap().map(Result::unwrap).collect();
    assert_eq!(species.len(), 2);
    assert_eq!(species[0].short_name(), "Homo_sapiens");
    assert_eq!(species[0].genebuild_initial_segment().as_deref(), Some("2014_01"));
    assert_eq!(species[1].display_name, "Mus musculus");
}

#[test]
fn both_versions_must_match() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);
    assert_eq!(store.species(&filter(110, 61)).unwrap().count(), 0);
}

#[test]
fn name_and_database_allow_lists() {
    let tmp = TempDir::new().unwrap();
    let store = store(&tmp);
    let mut f = filter(110, 60);
    f.species_names = vec!["mus_musculus".into()];
    let names: Vec<_> = store.species(&f).unwrap().map(|r| r.unwrap().name).collect();
    assert_eq!(names, vec!["mus_musculus"]);

    f.species_names.clear();
    f.database_names = vec!["homo_sapiens_core_110_38".into()];
    let names: Vec<_> = store.species(&f).unwrap().map(|r| r.unwrap().name).collect();
    assert_eq!(names, vec!["homo_sapiens"]);
}

#[test]
fn unreadable_store_is_a_resolver_error() {
    let tmp = TempDir::new().unwrap();
    let store = JsonMetadataStore::new(tmp.path().to_str().unwrap(), "absent").unwrap();
    let err = store.species(&filter(110, 60)).err().unwrap();
    assert!(matches!(err.downcast_ref::<ReorgError>(), Some(ReorgError::Resolver(_))));
}

#[test]
fn core_meta_accepts_maps_and_rows() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("core");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("a_core.json"), r#"{"species.annotation_source": "refseq", "assembly.name": "x"}"#).unwrap();
    fs::write(
        dir.join("b_core.json"),
        r#"[{"meta_key": "species.annotation_source", "meta_value": ""},
            {"meta_key": "genebuild.initial_release_date", "meta_value": "2020-05"}]"#,
    )
    .unwrap();
    let lookup = JsonCoreMetaStore::new(dir.to_str().unwrap()).unwrap();

    let a = lookup.lookup("a_core").unwrap();
    assert_eq!(a.annotation_source(), "refseq");
    assert_eq!(a.get("assembly.name"), None);

    let b = lookup.lookup("b_core").unwrap();
    assert_eq!(b.annotation_source(), "ensembl");
    assert_eq!(b.initial_release_date().as_deref(), Some("2020_05"));

    assert_eq!(lookup.lookup("missing_core").unwrap().annotation_source(), "ensembl");
}
