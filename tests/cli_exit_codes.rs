use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::tempdir;

fn ftp_root(base: &Path) -> PathBuf {
    let root = base.join("ftp");
    fs::create_dir_all(root.join("species")).unwrap();
    fs::create_dir_all(root.join("timestamped/species")).unwrap();
    root
}

fn write_metadata(dir: &Path, rows: serde_json::Value) -> PathBuf {
    let meta = dir.join("meta");
    fs::create_dir_all(&meta).unwrap();
    fs::write(meta.join("ensembl_metadata_qrp.json"), rows.to_string()).unwrap();
    meta
}

fn run(base: &Path, args: &[&str]) -> Output {
    let me = assert_cmd::cargo::cargo_bin!("annotation_reorg");
    Command::new(me)
        .env("ANNOTATION_REORG_CONFIG", base.join("no-config.xml"))
        .args(args)
        .output()
        .expect("spawn binary")
}

#[test]
fn missing_release_versions_is_a_usage_error() {
    let td = tempdir().unwrap();
    let out = run(td.path(), &["-r", "60", "-f", "/tmp"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn missing_species_directory_fails() {
    let td = tempdir().unwrap();
    let root = td.path().join("ftp");
    fs::create_dir_all(root.join("species")).unwrap();
    let meta = write_metadata(td.path(), serde_json::json!([]));

    let out = run(
        td.path(),
        &["-e", "110", "-r", "60", "-f", root.to_str().unwrap(), "-m", meta.to_str().unwrap()],
    );

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("timestamped"), "stderr: {stderr}");
}

#[test]
fn unsupported_metadata_scheme_fails() {
    let td = tempdir().unwrap();
    let root = ftp_root(td.path());
    let out = run(
        td.path(),
        &["-e", "110", "-r", "60", "-f", root.to_str().unwrap(), "-m", "mysql://ensro@host:3306"],
    );
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn empty_selection_only_fails_when_asked() {
    let td = tempdir().unwrap();
    let root = ftp_root(td.path());
    let meta = write_metadata(td.path(), serde_json::json!([]));
    let base = ["-e", "110", "-r", "60", "-f", root.to_str().unwrap(), "-m", meta.to_str().unwrap()];

    assert!(run(td.path(), &base).status.success());

    let mut strict = base.to_vec();
    strict.push("--fail-on-empty");
    assert_eq!(run(td.path(), &strict).status.code(), Some(1));
}

#[test]
fn full_run_relocates_and_writes_report() {
    let td = tempdir().unwrap();
    let root = ftp_root(td.path());
    let genome = root.join("species/Homo_sapiens/GCA_000001405.29/genome");
    fs::create_dir_all(&genome).unwrap();
    fs::write(genome.join("dna.fa"), "ACGT").unwrap();
    let meta = write_metadata(
        td.path(),
        serde_json::json!([
            {
                "assembly_accession": "GCA_000001405.29",
                "name": "homo_sapiens",
                "display_name": "Homo sapiens (Human)",
                "dbname": "homo_sapiens_core_110_38",
                "ensembl_version": 110,
                "ensembl_genomes_version": 60
            },
            {
                "assembly_accession": "GCA_9",
                "name": "old_species",
                "display_name": "Old species",
                "dbname": "old_species_core_100_1",
                "ensembl_version": 100,
                "ensembl_genomes_version": 50
            }
        ]),
    );
    let core = td.path().join("core");
    fs::create_dir_all(&core).unwrap();
    fs::write(
        core.join("homo_sapiens_core_110_38.json"),
        r#"{"species.annotation_source": "refseq", "genebuild.last_geneset_update": "2023-03"}"#,
    )
    .unwrap();
    let report = td.path().join("out/report.json");

    let out = run(
        td.path(),
        &[
            "-e", "110", "-r", "60",
            "-f", root.to_str().unwrap(),
            "-m", meta.to_str().unwrap(),
            "-c", core.to_str().unwrap(),
            "-t", "genome",
            "--report", report.to_str().unwrap(),
        ],
    );

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(root.join("species/Homo_sapiens/GCA_000001405.29/refseq/genome/dna.fa").is_file());
    assert!(root.join(".annotation_reorg.lock").is_file());
    annotation_reorg::fs_ops::RunLock::acquire(&root).unwrap();
    assert!(root.join(".annotation_reorg.ledger.jsonl").is_file());

    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    let species = parsed["species"].as_array().unwrap();
    assert_eq!(species.len(), 1);
    assert_eq!(species[0]["annotation_source"], "refseq");
    assert_eq!(species[0]["genebuild_update"], "2023_03");
    assert_eq!(species[0]["data_types"][0]["primary"]["status"], "renamed");
}

#[test]
fn dry_run_changes_nothing() {
    let td = tempdir().unwrap();
    let root = ftp_root(td.path());
    let genome = root.join("species/Mus_musculus/GCA_1/genome");
    fs::create_dir_all(&genome).unwrap();
    let meta = write_metadata(
        td.path(),
        serde_json::json!([{
            "assembly_accession": "GCA_1",
            "display_name": "Mus musculus",
            "dbname": "mus_musculus_core",
            "ensembl_version": 110,
            "ensembl_genomes_version": 60
        }]),
    );

    let out = run(
        td.path(),
        &["-e", "110", "-r", "60", "-f", root.to_str().unwrap(), "-m", meta.to_str().unwrap(), "--dry-run"],
    );

    assert!(out.status.success());
    assert!(genome.is_dir());
    assert!(!root.join("species/Mus_musculus/GCA_1/ensembl").exists());
    assert!(!root.join(".annotation_reorg.ledger.jsonl").exists());
}
