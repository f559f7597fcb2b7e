//! Application runner.
//! Merges XML config and flags, initializes logging, installs the signal handler,
//! validates the FTP root, takes the run lock and drives the reorganizer.

use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use annotation_reorg::cli::Args;
use annotation_reorg::config::load_xml_overrides;
use annotation_reorg::output as out;
use annotation_reorg::{
    shutdown, AnnotationLookup, BatchReport, Config, DefaultAnnotationLookup, JsonCoreMetaStore, JsonMetadataStore,
    MetadataResolver, Reorganizer, ReorgError, RunLock,
};

use crate::logging::init_tracing;

/// Run the CLI application and map the outcome to a process exit code.
pub fn run(args: Args) -> ExitCode {
    // Build config before logging so a bad config file is reported plainly.
    let mut cfg = Config::default();
    match load_xml_overrides() {
        Ok(Some((path, xml))) => {
            if let Err(e) = xml.apply_to(&mut cfg) {
                out::print_error(&format!("Invalid config file {}: {e:#}", path.display()));
                return ExitCode::FAILURE;
            }
        }
        Ok(None) => {}
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    }
    args.apply_overrides(&mut cfg);

    let guard_opt = match init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json) {
        Ok(g) => g,
        Err(e) => {
            out::print_error(&format!("Failed to initialize logging: {e}"));
            return ExitCode::FAILURE;
        }
    };

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        if let Err(e) = ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; finishing the current step and stopping...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        }) {
            warn!(error = %e, "failed to install signal handler; Ctrl-C will abort immediately");
        }
    }

    debug!("Starting annotation_reorg: {:?}", args);

    let code = match execute(&mut cfg) {
        Ok(report) => exit_code_for(&cfg, &report),
        Err(e) => {
            match e.downcast_ref::<ReorgError>() {
                Some(re) => error!(code = re.code(), kind = re.kind(), "{e:#}"),
                None => error!(error = ?e, "Run failed"),
            }
            out::print_error(&format!("{e:#}"));
            match e.downcast_ref::<ReorgError>() {
                Some(ReorgError::Interrupted) => ExitCode::from(130),
                _ => ExitCode::FAILURE,
            }
        }
    };

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    code
}

fn execute(cfg: &mut Config) -> Result<BatchReport> {
    cfg.validate()?;
    cfg.ftp_path = dunce::canonicalize(&cfg.ftp_path)
        .with_context(|| format!("canonicalize ftp path {}", cfg.ftp_path.display()))?;

    let metadata_url = cfg
        .metadata_url
        .clone()
        .ok_or_else(|| ReorgError::Precondition("no metadata url configured (-m/--metadata-url)".into()))?;
    let resolver = JsonMetadataStore::new(&metadata_url, &cfg.metadata_dbname)?;
    let lookup: Box<dyn AnnotationLookup> = match cfg.coredb_url.as_deref() {
        Some(url) => Box::new(JsonCoreMetaStore::new(url)?),
        None => {
            info!("no core database location given; every species uses the default annotation source");
            Box::new(DefaultAnnotationLookup)
        }
    };

    let _lock = if cfg.dry_run { None } else { Some(RunLock::acquire(&cfg.ftp_path)?) };

    let filter = cfg.metadata_filter();
    let species = resolver.species(&filter)?;
    let mut reorganizer = Reorganizer::from_config(cfg, &*lookup)?;
    let report = reorganizer.run(species);

    if report.no_species_matched {
        error!(
            code = filter.no_match_error().code(),
            kind = filter.no_match_error().kind(),
            "{}",
            filter.no_match_error()
        );
    }
    out::print_batch_summary(&report);
    if let Some(path) = &cfg.report_path {
        report.write_json(path)?;
        info!(report = %path.display(), "Batch report written");
    }
    Ok(report)
}

fn exit_code_for(cfg: &Config, report: &BatchReport) -> ExitCode {
    if report.interrupted {
        return ExitCode::from(130);
    }
    if report.no_species_matched && cfg.fail_on_empty {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
