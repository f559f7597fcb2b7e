//! Relocation ledger.
//! JSON-lines record of (species, accession, data type) triples whose relocation
//! and link repair finished, so an interrupted run can be resumed without
//! touching completed work again.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::species::DataType;

pub const LEDGER_FILE_NAME: &str = ".annotation_reorg.ledger.jsonl";

/// Identity of one unit of completed work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    pub species: String,
    pub accession: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub key: LedgerKey,
    pub annotation_source: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    done: HashSet<LedgerKey>,
    file: Option<File>,
}

impl Ledger {
    /// Default location under the FTP root.
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(LEDGER_FILE_NAME)
    }

    /// Load completed keys from `path` (a missing file is an empty ledger).
    pub fn open(path: &Path) -> Result<Self> {
        let mut done = HashSet::new();
        if path.exists() {
            let f = File::open(path).with_context(|| format!("open ledger {}", path.display()))?;
            for (n, line) in BufReader::new(f).lines().enumerate() {
                let line = line.with_context(|| format!("read ledger {}", path.display()))?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<LedgerEntry>(&line) {
                    Ok(entry) => {
                        done.insert(entry.key);
                    }
                    Err(e) => warn!(path = %path.display(), line = n + 1, error = %e, "skipping malformed ledger line"),
                }
            }
        }
        debug!(path = %path.display(), entries = done.len(), "ledger loaded");
        Ok(Self {
            path: path.to_path_buf(),
            done,
            file: None,
        })
    }

    pub fn contains(&self, key: &LedgerKey) -> bool {
        self.done.contains(key)
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry and flush it to disk before returning.
    pub fn record(&mut self, key: LedgerKey, annotation_source: &str) -> Result<()> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("create ledger dir {}", parent.display()))?;
                }
            }
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .with_context(|| format!("open ledger {} for append", self.path.display()))?;
            self.file = Some(f);
        }
        let entry = LedgerEntry {
            key: key.clone(),
            annotation_source: annotation_source.to_string(),
            completed_at: Utc::now(),
        };
        let line = serde_json::to_string(&entry)?;
        if let Some(f) = self.file.as_mut() {
            writeln!(f, "{line}").with_context(|| format!("append ledger {}", self.path.display()))?;
            f.sync_data().with_context(|| format!("sync ledger {}", self.path.display()))?;
        }
        self.done.insert(key);
        Ok(())
    }
}
