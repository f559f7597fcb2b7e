//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Values found in the file override defaults; CLI flags later override both.
//!
//! Notes:
//! - Unknown XML fields are an error so misspelled settings surface early.
//! - A missing file is not an error; the run proceeds on defaults and flags.

use anyhow::{bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::default_config_path;
use super::types::{Config, LogLevel};
use crate::fs_ops::{ExistingTarget, Strategy};
use crate::species::DataType;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
pub struct XmlConfig {
    pub ftp_path: Option<String>,
    pub metadata_url: Option<String>,
    pub metadata_dbname: Option<String>,
    pub coredb_url: Option<String>,
    /// Whitespace or comma separated list
    pub data_types: Option<String>,
    pub strategy: Option<String>,
    pub existing_target: Option<String>,
    #[serde(default, deserialize_with = "de_bool_trimmed_opt")]
    pub ledger: Option<bool>,
    pub ledger_path: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

// quick-xml hands over element text untrimmed; accept " true " etc.
fn de_bool_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    opt.map(|s| match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid boolean '{other}'"))),
    })
    .transpose()
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_data_types(raw: &str) -> Result<Vec<DataType>> {
    let mut out = Vec::new();
    for token in raw.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
        let dt: DataType = token.parse().map_err(anyhow::Error::msg)?;
        if !out.contains(&dt) {
            out.push(dt);
        }
    }
    if out.is_empty() {
        bail!("data_types lists no data type");
    }
    Ok(out)
}

fn parse_value_enum<T: clap::ValueEnum>(field: &str, raw: &str) -> Result<T> {
    T::from_str(raw, true).map_err(|e| anyhow::anyhow!("invalid {field} '{raw}': {e}"))
}

impl XmlConfig {
    /// Overlay the values present in the file onto `cfg`.
    pub fn apply_to(&self, cfg: &mut Config) -> Result<()> {
        if let Some(v) = non_empty(&self.ftp_path) {
            cfg.ftp_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty(&self.metadata_url) {
            cfg.metadata_url = Some(v.to_string());
        }
        if let Some(v) = non_empty(&self.metadata_dbname) {
            cfg.metadata_dbname = v.to_string();
        }
        if let Some(v) = non_empty(&self.coredb_url) {
            cfg.coredb_url = Some(v.to_string());
        }
        if let Some(v) = non_empty(&self.data_types) {
            cfg.data_types = parse_data_types(v)?;
        }
        if let Some(v) = non_empty(&self.strategy) {
            cfg.strategy = parse_value_enum::<Strategy>("strategy", v)?;
        }
        if let Some(v) = non_empty(&self.existing_target) {
            cfg.existing_target = parse_value_enum::<ExistingTarget>("existing_target", v)?;
        }
        if let Some(v) = self.ledger {
            cfg.ledger = v;
        }
        if let Some(v) = non_empty(&self.ledger_path) {
            cfg.ledger_path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty(&self.log_level) {
            cfg.log_level = v.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = non_empty(&self.log_file) {
            cfg.log_file = Some(PathBuf::from(v));
        }
        Ok(())
    }
}

/// Parse an XML config file.
pub fn load_config_from_xml_path(path: &Path) -> Result<XmlConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig =
        from_xml_str(&contents).with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(parsed)
}

/// Load the config file from the default location, if there is one.
pub fn load_xml_overrides() -> Result<Option<(PathBuf, XmlConfig)>> {
    let path = match default_config_path() {
        Ok(p) => p,
        Err(e) => {
            debug!(error = %e, "no config path available");
            return Ok(None);
        }
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(None);
    }
    let parsed = load_config_from_xml_path(&path)?;
    Ok(Some((path, parsed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_lists_accept_commas_and_spaces() {
        assert_eq!(
            parse_data_types("genome, geneset\n rnaseq").unwrap(),
            vec![DataType::Genome, DataType::Geneset, DataType::Rnaseq]
        );
        assert!(parse_data_types("proteins").is_err());
        assert!(parse_data_types(" , ").is_err());
    }

    #[test]
    fn applies_only_present_values() {
        let xml = XmlConfig {
            ftp_path: Some(" /ftp ".into()),
            strategy: Some("copy".into()),
            ledger: Some(false),
            ..Default::default()
        };
        let mut cfg = Config::default();
        xml.apply_to(&mut cfg).unwrap();
        assert_eq!(cfg.ftp_path, PathBuf::from("/ftp"));
        assert_eq!(cfg.strategy, Strategy::Copy);
        assert!(!cfg.ledger);
        assert_eq!(cfg.existing_target, ExistingTarget::Merge);
        assert_eq!(cfg.metadata_dbname, "ensembl_metadata_qrp");
    }
}
