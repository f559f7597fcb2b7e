//! Config module.
//! Provides the runtime configuration type, default paths, XML loading, and
//! validation of the release FTP root.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor, CONFIG_ENV_VAR};
pub use types::{Config, LogLevel};
pub use xml::{load_config_from_xml_path, load_xml_overrides, XmlConfig};

/// Metadata database name used when none is configured.
pub const METADATA_DBNAME_DEFAULT: &str = "ensembl_metadata_qrp";
