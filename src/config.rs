//! Configuration management for bundle generation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (vela-schemas.toml)
//! - Environment variables (VELA_SCHEMAS__*)
//!
//! ## Example config file (vela-schemas.toml):
//! ```toml
//! [output]
//! dir = "./schemas"
//! format = "pretty"
//! include_checksums = true
//!
//! [records]
//! prefix = "schema-"
//! content_key = "openapi-v3-json-schema"
//!
//! [validation]
//! check_type_schemas = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::entry::DEFAULT_RECORD_PREFIX;
use crate::writer::DEFAULT_CONTENT_KEY;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VelaSchemasConfig {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Schema record conventions
    #[serde(default)]
    pub records: RecordsConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the generated files
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// JSON layout of generated documents
    #[serde(default)]
    pub format: OutputFormat,

    /// Write a sha256 manifest next to the schemas
    #[serde(default)]
    pub include_checksums: bool,

    /// Name of the sha256 manifest
    #[serde(default = "default_checksum_file")]
    pub checksum_file: String,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    /// Serialize a document in this format
    pub fn render(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(OutputFormat::Pretty),
            "compact" => Ok(OutputFormat::Compact),
            other => Err(format!("unknown output format '{}' (expected pretty or compact)", other)),
        }
    }
}

/// Naming conventions of the schema ConfigMaps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Outer prefix stripped from every record name
    #[serde(default = "default_record_prefix")]
    pub prefix: String,

    /// Data key holding the property schema
    #[serde(default = "default_content_key")]
    pub content_key: String,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Compile each per-type schema and warn on failures
    #[serde(default = "default_true")]
    pub check_type_schemas: bool,
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_checksum_file() -> String {
    "vela-schemas.sha256".to_string()
}

fn default_record_prefix() -> String {
    DEFAULT_RECORD_PREFIX.to_string()
}

fn default_content_key() -> String {
    DEFAULT_CONTENT_KEY.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::Pretty,
            include_checksums: false,
            checksum_file: default_checksum_file(),
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            prefix: default_record_prefix(),
            content_key: default_content_key(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_type_schemas: true,
        }
    }
}

impl VelaSchemasConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering a specific file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "vela-schemas.toml",
            ".vela-schemas.toml",
            "config/vela-schemas.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "kubevela", "vela-schemas") {
            let xdg_config = config_dir.config_dir().join("vela-schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // VELA_SCHEMAS__OUTPUT__DIR etc.
        builder = builder.add_source(
            Environment::with_prefix("VELA_SCHEMAS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Output directory, resolved against the current directory
    pub fn output_dir(&self) -> PathBuf {
        if self.output.dir.is_absolute() {
            self.output.dir.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.output.dir)
        }
    }
}
