//! End-to-end bundle generation
//!
//! Decodes the envelope, writes the per-type schemas, builds the merged
//! Application schema and collects every output file in one
//! [`ArtifactSet`]. Nothing touches the filesystem until the caller hands
//! the bundle to a sink, so a failure at any step leaves no partial output.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::builder::{grandparent_schema, MasterSchemaBuilder, APPLICATION_SCHEMA_FILE, GRANDPARENT_SCHEMA_FILE};
use crate::category::Category;
use crate::checksum::checksum_manifest;
use crate::config::{OutputFormat, VelaSchemasConfig};
use crate::entry::{RecordNameParser, SchemaEntry, DEFAULT_RECORD_PREFIX};
use crate::error::{Result, SchemaError};
use crate::payload::ClusterPayload;
use crate::sink::ArtifactSink;
use crate::writer::{write_schemas, Artifact, ArtifactSet, WriterOptions};

/// Options for [`generate`]
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub record_prefix: String,
    pub writer: WriterOptions,
    pub format: OutputFormat,
    /// Name of the sha256 manifest to add, if any
    pub checksum_file: Option<String>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            record_prefix: DEFAULT_RECORD_PREFIX.to_string(),
            writer: WriterOptions::default(),
            format: OutputFormat::Pretty,
            checksum_file: None,
        }
    }
}

impl From<&VelaSchemasConfig> for BundleOptions {
    fn from(config: &VelaSchemasConfig) -> Self {
        Self {
            record_prefix: config.records.prefix.clone(),
            writer: WriterOptions {
                content_key: config.records.content_key.clone(),
                check_type_schemas: config.validation.check_type_schemas,
            },
            format: config.output.format,
            checksum_file: config
                .output
                .include_checksums
                .then(|| config.output.checksum_file.clone()),
        }
    }
}

/// What went into a bundle
#[derive(Debug, Clone, Serialize)]
pub struct BundleSummary {
    pub generated_at: DateTime<Utc>,
    pub records: usize,
    pub entries: BTreeMap<Category, usize>,
    pub skipped_records: Vec<String>,
    pub invalid_type_schemas: Vec<String>,
    pub definitions_written: Vec<Category>,
    pub missing_sites: Vec<Category>,
    pub artifacts: usize,
}

/// A generated schema bundle
#[derive(Debug, Clone)]
pub struct Bundle {
    pub artifacts: ArtifactSet,
    pub catalogue: Vec<SchemaEntry>,
    pub summary: BundleSummary,
}

impl Bundle {
    /// Hand every artifact to `sink`
    pub fn write_to(&self, sink: &mut dyn ArtifactSink) -> Result<()> {
        sink.put_all(&self.artifacts)
    }
}

/// Generate a bundle from the envelope text
pub fn generate(envelope: &str, options: &BundleOptions) -> Result<Bundle> {
    let payload = ClusterPayload::from_json(envelope)?;
    generate_from_payload(&payload, options)
}

/// Generate a bundle from an already decoded payload
pub fn generate_from_payload(payload: &ClusterPayload, options: &BundleOptions) -> Result<Bundle> {
    let crd_schema = payload.crd_schema()?;
    let records = payload.records()?;
    if records.is_empty() {
        return Err(SchemaError::NoSchemasFound);
    }

    let parser = RecordNameParser::new(options.record_prefix.as_str());
    let files = write_schemas(&records, &parser, &options.writer);
    if files.catalogue.is_empty() {
        return Err(SchemaError::NoSchemasFound);
    }

    let master = MasterSchemaBuilder::new(&files.catalogue).build(crd_schema);

    let mut artifacts = files.artifacts;
    artifacts.insert(Artifact::new(
        APPLICATION_SCHEMA_FILE,
        render(options.format, &master.document)?,
    ));

    let mut definitions_written = Vec::new();
    for category in Category::ALL {
        if let Some(text) = payload.definition_text(category)? {
            artifacts.insert(Artifact::new(category.definition_file_name(), text));
            definitions_written.push(category);
        }
    }

    artifacts.insert(Artifact::new(
        GRANDPARENT_SCHEMA_FILE,
        render(options.format, &grandparent_schema())?,
    ));

    if let Some(name) = &options.checksum_file {
        let manifest = checksum_manifest(&artifacts);
        artifacts.insert(Artifact::new(name.clone(), manifest));
    }

    let mut entries = BTreeMap::new();
    for entry in &files.catalogue {
        *entries.entry(entry.category).or_insert(0) += 1;
    }

    let summary = BundleSummary {
        generated_at: Utc::now(),
        records: records.len(),
        entries,
        skipped_records: files.skipped,
        invalid_type_schemas: files.invalid,
        definitions_written,
        missing_sites: master.report.missing,
        artifacts: artifacts.len(),
    };
    info!(
        records = summary.records,
        entries = files.catalogue.len(),
        artifacts = summary.artifacts,
        "schema bundle generated"
    );

    Ok(Bundle {
        artifacts,
        catalogue: files.catalogue,
        summary,
    })
}

fn render(format: OutputFormat, value: &serde_json::Value) -> Result<String> {
    let mut text = format.render(value)?;
    text.push('\n');
    Ok(text)
}
