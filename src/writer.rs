//! Per-type schema files and the ordered catalogue
//!
//! A record becomes one artifact named after the record only when it also
//! becomes a catalogue entry. Records without content, versioned duplicates
//! and repeats of an already catalogued type produce neither, so every file
//! in the set is referenced by exactly one entry.

use std::collections::{BTreeMap, HashSet};

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::{debug, warn};

use crate::checksum::Checksum;
use crate::entry::{ParsedName, RecordNameParser, SchemaEntry};
use crate::payload::SchemaRecord;

/// Key under which a schema ConfigMap stores the property schema
pub const DEFAULT_CONTENT_KEY: &str = "openapi-v3-json-schema";

/// A named output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub content: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn checksum(&self) -> Checksum {
        Checksum::from_str(&self.content)
    }
}

/// Artifacts addressed by file name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    files: BTreeMap<String, String>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an artifact
    pub fn insert(&mut self, artifact: Artifact) {
        self.files.insert(artifact.name, artifact.content);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Artifacts in name order
    pub fn iter(&self) -> impl Iterator<Item = Artifact> + '_ {
        self.files
            .iter()
            .map(|(name, content)| Artifact::new(name.clone(), content.clone()))
    }
}

/// Options for [`write_schemas`]
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub content_key: String,
    /// Compile each property schema and report the ones that fail
    pub check_type_schemas: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            content_key: DEFAULT_CONTENT_KEY.to_string(),
            check_type_schemas: true,
        }
    }
}

/// Output of the schema writer
#[derive(Debug, Clone, Default)]
pub struct SchemaFiles {
    pub artifacts: ArtifactSet,
    pub catalogue: Vec<SchemaEntry>,
    /// Records that produced no catalogue entry
    pub skipped: Vec<String>,
    /// File names whose content did not compile as a JSON Schema
    pub invalid: Vec<String>,
}

/// Turn schema records into per-type artifacts and the catalogue
pub fn write_schemas(
    records: &[SchemaRecord],
    parser: &RecordNameParser,
    options: &WriterOptions,
) -> SchemaFiles {
    let mut out = SchemaFiles::default();
    let mut seen = HashSet::new();

    for record in records {
        let name = record.name();
        let Some(content) = record.content(&options.content_key) else {
            warn!(record = name, key = %options.content_key, "record has no schema content");
            out.skipped.push(name.to_string());
            continue;
        };

        let (type_name, category) = match parser.parse(name) {
            ParsedName::Entry { type_name, category } => (type_name, category),
            ParsedName::Skip => {
                debug!(record = name, "versioned or empty name, skipping");
                out.skipped.push(name.to_string());
                continue;
            }
        };
        if !seen.insert((category, type_name.clone())) {
            debug!(record = name, %category, %type_name, "duplicate type, skipping");
            out.skipped.push(name.to_string());
            continue;
        }

        let file_name = parser.file_name(name);
        if options.check_type_schemas {
            if let Err(reason) = check_type_schema(content) {
                warn!(file = %file_name, %reason, "property schema is not a valid JSON Schema");
                out.invalid.push(file_name.clone());
            }
        }
        debug!(record = name, %category, %type_name, "catalogued");
        out.artifacts.insert(Artifact::new(file_name.clone(), content));
        out.catalogue.push(SchemaEntry::new(type_name, file_name, category));
    }

    out
}

/// Parse and compile a property schema as draft 7
pub fn check_type_schema(content: &str) -> Result<(), String> {
    let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&value)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
