//! Cluster payload decoding
//!
//! The fetch step hands over one JSON envelope holding the Application CRD
//! schema, the four definition-kind CRD schemas and the list of schema
//! ConfigMaps. Sub-documents stay as raw JSON until a later phase asks for
//! them, so a malformed record list is reported as such rather than as a
//! broken envelope.

use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::category::Category;
use crate::error::{Result, SchemaError};

/// Decode phase labels carried by [`SchemaError::Decode`]
pub mod phase {
    pub const ENVELOPE: &str = "envelope";
    pub const CRD_SCHEMA: &str = "application CRD schema";
    pub const RECORD_LIST: &str = "schema record list";
    pub const DEFINITION: &str = "definition schema";
}

/// Keys written by the fetch script:
/// `{"crd_schema":..,"config_maps":..,"comp_def_schema":..,"trait_def_schema":..,
/// "policy_def_schema":..,"workflow_step_def_schema":..}`
#[derive(Deserialize)]
struct Envelope {
    crd_schema: Box<RawValue>,
    config_maps: Box<RawValue>,
    #[serde(default)]
    comp_def_schema: Option<Box<RawValue>>,
    #[serde(default)]
    trait_def_schema: Option<Box<RawValue>>,
    #[serde(default)]
    policy_def_schema: Option<Box<RawValue>>,
    #[serde(default)]
    workflow_step_def_schema: Option<Box<RawValue>>,
}

/// The decoded envelope. Read-only once constructed.
#[derive(Debug)]
pub struct ClusterPayload {
    crd_schema: Box<RawValue>,
    definitions: BTreeMap<Category, Box<RawValue>>,
    records: Box<RawValue>,
}

impl ClusterPayload {
    /// Decode the envelope text produced by the fetch step
    pub fn from_json(text: &str) -> Result<Self> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| SchemaError::decode(phase::ENVELOPE, e))?;

        let definitions = [
            (Category::Component, envelope.comp_def_schema),
            (Category::Trait, envelope.trait_def_schema),
            (Category::Policy, envelope.policy_def_schema),
            (Category::WorkflowStep, envelope.workflow_step_def_schema),
        ]
        .into_iter()
        .filter_map(|(category, raw)| raw.map(|raw| (category, raw)))
        .collect();

        Ok(Self {
            crd_schema: envelope.crd_schema,
            definitions,
            records: envelope.config_maps,
        })
    }

    /// Parse a fresh copy of the Application CRD schema tree
    pub fn crd_schema(&self) -> Result<Value> {
        let value: Value = serde_json::from_str(self.crd_schema.get())
            .map_err(|e| SchemaError::decode(phase::CRD_SCHEMA, e))?;
        if !value.is_object() {
            return Err(SchemaError::InvalidDefinition {
                kind: "application".to_string(),
                reason: format!("expected an object, found {}", json_kind(&value)),
            });
        }
        Ok(value)
    }

    /// Raw text of a definition-kind schema, if it carries anything.
    ///
    /// JSON null, an empty object and an empty string all count as absent.
    /// Any other non-object value is rejected.
    pub fn definition_text(&self, category: Category) -> Result<Option<&str>> {
        let Some(raw) = self.definitions.get(&category) else {
            return Ok(None);
        };

        let value: Value = serde_json::from_str(raw.get())
            .map_err(|e| SchemaError::decode(phase::DEFINITION, e))?;
        match value {
            Value::Null => Ok(None),
            Value::Object(map) if map.is_empty() => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::Object(_) => Ok(Some(raw.get())),
            other => Err(SchemaError::InvalidDefinition {
                kind: category.label().to_string(),
                reason: format!("expected an object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Decode the schema record list.
    ///
    /// Accepts the list document itself or a JSON string that contains it.
    pub fn records(&self) -> Result<Vec<SchemaRecord>> {
        let raw = self.records.get();
        let list: RecordList = if raw.trim_start().starts_with('"') {
            let inner: String = serde_json::from_str(raw)
                .map_err(|e| SchemaError::decode(phase::RECORD_LIST, e))?;
            serde_json::from_str(&inner).map_err(|e| SchemaError::decode(phase::RECORD_LIST, e))?
        } else {
            serde_json::from_str(raw).map_err(|e| SchemaError::decode(phase::RECORD_LIST, e))?
        };
        Ok(list.items)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `{"items": [...]}` wrapper returned by `kubectl get configmap -o json`
#[derive(Debug, Deserialize)]
pub struct RecordList {
    #[serde(default)]
    pub items: Vec<SchemaRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordMetadata {
    pub name: String,
}

/// One ConfigMap-like record holding a per-type property schema
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaRecord {
    pub metadata: RecordMetadata,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl SchemaRecord {
    /// Create a record with a single content entry
    pub fn new(name: impl Into<String>, key: impl Into<String>, content: impl Into<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(key.into(), content.into());
        Self {
            metadata: RecordMetadata { name: name.into() },
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Content under `key`, if present and non-empty
    pub fn content(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str).filter(|s| !s.is_empty())
    }
}
