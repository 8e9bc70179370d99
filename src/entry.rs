//! Record name parsing and catalogue entries
//!
//! Schema ConfigMaps are named `<prefix><category-prefix><type>`, e.g.
//! `schema-component-schema-webservice`. KubeVela also keeps one ConfigMap
//! per definition revision (`...-webservice-v3`); those repeat the
//! unversioned schema and are dropped from the catalogue.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Outer prefix shared by every schema ConfigMap
pub const DEFAULT_RECORD_PREFIX: &str = "schema-";

/// Result of parsing one record name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedName {
    /// Record maps to a catalogue entry
    Entry { type_name: String, category: Category },
    /// Versioned duplicate or empty name
    Skip,
}

/// Parses record names into `(type name, category)` pairs
#[derive(Debug, Clone)]
pub struct RecordNameParser {
    prefix: String,
    version_suffix: Regex,
}

impl Default for RecordNameParser {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_PREFIX)
    }
}

impl RecordNameParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            version_suffix: Regex::new(r"-v[0-9]+$").expect("version suffix pattern is valid"),
        }
    }

    /// Remove the outer prefix, keeping the category prefix
    pub fn strip_prefix<'a>(&self, name: &'a str) -> &'a str {
        name.strip_prefix(self.prefix.as_str()).unwrap_or(name)
    }

    /// Parse a record name.
    ///
    /// Names that match no category prefix fall back to `component` with the
    /// stripped name used as-is; that branch never skips.
    pub fn parse(&self, name: &str) -> ParsedName {
        let stripped = self.strip_prefix(name);

        for category in Category::ALL {
            if let Some(type_name) = stripped.strip_prefix(category.record_prefix()) {
                if type_name.is_empty() || self.version_suffix.is_match(type_name) {
                    return ParsedName::Skip;
                }
                return ParsedName::Entry {
                    type_name: type_name.to_string(),
                    category,
                };
            }
        }

        if stripped.is_empty() {
            return ParsedName::Skip;
        }
        ParsedName::Entry {
            type_name: stripped.to_string(),
            category: Category::Component,
        }
    }

    /// File name for a record: `<stripped-record-name>-schema.json`
    pub fn file_name(&self, name: &str) -> String {
        format!("{}-schema.json", self.strip_prefix(name))
    }
}

/// One catalogue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEntry {
    /// Value a user writes in `type:`
    pub type_name: String,
    /// Per-type property schema file, unique across categories
    pub file_name: String,
    pub category: Category,
}

impl SchemaEntry {
    pub fn new(type_name: impl Into<String>, file_name: impl Into<String>, category: Category) -> Self {
        Self {
            type_name: type_name.into(),
            file_name: file_name.into(),
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(type_name: &str, category: Category) -> ParsedName {
        ParsedName::Entry {
            type_name: type_name.to_string(),
            category,
        }
    }

    #[test]
    fn test_category_prefixes() {
        let parser = RecordNameParser::default();
        assert_eq!(parser.parse("schema-component-schema-webservice"), entry("webservice", Category::Component));
        assert_eq!(parser.parse("schema-trait-schema-scaler"), entry("scaler", Category::Trait));
        assert_eq!(parser.parse("schema-policy-schema-topology"), entry("topology", Category::Policy));
        assert_eq!(
            parser.parse("schema-workflowstep-schema-deploy"),
            entry("deploy", Category::WorkflowStep)
        );
    }

    #[test]
    fn test_versioned_duplicates_skip() {
        let parser = RecordNameParser::default();
        assert_eq!(parser.parse("schema-component-schema-webservice-v1"), ParsedName::Skip);
        assert_eq!(parser.parse("schema-trait-schema-gateway-v12"), ParsedName::Skip);
        assert_eq!(parser.parse("schema-workflowstep-schema-notify-v0"), ParsedName::Skip);
    }

    #[test]
    fn test_non_digit_suffix_is_kept() {
        let parser = RecordNameParser::default();
        assert_eq!(
            parser.parse("schema-component-schema-webservice-vNext"),
            entry("webservice-vNext", Category::Component)
        );
        assert_eq!(parser.parse("schema-trait-schema-scaler-v"), entry("scaler-v", Category::Trait));
        assert_eq!(parser.parse("schema-trait-schema-scaler-v2a"), entry("scaler-v2a", Category::Trait));
        assert_eq!(parser.parse("schema-policy-schema-v2"), entry("v2", Category::Policy));
    }

    #[test]
    fn test_unmatched_prefix_falls_back_to_component() {
        let parser = RecordNameParser::default();
        assert_eq!(parser.parse("schema-custom-thing"), entry("custom-thing", Category::Component));
        assert_eq!(parser.parse("unprefixed-v2"), entry("unprefixed-v2", Category::Component));
        assert_eq!(parser.parse("schema-"), ParsedName::Skip);
        assert_eq!(parser.parse("schema-trait-schema-"), ParsedName::Skip);
    }

    #[test]
    fn test_file_name_keeps_category_prefix() {
        let parser = RecordNameParser::default();
        assert_eq!(
            parser.file_name("schema-component-schema-webservice"),
            "component-schema-webservice-schema.json"
        );
        assert_ne!(
            parser.file_name("schema-component-schema-gateway"),
            parser.file_name("schema-trait-schema-gateway")
        );
    }
}
