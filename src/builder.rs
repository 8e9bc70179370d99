//! Master schema builder
//!
//! Injects the catalogue into the Application CRD schema so an editor can
//! offer `type` completions and switch to the per-type property schema once
//! a type is chosen. Four injection sites exist:
//!
//! ```text
//! spec.components[]            <- component entries
//! spec.components[].traits[]   <- trait entries (only if components[] resolved)
//! spec.policies[]              <- policy entries
//! spec.workflow.steps[]        <- workflow-step entries
//! ```
//!
//! A site that does not resolve in the base schema is skipped. Each site
//! touches only its own item node, so sites never interfere.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::category::Category;
use crate::entry::SchemaEntry;
use crate::tree;

/// JSON Schema dialect stamped on generated documents
pub const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";

/// File name of the merged Application schema
pub const APPLICATION_SCHEMA_FILE: &str = "vela-application-schema.json";

/// File name of the top-level routing document
pub const GRANDPARENT_SCHEMA_FILE: &str = "vela-grandparent-schema.json";

/// Key of the composition-rule list on an item node
const COMPOSITION_KEY: &str = "allOf";

/// Which injection sites resolved in the base schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    pub resolved: Vec<Category>,
    pub missing: Vec<Category>,
}

/// The merged Application schema
#[derive(Debug, Clone)]
pub struct MasterSchema {
    pub document: Value,
    pub report: InjectionReport,
}

/// Builds the merged Application schema from a base CRD schema
pub struct MasterSchemaBuilder<'a> {
    catalogue: &'a [SchemaEntry],
}

impl<'a> MasterSchemaBuilder<'a> {
    pub fn new(catalogue: &'a [SchemaEntry]) -> Self {
        Self { catalogue }
    }

    fn entries(&self, category: Category) -> Vec<&'a SchemaEntry> {
        self.catalogue.iter().filter(|e| e.category == category).collect()
    }

    /// Inject every site into `base` and stamp the dialect marker
    pub fn build(&self, mut base: Value) -> MasterSchema {
        let mut report = InjectionReport::default();

        for category in [Category::Component, Category::Policy, Category::WorkflowStep] {
            let path = category.item_path();
            let Some(node) = tree::value_at_mut(&mut base, path).filter(|v| v.is_object()) else {
                debug!(site = %category, path = %tree::display_path(path), "injection site not found");
                report.missing.push(category);
                if category == Category::Component {
                    report.missing.push(Category::Trait);
                }
                continue;
            };

            self.inject(node, category);
            report.resolved.push(category);

            if category == Category::Component {
                let trait_path = Category::Trait.item_path();
                match tree::value_at_mut(node, trait_path).filter(|v| v.is_object()) {
                    Some(trait_node) => {
                        self.inject(trait_node, Category::Trait);
                        report.resolved.push(Category::Trait);
                    }
                    None => {
                        debug!(site = %Category::Trait, path = %tree::display_path(trait_path), "injection site not found");
                        report.missing.push(Category::Trait);
                    }
                }
            }
        }

        if let Some(root) = base.as_object_mut() {
            root.insert("$schema".to_string(), Value::String(SCHEMA_DIALECT.to_string()));
        }

        MasterSchema {
            document: base,
            report,
        }
    }

    fn inject(&self, node: &mut Value, category: Category) {
        let Some(node) = node.as_object_mut() else {
            return;
        };
        let entries = self.entries(category);
        debug!(site = %category, entries = entries.len(), "injecting");

        if let Some(props) = node.get_mut("properties").and_then(Value::as_object_mut) {
            // The passthrough `properties` placeholder would shadow the
            // per-type schemas in completion lists.
            if !entries.is_empty() {
                props.remove("properties");
            }
            if let Some(type_field) = props.get_mut("type").and_then(Value::as_object_mut) {
                let names = entries
                    .iter()
                    .map(|e| Value::String(e.type_name.clone()))
                    .collect();
                type_field.insert("enum".to_string(), Value::Array(names));
            }
        }

        if entries.is_empty() {
            return;
        }
        let rules = entries.iter().map(|e| composition_rule(e));
        append_rules(node, rules);
    }
}

/// `if type == <name> then properties.properties: $ref <file>`
pub fn composition_rule(entry: &SchemaEntry) -> Value {
    json!({
        "if": {
            "required": ["type"],
            "properties": {
                "type": { "const": entry.type_name }
            }
        },
        "then": {
            "properties": {
                "properties": { "$ref": entry.file_name }
            }
        }
    })
}

fn append_rules(node: &mut Map<String, Value>, rules: impl Iterator<Item = Value>) {
    let existing = node
        .entry(COMPOSITION_KEY)
        .or_insert_with(|| Value::Array(Vec::new()));
    if !existing.is_array() {
        let previous = existing.take();
        *existing = Value::Array(vec![previous]);
    }
    if let Value::Array(list) = existing {
        list.extend(rules);
    }
}

/// Routing document referencing the Application schema and all four
/// definition-kind schemas, whether or not they were written
pub fn grandparent_schema() -> Value {
    let refs: Vec<Value> = std::iter::once(APPLICATION_SCHEMA_FILE)
        .chain(Category::ALL.iter().map(|c| c.definition_file_name()))
        .map(|file| json!({ "$ref": file }))
        .collect();
    json!({
        "$schema": SCHEMA_DIALECT,
        "anyOf": refs
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_base() -> Value {
        json!({
            "properties": {
                "spec": {
                    "properties": {
                        "components": {
                            "items": {
                                "properties": {
                                    "type": {"type": "string"},
                                    "properties": {"x-kubernetes-preserve-unknown-fields": true},
                                    "traits": {
                                        "items": {
                                            "properties": {
                                                "type": {"type": "string"},
                                                "properties": {}
                                            }
                                        }
                                    }
                                },
                                "allOf": [{"required": ["name"]}]
                            }
                        },
                        "policies": {
                            "items": {"properties": {"type": {}}}
                        },
                        "workflow": {
                            "properties": {
                                "steps": {"items": {"properties": {"type": {}}}}
                            }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_enums_per_site_in_order() {
        let catalogue = vec![
            SchemaEntry::new("a", "fileA", Category::Component),
            SchemaEntry::new("b", "fileB", Category::Trait),
            SchemaEntry::new("c", "fileC", Category::Component),
            SchemaEntry::new("p", "fileP", Category::Policy),
            SchemaEntry::new("s", "fileS", Category::WorkflowStep),
        ];
        let master = MasterSchemaBuilder::new(&catalogue).build(full_base());
        let doc = &master.document;
        let component = &doc["properties"]["spec"]["properties"]["components"]["items"];

        assert_eq!(component["properties"]["type"]["enum"], json!(["a", "c"]));
        assert_eq!(
            component["properties"]["traits"]["items"]["properties"]["type"]["enum"],
            json!(["b"])
        );
        assert_eq!(
            doc["properties"]["spec"]["properties"]["policies"]["items"]["properties"]["type"]["enum"],
            json!(["p"])
        );
        assert_eq!(
            doc["properties"]["spec"]["properties"]["workflow"]["properties"]["steps"]["items"]["properties"]["type"]["enum"],
            json!(["s"])
        );
        assert_eq!(doc["$schema"], json!(SCHEMA_DIALECT));
        assert!(master.report.missing.is_empty());
        assert_eq!(master.report.resolved.len(), 4);
    }

    #[test]
    fn test_rules_appended_after_existing() {
        let catalogue = vec![
            SchemaEntry::new("a", "fileA", Category::Component),
            SchemaEntry::new("c", "fileC", Category::Component),
        ];
        let master = MasterSchemaBuilder::new(&catalogue).build(full_base());
        let rules = master.document["properties"]["spec"]["properties"]["components"]["items"]["allOf"]
            .as_array()
            .unwrap()
            .clone();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0], json!({"required": ["name"]}));
        assert_eq!(rules[1]["if"]["properties"]["type"]["const"], json!("a"));
        assert_eq!(rules[1]["if"]["required"], json!(["type"]));
        assert_eq!(rules[1]["then"]["properties"]["properties"]["$ref"], json!("fileA"));
        assert_eq!(rules[2]["then"]["properties"]["properties"]["$ref"], json!("fileC"));
    }

    #[test]
    fn test_placeholder_removed_when_types_injected() {
        let catalogue = vec![
            SchemaEntry::new("a", "fileA", Category::Component),
            SchemaEntry::new("b", "fileB", Category::Trait),
        ];
        let master = MasterSchemaBuilder::new(&catalogue).build(full_base());
        let component = &master.document["properties"]["spec"]["properties"]["components"]["items"];
        assert!(component["properties"].get("properties").is_none());
        assert!(component["properties"]["traits"]["items"]["properties"]
            .get("properties")
            .is_none());
        assert!(component["properties"].get("traits").is_some());
    }

    #[test]
    fn test_empty_catalogue_only_adds_enums_and_dialect() {
        let base = full_base();
        let master = MasterSchemaBuilder::new(&[]).build(base.clone());

        let mut expected = base;
        for path in [
            &["properties", "spec", "properties", "components", "items", "properties", "type"][..],
            &["properties", "spec", "properties", "components", "items", "properties", "traits", "items", "properties", "type"][..],
            &["properties", "spec", "properties", "policies", "items", "properties", "type"][..],
            &["properties", "spec", "properties", "workflow", "properties", "steps", "items", "properties", "type"][..],
        ] {
            tree::value_at_mut(&mut expected, path)
                .and_then(Value::as_object_mut)
                .unwrap()
                .insert("enum".into(), json!([]));
        }
        expected
            .as_object_mut()
            .unwrap()
            .insert("$schema".into(), json!(SCHEMA_DIALECT));

        assert_eq!(master.document, expected);
    }

    #[test]
    fn test_missing_policy_site_is_skipped() {
        let mut base = full_base();
        base["properties"]["spec"]["properties"]
            .as_object_mut()
            .unwrap()
            .remove("policies");
        let catalogue = vec![
            SchemaEntry::new("p", "fileP", Category::Policy),
            SchemaEntry::new("a", "fileA", Category::Component),
        ];
        let master = MasterSchemaBuilder::new(&catalogue).build(base);

        assert_eq!(master.report.missing, vec![Category::Policy]);
        assert!(master.document["properties"]["spec"]["properties"].get("policies").is_none());
        let text = serde_json::to_string(&master.document).unwrap();
        assert!(!text.contains("fileP"));
    }

    #[test]
    fn test_traits_need_components_site() {
        let base = json!({
            "properties": {"spec": {"properties": {
                "traits": {"items": {"properties": {"type": {}}}}
            }}}
        });
        let catalogue = vec![SchemaEntry::new("b", "fileB", Category::Trait)];
        let master = MasterSchemaBuilder::new(&catalogue).build(base);

        assert!(master.report.missing.contains(&Category::Component));
        assert!(master.report.missing.contains(&Category::Trait));
        assert_eq!(
            master.document["properties"]["spec"]["properties"]["traits"]["items"]["properties"]["type"],
            json!({})
        );
    }

    #[test]
    fn test_non_array_composition_list_is_kept() {
        let base = json!({
            "properties": {"spec": {"properties": {"policies": {"items": {
                "properties": {"type": {}},
                "allOf": {"required": ["name"]}
            }}}}}
        });
        let catalogue = vec![SchemaEntry::new("p", "fileP", Category::Policy)];
        let master = MasterSchemaBuilder::new(&catalogue).build(base);
        let rules = &master.document["properties"]["spec"]["properties"]["policies"]["items"]["allOf"];
        assert_eq!(rules[0], json!({"required": ["name"]}));
        assert_eq!(rules[1]["if"]["properties"]["type"]["const"], json!("p"));
    }

    #[test]
    fn test_grandparent_references_all_outputs() {
        let doc = grandparent_schema();
        let refs: Vec<_> = doc["anyOf"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["$ref"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            refs,
            vec![
                "vela-application-schema.json",
                "vela-componentdefinition-schema.json",
                "vela-traitdefinition-schema.json",
                "vela-policydefinition-schema.json",
                "vela-workflowstepdefinition-schema.json",
            ]
        );
        assert_eq!(doc["$schema"], json!(SCHEMA_DIALECT));
    }
}
