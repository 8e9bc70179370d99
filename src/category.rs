//! Definition categories and their fixed naming conventions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a KubeVela definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// ComponentDefinition (`components[].type`)
    Component,
    /// TraitDefinition (`components[].traits[].type`)
    Trait,
    /// PolicyDefinition (`policies[].type`)
    Policy,
    /// WorkflowStepDefinition (`workflow.steps[].type`)
    WorkflowStep,
}

impl Category {
    /// All categories, in prefix match order
    pub const ALL: [Category; 4] = [
        Category::Component,
        Category::Trait,
        Category::Policy,
        Category::WorkflowStep,
    ];

    /// Record name prefix that marks this category (after the outer prefix)
    pub fn record_prefix(&self) -> &'static str {
        match self {
            Category::Component => "component-schema-",
            Category::Trait => "trait-schema-",
            Category::Policy => "policy-schema-",
            Category::WorkflowStep => "workflowstep-schema-",
        }
    }

    /// Output file name of the definition-kind CRD schema
    pub fn definition_file_name(&self) -> &'static str {
        match self {
            Category::Component => "vela-componentdefinition-schema.json",
            Category::Trait => "vela-traitdefinition-schema.json",
            Category::Policy => "vela-policydefinition-schema.json",
            Category::WorkflowStep => "vela-workflowstepdefinition-schema.json",
        }
    }

    /// Key path from the Application CRD root to the array item schema.
    ///
    /// Traits are nested under the component item node, so their path is
    /// relative to that node rather than the root.
    pub fn item_path(&self) -> &'static [&'static str] {
        match self {
            Category::Component => &["properties", "spec", "properties", "components", "items"],
            Category::Trait => &["properties", "traits", "items"],
            Category::Policy => &["properties", "spec", "properties", "policies", "items"],
            Category::WorkflowStep => &[
                "properties", "spec", "properties", "workflow", "properties", "steps", "items",
            ],
        }
    }

    /// Short label used in logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Category::Component => "component",
            Category::Trait => "trait",
            Category::Policy => "policy",
            Category::WorkflowStep => "workflow-step",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
