//! KubeVela Schema Bundle
//!
//! Builds the JSON Schema files an editor needs to auto-complete KubeVela
//! `Application` manifests, from data captured off a running cluster.
//!
//! ## Inputs
//!
//! One JSON envelope holding the Application CRD's OpenAPI schema, the
//! ComponentDefinition / TraitDefinition / PolicyDefinition /
//! WorkflowStepDefinition CRD schemas, and the `schema-*` ConfigMaps in
//! which KubeVela stores each definition's parameter schema.
//!
//! ## Outputs
//!
//! ```text
//! schemas/
//! ├── component-schema-webservice-schema.json   # one per catalogued ConfigMap
//! ├── trait-schema-scaler-schema.json
//! ├── ...
//! ├── vela-application-schema.json              # CRD schema + type enums + if/then $refs
//! ├── vela-componentdefinition-schema.json      # when present on the cluster
//! ├── vela-traitdefinition-schema.json
//! ├── vela-policydefinition-schema.json
//! ├── vela-workflowstepdefinition-schema.json
//! └── vela-grandparent-schema.json              # anyOf over the five above
//! ```

pub mod builder;
pub mod bundle;
pub mod category;
pub mod checksum;
pub mod config;
pub mod drift;
pub mod entry;
pub mod error;
pub mod payload;
pub mod sink;
pub mod tree;
pub mod writer;

pub use builder::{MasterSchema, MasterSchemaBuilder, APPLICATION_SCHEMA_FILE, GRANDPARENT_SCHEMA_FILE, SCHEMA_DIALECT};
pub use bundle::{generate, Bundle, BundleOptions, BundleSummary};
pub use category::Category;
pub use checksum::Checksum;
pub use config::{OutputFormat, VelaSchemasConfig};
pub use drift::{check_directory, DriftReport};
pub use entry::{ParsedName, RecordNameParser, SchemaEntry};
pub use error::{Result, SchemaError};
pub use payload::{ClusterPayload, SchemaRecord};
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
pub use writer::{write_schemas, Artifact, ArtifactSet};
