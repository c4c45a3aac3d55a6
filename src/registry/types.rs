use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `artifactType` discriminator the registry uses for model artifacts.
pub const MODEL_ARTIFACT_TYPE: &str = "model-artifact";

/// Custom properties attached to any registry entity.
///
/// Kept in a `BTreeMap` so pretty-printed dumps have a stable key order.
pub type CustomProperties = BTreeMap<String, MetadataValue>;

/// The four kinds of entity this tool resolves against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    RegisteredModel,
    ModelVersion,
    ModelArtifact,
    ServingEnvironment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::RegisteredModel => "registered model",
            EntityKind::ModelVersion => "model version",
            EntityKind::ModelArtifact => "model artifact",
            EntityKind::ServingEnvironment => "serving environment",
        };
        f.write_str(label)
    }
}

/// Typed metadata value stored in `customProperties`.
///
/// The registry encodes the variant in a `metadataType` field next to the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metadataType")]
pub enum MetadataValue {
    #[serde(rename = "MetadataStringValue")]
    String { string_value: String },
    /// int64 values travel as strings
    #[serde(rename = "MetadataIntValue")]
    Int { int_value: String },
    #[serde(rename = "MetadataDoubleValue")]
    Double { double_value: f64 },
    #[serde(rename = "MetadataBoolValue")]
    Bool { bool_value: bool },
}

impl MetadataValue {
    pub fn double(value: f64) -> Self {
        MetadataValue::Double { double_value: value }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Double { double_value } => Some(*double_value),
            _ => None,
        }
    }
}

/// Lifecycle state of a stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactState {
    Unknown,
    Pending,
    Live,
    MarkedForDeletion,
    Deleted,
    Abandoned,
    Reference,
}

/// Top-level named entity representing a family of model versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: CustomProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time_since_epoch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time_since_epoch: Option<String>,
}

/// A specific iteration of a registered model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Parent model; required by the registry when creating a version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: CustomProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time_since_epoch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time_since_epoch: Option<String>,
}

/// A concrete stored object (e.g. serialized weights) belonging to a model version.
///
/// The storage fields are what a serving runtime needs to locate the model:
/// `storage_key` names the data connection and `storage_path` the object inside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ArtifactState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_format_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_format_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: CustomProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time_since_epoch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time_since_epoch: Option<String>,
}

impl ModelArtifact {
    /// Artifacts listed under a version may include other artifact types; only
    /// untagged or `model-artifact` entries are model artifacts.
    pub fn is_model_artifact(&self) -> bool {
        self.artifact_type
            .as_deref()
            .map_or(true, |t| t == MODEL_ARTIFACT_TYPE)
    }
}

/// A named target runtime where an artifact can be deployed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingEnvironment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: CustomProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time_since_epoch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time_since_epoch: Option<String>,
}

/// One page of a list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_page_token: String,
    #[serde(default)]
    pub page_size: i32,
    #[serde(default)]
    pub size: i32,
}

/// Common view over the entity structs used by the resolver.
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> Option<&str>;
    fn name(&self) -> &str;
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl Entity for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

impl_entity!(RegisteredModel, EntityKind::RegisteredModel);
impl_entity!(ModelVersion, EntityKind::ModelVersion);
impl_entity!(ModelArtifact, EntityKind::ModelArtifact);
impl_entity!(ServingEnvironment, EntityKind::ServingEnvironment);
