use std::io::Write;
use tracing::info;

use crate::display::print_entity;
use crate::error::CommandError;
use crate::registry::{
    ArtifactState, CustomProperties, EntityKind, MetadataValue, ModelArtifact, ModelRegistryApi, ModelVersion,
    RegisteredModel,
};
use crate::resolver::{Resolved, Resolver};

/// Custom property attached to every newly created version.
pub const SCORE_PROPERTY: &str = "score";

/// Deterministic artifact name for a version, so re-registering a version
/// always targets the same artifact.
pub fn artifact_name(version_name: &str) -> String {
    format!("{}/binary-model", version_name)
}

/// Inputs of `register`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterConfig {
    pub model_name: String,
    pub model_description: String,
    pub version_name: String,
    pub version_description: String,
    pub format_name: String,
    pub format_version: String,
    pub storage_key: String,
    pub storage_path: String,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            model_name: String::new(),
            model_description: String::new(),
            version_name: String::new(),
            version_description: String::new(),
            format_name: "onnx".to_string(),
            format_version: "1".to_string(),
            storage_key: "aws-connection-models".to_string(),
            storage_path: String::new(),
        }
    }
}

impl RegisterConfig {
    pub fn validate(&self) -> Result<(), CommandError> {
        if self.model_name.is_empty() || self.version_name.is_empty() {
            return Err(CommandError::Precondition(
                "[model, version] are mandatory and cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn model_template(&self) -> RegisteredModel {
        RegisteredModel {
            name: self.model_name.clone(),
            external_id: Some(self.model_name.clone()),
            description: non_empty(&self.model_description),
            ..Default::default()
        }
    }

    fn version_template(&self, score: f64) -> ModelVersion {
        let mut custom_properties = CustomProperties::new();
        custom_properties.insert(SCORE_PROPERTY.to_string(), MetadataValue::double(score));

        ModelVersion {
            name: self.version_name.clone(),
            external_id: Some(self.version_name.clone()),
            description: non_empty(&self.version_description),
            custom_properties,
            ..Default::default()
        }
    }

    fn artifact_template(&self) -> ModelArtifact {
        ModelArtifact {
            name: artifact_name(&self.version_name),
            description: Some(format!("model artifact for model {}", self.version_name)),
            state: Some(ArtifactState::Unknown),
            model_format_name: non_empty(&self.format_name),
            model_format_version: non_empty(&self.format_version),
            storage_key: non_empty(&self.storage_key),
            storage_path: non_empty(&self.storage_path),
            ..Default::default()
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Everything `register` resolved, tagged with whether it was created.
#[derive(Debug, Clone)]
pub struct Registration {
    pub model: Resolved<RegisteredModel>,
    pub version: Resolved<ModelVersion>,
    pub artifact: Resolved<ModelArtifact>,
}

/// Resolves model, version and artifact in turn, creating whichever is
/// missing, and prints each one as soon as it is resolved.
///
/// Existing entities are never updated.
pub async fn register_model(
    api: &dyn ModelRegistryApi,
    config: &RegisterConfig,
    out: &mut dyn Write,
) -> Result<Registration, CommandError> {
    config.validate()?;
    let resolver = Resolver::new(api);

    let model = resolver
        .registered_model(&config.model_name, || config.model_template())
        .await?;
    info!("Registered model {} (created: {})", config.model_name, model.was_created());
    print_entity(out, EntityKind::RegisteredModel, model.entity())?;

    let version = resolver
        .model_version(&config.version_name, model.entity(), || {
            config.version_template(rand::random::<f64>())
        })
        .await?;
    info!("Model version {} (created: {})", config.version_name, version.was_created());
    print_entity(out, EntityKind::ModelVersion, version.entity())?;

    let artifact_name = artifact_name(&config.version_name);
    let artifact = resolver
        .model_artifact(&artifact_name, version.entity(), || config.artifact_template())
        .await?;
    info!("Model artifact {} (created: {})", artifact_name, artifact.was_created());
    print_entity(out, EntityKind::ModelArtifact, artifact.entity())?;

    Ok(Registration { model, version, artifact })
}
