use std::io::Write;
use tracing::info;

use crate::display::print_entity;
use crate::error::CommandError;
use crate::registry::{EntityKind, ModelArtifact, ModelRegistryApi, ModelVersion, RegisteredModel};
use crate::resolver::{parent_id, Resolver};

/// Inputs of `get`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetConfig {
    pub model_name: String,
}

impl GetConfig {
    pub fn validate(&self) -> Result<(), CommandError> {
        if self.model_name.is_empty() {
            return Err(CommandError::Precondition("`model` is mandatory and cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// A model with all of its versions, each with its model artifacts.
#[derive(Debug, Clone)]
pub struct ModelTree {
    pub model: RegisteredModel,
    pub versions: Vec<(ModelVersion, Vec<ModelArtifact>)>,
}

/// Looks up a model and prints it, then each version followed by that
/// version's artifacts.
pub async fn get_model(
    api: &dyn ModelRegistryApi,
    config: &GetConfig,
    out: &mut dyn Write,
) -> Result<ModelTree, CommandError> {
    config.validate()?;

    let model = Resolver::new(api).require_registered_model(&config.model_name).await?;
    print_entity(out, EntityKind::RegisteredModel, &model)?;

    let model_id = parent_id(&model)?;
    let versions = api
        .list_model_versions(model_id)
        .await
        .map_err(|source| CommandError::List {
            kind: EntityKind::ModelVersion,
            parent: format!("{} {}", EntityKind::RegisteredModel, model_id),
            source,
        })?;
    info!("Found {} versions for model {}", versions.len(), config.model_name);

    let mut tree = Vec::with_capacity(versions.len());
    for version in versions {
        print_entity(out, EntityKind::ModelVersion, &version)?;

        let version_id = parent_id(&version)?;
        let artifacts = api
            .list_model_artifacts(version_id)
            .await
            .map_err(|source| CommandError::List {
                kind: EntityKind::ModelArtifact,
                parent: format!("{} {}", EntityKind::ModelVersion, version_id),
                source,
            })?;

        for artifact in &artifacts {
            print_entity(out, EntityKind::ModelArtifact, artifact)?;
        }
        tree.push((version, artifacts));
    }

    Ok(ModelTree { model, versions: tree })
}
