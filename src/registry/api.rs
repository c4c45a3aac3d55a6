use async_trait::async_trait;

use super::error::RegistryError;
use super::types::{ModelArtifact, ModelVersion, RegisteredModel, ServingEnvironment};

/// Operations this tool needs from the model registry.
///
/// `find_*` return `Ok(None)` when nothing with that name exists in the given
/// scope. `upsert_*` create the entity when absent; what happens on a name
/// collision is up to the service.
#[async_trait]
pub trait ModelRegistryApi: Send + Sync {
    async fn find_registered_model(&self, name: &str) -> Result<Option<RegisteredModel>, RegistryError>;

    async fn upsert_registered_model(&self, model: &RegisteredModel) -> Result<RegisteredModel, RegistryError>;

    async fn find_model_version(
        &self,
        name: &str,
        registered_model_id: &str,
    ) -> Result<Option<ModelVersion>, RegistryError>;

    async fn upsert_model_version(
        &self,
        version: &ModelVersion,
        registered_model_id: &str,
    ) -> Result<ModelVersion, RegistryError>;

    async fn list_model_versions(&self, registered_model_id: &str) -> Result<Vec<ModelVersion>, RegistryError>;

    async fn find_model_artifact(
        &self,
        name: &str,
        model_version_id: &str,
    ) -> Result<Option<ModelArtifact>, RegistryError>;

    async fn upsert_model_artifact(
        &self,
        artifact: &ModelArtifact,
        model_version_id: &str,
    ) -> Result<ModelArtifact, RegistryError>;

    async fn list_model_artifacts(&self, model_version_id: &str) -> Result<Vec<ModelArtifact>, RegistryError>;

    async fn find_serving_environment(&self, name: &str) -> Result<Option<ServingEnvironment>, RegistryError>;

    async fn upsert_serving_environment(
        &self,
        environment: &ServingEnvironment,
    ) -> Result<ServingEnvironment, RegistryError>;
}
