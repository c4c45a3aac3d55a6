#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;

use mrctl::registry::{
    EntityKind, ModelArtifact, ModelRegistryApi, ModelVersion, RegisteredModel, RegistryError, ServingEnvironment,
};

/// Number of registry calls made, by operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub finds: usize,
    pub upserts: usize,
    pub lists: usize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.finds + self.upserts + self.lists
    }
}

#[derive(Default)]
struct State {
    next_id: u64,
    models: Vec<RegisteredModel>,
    versions: Vec<ModelVersion>,
    // (parent version id, artifact)
    artifacts: Vec<(String, ModelArtifact)>,
    environments: Vec<ServingEnvironment>,
    calls: Calls,
    reject_upserts_of: Option<EntityKind>,
}

impl State {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// In-memory registry that enforces name scoping and counts calls.
#[derive(Default)]
pub struct InMemoryRegistry {
    state: Mutex<State>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls
    }

    pub fn reset_calls(&self) {
        self.state.lock().unwrap().calls = Calls::default();
    }

    /// Makes every upsert of `kind` fail with a conflict.
    pub fn reject_upserts_of(&self, kind: EntityKind) {
        self.state.lock().unwrap().reject_upserts_of = Some(kind);
    }

    pub fn models(&self) -> Vec<RegisteredModel> {
        self.state.lock().unwrap().models.clone()
    }

    pub fn versions(&self) -> Vec<ModelVersion> {
        self.state.lock().unwrap().versions.clone()
    }

    pub fn artifacts(&self) -> Vec<ModelArtifact> {
        self.state.lock().unwrap().artifacts.iter().map(|(_, a)| a.clone()).collect()
    }

    pub fn seed_model(&self, name: &str) -> RegisteredModel {
        let mut state = self.state.lock().unwrap();
        let model = RegisteredModel {
            id: Some(state.next_id()),
            name: name.to_string(),
            ..Default::default()
        };
        state.models.push(model.clone());
        model
    }

    pub fn seed_version(&self, model: &RegisteredModel, name: &str) -> ModelVersion {
        let mut state = self.state.lock().unwrap();
        let version = ModelVersion {
            id: Some(state.next_id()),
            name: name.to_string(),
            registered_model_id: model.id.clone(),
            ..Default::default()
        };
        state.versions.push(version.clone());
        version
    }

    pub fn seed_artifact(&self, version: &ModelVersion, name: &str) -> ModelArtifact {
        let mut state = self.state.lock().unwrap();
        let artifact = ModelArtifact {
            id: Some(state.next_id()),
            name: name.to_string(),
            model_format_name: Some("onnx".to_string()),
            model_format_version: Some("1".to_string()),
            storage_key: Some("aws-connection-models".to_string()),
            storage_path: Some(format!("models/{}", name)),
            ..Default::default()
        };
        let parent = version.id.clone().unwrap_or_default();
        state.artifacts.push((parent, artifact.clone()));
        artifact
    }

    pub fn seed_environment(&self, name: &str) -> ServingEnvironment {
        let mut state = self.state.lock().unwrap();
        let environment = ServingEnvironment {
            id: Some(state.next_id()),
            name: name.to_string(),
            ..Default::default()
        };
        state.environments.push(environment.clone());
        environment
    }

    fn check_upsert(state: &State, kind: EntityKind, name: &str) -> Result<(), RegistryError> {
        if state.reject_upserts_of == Some(kind) {
            return Err(RegistryError::Conflict(format!("{} {} already exists", kind, name)));
        }
        Ok(())
    }
}

#[async_trait]
impl ModelRegistryApi for InMemoryRegistry {
    async fn find_registered_model(&self, name: &str) -> Result<Option<RegisteredModel>, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.finds += 1;
        Ok(state.models.iter().find(|m| m.name == name).cloned())
    }

    async fn upsert_registered_model(&self, model: &RegisteredModel) -> Result<RegisteredModel, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.upserts += 1;
        Self::check_upsert(&state, EntityKind::RegisteredModel, &model.name)?;
        let created = RegisteredModel {
            id: Some(state.next_id()),
            ..model.clone()
        };
        state.models.push(created.clone());
        Ok(created)
    }

    async fn find_model_version(
        &self,
        name: &str,
        registered_model_id: &str,
    ) -> Result<Option<ModelVersion>, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.finds += 1;
        Ok(state
            .versions
            .iter()
            .find(|v| v.name == name && v.registered_model_id.as_deref() == Some(registered_model_id))
            .cloned())
    }

    async fn upsert_model_version(
        &self,
        version: &ModelVersion,
        registered_model_id: &str,
    ) -> Result<ModelVersion, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.upserts += 1;
        Self::check_upsert(&state, EntityKind::ModelVersion, &version.name)?;
        let created = ModelVersion {
            id: Some(state.next_id()),
            registered_model_id: Some(registered_model_id.to_string()),
            ..version.clone()
        };
        state.versions.push(created.clone());
        Ok(created)
    }

    async fn list_model_versions(&self, registered_model_id: &str) -> Result<Vec<ModelVersion>, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.lists += 1;
        Ok(state
            .versions
            .iter()
            .filter(|v| v.registered_model_id.as_deref() == Some(registered_model_id))
            .cloned()
            .collect())
    }

    async fn find_model_artifact(
        &self,
        name: &str,
        model_version_id: &str,
    ) -> Result<Option<ModelArtifact>, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.finds += 1;
        Ok(state
            .artifacts
            .iter()
            .find(|(parent, a)| parent == model_version_id && a.name == name)
            .map(|(_, a)| a.clone()))
    }

    async fn upsert_model_artifact(
        &self,
        artifact: &ModelArtifact,
        model_version_id: &str,
    ) -> Result<ModelArtifact, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.upserts += 1;
        Self::check_upsert(&state, EntityKind::ModelArtifact, &artifact.name)?;
        let created = ModelArtifact {
            id: Some(state.next_id()),
            ..artifact.clone()
        };
        state.artifacts.push((model_version_id.to_string(), created.clone()));
        Ok(created)
    }

    async fn list_model_artifacts(&self, model_version_id: &str) -> Result<Vec<ModelArtifact>, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.lists += 1;
        Ok(state
            .artifacts
            .iter()
            .filter(|(parent, _)| parent == model_version_id)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn find_serving_environment(&self, name: &str) -> Result<Option<ServingEnvironment>, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.finds += 1;
        Ok(state.environments.iter().find(|e| e.name == name).cloned())
    }

    async fn upsert_serving_environment(
        &self,
        environment: &ServingEnvironment,
    ) -> Result<ServingEnvironment, RegistryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.upserts += 1;
        Self::check_upsert(&state, EntityKind::ServingEnvironment, &environment.name)?;
        let created = ServingEnvironment {
            id: Some(state.next_id()),
            ..environment.clone()
        };
        state.environments.push(created.clone());
        Ok(created)
    }
}

/// Block headers (`registered model`, `model version`, `model artifact`) in output order.
pub fn block_headers(output: &str) -> Vec<&'static str> {
    const HEADERS: [&str; 3] = ["registered model:", "model version:", "model artifact:"];
    output
        .lines()
        .filter_map(|line| HEADERS.iter().copied().find(|h| line.contains(h) && !line.trim_start().starts_with('"')))
        .collect()
}
