//! Find-or-create resolution of registry entities.
//!
//! Each step looks an entity up by name inside its parent's scope and creates
//! it only when the lookup comes back empty. Existing entities are used as-is,
//! never updated. The lookup and the create are two separate calls, so two
//! concurrent registrations of the same new name can both miss and both try
//! to create; the registry decides which create wins and the loser surfaces as
//! a [`CommandError::Creation`] (with [`RegistryError::Conflict`] when the
//! service answers 409). Nothing created earlier in a chain is rolled back.

use std::future::Future;
use tracing::info;

use crate::error::CommandError;
use crate::registry::{
    Entity, ModelArtifact, ModelRegistryApi, ModelVersion, RegisteredModel, RegistryError, ServingEnvironment,
};

/// Outcome of a resolution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    /// An entity with that name already existed
    Found(T),
    /// Nothing matched, so the entity was created
    Created(T),
}

impl<T> Resolved<T> {
    pub fn entity(&self) -> &T {
        match self {
            Resolved::Found(e) | Resolved::Created(e) => e,
        }
    }

    pub fn into_entity(self) -> T {
        match self {
            Resolved::Found(e) | Resolved::Created(e) => e,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Resolved::Created(_))
    }
}

/// Generic get-or-create step.
///
/// `find` is always called; `create` only when `find` returned `None`.
pub async fn get_or_create<T, F, FFut, C, CFut>(name: &str, find: F, create: C) -> Result<Resolved<T>, CommandError>
where
    T: Entity,
    F: FnOnce() -> FFut,
    FFut: Future<Output = Result<Option<T>, RegistryError>>,
    C: FnOnce() -> CFut,
    CFut: Future<Output = Result<T, RegistryError>>,
{
    let found = find().await.map_err(|source| CommandError::Lookup {
        kind: T::KIND,
        name: name.to_string(),
        source,
    })?;

    if let Some(entity) = found {
        return Ok(Resolved::Found(entity));
    }

    info!("Unable to find {} {}, registering it", T::KIND, name);
    let created = create().await.map_err(|source| CommandError::Creation {
        kind: T::KIND,
        name: name.to_string(),
        source,
    })?;

    Ok(Resolved::Created(created))
}

/// Lookup-only step: a missing entity is an error instead of a create.
pub async fn require<T, F, FFut>(name: &str, find: F) -> Result<T, CommandError>
where
    T: Entity,
    F: FnOnce() -> FFut,
    FFut: Future<Output = Result<Option<T>, RegistryError>>,
{
    find()
        .await
        .map_err(|source| CommandError::Lookup {
            kind: T::KIND,
            name: name.to_string(),
            source,
        })?
        .ok_or_else(|| CommandError::NotFound {
            kind: T::KIND,
            name: name.to_string(),
        })
}

/// Id of a resolved entity, for scoping the next step.
pub fn parent_id<T: Entity>(entity: &T) -> Result<&str, CommandError> {
    entity.id().ok_or_else(|| CommandError::MissingId {
        kind: T::KIND,
        name: entity.name().to_string(),
    })
}

/// Runs the per-kind resolution steps against one registry.
pub struct Resolver<'a> {
    api: &'a dyn ModelRegistryApi,
}

impl<'a> Resolver<'a> {
    pub fn new(api: &'a dyn ModelRegistryApi) -> Self {
        Self { api }
    }

    pub async fn registered_model(
        &self,
        name: &str,
        template: impl FnOnce() -> RegisteredModel,
    ) -> Result<Resolved<RegisteredModel>, CommandError> {
        let api = self.api;
        get_or_create(
            name,
            || api.find_registered_model(name),
            || async move { api.upsert_registered_model(&template()).await },
        )
        .await
    }

    pub async fn model_version(
        &self,
        name: &str,
        model: &RegisteredModel,
        template: impl FnOnce() -> ModelVersion,
    ) -> Result<Resolved<ModelVersion>, CommandError> {
        let api = self.api;
        let model_id = parent_id(model)?;
        get_or_create(
            name,
            || api.find_model_version(name, model_id),
            || async move { api.upsert_model_version(&template(), model_id).await },
        )
        .await
    }

    pub async fn model_artifact(
        &self,
        name: &str,
        version: &ModelVersion,
        template: impl FnOnce() -> ModelArtifact,
    ) -> Result<Resolved<ModelArtifact>, CommandError> {
        let api = self.api;
        let version_id = parent_id(version)?;
        get_or_create(
            name,
            || api.find_model_artifact(name, version_id),
            || async move { api.upsert_model_artifact(&template(), version_id).await },
        )
        .await
    }

    pub async fn require_registered_model(&self, name: &str) -> Result<RegisteredModel, CommandError> {
        require(name, || self.api.find_registered_model(name)).await
    }

    pub async fn require_model_version(
        &self,
        name: &str,
        model: &RegisteredModel,
    ) -> Result<ModelVersion, CommandError> {
        let model_id = parent_id(model)?;
        require(name, || self.api.find_model_version(name, model_id)).await
    }

    pub async fn require_model_artifact(
        &self,
        name: &str,
        version: &ModelVersion,
    ) -> Result<ModelArtifact, CommandError> {
        let version_id = parent_id(version)?;
        require(name, || self.api.find_model_artifact(name, version_id)).await
    }

    pub async fn require_serving_environment(&self, name: &str) -> Result<ServingEnvironment, CommandError> {
        require(name, || self.api.find_serving_environment(name)).await
    }
}
