// Registry access: entity types, the API trait and its HTTP implementation
mod api;
mod client;
mod error;
mod types;

pub use api::ModelRegistryApi;
pub use client::{RegistryClient, API_BASE_PATH};
pub use error::RegistryError;
pub use types::{
    ArtifactState, CustomProperties, Entity, EntityKind, ListPage, MetadataValue, ModelArtifact, ModelVersion,
    RegisteredModel, ServingEnvironment, MODEL_ARTIFACT_TYPE,
};
