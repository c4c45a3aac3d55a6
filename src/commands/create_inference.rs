use std::io::Write;
use tracing::info;

use crate::display::{write_inference_service, InferenceServiceParams};
use crate::error::CommandError;
use crate::registry::ModelRegistryApi;
use crate::resolver::Resolver;

/// Inputs of `create-inference`.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    pub model_name: String,
    pub version_name: String,
    pub artifact_name: String,
    /// Serving environment that becomes the `runtime` of the resource
    pub serving_environment_name: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_name: "mnist".to_string(),
            version_name: "v8".to_string(),
            artifact_name: "mnist-8".to_string(),
            serving_environment_name: "model-server".to_string(),
        }
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> Result<(), CommandError> {
        let missing: Vec<&str> = [
            ("model", &self.model_name),
            ("version", &self.version_name),
            ("artifact", &self.artifact_name),
            ("runtime", &self.serving_environment_name),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(flag, _)| *flag)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommandError::Precondition(format!(
                "[{}] cannot be empty",
                missing.join(", ")
            )))
        }
    }
}

/// Gathers what the template needs. Lookup only: nothing is ever created here.
pub async fn inference_service_params(
    api: &dyn ModelRegistryApi,
    config: &InferenceConfig,
) -> Result<InferenceServiceParams, CommandError> {
    config.validate()?;
    let resolver = Resolver::new(api);

    let model = resolver.require_registered_model(&config.model_name).await?;
    let version = resolver.require_model_version(&config.version_name, &model).await?;
    let model_artifact = resolver.require_model_artifact(&config.artifact_name, &version).await?;
    let environment = resolver
        .require_serving_environment(&config.serving_environment_name)
        .await?;

    Ok(InferenceServiceParams {
        runtime: environment.name,
        model_artifact,
    })
}

/// Writes an `InferenceService` resource for an already registered artifact.
pub async fn create_inference(
    api: &dyn ModelRegistryApi,
    config: &InferenceConfig,
    out: &mut dyn Write,
) -> Result<(), CommandError> {
    let params = inference_service_params(api, config).await?;
    info!(
        "Rendering inference service for artifact {} on runtime {}",
        params.model_artifact.name, params.runtime
    );
    write_inference_service(out, &params)
}
