// Command handlers and the dispatcher that wires them to a registry connection
mod create_inference;
mod get;
mod reconcile;
mod register;

pub use create_inference::{create_inference, inference_service_params, InferenceConfig};
pub use get::{get_model, GetConfig, ModelTree};
pub use reconcile::reconcile;
pub use register::{artifact_name, register_model, RegisterConfig, Registration, SCORE_PROPERTY};

use std::io::Write;
use tracing::info;

use crate::config::RegistryConfig;
use crate::error::CommandError;
use crate::registry::RegistryClient;

/// A fully parsed command with its immutable inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register(RegisterConfig),
    Get(GetConfig),
    CreateInference(InferenceConfig),
    Reconcile,
}

/// Runs one command: check inputs, connect, resolve, present.
///
/// Inputs are validated before dialing so a bad invocation never touches the
/// network. The connection is released when this returns, on success or error.
pub async fn dispatch(command: Command, registry: &RegistryConfig, out: &mut dyn Write) -> Result<(), CommandError> {
    match command {
        Command::Register(config) => {
            config.validate()?;
            let client = connect(registry).await?;
            register_model(&client, &config, out).await.map(|_| ())
        }
        Command::Get(config) => {
            config.validate()?;
            let client = connect(registry).await?;
            get_model(&client, &config, out).await.map(|_| ())
        }
        Command::CreateInference(config) => {
            config.validate()?;
            let client = connect(registry).await?;
            create_inference(&client, &config, out).await
        }
        Command::Reconcile => reconcile(),
    }
}

async fn connect(registry: &RegistryConfig) -> Result<RegistryClient, CommandError> {
    let client = RegistryClient::connect(registry)
        .await
        .map_err(CommandError::Connection)?;
    info!("Model registry service created for {}", client.address());
    Ok(client)
}
