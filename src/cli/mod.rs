use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{Command, GetConfig, InferenceConfig, RegisterConfig};
use crate::config::{Overrides, DEFAULT_CONFIG_DIR};

/// Command-line client for a model registry
#[derive(Parser, Debug)]
#[command(name = "mrctl", version, about = "Register models and render inference services from a model registry")]
pub struct Cli {
    /// Registry host, overrides configuration
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Registry port, overrides configuration
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Directory holding default.toml and local.toml
    #[arg(long, global = true, env = "MRCTL_CONFIG_DIR", default_value = DEFAULT_CONFIG_DIR)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a new model version, creating the model if it does not exist yet
    Register(RegisterArgs),
    /// Retrieve all information for a specific model
    Get(GetArgs),
    /// Write an InferenceService resource for a registered artifact to stdout
    CreateInference(CreateInferenceArgs),
    /// Create InferenceService resources for every serving environment (not implemented)
    Reconcile(ReconcileArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Registered model name
    #[arg(long, default_value = "")]
    pub model: String,
    /// Specific model version name
    #[arg(long, default_value = "")]
    pub version: String,
    /// Registered model description
    #[arg(long, default_value = "")]
    pub model_description: String,
    /// Model version description
    #[arg(long, default_value = "")]
    pub version_description: String,
    /// Model artifact format name, e.g. onnx
    #[arg(long, default_value = "onnx")]
    pub format_name: String,
    /// Model artifact format version, e.g. 1
    #[arg(long, default_value = "1")]
    pub format_version: String,
    /// Model artifact data connection key
    #[arg(long, default_value = "aws-connection-models")]
    pub key: String,
    /// Model artifact data connection storage path
    #[arg(long, default_value = "")]
    pub path: String,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Registered model name
    #[arg(long, default_value = "")]
    pub model: String,
}

#[derive(Args, Debug)]
pub struct CreateInferenceArgs {
    /// Registered model name
    #[arg(long, default_value = "mnist")]
    pub model: String,
    /// Specific model version name
    #[arg(long, default_value = "v8")]
    pub version: String,
    /// Model artifact name
    #[arg(long, default_value = "mnist-8")]
    pub artifact: String,
    /// Serving environment runtime name
    #[arg(long, default_value = "model-server")]
    pub runtime: String,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {}

impl From<RegisterArgs> for RegisterConfig {
    fn from(args: RegisterArgs) -> Self {
        RegisterConfig {
            model_name: args.model,
            model_description: args.model_description,
            version_name: args.version,
            version_description: args.version_description,
            format_name: args.format_name,
            format_version: args.format_version,
            storage_key: args.key,
            storage_path: args.path,
        }
    }
}

impl From<GetArgs> for GetConfig {
    fn from(args: GetArgs) -> Self {
        GetConfig { model_name: args.model }
    }
}

impl From<CreateInferenceArgs> for InferenceConfig {
    fn from(args: CreateInferenceArgs) -> Self {
        InferenceConfig {
            model_name: args.model,
            version_name: args.version,
            artifact_name: args.artifact,
            serving_environment_name: args.runtime,
        }
    }
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Register(args) => Command::Register(args.into()),
            Commands::Get(args) => Command::Get(args.into()),
            Commands::CreateInference(args) => Command::CreateInference(args.into()),
            Commands::Reconcile(_) => Command::Reconcile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mrctl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_register_flags() {
        let cli = parse(&["register", "--model", "mnist", "--version", "v8", "--path", "mnist/v8"]);
        let Command::Register(config) = Command::from(cli.command) else {
            panic!("expected register");
        };
        assert_eq!(config.model_name, "mnist");
        assert_eq!(config.version_name, "v8");
        assert_eq!(config.storage_path, "mnist/v8");
        assert_eq!(config.format_name, "onnx");
        assert_eq!(config.format_version, "1");
        assert_eq!(config.storage_key, "aws-connection-models");
    }

    #[test]
    fn test_create_inference_defaults() {
        let cli = parse(&["create-inference"]);
        assert_eq!(Command::from(cli.command), Command::CreateInference(InferenceConfig::default()));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["get", "--model", "mnist", "--host", "registry", "--port", "9090"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.host.as_deref(), Some("registry"));
        assert_eq!(overrides.port, Some(9090));
        assert_eq!(
            Command::from(cli.command),
            Command::Get(GetConfig { model_name: "mnist".to_string() })
        );
    }

    #[test]
    fn test_reconcile_and_unknown_commands() {
        assert_eq!(Command::from(parse(&["reconcile"]).command), Command::Reconcile);
        assert!(Cli::try_parse_from(["mrctl", "deploy"]).is_err());
    }
}
