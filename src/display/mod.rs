use colored::*;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::io::Write;

use crate::error::CommandError;
use crate::registry::{EntityKind, ModelArtifact};

const INFERENCE_SERVICE_TEMPLATE_NAME: &str = "inference_service.yaml";
const INFERENCE_SERVICE_TEMPLATE: &str = include_str!("templates/inference_service.yaml.j2");

/// Writes one entity as a labelled, pretty-printed JSON block.
///
/// Keys come out in struct field order, custom properties sorted by name, so
/// two dumps of the same entity are byte-identical.
pub fn print_entity<T: Serialize>(out: &mut dyn Write, kind: EntityKind, entity: &T) -> Result<(), CommandError> {
    let body = serde_json::to_string_pretty(entity).map_err(std::io::Error::from)?;
    writeln!(out, "{}", format!("{}:", kind).bold().cyan())?;
    writeln!(out, "{}", body)?;
    Ok(())
}

/// Data fed to the `InferenceService` template.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceServiceParams {
    /// Serving environment name, used as the serving runtime
    pub runtime: String,
    pub model_artifact: ModelArtifact,
}

// Kubernetes caps DNS-1035 labels at 63 characters
const MAX_RESOURCE_NAME_LEN: usize = 63;
const RESOURCE_NAME_PREFIX: &str = "isvc";

/// Turns `value` into a DNS-1035 label usable as an `InferenceService` name.
///
/// Lowercases, replaces anything but `[a-z0-9-]` with `-` and trims dashes
/// from both ends. A result that is empty or does not start with a letter gets
/// a letter prefix, and the whole is cut to 63 characters.
pub fn resource_name(value: String) -> String {
    let replaced: String = value
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '-' })
        .collect();
    let trimmed = replaced.trim_matches('-');

    let mut name = match trimmed.chars().next() {
        None => RESOURCE_NAME_PREFIX.to_string(),
        Some(c) if c.is_ascii_lowercase() => trimmed.to_string(),
        Some(_) => format!("{}-{}", RESOURCE_NAME_PREFIX, trimmed),
    };
    name.truncate(MAX_RESOURCE_NAME_LEN);
    name.trim_end_matches('-').to_string()
}

fn template_env(source: &'static str) -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    // YAML output: values are written verbatim
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_filter("resource_name", resource_name);
    env.add_template(INFERENCE_SERVICE_TEMPLATE_NAME, source)?;
    Ok(env)
}

fn render(source: &'static str, params: &InferenceServiceParams) -> Result<String, minijinja::Error> {
    let env = template_env(source)?;
    let template = env.get_template(INFERENCE_SERVICE_TEMPLATE_NAME)?;
    template.render(params)
}

/// Renders the `InferenceService` resource for `params`.
pub fn render_inference_service(params: &InferenceServiceParams) -> Result<String, minijinja::Error> {
    render(INFERENCE_SERVICE_TEMPLATE, params)
}

fn write_rendered(
    out: &mut dyn Write,
    source: &'static str,
    params: &InferenceServiceParams,
) -> Result<(), CommandError> {
    let rendered = render(source, params)?;
    writeln!(out, "{}", rendered)?;
    Ok(())
}

/// Renders the `InferenceService` resource and writes it to `out`.
///
/// Nothing is written when rendering fails.
pub fn write_inference_service(out: &mut dyn Write, params: &InferenceServiceParams) -> Result<(), CommandError> {
    write_rendered(out, INFERENCE_SERVICE_TEMPLATE, params)
}
