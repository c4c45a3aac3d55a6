//! Command-line client for a model registry service.
//!
//! `register` records a model version and its artifact, creating whatever is
//! missing; `get` prints a model with its versions and artifacts;
//! `create-inference` renders a KServe `InferenceService` from registry data.

pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod registry;
pub mod resolver;

pub use error::CommandError;
