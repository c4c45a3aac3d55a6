use thiserror::Error;

use crate::registry::{EntityKind, RegistryError};

/// Everything a command can fail with.
///
/// Each variant says which step failed and on which entity. The underlying
/// cause is kept as the error source, not repeated in the message; `main`
/// prints the whole chain and exits non-zero.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("unable to connect to the registry")]
    Connection(#[source] RegistryError),

    #[error("missing required parameter: {0}")]
    Precondition(String),

    #[error("unable to find {kind} {name}")]
    NotFound { kind: EntityKind, name: String },

    #[error("error looking up {kind} {name}")]
    Lookup {
        kind: EntityKind,
        name: String,
        #[source]
        source: RegistryError,
    },

    #[error("error registering {kind} {name}")]
    Creation {
        kind: EntityKind,
        name: String,
        #[source]
        source: RegistryError,
    },

    #[error("error retrieving {kind}s for {parent}")]
    List {
        kind: EntityKind,
        parent: String,
        #[source]
        source: RegistryError,
    },

    #[error("{kind} {name} returned by the registry has no id")]
    MissingId { kind: EntityKind, name: String },

    #[error("method not yet implemented")]
    NotImplemented,

    #[error("error rendering inference service")]
    Template(#[from] minijinja::Error),

    #[error("error writing output")]
    Output(#[from] std::io::Error),
}
