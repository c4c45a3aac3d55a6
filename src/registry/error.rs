use thiserror::Error;

/// Failures talking to the model registry service.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("error dialing connection to registry server {addr}: {reason}")]
    Dial { addr: String, reason: String },

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The service refused a create because the name is already taken in its scope.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("registry returned status {status}: {message}")]
    Status { status: u16, message: String },
}
