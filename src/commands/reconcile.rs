use crate::error::CommandError;

/// Placeholder for rendering inference services for every serving
/// environment in one pass. Always fails, whatever the flags.
pub fn reconcile() -> Result<(), CommandError> {
    Err(CommandError::NotImplemented)
}
