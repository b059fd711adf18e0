//! Errors surfaced to the host when an entity operation fails

use thiserror::Error;

/// Boxed error carried from an integration through to the host
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while acting on an entity
#[derive(Debug, Error)]
pub enum HomeAssistantError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("entity {0} is unavailable")]
    Unavailable(String),

    #[error("value {value} for {entity_id} is outside valid range {min} - {max}")]
    ValueOutOfRange {
        entity_id: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The integration's command failed; the original error is kept as the source
    #[error("command failed: {source}")]
    CommandFailed {
        #[source]
        source: BoxError,
    },
}

impl HomeAssistantError {
    /// Wrap an integration error without translating it
    pub fn command_failed(err: impl Into<BoxError>) -> Self {
        Self::CommandFailed { source: err.into() }
    }
}
