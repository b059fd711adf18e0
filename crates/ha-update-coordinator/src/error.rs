//! Coordinator error types

use thiserror::Error;

/// A refresh attempt failed; the previous snapshot stays in place
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct UpdateFailed(pub String);

impl UpdateFailed {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The first refresh during setup failed, so the entry should be retried later
#[derive(Debug, Clone, Error)]
#[error("{name} is not ready yet: {source}")]
pub struct ConfigEntryNotReady {
    pub name: String,
    #[source]
    pub source: UpdateFailed,
}
