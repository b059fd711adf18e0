//! Plugwise error types

use std::path::PathBuf;

use ha_update_coordinator::{ConfigEntryNotReady, UpdateFailed};
use thiserror::Error;

pub type PlugwiseResult<T> = Result<T, PlugwiseError>;

/// Errors reported by a Smile API client
#[derive(Debug, Error)]
pub enum PlugwiseError {
    #[error("failed to connect to {host}: {reason}")]
    ConnectionFailed { host: String, reason: String },

    #[error("invalid username or Smile ID")]
    InvalidAuth,

    #[error("request to the Smile timed out")]
    Timeout,

    #[error("invalid response from the Smile: {0}")]
    Response(String),

    #[error("setpoint {value} is outside the allowed range {min} - {max}")]
    InvalidSetpoint { value: f64, min: f64, max: f64 },

    #[error("no device supports {0}")]
    Unsupported(&'static str),

    #[error("failed to read fixture {path}: {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<PlugwiseError> for UpdateFailed {
    fn from(err: PlugwiseError) -> Self {
        match err {
            PlugwiseError::ConnectionFailed { .. } | PlugwiseError::Timeout => {
                UpdateFailed::new("Failed to connect to the Plugwise Smile")
            }
            PlugwiseError::InvalidAuth => UpdateFailed::new("Invalid username or Smile ID"),
            PlugwiseError::Response(_) => UpdateFailed::new(
                "Invalid XML data, or error indication received for the Plugwise Adam/Smile/Stretch",
            ),
            other => UpdateFailed::new(other.to_string()),
        }
    }
}

/// Errors raised while setting up a Plugwise config entry
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid Plugwise configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error(transparent)]
    NotReady(#[from] ConfigEntryNotReady),
}
