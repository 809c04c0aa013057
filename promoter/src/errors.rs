//! Error types for the promoter agent

use std::time::Duration;

use thiserror::Error;

use crate::models::version::VersionStatus;

/// Main error type for the promoter agent
#[derive(Error, Debug)]
pub enum PromoterError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Platform API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Version '{0}' not found while waiting for processing")]
    VersionNotFound(String),

    #[error("Timed out after {elapsed:?} waiting for processing (last status: {last_status})")]
    TimedOut {
        elapsed: Duration,
        last_status: VersionStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for PromoterError {
    fn from(err: anyhow::Error) -> Self {
        PromoterError::Internal(err.to_string())
    }
}
