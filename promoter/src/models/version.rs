//! Version status models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform-side processing state of a registered version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    /// Registered, evaluation pending or in progress
    Pending,

    /// Processing complete, eligible for activation
    Ready,

    /// The platform answered but carried no usable status information.
    /// Retryable; indistinguishable from `Pending` for waiting purposes.
    Unknown,

    /// The platform affirmatively reports no such version. Fatal to
    /// the wait stage: registration happens before any status query,
    /// so absence will not resolve by waiting.
    NotFound,
}

impl VersionStatus {
    /// Whether this status ends the wait loop
    pub fn is_terminal(&self) -> bool {
        matches!(self, VersionStatus::Ready | VersionStatus::NotFound)
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VersionStatus::Pending => "pending",
            VersionStatus::Ready => "ready",
            VersionStatus::Unknown => "unknown",
            VersionStatus::NotFound => "not-found",
        };
        write!(f, "{}", s)
    }
}

/// One status check issued by the processing monitor. Ephemeral:
/// drives the loop and tracing, never persisted.
#[derive(Debug, Clone)]
pub struct PollAttempt {
    /// When the query was issued
    pub issued_at: DateTime<Utc>,

    /// 1-based attempt number
    pub attempt: u32,

    /// Status returned by the platform
    pub status: VersionStatus,
}

impl PollAttempt {
    pub fn new(attempt: u32, status: VersionStatus) -> Self {
        Self {
            issued_at: Utc::now(),
            attempt,
            status,
        }
    }

    /// Whether this attempt terminates the wait loop
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
