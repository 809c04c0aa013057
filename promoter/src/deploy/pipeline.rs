//! Deployment orchestrator
//!
//! Runs the four stages of one promotion in strict order: store the
//! bundle, register the version, wait for processing, activate. The
//! first failing stage aborts the run with that stage attributed.
//! There is no compensation on failure: a version registered by a run
//! that later fails stays registered but unused, and recovery is
//! re-invoking the whole run.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use tracing::{error, info};
use uuid::Uuid;

use crate::deploy::monitor::{self, MonitorSettings, WaitOutcome};
use crate::deploy::platform::Platform;
use crate::errors::PromoterError;
use crate::models::request::DeploymentRequest;

/// One of the four ordered steps of a deployment run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Store,
    Register,
    Wait,
    Activate,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Store => "store",
            Stage::Register => "register",
            Stage::Wait => "wait",
            Stage::Activate => "activate",
        };
        write!(f, "{}", s)
    }
}

/// Terminal outcome of one deployment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The environment was switched to the new version
    Ok,

    /// A stage failed; no later stage was attempted
    Failed { stage: Stage, cause: String },

    /// The run was cancelled at a suspension point before completing
    Cancelled,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

type StageOp<'a> = Pin<Box<dyn Future<Output = Result<(), PromoterError>> + Send + 'a>>;

/// Run the four stages for one validated request.
///
/// Every stage await races the caller-supplied shutdown future; when
/// it fires the in-flight stage is dropped, no further calls are
/// issued, and the run reports `Cancelled`. Each stage is attempted
/// at most once; only the wait stage retries internally (its status
/// polling), and retrying a failed run belongs to the caller.
pub async fn run_deployment<P>(
    platform: &P,
    request: &DeploymentRequest,
    monitor_settings: &MonitorSettings,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) -> Outcome
where
    P: Platform + ?Sized,
{
    let run_id = Uuid::new_v4();
    info!(
        "Deployment run {}: '{}' version '{}' -> environment '{}'",
        run_id, request.app_id, request.version_label, request.environment_id
    );

    // Ordered stage list; execution stops at the first failure so
    // stage attribution stays explicit.
    let stages: Vec<(Stage, StageOp<'_>)> = vec![
        (Stage::Store, Box::pin(stage_store(platform, request))),
        (Stage::Register, Box::pin(stage_register(platform, request))),
        (
            Stage::Wait,
            Box::pin(stage_wait(platform, request, monitor_settings)),
        ),
        (Stage::Activate, Box::pin(stage_activate(platform, request))),
    ];

    for (stage, op) in stages {
        info!("Run {}: stage '{}' starting", run_id, stage);

        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Run {}: cancelled during stage '{}'", run_id, stage);
                return Outcome::Cancelled;
            }
            result = op => match result {
                Ok(()) => {
                    info!("Run {}: stage '{}' complete", run_id, stage);
                }
                Err(e) => {
                    error!("Run {}: stage '{}' failed: {}", run_id, stage, e);
                    return Outcome::Failed {
                        stage,
                        cause: e.to_string(),
                    };
                }
            }
        }
    }

    info!(
        "Run {}: version '{}' is live on '{}'",
        run_id, request.version_label, request.environment_id
    );
    Outcome::Ok
}

async fn stage_store<P: Platform + ?Sized>(
    platform: &P,
    request: &DeploymentRequest,
) -> Result<(), PromoterError> {
    let body = read_artifact(&request.artifact_path).await?;
    info!(
        "Uploading {} byte bundle to {}/{}",
        body.len(),
        request.bucket,
        request.key
    );
    platform
        .store_artifact(&request.bucket, &request.key, body, &request.credentials)
        .await
}

/// Read the bundle into memory. The file handle lives only inside
/// this call and is closed on every exit path, including read errors
/// mid-transfer.
async fn read_artifact(path: &Path) -> Result<Vec<u8>, PromoterError> {
    tokio::fs::read(path).await.map_err(|e| {
        PromoterError::ArtifactError(format!("unable to read bundle '{}': {}", path.display(), e))
    })
}

async fn stage_register<P: Platform + ?Sized>(
    platform: &P,
    request: &DeploymentRequest,
) -> Result<(), PromoterError> {
    platform
        .register_version(
            &request.app_id,
            &request.bucket,
            &request.key,
            &request.version_label,
            &request.credentials,
        )
        .await
}

async fn stage_wait<P: Platform + ?Sized>(
    platform: &P,
    request: &DeploymentRequest,
    monitor_settings: &MonitorSettings,
) -> Result<(), PromoterError> {
    let outcome = monitor::await_ready(
        &request.app_id,
        &request.version_label,
        request.wait_ceiling,
        monitor_settings,
        || {
            platform.query_version_status(
                &request.app_id,
                &request.version_label,
                &request.credentials,
            )
        },
        tokio::time::sleep,
    )
    .await?;

    match outcome {
        WaitOutcome::Ready { .. } => Ok(()),
        WaitOutcome::TimedOut {
            elapsed,
            last_status,
            ..
        } => Err(PromoterError::TimedOut {
            elapsed,
            last_status,
        }),
        WaitOutcome::NotFound { .. } => Err(PromoterError::VersionNotFound(
            request.version_label.clone(),
        )),
    }
}

async fn stage_activate<P: Platform + ?Sized>(
    platform: &P,
    request: &DeploymentRequest,
) -> Result<(), PromoterError> {
    platform
        .activate_version(
            &request.app_id,
            &request.environment_id,
            &request.version_label,
            &request.credentials,
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Store.to_string(), "store");
        assert_eq!(Stage::Register.to_string(), "register");
        assert_eq!(Stage::Wait.to_string(), "wait");
        assert_eq!(Stage::Activate.to_string(), "activate");
    }

    #[test]
    fn test_outcome_is_ok() {
        assert!(Outcome::Ok.is_ok());
        assert!(!Outcome::Cancelled.is_ok());
        assert!(!Outcome::Failed {
            stage: Stage::Store,
            cause: "boom".to_string()
        }
        .is_ok());
    }
}
