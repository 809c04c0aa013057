//! Top-level run wiring

use std::future::Future;

use tracing::{error, info, warn};
use url::Url;

use crate::app::options::AppOptions;
use crate::deploy::pipeline::{run_deployment, Outcome};
use crate::errors::PromoterError;
use crate::http::client::HttpClient;
use crate::models::request::DeploymentRequest;

/// Run one deployment against the configured platform.
///
/// Builds the HTTP client, executes the pipeline, and logs the
/// outcome. The shutdown future cancels the run at its next
/// suspension point.
pub async fn run(
    options: AppOptions,
    request: DeploymentRequest,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<Outcome, PromoterError> {
    let base_url = Url::parse(&options.platform_base_url).map_err(|e| {
        PromoterError::ConfigError(format!(
            "invalid platform base URL '{}': {}",
            options.platform_base_url, e
        ))
    })?;

    info!("Promoting against platform at {}", base_url);
    let client = HttpClient::new(base_url.as_str(), options.request_timeout)?;

    let outcome = run_deployment(
        &client,
        &request,
        &options.monitor,
        Box::pin(shutdown_signal),
    )
    .await;

    match &outcome {
        Outcome::Ok => {
            info!(
                "Deployment succeeded: '{}' version '{}' live on '{}'",
                request.app_id, request.version_label, request.environment_id
            );
        }
        Outcome::Failed { stage, cause } => {
            error!("Deployment failed at stage '{}': {}", stage, cause);
        }
        Outcome::Cancelled => {
            warn!("Deployment cancelled before completion");
        }
    }

    Ok(outcome)
}
