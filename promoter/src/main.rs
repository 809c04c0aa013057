//! Promoter - Entry Point
//!
//! One-shot agent that promotes a packaged application bundle to a
//! managed hosting environment: uploads the bundle, registers it as a
//! new version, waits for platform-side processing, then switches the
//! target environment to it.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::process::exit;
use std::time::Duration;

use promoter::app::options::AppOptions;
use promoter::app::run::run;
use promoter::deploy::pipeline::Outcome;
use promoter::errors::PromoterError;
use promoter::logs::{init_logging, LogOptions};
use promoter::models::request::{Credentials, DeploymentRequest};
use promoter::settings::Settings;
use promoter::utils::version_info;

use tracing::{error, info};

const ACCESS_KEY_ENV: &str = "PROMOTER_ACCESS_KEY_ID";
const SECRET_KEY_ENV: &str = "PROMOTER_SECRET_ACCESS_KEY";
const SESSION_TOKEN_ENV: &str = "PROMOTER_SESSION_TOKEN";

const EXIT_FAILED: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        println!("{}", serde_json::to_string_pretty(&version_info()).unwrap());
        return;
    }

    // Retrieve the settings file, when given
    let settings = match cli_args.get("settings") {
        Some(path) => match Settings::load(Path::new(path)).await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Unable to read settings file: {}", e);
                exit(EXIT_INVALID_INPUT);
            }
        },
        None => Settings::default(),
    };

    // Initialize logging; CLI flags win over the settings file
    let log_level = match cli_args.get("log-level") {
        Some(level) => match level.parse() {
            Ok(level) => level,
            Err(e) => {
                eprintln!("{}", e);
                exit(EXIT_INVALID_INPUT);
            }
        },
        None => settings.log_level.clone(),
    };
    let log_options = LogOptions {
        log_level,
        json_format: settings.json_logs || cli_args.contains_key("json-logs"),
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    // Build the request from validated input
    let request = match build_request(&cli_args) {
        Ok(request) => request,
        Err(e) => {
            error!("{}", e);
            error!(
                "Usage: promoter --app=NAME --env=NAME --bucket=NAME --key=KEY \
                 --file=PATH --version-label=LABEL [--wait-timeout=SECS] [--settings=PATH]"
            );
            exit(EXIT_INVALID_INPUT);
        }
    };

    let options = AppOptions::from_settings(&settings);
    info!(
        "Running promoter with platform '{}' and poll interval {:?}",
        options.platform_base_url, options.monitor.poll_interval
    );

    match run(options, request, await_shutdown_signal()).await {
        Ok(Outcome::Ok) => {}
        Ok(Outcome::Failed { .. }) => exit(EXIT_FAILED),
        Ok(Outcome::Cancelled) => exit(EXIT_CANCELLED),
        Err(e) => {
            error!("Failed to run the promoter: {e}");
            exit(EXIT_FAILED);
        }
    }
}

/// Assemble a validated deployment request from CLI inputs and
/// environment credentials. Everything rejected here fails before any
/// remote call is made.
fn build_request(cli_args: &HashMap<String, String>) -> Result<DeploymentRequest, PromoterError> {
    let required = |key: &str| -> Result<&str, PromoterError> {
        cli_args
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| PromoterError::ValidationError(format!("missing required --{}", key)))
    };

    let wait_ceiling = match cli_args.get("wait-timeout") {
        Some(value) => {
            let secs: u64 = value.parse().map_err(|_| {
                PromoterError::ValidationError(format!(
                    "--wait-timeout must be a non-negative number of seconds, got '{}'",
                    value
                ))
            })?;
            Duration::from_secs(secs)
        }
        None => Duration::from_secs(300),
    };

    let access_key_id = env::var(ACCESS_KEY_ENV).map_err(|_| {
        PromoterError::ValidationError(format!("{} must be set", ACCESS_KEY_ENV))
    })?;
    let secret_access_key = env::var(SECRET_KEY_ENV).map_err(|_| {
        PromoterError::ValidationError(format!("{} must be set", SECRET_KEY_ENV))
    })?;
    let session_token = env::var(SESSION_TOKEN_ENV).ok();

    DeploymentRequest::new(
        required("app")?,
        required("env")?,
        required("bucket")?,
        required("key")?,
        required("file")?,
        required("version-label")?,
        wait_ceiling,
        Credentials::new(access_key_id, secret_access_key, session_token),
    )
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Ctrl+C received, shutting down...");
    }
}
