//! Deployment request models

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::errors::PromoterError;

/// Credential bundle passed to the platform on every call.
///
/// Opaque to the rest of the agent: the pipeline threads it through
/// without inspecting it, and the secret fields are redacted in Debug
/// output by `secrecy`.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Access key identifier
    pub access_key_id: String,

    /// Secret access key
    pub secret_access_key: SecretString,

    /// Optional session token for temporary credentials
    pub session_token: Option<SecretString>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            session_token: session_token.map(SecretString::from),
        }
    }
}

/// One promotion, described up front and read-only for the rest of
/// the run.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    /// Target application identifier
    pub app_id: String,

    /// Target environment identifier
    pub environment_id: String,

    /// Object store bucket for the bundle
    pub bucket: String,

    /// Object store key for the bundle
    pub key: String,

    /// Local path of the bundle to upload
    pub artifact_path: PathBuf,

    /// Caller-chosen version label, unique per application
    pub version_label: String,

    /// Ceiling for the processing wait stage. Zero means a single
    /// status check with no waiting.
    pub wait_ceiling: Duration,

    /// Credentials forwarded to every platform call
    pub credentials: Credentials,
}

impl DeploymentRequest {
    /// Build a validated request. Empty identifiers are rejected here
    /// so the pipeline never issues a remote call for malformed input.
    pub fn new(
        app_id: impl Into<String>,
        environment_id: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
        artifact_path: impl Into<PathBuf>,
        version_label: impl Into<String>,
        wait_ceiling: Duration,
        credentials: Credentials,
    ) -> Result<Self, PromoterError> {
        let request = Self {
            app_id: app_id.into(),
            environment_id: environment_id.into(),
            bucket: bucket.into(),
            key: key.into(),
            artifact_path: artifact_path.into(),
            version_label: version_label.into(),
            wait_ceiling,
            credentials,
        };

        for (name, value) in [
            ("app", &request.app_id),
            ("environment", &request.environment_id),
            ("bucket", &request.bucket),
            ("key", &request.key),
            ("version-label", &request.version_label),
        ] {
            if value.trim().is_empty() {
                return Err(PromoterError::ValidationError(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }

        if request.artifact_path.as_os_str().is_empty() {
            return Err(PromoterError::ValidationError(
                "artifact file path must not be empty".to_string(),
            ));
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("AKID", "hunter2", Some("tok3n".to_string()))
    }

    #[test]
    fn test_request_accepts_valid_input() {
        let request = DeploymentRequest::new(
            "api",
            "prod",
            "bundles",
            "api/v1.zip",
            "/tmp/bundle.zip",
            "v1",
            Duration::from_secs(60),
            creds(),
        )
        .unwrap();

        assert_eq!(request.app_id, "api");
        assert_eq!(request.wait_ceiling, Duration::from_secs(60));
    }

    #[test]
    fn test_request_rejects_empty_identifiers() {
        let result = DeploymentRequest::new(
            "",
            "prod",
            "bundles",
            "api/v1.zip",
            "/tmp/bundle.zip",
            "v1",
            Duration::from_secs(60),
            creds(),
        );

        assert!(matches!(result, Err(PromoterError::ValidationError(_))));
    }

    #[test]
    fn test_request_rejects_blank_version_label() {
        let result = DeploymentRequest::new(
            "api",
            "prod",
            "bundles",
            "api/v1.zip",
            "/tmp/bundle.zip",
            "   ",
            Duration::from_secs(60),
            creds(),
        );

        assert!(matches!(result, Err(PromoterError::ValidationError(_))));
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let rendered = format!("{:?}", creds());
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tok3n"));
        assert!(rendered.contains("AKID"));
    }

    #[test]
    fn test_zero_ceiling_is_valid() {
        let request = DeploymentRequest::new(
            "api",
            "prod",
            "bundles",
            "api/v1.zip",
            "/tmp/bundle.zip",
            "v1",
            Duration::ZERO,
            creds(),
        );

        assert!(request.is_ok());
    }
}
