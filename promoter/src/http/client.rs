//! HTTP client implementation
//!
//! Owns the wire protocol of the hosting platform: a plain JSON/HTTP
//! surface with credential headers. The rest of the agent only sees
//! the `Platform` trait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, error};

use crate::deploy::platform::Platform;
use crate::errors::PromoterError;
use crate::models::request::Credentials;
use crate::models::version::VersionStatus;

const ACCESS_KEY_HEADER: &str = "X-Access-Key-Id";
const SECRET_KEY_HEADER: &str = "X-Secret-Access-Key";
const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

/// HTTP client for platform communication
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, PromoterError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attach credential headers. Secrets are exposed here only, at
    /// send time, and never appear in logs.
    fn with_credentials(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
    ) -> RequestBuilder {
        let mut request = request
            .header(ACCESS_KEY_HEADER, &credentials.access_key_id)
            .header(
                SECRET_KEY_HEADER,
                credentials.secret_access_key.expose_secret(),
            );

        if let Some(token) = &credentials.session_token {
            request = request.header(SESSION_TOKEN_HEADER, token.expose_secret());
        }

        request
    }
}

/// Status payload returned by the version status endpoint
#[derive(Debug, Clone, Deserialize)]
struct VersionStatusResponse {
    status: Option<String>,
}

impl VersionStatusResponse {
    fn into_status(self) -> VersionStatus {
        match self.status.as_deref() {
            Some("ready") | Some("processed") => VersionStatus::Ready,
            Some("pending") | Some("processing") => VersionStatus::Pending,
            // Anything unrecognized, including a missing field, is a
            // retryable unknown rather than a hard failure.
            _ => VersionStatus::Unknown,
        }
    }
}

#[async_trait]
impl Platform for HttpClient {
    async fn store_artifact(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        credentials: &Credentials,
    ) -> Result<(), PromoterError> {
        let url = format!("{}/storage/{}/{}", self.base_url, bucket, key);
        debug!("PUT {}", url);

        let request = self
            .client
            .put(&url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(body);

        let response = self.with_credentials(request, credentials).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Bundle upload failed: {} - {}", status, body);
            return Err(PromoterError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn register_version(
        &self,
        app_id: &str,
        bucket: &str,
        key: &str,
        version_label: &str,
        credentials: &Credentials,
    ) -> Result<(), PromoterError> {
        let url = format!("{}/applications/{}/versions", self.base_url, app_id);
        debug!("POST {}", url);

        let body = serde_json::json!({
            "version_label": version_label,
            "source_bundle": { "bucket": bucket, "key": key },
            "auto_create_application": true,
            "process": true,
        });

        let request = self.client.post(&url).json(&body);
        let response = self.with_credentials(request, credentials).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Version registration failed: {} - {}", status, body);
            return Err(PromoterError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn query_version_status(
        &self,
        app_id: &str,
        version_label: &str,
        credentials: &Credentials,
    ) -> Result<VersionStatus, PromoterError> {
        let url = format!(
            "{}/applications/{}/versions/{}",
            self.base_url, app_id, version_label
        );
        debug!("GET {}", url);

        let request = self.client.get(&url);
        let response = self.with_credentials(request, credentials).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(VersionStatus::NotFound);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Version status query failed: {} - {}", status, body);
            return Err(PromoterError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body: VersionStatusResponse = response.json().await?;
        Ok(body.into_status())
    }

    async fn activate_version(
        &self,
        app_id: &str,
        environment_id: &str,
        version_label: &str,
        credentials: &Credentials,
    ) -> Result<(), PromoterError> {
        let url = format!(
            "{}/applications/{}/environments/{}/release",
            self.base_url, app_id, environment_id
        );
        debug!("POST {}", url);

        let body = serde_json::json!({ "version_label": version_label });

        let request = self.client.post(&url).json(&body);
        let response = self.with_credentials(request, credentials).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Environment activation failed: {} - {}", status, body);
            return Err(PromoterError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = HttpClient::new("https://platform.example/api/", Duration::from_secs(30))
            .unwrap();
        assert_eq!(client.base_url(), "https://platform.example/api");
    }

    #[test]
    fn test_status_response_mapping() {
        let parse = |json: &str| -> VersionStatus {
            serde_json::from_str::<VersionStatusResponse>(json)
                .unwrap()
                .into_status()
        };

        assert_eq!(parse(r#"{"status":"ready"}"#), VersionStatus::Ready);
        assert_eq!(parse(r#"{"status":"processed"}"#), VersionStatus::Ready);
        assert_eq!(parse(r#"{"status":"pending"}"#), VersionStatus::Pending);
        assert_eq!(parse(r#"{"status":"processing"}"#), VersionStatus::Pending);
        assert_eq!(parse(r#"{"status":"mystery"}"#), VersionStatus::Unknown);
        assert_eq!(parse(r#"{"status":null}"#), VersionStatus::Unknown);
        assert_eq!(parse(r#"{}"#), VersionStatus::Unknown);
    }
}
