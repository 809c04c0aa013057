//! Remote platform capability seam

use async_trait::async_trait;

use crate::errors::PromoterError;
use crate::models::request::Credentials;
use crate::models::version::VersionStatus;

/// The four remote operations a deployment run needs from the hosting
/// platform. The orchestrator only ever talks to this trait; the wire
/// protocol lives entirely in the implementation.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Durably upload the bundle to the named object-store location
    async fn store_artifact(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        credentials: &Credentials,
    ) -> Result<(), PromoterError>;

    /// Register a version pointing at the stored bundle. Auto-creates
    /// the application when missing and requests asynchronous
    /// processing of the bundle.
    async fn register_version(
        &self,
        app_id: &str,
        bucket: &str,
        key: &str,
        version_label: &str,
        credentials: &Credentials,
    ) -> Result<(), PromoterError>;

    /// Single-shot status read for a registered version. Never blocks
    /// waiting for a transition.
    async fn query_version_status(
        &self,
        app_id: &str,
        version_label: &str,
        credentials: &Credentials,
    ) -> Result<VersionStatus, PromoterError>;

    /// Switch the live environment to the given version
    async fn activate_version(
        &self,
        app_id: &str,
        environment_id: &str,
        version_label: &str,
        credentials: &Credentials,
    ) -> Result<(), PromoterError>;
}
