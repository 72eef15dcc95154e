// ABOUTME: Registry client capability.
// ABOUTME: Authenticates against a registry host and uploads images.

use async_trait::async_trait;

use super::ExecError;
use crate::types::ImageRef;

/// Pushes images to a container registry.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Log in to `registry_host`.
    async fn authenticate(&self, registry_host: &str) -> Result<(), RegistryError>;

    /// Upload `image`. Pushing an unchanged image is a no-op on the registry side.
    async fn push(&self, image: &ImageRef) -> Result<(), RegistryError>;
}

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("authentication failed for registry {registry}: {message}")]
    AuthenticationFailed { registry: String, message: String },

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl RegistryError {
    pub fn is_auth(&self) -> bool {
        matches!(self, RegistryError::AuthenticationFailed { .. })
    }
}
