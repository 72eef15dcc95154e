// ABOUTME: Image builder capability.
// ABOUTME: Turns a build context into a tagged local image.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::ExecError;
use crate::types::ImageRef;

/// Builds a container image from a context directory.
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Build `image` from `context`. Rebuilding the same tag overwrites it.
    async fn build(&self, context: &Path, image: &ImageRef) -> Result<(), BuildError>;
}

/// Errors from image builds.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("build context not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("build exited with code {code:?}: {message}")]
    Failed { code: Option<i32>, message: String },

    #[error(transparent)]
    Exec(#[from] ExecError),
}
