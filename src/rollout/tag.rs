// ABOUTME: Image tag resolution from an explicit value or the source revision.
// ABOUTME: Explicit non-empty tags win; otherwise the short commit hash is used.

use crate::tools::SourceControl;
use crate::types::ImageTag;

use super::RolloutError;

/// Resolve the tag for this run.
///
/// An explicit tag that is blank after trimming counts as absent.
///
/// # Errors
///
/// Returns `RolloutError::Configuration` when the explicit tag is invalid or
/// the derived revision is not a usable tag, and `RolloutError::Revision`
/// when no revision can be read.
pub async fn resolve_image_tag<S: SourceControl + ?Sized>(
    explicit: Option<&str>,
    scm: &S,
) -> Result<ImageTag, RolloutError> {
    if let Some(tag) = explicit.filter(|t| !t.trim().is_empty()) {
        return ImageTag::new(tag)
            .map_err(|e| RolloutError::Configuration(format!("invalid image tag {tag:?}: {e}")));
    }

    let revision = scm.short_revision().await?;
    tracing::debug!(%revision, "derived image tag from source revision");
    ImageTag::new(&revision).map_err(|e| {
        RolloutError::Configuration(format!("revision {revision:?} is not a valid tag: {e}"))
    })
}
