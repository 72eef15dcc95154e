// ABOUTME: Source control capability used to derive default image tags.
// ABOUTME: Reports the short revision of the working tree.

use async_trait::async_trait;

use super::ExecError;

#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Short identifier of the current revision, e.g. `abc1234`.
    async fn short_revision(&self) -> Result<String, RevisionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    #[error("not a source repository: {0}")]
    NotARepository(String),

    #[error("could not read current revision: {0}")]
    Failed(String),

    #[error(transparent)]
    Exec(#[from] ExecError),
}
