// ABOUTME: SourceControl backed by the git command-line tool.
// ABOUTME: Derives default image tags from the short commit hash.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::exec::ToolCommand;
use super::source_control::{RevisionError, SourceControl};

#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }
}

#[async_trait]
impl SourceControl for GitCli {
    async fn short_revision(&self) -> Result<String, RevisionError> {
        let output = ToolCommand::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .current_dir(&self.repo_dir)
            .timeout(Duration::from_secs(10))
            .output()
            .await?;

        if output.success() {
            return Ok(output.stdout.trim().to_string());
        }

        let message = output.message();
        if message.to_lowercase().contains("not a git repository") {
            Err(RevisionError::NotARepository(
                self.repo_dir.display().to_string(),
            ))
        } else {
            Err(RevisionError::Failed(message))
        }
    }
}
