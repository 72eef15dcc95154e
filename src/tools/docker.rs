// ABOUTME: ImageBuilder and RegistryClient backed by the docker command-line tool.
// ABOUTME: ECR registries are logged into with a password from the AWS CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use super::aws::{AwsCli, is_ecr_host};
use super::builder::{BuildError, ImageBuilder};
use super::exec::ToolCommand;
use super::registry::{RegistryClient, RegistryError};
use crate::types::ImageRef;

const DOCKER: &str = "docker";

const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Options passed to every `docker build`.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub dockerfile: Option<PathBuf>,
    pub platform: Option<String>,
    /// Sorted `KEY=VALUE` pairs.
    pub build_args: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct DockerCli {
    options: BuildOptions,
    aws: Option<AwsCli>,
}

impl DockerCli {
    /// `aws` is used to log in to ECR hosts; other hosts are expected to be
    /// logged in already.
    pub fn new(options: BuildOptions, aws: Option<AwsCli>) -> Self {
        Self { options, aws }
    }

    fn build_command(&self, context: &Path, image: &ImageRef) -> ToolCommand {
        let mut cmd = ToolCommand::new(DOCKER).args(["build", "--tag"]).arg(image.to_string());

        if let Some(ref dockerfile) = self.options.dockerfile {
            cmd = cmd.arg("--file").arg(dockerfile.display().to_string());
        }
        if let Some(ref platform) = self.options.platform {
            cmd = cmd.args(["--platform", platform.as_str()]);
        }
        for (key, value) in &self.options.build_args {
            cmd = cmd.arg("--build-arg").arg(format!("{key}={value}"));
        }

        cmd.arg(context.display().to_string())
    }
}

#[async_trait]
impl ImageBuilder for DockerCli {
    async fn build(&self, context: &Path, image: &ImageRef) -> Result<(), BuildError> {
        if !context.is_dir() {
            return Err(BuildError::ContextNotFound(context.to_path_buf()));
        }

        let output = self.build_command(context, image).output().await?;
        if output.success() {
            Ok(())
        } else {
            Err(BuildError::Failed {
                code: output.exit_code,
                message: last_lines(&output.message(), 10),
            })
        }
    }
}

#[async_trait]
impl RegistryClient for DockerCli {
    async fn authenticate(&self, registry_host: &str) -> Result<(), RegistryError> {
        // The login password is only valid in the registry's own region
        let aws = match self.aws {
            Some(ref aws) if is_ecr_host(registry_host) => aws.for_registry(registry_host),
            _ => {
                tracing::debug!(registry = %registry_host, "not an ECR host, using existing docker credentials");
                return Ok(());
            }
        };

        let password = aws
            .ecr_login_password()
            .await
            .map_err(|e| RegistryError::AuthenticationFailed {
                registry: registry_host.to_string(),
                message: e.to_string(),
            })?;

        let output = ToolCommand::new(DOCKER)
            .args(["login", "--username", "AWS", "--password-stdin", registry_host])
            .stdin(password)
            .timeout(LOGIN_TIMEOUT)
            .output()
            .await?;

        if output.success() {
            Ok(())
        } else {
            Err(RegistryError::AuthenticationFailed {
                registry: registry_host.to_string(),
                message: output.message(),
            })
        }
    }

    async fn push(&self, image: &ImageRef) -> Result<(), RegistryError> {
        let output = ToolCommand::new(DOCKER)
            .arg("push")
            .arg(image.to_string())
            .output()
            .await?;

        if output.success() {
            return Ok(());
        }

        let message = output.message();
        if is_auth_failure(&message) {
            Err(RegistryError::AuthenticationFailed {
                registry: image.registry().unwrap_or("docker.io").to_string(),
                message,
            })
        } else {
            Err(RegistryError::PushFailed(last_lines(&message, 10)))
        }
    }
}

fn is_auth_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["denied", "unauthorized", "no basic auth credentials", "authorization token has expired"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Keep the tail of noisy build/push output.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
