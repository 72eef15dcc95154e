// ABOUTME: Thin wrapper around the AWS command-line tool.
// ABOUTME: Fetches ECR login passwords and writes EKS kubeconfig entries.

use std::time::Duration;

use super::exec::{ExecError, ToolCommand};

const AWS: &str = "aws";

const AWS_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors from AWS CLI invocations.
#[derive(Debug, thiserror::Error)]
pub enum AwsError {
    #[error("aws {operation} failed: {message}")]
    Failed { operation: String, message: String },

    #[error(transparent)]
    Exec(#[from] ExecError),
}

#[derive(Debug, Clone)]
pub struct AwsCli {
    region: String,
}

impl AwsCli {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Client for the region an ECR host lives in; other hosts keep this
    /// client's region.
    pub fn for_registry(&self, registry_host: &str) -> AwsCli {
        match ecr_host_region(registry_host) {
            Some(region) if region != self.region => {
                tracing::debug!(registry = %registry_host, %region, "using registry region for ECR login");
                AwsCli::new(region)
            }
            _ => self.clone(),
        }
    }

    fn command(&self) -> ToolCommand {
        ToolCommand::new(AWS)
            .args(["--region", self.region.as_str()])
            .timeout(AWS_TIMEOUT)
    }

    /// Short-lived password for `docker login` against ECR.
    pub async fn ecr_login_password(&self) -> Result<String, AwsError> {
        let output = self
            .command()
            .args(["ecr", "get-login-password"])
            .output()
            .await?;
        if !output.success() {
            return Err(AwsError::Failed {
                operation: format!("ecr get-login-password (region {})", self.region),
                message: output.message(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }

    /// Add or refresh the kubeconfig entry for an EKS cluster.
    pub async fn update_kubeconfig(
        &self,
        cluster: &str,
        alias: Option<&str>,
    ) -> Result<(), AwsError> {
        let mut cmd = self
            .command()
            .args(["eks", "update-kubeconfig", "--name", cluster]);
        if let Some(alias) = alias {
            cmd = cmd.args(["--alias", alias]);
        }

        let output = cmd.output().await?;
        if !output.success() {
            return Err(AwsError::Failed {
                operation: "eks update-kubeconfig".to_string(),
                message: output.message(),
            });
        }
        Ok(())
    }
}

/// Whether `host` is an ECR registry endpoint.
pub fn is_ecr_host(host: &str) -> bool {
    host.contains(".dkr.ecr.") && host.ends_with(".amazonaws.com")
}

/// Region part of `<account>.dkr.ecr.<region>.amazonaws.com`.
pub fn ecr_host_region(host: &str) -> Option<&str> {
    if !is_ecr_host(host) {
        return None;
    }
    let (_, rest) = host.split_once(".dkr.ecr.")?;
    let region = rest.strip_suffix(".amazonaws.com")?;
    (!region.is_empty() && !region.contains('.')).then_some(region)
}

/// `<account>.dkr.ecr.<region>.amazonaws.com`
pub fn ecr_registry_host(account_id: &str, region: &str) -> String {
    format!("{account_id}.dkr.ecr.{region}.amazonaws.com")
}
