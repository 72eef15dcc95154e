// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a commented kubeship.yml template.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ResourceName;

use super::{CONFIG_FILENAME, DEFAULT_NAMESPACE, DEFAULT_REGION};

/// Values filled into the generated template.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub deployment: Option<String>,
    pub container: Option<String>,
    pub repository: Option<String>,
}

pub fn init_config(dir: &Path, options: &InitOptions, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let deployment = options.deployment.as_deref().unwrap_or("my-app-deployment");
    let container = options.container.as_deref().unwrap_or("my-app");
    let repository = options.repository.as_deref().unwrap_or(container);

    for (field, value) in [("deployment", deployment), ("container", container)] {
        ResourceName::new(value)
            .map_err(|e| Error::InvalidConfig(format!("{field}: {e}")))?;
    }
    if repository.trim().is_empty() || repository.contains(':') {
        return Err(Error::InvalidConfig(format!(
            "repository: {repository:?} is not a repository name"
        )));
    }

    std::fs::write(
        &config_path,
        template_yaml(deployment, container, repository),
    )?;

    Ok(())
}

fn template_yaml(deployment: &str, container: &str, repository: &str) -> String {
    format!(
        r#"target:
  namespace: {DEFAULT_NAMESPACE}
  deployment: {deployment}
  container: {container}

registry:
  # Host defaults to <account_id>.dkr.ecr.<region>.amazonaws.com
  # account_id: "123456789012"
  region: {DEFAULT_REGION}
  repository: {repository}

build:
  context: .
  # dockerfile: Dockerfile
  # platform: linux/amd64
  # args:
  #   NODE_ENV: production
  #   NPM_TOKEN: {{ env: NPM_TOKEN }}

cluster:
  # name: eks-cluster
  update_kubeconfig: false

rollout_timeout: 5m
poll_interval: 2s
"#
    )
}
