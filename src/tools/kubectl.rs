// ABOUTME: OrchestrationClient backed by the kubectl command-line tool.
// ABOUTME: Reads Deployment and Pod JSON and issues set-image / rollout-undo requests.

use std::time::Duration;

use async_trait::async_trait;

use super::exec::{ToolCommand, ToolOutput};
use super::kube_objects::{DeploymentObject, PodList};
use super::orchestration::{OrchestrationClient, OrchestrationError};
use crate::rollout::{Convergence, assess};
use crate::types::{DeploymentTarget, ImageRef};

const KUBECTL: &str = "kubectl";

/// Per-request timeout handed to kubectl and enforced on the process.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct Kubectl {
    context: Option<String>,
}

impl Kubectl {
    pub fn new(context: Option<String>) -> Self {
        Self { context }
    }

    fn command(&self, target: &DeploymentTarget) -> ToolCommand {
        let mut cmd = ToolCommand::new(KUBECTL);
        if let Some(ref context) = self.context {
            cmd = cmd.args(["--context", context.as_str()]);
        }
        cmd.args(["--namespace", target.namespace().as_str()])
            .arg(format!("--request-timeout={}s", REQUEST_TIMEOUT.as_secs()))
            // Leave headroom for kubectl to report its own timeout first
            .timeout(REQUEST_TIMEOUT + Duration::from_secs(5))
    }

    async fn get_deployment(
        &self,
        target: &DeploymentTarget,
    ) -> Result<DeploymentObject, OrchestrationError> {
        let output = self
            .command(target)
            .args(["get", "deployment", target.deployment().as_str(), "-o", "json"])
            .output()
            .await?;
        if !output.success() {
            return Err(classify(target, &output));
        }
        serde_json::from_str(&output.stdout)
            .map_err(|e| OrchestrationError::InvalidResponse(format!("deployment JSON: {e}")))
    }

    async fn get_pods(
        &self,
        target: &DeploymentTarget,
        selector: &str,
    ) -> Result<PodList, OrchestrationError> {
        let output = self
            .command(target)
            .args(["get", "pods", "-l", selector, "-o", "json"])
            .output()
            .await?;
        if !output.success() {
            return Err(classify(target, &output));
        }
        serde_json::from_str(&output.stdout)
            .map_err(|e| OrchestrationError::InvalidResponse(format!("pod list JSON: {e}")))
    }
}

#[async_trait]
impl OrchestrationClient for Kubectl {
    async fn current_image(
        &self,
        target: &DeploymentTarget,
    ) -> Result<Option<ImageRef>, OrchestrationError> {
        let deployment = self.get_deployment(target).await?;
        let image = deployment
            .container_image(target.container().as_str())
            .ok_or_else(|| container_not_found(target))?;

        // Images that do not parse (e.g. set by hand) are reported as unknown
        match ImageRef::parse(image) {
            Ok(image) => Ok(Some(image)),
            Err(e) => {
                tracing::debug!(%image, error = %e, "current image is not a valid reference");
                Ok(None)
            }
        }
    }

    async fn set_image(
        &self,
        target: &DeploymentTarget,
        image: &ImageRef,
    ) -> Result<(), OrchestrationError> {
        let output = self
            .command(target)
            .args(["set", "image", target.resource().as_str()])
            .arg(format!("{}={}", target.container(), image))
            .output()
            .await?;
        if output.success() {
            Ok(())
        } else {
            Err(classify(target, &output))
        }
    }

    async fn rollout_state(
        &self,
        target: &DeploymentTarget,
        expected: Option<&ImageRef>,
    ) -> Result<Convergence, OrchestrationError> {
        let deployment = self.get_deployment(target).await?;
        if deployment
            .container_image(target.container().as_str())
            .is_none()
        {
            return Err(container_not_found(target));
        }

        let pods = match deployment.selector() {
            Some(selector) => self.get_pods(target, &selector).await?,
            None => PodList::default(),
        };

        Ok(assess(
            &deployment,
            &pods,
            target.container().as_str(),
            expected,
        ))
    }

    async fn undo_rollout(&self, target: &DeploymentTarget) -> Result<(), OrchestrationError> {
        let output = self
            .command(target)
            .args(["rollout", "undo", target.resource().as_str()])
            .output()
            .await?;
        if output.success() {
            Ok(())
        } else {
            Err(classify(target, &output))
        }
    }
}

fn container_not_found(target: &DeploymentTarget) -> OrchestrationError {
    OrchestrationError::ContainerNotFound {
        deployment: target.deployment().to_string(),
        container: target.container().to_string(),
    }
}

/// Map a failed kubectl invocation onto an error variant.
///
/// Only the API server's own NotFound answer means the Deployment is missing;
/// client-side failures such as an unknown context or a missing credential
/// plugin keep their message.
fn classify(target: &DeploymentTarget, output: &ToolOutput) -> OrchestrationError {
    let message = output.message();
    let lower = message.to_lowercase();

    if lower.contains("unable to find container named") {
        container_not_found(target)
    } else if message.contains("Error from server (NotFound)") {
        OrchestrationError::NotFound(format!(
            "{}/{}",
            target.namespace(),
            target.deployment()
        ))
    } else if lower.contains("forbidden") || lower.contains("unauthorized") {
        OrchestrationError::Forbidden(message)
    } else {
        OrchestrationError::Rejected(message)
    }
}
