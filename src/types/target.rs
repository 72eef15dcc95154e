// ABOUTME: The Deployment and container a rollout updates.
// ABOUTME: Immutable for the duration of a rollout attempt.

use std::fmt;

use super::ResourceName;

/// Identifies the container inside a Deployment that receives the new image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeploymentTarget {
    namespace: ResourceName,
    deployment: ResourceName,
    container: ResourceName,
}

impl DeploymentTarget {
    pub fn new(namespace: ResourceName, deployment: ResourceName, container: ResourceName) -> Self {
        Self {
            namespace,
            deployment,
            container,
        }
    }

    pub fn namespace(&self) -> &ResourceName {
        &self.namespace
    }

    pub fn deployment(&self) -> &ResourceName {
        &self.deployment
    }

    pub fn container(&self) -> &ResourceName {
        &self.container
    }

    /// `deployment/<name>`, the form kubectl accepts as a resource argument.
    pub fn resource(&self) -> String {
        format!("deployment/{}", self.deployment)
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}[{}]",
            self.namespace, self.deployment, self.container
        )
    }
}
