// ABOUTME: Errors that stop a rollout before or outside the convergence check.
// ABOUTME: Each variant maps to the step that failed for reporting.

use std::fmt;

use crate::tools::{BuildError, ConvergenceFailure, OrchestrationError, RegistryError, RevisionError};
use crate::types::{DeploymentTarget, ImageRef};

/// The step a rollout error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutStep {
    Configuration,
    Build,
    Push,
    Deploy,
    Rollback,
}

impl fmt::Display for RolloutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RolloutStep::Configuration => "configuration",
            RolloutStep::Build => "build",
            RolloutStep::Push => "push",
            RolloutStep::Deploy => "deploy",
            RolloutStep::Rollback => "rollback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RolloutError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("could not determine image tag: {0}")]
    Revision(#[from] RevisionError),

    #[error("failed to build {image}: {source}")]
    Build {
        image: ImageRef,
        #[source]
        source: BuildError,
    },

    #[error("failed to push {image}: {source}")]
    Push {
        image: ImageRef,
        #[source]
        source: RegistryError,
    },

    #[error("failed to update {target} to {image}: {source}")]
    DeployRequest {
        target: DeploymentTarget,
        image: ImageRef,
        #[source]
        source: OrchestrationError,
    },

    #[error("failed to request rollback of {target}: {source}")]
    RollbackRequest {
        target: DeploymentTarget,
        #[source]
        source: OrchestrationError,
    },

    #[error("rollback of {target} did not converge: {source}")]
    RollbackConvergence {
        target: DeploymentTarget,
        #[source]
        source: ConvergenceFailure,
    },
}

impl RolloutError {
    pub fn step(&self) -> RolloutStep {
        match self {
            RolloutError::Configuration(_) | RolloutError::Revision(_) => {
                RolloutStep::Configuration
            }
            RolloutError::Build { .. } => RolloutStep::Build,
            RolloutError::Push { .. } => RolloutStep::Push,
            RolloutError::DeployRequest { .. } => RolloutStep::Deploy,
            RolloutError::RollbackRequest { .. } | RolloutError::RollbackConvergence { .. } => {
                RolloutStep::Rollback
            }
        }
    }
}
