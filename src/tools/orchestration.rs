// ABOUTME: Orchestration client capability for Kubernetes Deployments.
// ABOUTME: Image updates, rollout observation with a bounded wait, and rollback requests.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::ExecError;
use crate::rollout::Convergence;
use crate::types::{DeploymentTarget, ImageRef};

/// Bounds for observing a rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutWait {
    /// Give up once this much time has passed.
    pub timeout: Duration,
    /// Pause between status reads.
    pub poll_interval: Duration,
}

impl RolloutWait {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

/// A rollout that reached its desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Converged {
    /// Available replicas at the time convergence was observed.
    pub replicas: u32,
    pub elapsed: Duration,
}

/// Why a rollout did not converge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvergenceFailure {
    #[error("rollout did not converge within {timeout:?} (last status: {last_status})")]
    Timeout {
        timeout: Duration,
        last_status: String,
    },

    #[error("platform reported failure: {0}")]
    PlatformReported(String),

    #[error("rollout cannot be observed: {0}")]
    Unobservable(String),
}

/// Talks to the orchestration platform on behalf of the coordinator.
///
/// Implementations only need the four primitive requests; the bounded wait is
/// provided on top of [`OrchestrationClient::rollout_state`].
#[async_trait]
pub trait OrchestrationClient: Send + Sync {
    /// Image currently configured for the target container, if it exists.
    async fn current_image(
        &self,
        target: &DeploymentTarget,
    ) -> Result<Option<ImageRef>, OrchestrationError>;

    /// Point the target container at `image`. Accepted immediately; the
    /// rollout proceeds asynchronously.
    async fn set_image(
        &self,
        target: &DeploymentTarget,
        image: &ImageRef,
    ) -> Result<(), OrchestrationError>;

    /// One read of the rollout state.
    ///
    /// With `expected` set, a pod template running any other image is a
    /// failure: another writer changed the Deployment underneath us.
    async fn rollout_state(
        &self,
        target: &DeploymentTarget,
        expected: Option<&ImageRef>,
    ) -> Result<Convergence, OrchestrationError>;

    /// Revert the target to its previous revision.
    async fn undo_rollout(&self, target: &DeploymentTarget) -> Result<(), OrchestrationError>;

    /// Poll [`rollout_state`](Self::rollout_state) until the rollout converges,
    /// fails, or `wait.timeout` elapses.
    ///
    /// A rollout that is already converged, or already progressing towards
    /// `expected`, is reported like any other. Read errors are tolerated until
    /// the deadline, except for a missing Deployment or container. A read
    /// still running at the deadline is abandoned.
    async fn wait_for_rollout(
        &self,
        target: &DeploymentTarget,
        expected: Option<&ImageRef>,
        wait: &RolloutWait,
    ) -> Result<Converged, ConvergenceFailure> {
        let start = Instant::now();
        let mut last_status = String::from("no status observed");

        loop {
            let remaining = wait.timeout.saturating_sub(start.elapsed());
            let read =
                match tokio::time::timeout(remaining, self.rollout_state(target, expected)).await {
                    Ok(read) => read,
                    Err(_elapsed) => {
                        tracing::warn!(deployment = %target, "rollout status read still running at the deadline");
                        return Err(ConvergenceFailure::Timeout {
                            timeout: wait.timeout,
                            last_status,
                        });
                    }
                };

            match read {
                Ok(Convergence::Converged { replicas }) => {
                    return Ok(Converged {
                        replicas,
                        elapsed: start.elapsed(),
                    });
                }
                Ok(Convergence::Failed { reason }) => {
                    return Err(ConvergenceFailure::PlatformReported(reason));
                }
                Ok(Convergence::Progressing { message }) => {
                    tracing::debug!(deployment = %target, %message, "rollout progressing");
                    last_status = message;
                }
                Err(e) if e.is_permanent() => {
                    return Err(ConvergenceFailure::Unobservable(e.to_string()));
                }
                Err(e) => {
                    tracing::warn!(deployment = %target, error = %e, "failed to read rollout status");
                    last_status = e.to_string();
                }
            }

            let elapsed = start.elapsed();
            if elapsed >= wait.timeout {
                return Err(ConvergenceFailure::Timeout {
                    timeout: wait.timeout,
                    last_status,
                });
            }

            let remaining = wait.timeout - elapsed;
            tokio::time::sleep(wait.poll_interval.min(remaining)).await;
        }
    }
}

/// Errors from orchestration requests.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("deployment not found: {0}")]
    NotFound(String),

    #[error("container {container} not found in deployment {deployment}")]
    ContainerNotFound {
        deployment: String,
        container: String,
    },

    #[error("request forbidden: {0}")]
    Forbidden(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl OrchestrationError {
    /// Errors that will not go away by asking again.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            OrchestrationError::NotFound(_) | OrchestrationError::ContainerNotFound { .. }
        )
    }
}
