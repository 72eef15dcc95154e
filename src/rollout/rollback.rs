// ABOUTME: Operator-requested rollback outside a deploy run.
// ABOUTME: Undoes the last revision of a Deployment and waits for it to converge.

use crate::tools::{Converged, OrchestrationClient, RolloutWait};
use crate::types::DeploymentTarget;

use super::RolloutError;

/// Revert `target` to its previous revision and observe convergence.
///
/// # Errors
///
/// Returns `RolloutError::RollbackRequest` if the undo is rejected (for
/// example when the Deployment has no earlier revision) and
/// `RolloutError::RollbackConvergence` if the restored revision does not
/// converge within `wait.timeout`.
pub async fn manual_rollback<O: OrchestrationClient + ?Sized>(
    orchestrator: &O,
    target: &DeploymentTarget,
    wait: &RolloutWait,
) -> Result<Converged, RolloutError> {
    orchestrator
        .undo_rollout(target)
        .await
        .map_err(|source| RolloutError::RollbackRequest {
            target: target.clone(),
            source,
        })?;

    tracing::info!(deployment = %target, "rollback requested");

    orchestrator
        .wait_for_rollout(target, None, wait)
        .await
        .map_err(|source| RolloutError::RollbackConvergence {
            target: target.clone(),
            source,
        })
}
