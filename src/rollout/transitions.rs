// ABOUTME: State transition methods for a rollout.
// ABOUTME: Each method consumes self and returns the next state on success.

use chrono::Utc;

use crate::diagnostics::{Diagnostics, Warning};
use crate::tools::{ConvergenceFailure, OrchestrationClient, RolloutWait};

use super::Rollout;
use super::error::RolloutError;
use super::outcome::{Outcome, RolloutReport};
use super::state::{Live, Pending, Updated};

/// Result type for transitions whose failure leads to the rollback path.
pub type TransitionResult<T, S> = Result<Rollout<T>, (Rollout<S>, ConvergenceFailure)>;

// =============================================================================
// Pending -> Updated
// =============================================================================

impl Rollout<Pending> {
    /// Record the image currently deployed, then point the container at the
    /// new image.
    ///
    /// Failing to read the current image only costs the report its
    /// "rolled back to" detail, so it is collected as a warning.
    ///
    /// # Errors
    ///
    /// Returns `RolloutError::DeployRequest` if the update is rejected. Nothing
    /// changed on the platform in that case, so no rollback is needed.
    #[must_use = "rollout state must be used"]
    pub async fn update<O: OrchestrationClient + ?Sized>(
        mut self,
        orchestrator: &O,
        diagnostics: &mut Diagnostics,
    ) -> Result<Rollout<Updated>, RolloutError> {
        match orchestrator.current_image(&self.target).await {
            Ok(Some(previous)) => {
                if previous == self.image {
                    tracing::info!(deployment = %self.target, image = %self.image, "deployment already runs this image");
                }
                self.previous_image = Some(previous);
            }
            Ok(None) => diagnostics.warn(Warning::previous_image_unknown(format!(
                "current image of {} is not a recognizable reference",
                self.target
            ))),
            Err(e) => diagnostics.warn(Warning::previous_image_unknown(format!(
                "could not read current image of {}: {e}",
                self.target
            ))),
        }

        if let Err(source) = orchestrator.set_image(&self.target, &self.image).await {
            return Err(RolloutError::DeployRequest {
                target: self.target,
                image: self.image,
                source,
            });
        }

        tracing::info!(deployment = %self.target, image = %self.image, "image update accepted");
        Ok(self.transition(Updated))
    }
}

// =============================================================================
// Updated -> Live | rollback
// =============================================================================

impl Rollout<Updated> {
    /// Wait for every replica to run the new image.
    ///
    /// # Errors
    ///
    /// Hands the rollout back with the failure so the caller can roll back.
    #[must_use = "rollout state must be used"]
    pub async fn observe<O: OrchestrationClient + ?Sized>(
        self,
        orchestrator: &O,
        wait: &RolloutWait,
    ) -> TransitionResult<Live, Updated> {
        match orchestrator
            .wait_for_rollout(&self.target, Some(&self.image), wait)
            .await
        {
            Ok(converged) => {
                tracing::info!(
                    deployment = %self.target,
                    replicas = converged.replicas,
                    elapsed = ?converged.elapsed,
                    "rollout converged"
                );
                Ok(self.transition(Live))
            }
            Err(failure) => {
                tracing::warn!(deployment = %self.target, error = %failure, "rollout failed");
                Err((self, failure))
            }
        }
    }

    /// Revert the Deployment to its prior revision and wait for that to
    /// converge. The undo request is issued exactly once.
    ///
    /// Always ends the rollout; a rollback that cannot be requested or does
    /// not converge yields `Outcome::RollbackFailed`.
    pub async fn roll_back<O: OrchestrationClient + ?Sized>(
        self,
        orchestrator: &O,
        wait: &RolloutWait,
        cause: ConvergenceFailure,
    ) -> RolloutReport {
        tracing::info!(deployment = %self.target, "requesting rollback");

        let rollback_error = match orchestrator.undo_rollout(&self.target).await {
            Err(source) => Some(RolloutError::RollbackRequest {
                target: self.target.clone(),
                source,
            }),
            // The restored template is whatever the previous revision held
            Ok(()) => match orchestrator.wait_for_rollout(&self.target, None, wait).await {
                Ok(converged) => {
                    tracing::info!(
                        deployment = %self.target,
                        replicas = converged.replicas,
                        "rollback converged"
                    );
                    None
                }
                Err(source) => Some(RolloutError::RollbackConvergence {
                    target: self.target.clone(),
                    source,
                }),
            },
        };

        let outcome = match rollback_error {
            None => Outcome::RolledBack,
            Some(ref e) => {
                tracing::error!(deployment = %self.target, error = %e, "rollback failed");
                Outcome::RollbackFailed
            }
        };

        self.into_report(outcome, Some(cause), rollback_error.map(|e| e.to_string()))
    }
}

// =============================================================================
// Live -> report
// =============================================================================

impl Rollout<Live> {
    pub fn finish(self) -> RolloutReport {
        self.into_report(Outcome::Succeeded, None, None)
    }
}

impl<S> Rollout<S> {
    fn into_report(
        self,
        outcome: Outcome,
        failure: Option<ConvergenceFailure>,
        rollback_error: Option<String>,
    ) -> RolloutReport {
        RolloutReport {
            target: self.target,
            image: self.image,
            previous_image: self.previous_image,
            outcome,
            failure,
            rollback_error,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
