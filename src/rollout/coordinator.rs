// ABOUTME: Sequences build, push, image update, convergence wait and rollback.
// ABOUTME: Talks to the outside world only through the injected tool clients.

use std::path::Path;
use std::time::Duration;

use crate::diagnostics::Diagnostics;
use crate::output::Output;
use crate::tools::{ImageBuilder, OrchestrationClient, RegistryClient, RolloutWait};
use crate::types::{DeploymentTarget, ImageRef, ImageTag};

use super::error::RolloutError;
use super::outcome::RolloutReport;
use super::{Pending, Rollout};

/// Pause between rollout status reads unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Drives one rollout attempt.
///
/// Every step runs to completion before the next begins. Nothing is retried
/// within a run; each step is safe to repeat by running the tool again.
pub struct Coordinator<'a, B: ?Sized, R: ?Sized, O: ?Sized> {
    builder: &'a B,
    registry: &'a R,
    orchestrator: &'a O,
    output: &'a Output,
    poll_interval: Duration,
}

impl<'a, B, R, O> Coordinator<'a, B, R, O>
where
    B: ImageBuilder + ?Sized,
    R: RegistryClient + ?Sized,
    O: OrchestrationClient + ?Sized,
{
    pub fn new(builder: &'a B, registry: &'a R, orchestrator: &'a O, output: &'a Output) -> Self {
        Self {
            builder,
            registry,
            orchestrator,
            output,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Build `registry_host/repository:tag` from `context` and push it.
    ///
    /// Orchestration state is never touched here.
    ///
    /// # Errors
    ///
    /// `RolloutError::Configuration` for an unusable registry or repository,
    /// `RolloutError::Build` when the build fails and `RolloutError::Push`
    /// when authentication or upload fails.
    pub async fn build_and_push(
        &self,
        context: &Path,
        registry_host: &str,
        repository: &str,
        tag: &ImageTag,
    ) -> Result<ImageRef, RolloutError> {
        let image = ImageRef::new(registry_host, repository, tag)
            .map_err(|e| RolloutError::Configuration(format!("invalid image reference: {e}")))?;

        self.output.progress(&format!("Building {image}..."));
        tracing::info!(step = "build", %image, context = %context.display(), "building image");
        if let Err(source) = self.builder.build(context, &image).await {
            return Err(RolloutError::Build { image, source });
        }

        self.output.progress(&format!("Pushing {image}..."));
        tracing::info!(step = "push", %image, "pushing image");
        if let Err(source) = self.registry.authenticate(registry_host).await {
            return Err(RolloutError::Push { image, source });
        }
        if let Err(source) = self.registry.push(&image).await {
            return Err(RolloutError::Push { image, source });
        }

        Ok(image)
    }

    /// Roll `image` out to `target`, rolling back if it does not converge
    /// within `timeout`.
    ///
    /// Convergence failures are not errors: they end in a report whose
    /// outcome says whether the rollback worked.
    ///
    /// # Errors
    ///
    /// Returns `RolloutError::DeployRequest` when the update itself is
    /// rejected; nothing changed on the platform in that case.
    pub async fn deploy(
        &self,
        target: &DeploymentTarget,
        image: &ImageRef,
        timeout: Duration,
        diagnostics: &mut Diagnostics,
    ) -> Result<RolloutReport, RolloutError> {
        let wait = RolloutWait::new(timeout, self.poll_interval);
        let rollout = Rollout::<Pending>::new(target.clone(), image.clone());

        self.output
            .progress(&format!("Updating {target} to {image}..."));
        tracing::info!(step = "update", deployment = %target, %image, "requesting image update");
        let rollout = rollout.update(self.orchestrator, diagnostics).await?;

        self.output
            .progress(&format!("Waiting up to {} for rollout...", humantime::format_duration(timeout)));
        tracing::info!(step = "observe", deployment = %target, ?timeout, "observing rollout");
        let report = match rollout.observe(self.orchestrator, &wait).await {
            Ok(converged) => converged.finish(),
            Err((updated, failure)) => {
                self.output
                    .progress(&format!("Rollout failed: {failure}. Rolling back..."));
                tracing::info!(step = "rollback", deployment = %target, "rolling back");
                updated.roll_back(self.orchestrator, &wait, failure).await
            }
        };

        tracing::info!(deployment = %target, %image, outcome = %report.outcome, "rollout finished");
        Ok(report)
    }
}
