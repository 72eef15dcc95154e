// ABOUTME: Rollback command implementation.
// ABOUTME: Reverts the deployment to its previous revision and waits for it.

use super::cluster::ClusterAccess;
use kubeship::config::Config;
use kubeship::diagnostics::Diagnostics;
use kubeship::error::Result;
use kubeship::output::Output;
use kubeship::rollout::manual_rollback;
use kubeship::tools::OrchestrationClient;
use std::time::Duration;

/// Roll the configured deployment back one revision.
pub async fn rollback(config: Config, timeout: Option<Duration>, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let target = config.deployment_target()?;
    let wait = config.rollout_wait(timeout);
    let cluster = ClusterAccess::from_config(&config)?;
    cluster.refresh_kubeconfig(&output, &mut diag).await;

    output.progress(&format!("Rolling back {target}..."));
    let converged = manual_rollback(cluster.kubectl(), &target, &wait).await?;

    match cluster.kubectl().current_image(&target).await {
        Ok(Some(image)) => output.progress(&format!("  ✓ Now running {image}")),
        Ok(None) => {}
        Err(e) => tracing::debug!(error = %e, "could not read image after rollback"),
    }

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    output.success(&format!(
        "Rolled back {target} ({} replicas available)",
        converged.replicas
    ));
    Ok(())
}
