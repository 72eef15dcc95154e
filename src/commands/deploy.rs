// ABOUTME: Deploy command implementation.
// ABOUTME: Runs hooks around the build, push and rollout of one image.

use super::cluster::ClusterAccess;
use kubeship::config::Config;
use kubeship::diagnostics::{Diagnostics, Warning};
use kubeship::error::{Error, Result};
use kubeship::hooks::{HookContext, HookPoint, HookRunner};
use kubeship::output::Output;
use kubeship::rollout::{Coordinator, RolloutError, RolloutReport, resolve_image_tag};
use kubeship::tools::{AwsCli, DockerCli, GitCli};
use kubeship::types::{DeploymentTarget, ImageRef};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Command-line arguments of `deploy`.
#[derive(Debug, Clone, Default)]
pub struct DeployArgs {
    pub tag: Option<String>,
    pub skip_build: bool,
    pub timeout: Option<Duration>,
}

/// Build, push and roll out one image.
pub async fn deploy(config: Config, args: DeployArgs, mut output: Output) -> Result<()> {
    output.start_timer();
    let cwd = env::current_dir()?;
    let hook_runner = HookRunner::new(&cwd);
    let mut diag = Diagnostics::default();

    // Everything the run needs is validated before the first side effect
    let target = config.deployment_target()?;
    let registry_host = config.registry_host()?;
    let repository = config.repository()?.to_string();
    let cluster = ClusterAccess::from_config(&config)?;

    let mut hook_context = HookContext::new(target.clone());
    if let Some(result) = hook_runner.run(HookPoint::PreDeploy, &hook_context).await
        && !result.success
    {
        if !result.stderr.is_empty() {
            eprintln!("{}", result.stderr.trim_end());
        }
        return Err(Error::Hook(HookPoint::PreDeploy.filename(), result.reason()));
    }

    let result = run_rollout(
        &config,
        &cluster,
        &cwd,
        &target,
        &registry_host,
        &repository,
        &args,
        &output,
        &mut diag,
    )
    .await;

    let outcome = match result {
        Ok(report) => {
            hook_context.image = Some(report.image.clone());
            hook_context.previous_image = report.previous_image.clone();
            hook_context.outcome = Some(report.outcome);
            output.report(&report);

            if report.outcome.is_success() {
                run_warning_hook(&hook_runner, HookPoint::PostDeploy, &hook_context, &mut diag)
                    .await;
                Ok(report.summary())
            } else {
                hook_context.error = Some(report.summary());
                run_warning_hook(&hook_runner, HookPoint::OnError, &hook_context, &mut diag).await;
                Err(Error::RolloutFailed {
                    outcome: report.outcome,
                    summary: report.summary(),
                })
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "deploy failed");
            hook_context.error = Some(e.to_string());
            run_warning_hook(&hook_runner, HookPoint::OnError, &hook_context, &mut diag).await;
            Err(e)
        }
    };

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    let summary = outcome?;
    output.success(&summary);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_rollout(
    config: &Config,
    cluster: &ClusterAccess,
    project_dir: &Path,
    target: &DeploymentTarget,
    registry_host: &str,
    repository: &str,
    args: &DeployArgs,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<RolloutReport> {
    let tag = resolve_image_tag(args.tag.as_deref(), &GitCli::new(project_dir)).await?;

    let aws = AwsCli::new(config.registry.region.clone());
    let docker = DockerCli::new(config.build_options(project_dir)?, Some(aws));
    let coordinator = Coordinator::new(&docker, &docker, cluster.kubectl(), output)
        .with_poll_interval(config.poll_interval);

    let image = if args.skip_build {
        let image = ImageRef::new(registry_host, repository, &tag).map_err(|e| {
            RolloutError::Configuration(format!("invalid image reference: {e}"))
        })?;
        output.progress(&format!("Using pushed image {image}"));
        image
    } else {
        coordinator
            .build_and_push(
                &config.build_context(project_dir),
                registry_host,
                repository,
                &tag,
            )
            .await?
    };

    // The cluster is only reached once the image exists
    cluster.refresh_kubeconfig(output, diag).await;

    let timeout = config.rollout_wait(args.timeout).timeout;
    Ok(coordinator.deploy(target, &image, timeout, diag).await?)
}

/// Run a hook whose failure is only worth a warning.
async fn run_warning_hook(
    runner: &HookRunner,
    point: HookPoint,
    context: &HookContext,
    diag: &mut Diagnostics,
) {
    if let Some(result) = runner.run(point, context).await
        && !result.success
    {
        diag.warn(Warning::hook_failed(format!(
            "{} hook failed: {}",
            point.filename(),
            result.reason()
        )));
    }
}
