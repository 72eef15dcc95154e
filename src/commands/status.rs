// ABOUTME: Status command implementation.
// ABOUTME: Shows the image the deployment runs and one read of its rollout state.

use super::cluster::ClusterAccess;
use kubeship::config::Config;
use kubeship::diagnostics::Diagnostics;
use kubeship::error::Result;
use kubeship::output::{Output, OutputMode};
use kubeship::rollout::Convergence;
use kubeship::tools::OrchestrationClient;
use serde::Serialize;

#[derive(Serialize)]
struct StatusEvent<'a> {
    event: &'a str,
    namespace: &'a str,
    deployment: &'a str,
    container: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    state: &'a str,
    message: String,
}

pub async fn status(config: Config, output: Output) -> Result<()> {
    let mut diag = Diagnostics::default();
    let target = config.deployment_target()?;
    let cluster = ClusterAccess::from_config(&config)?;
    cluster.refresh_kubeconfig(&output, &mut diag).await;

    let kubectl = cluster.kubectl();
    let image = kubectl.current_image(&target).await?;
    let (state, message) = match kubectl.rollout_state(&target, None).await? {
        Convergence::Converged { replicas } => {
            ("converged", format!("{replicas} replicas available"))
        }
        Convergence::Progressing { message } => ("progressing", message),
        Convergence::Failed { reason } => ("failed", reason),
    };

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    match output.mode() {
        OutputMode::Json => output.json(&StatusEvent {
            event: "status",
            namespace: target.namespace().as_str(),
            deployment: target.deployment().as_str(),
            container: target.container().as_str(),
            image: image.as_ref().map(|i| i.to_string()),
            state,
            message,
        }),
        OutputMode::Normal | OutputMode::Quiet => {
            println!("Deployment: {target}");
            match image {
                Some(image) => println!("Image: {image}"),
                None => println!("Image: unknown"),
            }
            println!("Rollout: {state} ({message})");
        }
    }

    Ok(())
}
