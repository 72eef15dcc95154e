// ABOUTME: Decides whether a Deployment rollout has converged, is progressing, or failed.
// ABOUTME: Pure function over the Deployment status and its pods.

use crate::tools::kube_objects::{DeploymentObject, PodList};
use crate::types::ImageRef;

/// Container waiting reasons that will not resolve without a new revision.
const TERMINAL_WAITING_REASONS: &[&str] = &[
    "CrashLoopBackOff",
    "ImagePullBackOff",
    "ErrImagePull",
    "CreateContainerConfigError",
    "InvalidImageName",
];

/// A single observation of a rollout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Convergence {
    /// Every replica runs the current template and is available.
    Converged { replicas: u32 },
    /// Still moving; `message` says what it is waiting for.
    Progressing { message: String },
    /// The platform reports a failure that waiting will not fix.
    Failed { reason: String },
}

/// Assess a rollout from one read of the Deployment and its pods.
///
/// The replica rules follow the platform's own rollout status check: the
/// latest spec must be observed, every desired replica updated, no old
/// replicas left, and every updated replica available. On top of that, a
/// pod running the template image stuck in a terminal waiting state fails the
/// rollout early instead of letting it run into the timeout.
pub fn assess(
    deployment: &DeploymentObject,
    pods: &PodList,
    container: &str,
    expected: Option<&ImageRef>,
) -> Convergence {
    let name = &deployment.metadata.name;
    let status = &deployment.status;
    let template_image = deployment.container_image(container);

    if let (Some(expected), Some(actual)) = (expected, template_image) {
        let expected = expected.to_string();
        if actual != expected {
            return Convergence::Failed {
                reason: format!(
                    "deployment {name} now runs {actual} instead of {expected}; it was changed by another writer"
                ),
            };
        }
    }

    if deployment.metadata.generation > status.observed_generation {
        return Convergence::Progressing {
            message: format!("waiting for deployment {name} spec update to be observed"),
        };
    }

    if let Some(progressing) = deployment.condition("Progressing")
        && progressing.reason.as_deref() == Some("ProgressDeadlineExceeded")
    {
        return Convergence::Failed {
            reason: format!("deployment {name} exceeded its progress deadline"),
        };
    }

    if let Some(image) = template_image
        && let Some(reason) = stuck_pod(pods, container, image)
    {
        return Convergence::Failed { reason };
    }

    let desired = deployment.spec.replicas.unwrap_or(1).max(0);
    let updated = status.updated_replicas;
    let available = status.available_replicas;

    if updated < desired {
        return Convergence::Progressing {
            message: format!("{updated} out of {desired} new replicas have been updated"),
        };
    }

    if status.replicas > updated {
        return Convergence::Progressing {
            message: format!(
                "{} old replicas are pending termination",
                status.replicas - updated
            ),
        };
    }

    if available < updated {
        return Convergence::Progressing {
            message: format!("{available} of {updated} updated replicas are available"),
        };
    }

    Convergence::Converged {
        replicas: u32::try_from(available).unwrap_or(0),
    }
}

/// First pod of `image` whose `container` is stuck, described for humans.
fn stuck_pod(pods: &PodList, container: &str, image: &str) -> Option<String> {
    pods.items
        .iter()
        .filter(|pod| {
            pod.spec
                .containers
                .iter()
                .any(|c| c.name == container && c.image == image)
        })
        .find_map(|pod| {
            pod.status
                .container_statuses
                .iter()
                .filter(|s| s.name == container)
                .find_map(|s| {
                    let waiting = s.state.waiting.as_ref()?;
                    let reason = waiting.reason.as_deref()?;
                    if !TERMINAL_WAITING_REASONS.contains(&reason) {
                        return None;
                    }
                    let mut description = format!(
                        "pod {} container {} is in {} (restarts: {})",
                        pod.metadata.name, container, reason, s.restart_count
                    );
                    if let Some(ref message) = waiting.message {
                        description.push_str(": ");
                        description.push_str(message);
                    }
                    Some(description)
                })
        })
}
