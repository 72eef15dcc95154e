// ABOUTME: External collaborators: image builder, registry, orchestration, source control.
// ABOUTME: Capability traits plus implementations that drive docker, aws, kubectl and git.

mod aws;
mod builder;
mod docker;
mod exec;
mod git;
pub mod kube_objects;
mod kubectl;
mod orchestration;
pub mod preflight;
mod registry;
mod source_control;

pub use aws::{AwsCli, AwsError, ecr_host_region, ecr_registry_host, is_ecr_host};
pub use builder::{BuildError, ImageBuilder};
pub use docker::{BuildOptions, DockerCli};
pub use exec::{ExecError, ToolCommand, ToolOutput};
pub use git::GitCli;
pub use kubectl::Kubectl;
pub use orchestration::{
    Converged, ConvergenceFailure, OrchestrationClient, OrchestrationError, RolloutWait,
};
pub use registry::{RegistryClient, RegistryError};
pub use source_control::{RevisionError, SourceControl};
