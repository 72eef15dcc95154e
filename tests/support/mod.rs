// ABOUTME: Test support utilities.
// ABOUTME: Scripted fake tool clients that record every call, plus tracing setup.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use kubeship::rollout::Convergence;
use kubeship::tools::{
    BuildError, ImageBuilder, OrchestrationClient, OrchestrationError, RegistryClient,
    RegistryError, RevisionError, SourceControl,
};
use kubeship::types::{DeploymentTarget, ImageRef, ImageTag, ResourceName};
use parking_lot::Mutex;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("kubeship=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const ECR_HOST: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com";

/// `default/my-node-app-deployment[my-node-app]`
pub fn node_app_target() -> DeploymentTarget {
    DeploymentTarget::new(
        ResourceName::new("default").unwrap(),
        ResourceName::new("my-node-app-deployment").unwrap(),
        ResourceName::new("my-node-app").unwrap(),
    )
}

pub fn node_app_image(tag: &str) -> ImageRef {
    ImageRef::new(ECR_HOST, "my-node-app", &ImageTag::new(tag).unwrap()).unwrap()
}

// =============================================================================
// Image builder
// =============================================================================

#[derive(Default)]
pub struct FakeBuilder {
    fail_with: Option<String>,
    builds: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn builds(&self) -> Vec<(PathBuf, String)> {
        self.builds.lock().clone()
    }
}

#[async_trait]
impl ImageBuilder for FakeBuilder {
    async fn build(&self, context: &Path, image: &ImageRef) -> Result<(), BuildError> {
        self.builds
            .lock()
            .push((context.to_path_buf(), image.to_string()));
        match self.fail_with {
            Some(ref message) => Err(BuildError::Failed {
                code: Some(1),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Default)]
pub struct FakeRegistry {
    reject_login: bool,
    reject_push: bool,
    logins: Mutex<Vec<String>>,
    pushes: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_login() -> Self {
        Self {
            reject_login: true,
            ..Self::default()
        }
    }

    pub fn rejecting_push() -> Self {
        Self {
            reject_push: true,
            ..Self::default()
        }
    }

    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().clone()
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn authenticate(&self, registry_host: &str) -> Result<(), RegistryError> {
        self.logins.lock().push(registry_host.to_string());
        if self.reject_login {
            return Err(RegistryError::AuthenticationFailed {
                registry: registry_host.to_string(),
                message: "authorization token has expired".to_string(),
            });
        }
        Ok(())
    }

    async fn push(&self, image: &ImageRef) -> Result<(), RegistryError> {
        self.pushes.lock().push(image.to_string());
        if self.reject_push {
            return Err(RegistryError::PushFailed("blob upload unknown".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Source control
// =============================================================================

pub struct FakeScm {
    revision: Option<String>,
    reads: Mutex<usize>,
}

impl FakeScm {
    pub fn at(revision: &str) -> Self {
        Self {
            revision: Some(revision.to_string()),
            reads: Mutex::new(0),
        }
    }

    pub fn outside_repository() -> Self {
        Self {
            revision: None,
            reads: Mutex::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock()
    }
}

#[async_trait]
impl SourceControl for FakeScm {
    async fn short_revision(&self) -> Result<String, RevisionError> {
        *self.reads.lock() += 1;
        self.revision.clone().ok_or_else(|| {
            RevisionError::NotARepository("fatal: not a git repository".to_string())
        })
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// One scripted answer to a rollout status read.
#[derive(Debug, Clone)]
pub enum Step {
    State(Convergence),
    Missing,
    Forbidden,
    /// A read that does not come back for an hour.
    Hang,
}

pub fn converged(replicas: u32) -> Step {
    Step::State(Convergence::Converged { replicas })
}

pub fn progressing(message: &str) -> Step {
    Step::State(Convergence::Progressing {
        message: message.to_string(),
    })
}

pub fn failed(reason: &str) -> Step {
    Step::State(Convergence::Failed {
        reason: reason.to_string(),
    })
}

/// Answers played in order; the last one repeats forever.
#[derive(Debug, Clone)]
struct Script {
    steps: VecDeque<Step>,
    last: Step,
}

impl Script {
    fn new(steps: Vec<Step>) -> Self {
        let last = steps.last().cloned().unwrap_or_else(|| converged(2));
        Self {
            steps: steps.into(),
            last,
        }
    }

    fn next(&mut self) -> Step {
        self.steps.pop_front().unwrap_or_else(|| self.last.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CurrentImage,
    SetImage(String),
    RolloutState { expected: Option<String> },
    UndoRollout,
}

struct OrchestratorState {
    current_image: Option<ImageRef>,
    unreadable_image: bool,
    reject_set_image: Option<String>,
    reject_undo: Option<String>,
    forward: Script,
    rollback: Script,
    undone: bool,
    calls: Vec<Call>,
}

/// A Deployment whose rollout behavior is scripted per phase: before and
/// after an undo.
pub struct FakeOrchestrator {
    state: Mutex<OrchestratorState>,
}

impl FakeOrchestrator {
    /// Converges immediately in both phases.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(OrchestratorState {
                current_image: None,
                unreadable_image: false,
                reject_set_image: None,
                reject_undo: None,
                forward: Script::new(vec![converged(2)]),
                rollback: Script::new(vec![converged(2)]),
                undone: false,
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_current_image(self, image: ImageRef) -> Self {
        self.state.lock().current_image = Some(image);
        self
    }

    pub fn with_unreadable_image(self) -> Self {
        self.state.lock().unreadable_image = true;
        self
    }

    pub fn with_forward(self, steps: Vec<Step>) -> Self {
        self.state.lock().forward = Script::new(steps);
        self
    }

    pub fn with_rollback(self, steps: Vec<Step>) -> Self {
        self.state.lock().rollback = Script::new(steps);
        self
    }

    pub fn rejecting_set_image(self, message: &str) -> Self {
        self.state.lock().reject_set_image = Some(message.to_string());
        self
    }

    pub fn rejecting_undo(self, message: &str) -> Self {
        self.state.lock().reject_undo = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| matches(c)).count()
    }

    pub fn undo_count(&self) -> usize {
        self.count(|c| *c == Call::UndoRollout)
    }

    pub fn set_image_count(&self) -> usize {
        self.count(|c| matches!(c, Call::SetImage(_)))
    }
}

impl Default for FakeOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrchestrationClient for FakeOrchestrator {
    async fn current_image(
        &self,
        _target: &DeploymentTarget,
    ) -> Result<Option<ImageRef>, OrchestrationError> {
        let mut state = self.state.lock();
        state.calls.push(Call::CurrentImage);
        if state.unreadable_image {
            return Err(OrchestrationError::Forbidden(
                "deployments.apps is forbidden".to_string(),
            ));
        }
        Ok(state.current_image.clone())
    }

    async fn set_image(
        &self,
        _target: &DeploymentTarget,
        image: &ImageRef,
    ) -> Result<(), OrchestrationError> {
        let mut state = self.state.lock();
        state.calls.push(Call::SetImage(image.to_string()));
        if let Some(ref message) = state.reject_set_image {
            return Err(OrchestrationError::Rejected(message.clone()));
        }
        state.current_image = Some(image.clone());
        Ok(())
    }

    async fn rollout_state(
        &self,
        target: &DeploymentTarget,
        expected: Option<&ImageRef>,
    ) -> Result<Convergence, OrchestrationError> {
        let step = {
            let mut state = self.state.lock();
            state.calls.push(Call::RolloutState {
                expected: expected.map(|i| i.to_string()),
            });
            if state.undone {
                state.rollback.next()
            } else {
                state.forward.next()
            }
        };
        match step {
            Step::State(convergence) => Ok(convergence),
            Step::Missing => Err(OrchestrationError::NotFound(format!(
                "{}/{}",
                target.namespace(),
                target.deployment()
            ))),
            Step::Forbidden => Err(OrchestrationError::Forbidden(
                "deployments.apps is forbidden".to_string(),
            )),
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(OrchestrationError::Rejected("read timed out".to_string()))
            }
        }
    }

    async fn undo_rollout(&self, _target: &DeploymentTarget) -> Result<(), OrchestrationError> {
        let mut state = self.state.lock();
        state.calls.push(Call::UndoRollout);
        if let Some(ref message) = state.reject_undo {
            return Err(OrchestrationError::Rejected(message.clone()));
        }
        state.undone = true;
        Ok(())
    }
}
