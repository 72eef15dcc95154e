// ABOUTME: Hooks system for rollout lifecycle events.
// ABOUTME: Discovers and executes shell scripts at pre-deploy, post-deploy, and on-error points.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::rollout::Outcome;
use crate::types::{DeploymentTarget, ImageRef};

/// Hook execution points in the rollout lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before anything is built. Failure aborts the run.
    PreDeploy,
    /// After the rollout succeeded. Failure logs warning.
    PostDeploy,
    /// After any failure, including rollbacks. Failure logs warning.
    OnError,
}

impl HookPoint {
    pub fn filename(&self) -> &'static str {
        match self {
            HookPoint::PreDeploy => "pre-deploy",
            HookPoint::PostDeploy => "post-deploy",
            HookPoint::OnError => "on-error",
        }
    }

    /// Whether failure at this hook point should abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HookPoint::PreDeploy)
    }
}

/// Context passed to hooks via environment variables.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub target: DeploymentTarget,
    /// Image being deployed; unknown when the run failed before the tag was resolved.
    pub image: Option<ImageRef>,
    pub previous_image: Option<ImageRef>,
    pub outcome: Option<Outcome>,
    pub error: Option<String>,
}

impl HookContext {
    pub fn new(target: DeploymentTarget) -> Self {
        Self {
            target,
            image: None,
            previous_image: None,
            outcome: None,
            error: None,
        }
    }

    pub fn to_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert(
            "KUBESHIP_NAMESPACE".to_string(),
            self.target.namespace().to_string(),
        );
        env.insert(
            "KUBESHIP_DEPLOYMENT".to_string(),
            self.target.deployment().to_string(),
        );
        env.insert(
            "KUBESHIP_CONTAINER".to_string(),
            self.target.container().to_string(),
        );
        if let Some(ref image) = self.image {
            env.insert("KUBESHIP_IMAGE".to_string(), image.to_string());
        }
        if let Some(ref prev) = self.previous_image {
            env.insert("KUBESHIP_PREVIOUS_IMAGE".to_string(), prev.to_string());
        }
        if let Some(outcome) = self.outcome {
            env.insert("KUBESHIP_OUTCOME".to_string(), outcome.to_string());
        }
        if let Some(ref error) = self.error {
            env.insert("KUBESHIP_ERROR".to_string(), error.clone());
        }
        env
    }
}

#[derive(Debug)]
pub struct HookResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl HookResult {
    /// Last non-empty stderr line, or the exit code.
    pub fn reason(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| match self.exit_code {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            })
    }
}

/// Discovers and runs hooks from a project directory.
pub struct HookRunner {
    hooks_dir: PathBuf,
}

impl HookRunner {
    /// Look for hooks in `<project_dir>/.kubeship/hooks`.
    pub fn new(project_dir: &Path) -> Self {
        Self {
            hooks_dir: project_dir.join(".kubeship").join("hooks"),
        }
    }

    pub fn hook_exists(&self, point: HookPoint) -> bool {
        self.hook_path(point).is_file()
    }

    fn hook_path(&self, point: HookPoint) -> PathBuf {
        self.hooks_dir.join(point.filename())
    }

    /// Run a hook if it exists.
    ///
    /// Returns None if the hook doesn't exist, or Some(HookResult) if it was run.
    pub async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult> {
        let hook_path = self.hook_path(point);

        if !hook_path.is_file() {
            return None;
        }

        tracing::info!(hook = point.filename(), path = %hook_path.display(), "running hook");

        let output = Command::new(&hook_path)
            .envs(context.to_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) => {
                let result = HookResult {
                    success: output.status.success(),
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if result.success {
                    tracing::info!(hook = point.filename(), "hook completed");
                } else {
                    tracing::warn!(
                        hook = point.filename(),
                        exit_code = ?result.exit_code,
                        "hook failed"
                    );
                }

                Some(result)
            }
            Err(e) => {
                tracing::error!(hook = point.filename(), error = %e, "failed to execute hook");
                Some(HookResult {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                })
            }
        }
    }
}
