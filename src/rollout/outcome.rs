// ABOUTME: Terminal outcome of a rollout attempt and the report handed to the invoker.
// ABOUTME: Exactly three outcomes; every run ends with one of them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::tools::ConvergenceFailure;
use crate::types::{DeploymentTarget, ImageRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The new image converged.
    Succeeded,
    /// The new image did not converge; the previous revision was restored.
    RolledBack,
    /// Neither the new image nor the rollback converged.
    RollbackFailed,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Succeeded
    }

    /// Process exit code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Succeeded => 0,
            Outcome::RolledBack | Outcome::RollbackFailed => 1,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded => write!(f, "Succeeded"),
            Outcome::RolledBack => write!(f, "Failed-RolledBack"),
            Outcome::RollbackFailed => write!(f, "Failed-RollbackFailed"),
        }
    }
}

/// Everything known about a finished rollout attempt.
#[derive(Debug, Clone)]
pub struct RolloutReport {
    pub target: DeploymentTarget,
    pub image: ImageRef,
    pub previous_image: Option<ImageRef>,
    pub outcome: Outcome,
    /// Why the new image did not converge.
    pub failure: Option<ConvergenceFailure>,
    /// Why the rollback did not complete.
    pub rollback_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RolloutReport {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self.outcome {
            Outcome::Succeeded => format!("{} now runs {}", self.target, self.image),
            Outcome::RolledBack => format!(
                "{} did not converge on {} ({}); rolled back to {}",
                self.target,
                self.image,
                self.failure_text(),
                self.previous_text()
            ),
            Outcome::RollbackFailed => format!(
                "{} did not converge on {} ({}) and rollback failed ({}); manual intervention required",
                self.target,
                self.image,
                self.failure_text(),
                self.rollback_error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    fn failure_text(&self) -> String {
        self.failure
            .as_ref()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown failure".to_string())
    }

    fn previous_text(&self) -> String {
        self.previous_image
            .as_ref()
            .map(|i| i.to_string())
            .unwrap_or_else(|| "the previous revision".to_string())
    }

    /// Serializable view for JSON output.
    pub fn to_json(&self) -> ReportJson<'_> {
        ReportJson {
            event: "rollout",
            outcome: self.outcome,
            summary: self.summary(),
            namespace: self.target.namespace().as_str(),
            deployment: self.target.deployment().as_str(),
            container: self.target.container().as_str(),
            image: self.image.to_string(),
            previous_image: self.previous_image.as_ref().map(|i| i.to_string()),
            failure: self.failure.as_ref().map(|f| f.to_string()),
            rollback_error: self.rollback_error.as_deref(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportJson<'a> {
    pub event: &'a str,
    pub outcome: Outcome,
    pub summary: String,
    pub namespace: &'a str,
    pub deployment: &'a str,
    pub container: &'a str,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_error: Option<&'a str>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
