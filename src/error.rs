// ABOUTME: Application-wide error types for kubeship.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::rollout::{Outcome, RolloutError};
use crate::tools::OrchestrationError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown destination: {0}")]
    UnknownDestination(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Rollout(#[from] RolloutError),

    /// The rollout ran to completion but did not succeed.
    #[error("rollout finished as {outcome}: {summary}")]
    RolloutFailed { outcome: Outcome, summary: String },

    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),

    #[error("{0} hook failed: {1}")]
    Hook(&'static str, String),

    #[error("missing required tools: {0}")]
    MissingTools(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
