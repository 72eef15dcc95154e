// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kubeship")]
#[command(about = "Build, push and roll out container images to Kubernetes, rolling back on failure")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: kubeship.yml in the current directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new kubeship.yml configuration file
    Init {
        /// Deployment name
        #[arg(long)]
        deployment: Option<String>,

        /// Container name within the deployment
        #[arg(long)]
        container: Option<String>,

        /// Image repository (defaults to the container name)
        #[arg(long)]
        repository: Option<String>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Build, push and roll out an image, rolling back if it does not converge
    Deploy {
        /// Image tag (default: short revision of the current commit)
        tag: Option<String>,

        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,

        /// Deploy an image that was already pushed
        #[arg(long)]
        skip_build: bool,

        /// How long to wait for the rollout, e.g. 90s or 5m
        #[arg(short, long, value_parser = parse_timeout)]
        timeout: Option<Duration>,
    },

    /// Roll the deployment back to its previous revision
    Rollback {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,

        /// How long to wait for the rollback, e.g. 90s or 5m
        #[arg(short, long, value_parser = parse_timeout)]
        timeout: Option<Duration>,
    },

    /// Show the deployed image and rollout state
    Status {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Check that docker, aws, kubectl and git are installed
    Check,
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    match kubeship::config::parse_duration(value) {
        Some(d) if !d.is_zero() => Ok(d),
        Some(_) => Err("timeout must be greater than zero".to_string()),
        None => Err(format!("{value:?} is not a duration (try 90s or 5m)")),
    }
}
