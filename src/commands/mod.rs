// ABOUTME: Command module aggregator for the kubeship CLI.
// ABOUTME: Re-exports command handlers and the shared config loader.

mod check;
mod cluster;
mod deploy;
mod rollback;
mod status;

pub use check::check;
pub use deploy::{DeployArgs, deploy};
pub use rollback::rollback;
pub use status::status;

use kubeship::config::Config;
use kubeship::error::Result;
use std::env;
use std::path::Path;

/// Load the config file (explicit or discovered), apply the destination,
/// then environment overrides.
pub fn load_config(path: Option<&Path>, destination: Option<&str>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::discover(&env::current_dir()?)?,
    };

    let mut config = match destination {
        Some(dest) => config.for_destination(dest)?,
        None => config,
    };

    config.apply_process_env()?;
    Ok(config)
}
