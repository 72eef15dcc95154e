// ABOUTME: Entry point for the kubeship CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use kubeship::config::{self, CONFIG_FILENAME, InitOptions};
use kubeship::error::{Error, Result};
use kubeship::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --verbose wins over RUST_LOG; logs go to stderr so JSON output stays clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        let code = match e {
            Error::RolloutFailed { outcome, .. } => outcome.exit_code(),
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init {
            deployment,
            container,
            repository,
            force,
        } => {
            let cwd = env::current_dir()?;
            let options = InitOptions {
                deployment,
                container,
                repository,
            };
            config::init_config(&cwd, &options, force)?;
            output.success(&format!("Created {CONFIG_FILENAME}"));
            Ok(())
        }
        Commands::Deploy {
            tag,
            destination,
            skip_build,
            timeout,
        } => {
            let config = commands::load_config(config_path, destination.as_deref())?;
            let args = commands::DeployArgs {
                tag,
                skip_build,
                timeout,
            };
            commands::deploy(config, args, output).await
        }
        Commands::Rollback {
            destination,
            timeout,
        } => {
            let config = commands::load_config(config_path, destination.as_deref())?;
            commands::rollback(config, timeout, output).await
        }
        Commands::Status { destination } => {
            let config = commands::load_config(config_path, destination.as_deref())?;
            commands::status(config, output).await
        }
        Commands::Check => commands::check(&output),
    }
}
