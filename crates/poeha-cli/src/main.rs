use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use poeha_cli::commands::{init, replay, watch};
use poeha_cli::{Cli, Commands, Config, default_config_path};

/// Loads config, then starts logging at the level it asks for.
fn load_config(config_path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    init_tracing(verbose || config.debug);
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // stdout belongs to command output (replay); logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Watch);

    match command {
        Commands::Init { force } => {
            // Init doesn't load config - it creates it
            init_tracing(cli.verbose);
            let path = match cli.config {
                Some(path) => path,
                None => default_config_path().context("could not determine config directory")?,
            };
            init::run(&mut std::io::stdout(), &path, force)?;
        }
        Commands::Replay(args) => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            replay::run(&mut std::io::stdout().lock(), &args, &config.player_name)?;
        }
        Commands::Watch => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            watch::run(&config)?;
        }
    }

    Ok(())
}
