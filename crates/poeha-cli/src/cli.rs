//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::replay::ReplayArgs;

/// Path of Exile to Home Assistant bridge.
///
/// Follows the game client log and fires Home Assistant events for incoming
/// trade requests, level-ups and deaths.
#[derive(Debug, Parser)]
#[command(name = "poe-ha", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (logs every line read).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Watch the client log and send events (the default).
    Watch,

    /// Write a configuration template.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },

    /// Classify an existing log file and print what would be sent.
    Replay(ReplayArgs),
}
