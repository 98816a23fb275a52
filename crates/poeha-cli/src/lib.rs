//! Path of Exile to Home Assistant bridge CLI library.
//!
//! This crate provides the CLI interface for the bridge.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{Config, ConfigError, default_config_path};
