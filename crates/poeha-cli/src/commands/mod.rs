//! CLI subcommand implementations.

pub mod init;
pub mod replay;
pub mod watch;
