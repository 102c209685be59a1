//! Subcommand implementations.

pub mod build;
pub mod init;
pub mod site;
pub mod watch;
