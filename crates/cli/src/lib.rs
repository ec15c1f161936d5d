//! Command line front end for WireGuard group management.
//!
//! Each invocation opens the JSON file store, runs one operation through the
//! group service and prints the result:
//! - groups and peers as JSON
//! - rendered configs as plain `wg-quick` text

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
