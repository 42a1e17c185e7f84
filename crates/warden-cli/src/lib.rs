//! # warden-cli
//!
//! Administrative command-line surface for the warden blocklist.
//!
//! The `warden` binary validates IP address literals and inserts or
//! removes them from the JSON-file blocklist shared with the server
//! wiring. Invalid IP syntax is rejected before any mutation, with a
//! non-zero exit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Commands};
pub use error::CliError;
