//! Command execution against the blocklist store.

use std::io::Write;

use tracing::debug;

use warden_track::{BlocklistStore, JsonFileBlocklist};

use crate::cli::{Cli, Commands};
use crate::error::CliError;

/// Execute the parsed command, writing human-readable output to `out`.
///
/// # Errors
///
/// Returns an error if the blocklist file cannot be read or written, or
/// if output fails.
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<(), CliError> {
    debug!(blocklist = %cli.blocklist.display(), "opening blocklist");
    let store = JsonFileBlocklist::open(&cli.blocklist)?;

    match &cli.command {
        Commands::Block { ip } => {
            if store.insert(*ip)? {
                writeln!(out, "IP {ip} has been blocked.")?;
            } else {
                writeln!(out, "IP {ip} was already blocked.")?;
            }
        }
        Commands::Unblock { ip } => {
            if store.remove(ip)? {
                writeln!(out, "IP {ip} has been unblocked.")?;
            } else {
                writeln!(out, "IP {ip} was not blocked.")?;
            }
        }
        Commands::List => {
            let mut blocked = store.list()?;
            blocked.sort();
            if blocked.is_empty() {
                writeln!(out, "No blocked IPs.")?;
            } else {
                for ip in blocked {
                    writeln!(out, "{ip}")?;
                }
            }
        }
    }

    Ok(())
}
