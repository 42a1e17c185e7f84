//! Command-line argument parsing with clap.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// warden - IP blocklist administration.
#[derive(Parser, Debug, Clone)]
#[command(name = "warden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the blocklist file.
    #[arg(
        short,
        long,
        env = "WARDEN_BLOCKLIST",
        default_value = "blocklist.json"
    )]
    pub blocklist: PathBuf,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Block an IP address.
    ///
    /// The argument must be a valid IPv4 or IPv6 literal; anything else
    /// is rejected before the blocklist is touched.
    Block {
        /// The IP address to block.
        ip: IpAddr,
    },

    /// Unblock an IP address.
    Unblock {
        /// The IP address to unblock.
        ip: IpAddr,
    },

    /// List currently blocked IP addresses.
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_block() {
        let cli = Cli::try_parse_from(["warden", "block", "9.9.9.9"]).unwrap();
        assert!(matches!(cli.command, Commands::Block { ip } if ip == "9.9.9.9".parse::<IpAddr>().unwrap()));
        assert_eq!(cli.blocklist, PathBuf::from("blocklist.json"));
    }

    #[test]
    fn test_parse_unblock_ipv6() {
        let cli = Cli::try_parse_from(["warden", "unblock", "2001:db8::1"]).unwrap();
        assert!(matches!(cli.command, Commands::Unblock { ip } if ip == "2001:db8::1".parse::<IpAddr>().unwrap()));
    }

    #[test]
    fn test_parse_custom_blocklist_path() {
        let cli = Cli::try_parse_from(["warden", "--blocklist", "/tmp/b.json", "list"]).unwrap();
        assert_eq!(cli.blocklist, PathBuf::from("/tmp/b.json"));
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_invalid_ip_is_rejected() {
        let result = Cli::try_parse_from(["warden", "block", "not-an-ip"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        let result = Cli::try_parse_from(["warden"]);
        assert!(result.is_err());
    }
}
